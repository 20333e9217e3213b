//! Message Stream Ports
//!
//! The two directions of a streaming call. The transport adapter provides
//! implementations backed by the wire; tests and in-process callers can use
//! the channel and `Vec` implementations below.

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Failure of a stream receive or send.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    /// The peer closed its side of the stream.
    #[error("stream closed by peer")]
    Closed,
    /// The transport reported an error.
    #[error("stream transport error: {0}")]
    Transport(String),
}

/// Inbound side of a stream.
#[async_trait]
pub trait MessageSource<T: Send + 'static>: Send {
    /// Receive the next message.
    ///
    /// Returns `Ok(None)` once the peer has finished sending.
    async fn next_message(&mut self) -> Result<Option<T>, StreamError>;
}

/// Outbound side of a stream.
#[async_trait]
pub trait MessageSink<T: Send + 'static>: Send {
    /// Send one message, waiting for capacity if needed.
    async fn send(&mut self, message: T) -> Result<(), StreamError>;
}

#[async_trait]
impl<T: Send + 'static> MessageSource<T> for mpsc::Receiver<T> {
    async fn next_message(&mut self) -> Result<Option<T>, StreamError> {
        Ok(self.recv().await)
    }
}

#[async_trait]
impl<T: Send + 'static> MessageSink<T> for mpsc::Sender<T> {
    async fn send(&mut self, message: T) -> Result<(), StreamError> {
        mpsc::Sender::send(self, message)
            .await
            .map_err(|_| StreamError::Closed)
    }
}

#[async_trait]
impl<T: Send + 'static> MessageSink<T> for Vec<T> {
    async fn send(&mut self, message: T) -> Result<(), StreamError> {
        self.push(message);
        Ok(())
    }
}
