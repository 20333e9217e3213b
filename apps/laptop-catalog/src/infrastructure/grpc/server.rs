//! gRPC Server Implementation
//!
//! Implements the `LaptopService` gRPC service on top of
//! [`CatalogService`]. This module owns everything wire-specific: decoding
//! requests, deriving the call deadline, adapting tonic streams to the
//! message ports, and encoding failures as rich statuses.

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_stream::Stream;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tonic::{Request, Response, Status, Streaming};

use super::proto::{
    CreateLaptopRequest, CreateLaptopResponse, RateLaptopRequest, RateLaptopResponse,
    SearchLaptopRequest, SearchLaptopResponse, UploadImageRequest, UploadImageResponse,
    laptop_service_server::LaptopService,
};
use crate::application::ports::{
    CallContext, Interrupted, MessageSink, MessageSource, StreamError,
};
use crate::application::services::CatalogService;
use crate::domain::filter::Filter;
use crate::domain::laptop::Laptop;
use crate::domain::rating::RatingSummary;
use crate::error::ServiceError;
use crate::infrastructure::metrics::{self, Rpc};

// =============================================================================
// Type Aliases
// =============================================================================

type RpcResult<T> = Result<Response<T>, Status>;
type BoxedStream<T> = Pin<Box<dyn Stream<Item = Result<T, Status>> + Send>>;

/// Default capacity of the outbound channel of a streaming call.
pub const DEFAULT_STREAM_BUFFER: usize = 128;

// =============================================================================
// Stream Adapters
// =============================================================================

/// Inbound tonic stream as a [`MessageSource`].
pub struct InboundStream<R> {
    inner: Streaming<R>,
}

impl<R> InboundStream<R> {
    /// Wrap a tonic request stream.
    #[must_use]
    pub const fn new(inner: Streaming<R>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<R, T> MessageSource<T> for InboundStream<R>
where
    R: Send + 'static,
    T: From<R> + Send + 'static,
{
    async fn next_message(&mut self) -> Result<Option<T>, StreamError> {
        self.inner
            .message()
            .await
            .map(|message| message.map(T::from))
            .map_err(|status| StreamError::Transport(status.to_string()))
    }
}

/// Outbound response channel as a [`MessageSink`].
pub struct ResponseSink<T, R> {
    tx: mpsc::Sender<Result<R, Status>>,
    encode: fn(T) -> R,
}

impl<T, R> ResponseSink<T, R> {
    /// Wrap a response channel, encoding each message with `encode`.
    #[must_use]
    pub const fn new(tx: mpsc::Sender<Result<R, Status>>, encode: fn(T) -> R) -> Self {
        Self { tx, encode }
    }
}

#[async_trait]
impl<T, R> MessageSink<T> for ResponseSink<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    async fn send(&mut self, message: T) -> Result<(), StreamError> {
        self.tx
            .send(Ok((self.encode)(message)))
            .await
            .map_err(|_| StreamError::Closed)
    }
}

// =============================================================================
// Call Context
// =============================================================================

/// Parse a `grpc-timeout` header value: at most eight digits followed by a
/// unit (`H`, `M`, `S`, `m`, `u` or `n`).
fn parse_grpc_timeout(value: &str) -> Option<Duration> {
    if !value.is_ascii() || value.len() < 2 || value.len() > 9 {
        return None;
    }

    let (digits, unit) = value.split_at(value.len() - 1);
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let amount: u64 = digits.parse().ok()?;

    match unit {
        "H" => Some(Duration::from_secs(amount * 3600)),
        "M" => Some(Duration::from_secs(amount * 60)),
        "S" => Some(Duration::from_secs(amount)),
        "m" => Some(Duration::from_millis(amount)),
        "u" => Some(Duration::from_micros(amount)),
        "n" => Some(Duration::from_nanos(amount)),
        _ => None,
    }
}

/// Build the context of an incoming call from its metadata.
fn call_context<T>(request: &Request<T>) -> CallContext {
    let ctx = CallContext::new().with_cancellation(CancellationToken::new());

    match request
        .metadata()
        .get("grpc-timeout")
        .and_then(|value| value.to_str().ok())
    {
        Some(raw) => match parse_grpc_timeout(raw) {
            Some(timeout) => ctx.with_timeout(timeout),
            None => {
                tracing::debug!(grpc_timeout = raw, "Ignoring malformed grpc-timeout");
                ctx
            }
        },
        None => ctx,
    }
}

/// Run `operation` until it finishes or the call is interrupted.
///
/// The operation future is dropped when the deadline passes or the call is
/// cancelled, releasing whatever it holds even while it waits on a peer.
async fn until_interrupted<T, F>(ctx: &CallContext, operation: F) -> Result<T, ServiceError>
where
    F: Future<Output = Result<T, ServiceError>>,
{
    tokio::select! {
        output = operation => output,
        reason = ctx.interrupted() => {
            tracing::debug!(reason = %reason, "Call interrupted, abandoning operation");
            Err(ServiceError::from(reason))
        }
    }
}

/// Run `operation` until it finishes, the call is interrupted, or the
/// client drops the response stream. A disconnect cancels `ctx`.
async fn cancel_on_disconnect<T, R, F>(
    ctx: &CallContext,
    tx: &mpsc::Sender<Result<R, Status>>,
    operation: F,
) -> Result<T, ServiceError>
where
    F: Future<Output = Result<T, ServiceError>>,
{
    tokio::select! {
        output = until_interrupted(ctx, operation) => output,
        () = tx.closed() => {
            tracing::debug!("Client disconnected, cancelling call");
            ctx.cancel();
            Err(ServiceError::from(Interrupted::Canceled))
        }
    }
}

fn record_outcome<T>(rpc: Rpc, started: Instant, result: &Result<T, ServiceError>) {
    let code = match result {
        Ok(_) => "OK",
        Err(e) => e.kind().reason(),
    };
    metrics::record_request(rpc, code, started.elapsed());
}

// =============================================================================
// Server Implementation
// =============================================================================

/// gRPC front end of the laptop catalog.
#[derive(Debug, Clone)]
pub struct LaptopServer {
    service: CatalogService,
    stream_buffer: usize,
}

impl LaptopServer {
    /// Create a server over `service`.
    #[must_use]
    pub const fn new(service: CatalogService) -> Self {
        Self {
            service,
            stream_buffer: DEFAULT_STREAM_BUFFER,
        }
    }

    /// Set the outbound channel capacity of streaming calls.
    #[must_use]
    pub const fn with_stream_buffer(mut self, stream_buffer: usize) -> Self {
        self.stream_buffer = if stream_buffer == 0 { 1 } else { stream_buffer };
        self
    }
}

#[tonic::async_trait]
impl LaptopService for LaptopServer {
    type SearchLaptopStream = BoxedStream<SearchLaptopResponse>;
    type RateLaptopStream = BoxedStream<RateLaptopResponse>;

    async fn create_laptop(
        &self,
        request: Request<CreateLaptopRequest>,
    ) -> RpcResult<CreateLaptopResponse> {
        let started = Instant::now();
        let ctx = call_context(&request);

        let result = match request.into_inner().laptop {
            Some(laptop) => self.service.create_laptop(&ctx, laptop.into()).await,
            None => Err(ServiceError::invalid_argument("laptop is required")),
        };
        record_outcome(Rpc::CreateLaptop, started, &result);

        let id = result?;
        Ok(Response::new(CreateLaptopResponse { id }))
    }

    async fn search_laptop(
        &self,
        request: Request<SearchLaptopRequest>,
    ) -> RpcResult<Self::SearchLaptopStream> {
        let started = Instant::now();
        let ctx = call_context(&request);
        let filter = request
            .into_inner()
            .filter
            .map(Filter::from)
            .unwrap_or_default();

        let (tx, rx) = mpsc::channel(self.stream_buffer);
        let service = self.service.clone();

        tokio::spawn(async move {
            let mut sink = ResponseSink::new(tx.clone(), |laptop: Laptop| SearchLaptopResponse {
                laptop: Some(laptop.into()),
            });

            let result =
                cancel_on_disconnect(&ctx, &tx, service.search_laptop(&ctx, &filter, &mut sink))
                    .await;
            record_outcome(Rpc::SearchLaptop, started, &result);

            if let Err(e) = result {
                let _ = tx.send(Err(e.into())).await;
            }
        });

        let stream = ReceiverStream::new(rx);
        Ok(Response::new(Box::pin(stream) as Self::SearchLaptopStream))
    }

    async fn upload_image(
        &self,
        request: Request<Streaming<UploadImageRequest>>,
    ) -> RpcResult<UploadImageResponse> {
        let started = Instant::now();
        let ctx = call_context(&request);
        let mut messages = InboundStream::new(request.into_inner());

        let result = until_interrupted(&ctx, self.service.upload_image(&ctx, &mut messages)).await;
        record_outcome(Rpc::UploadImage, started, &result);

        let saved = result?;
        Ok(Response::new(UploadImageResponse {
            id: saved.id,
            size: u32::try_from(saved.size).unwrap_or(u32::MAX),
        }))
    }

    async fn rate_laptop(
        &self,
        request: Request<Streaming<RateLaptopRequest>>,
    ) -> RpcResult<Self::RateLaptopStream> {
        let started = Instant::now();
        let ctx = call_context(&request);
        let mut requests = InboundStream::new(request.into_inner());

        let (tx, rx) = mpsc::channel(self.stream_buffer);
        let service = self.service.clone();

        tokio::spawn(async move {
            let mut replies = ResponseSink::new(
                tx.clone(),
                <RateLaptopResponse as From<RatingSummary>>::from,
            );

            let result = cancel_on_disconnect(
                &ctx,
                &tx,
                service.rate_laptop(&ctx, &mut requests, &mut replies),
            )
            .await;
            record_outcome(Rpc::RateLaptop, started, &result);

            if let Err(e) = result {
                let _ = tx.send(Err(e.into())).await;
            }
        });

        let stream = ReceiverStream::new(rx);
        Ok(Response::new(Box::pin(stream) as Self::RateLaptopStream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StatusKind;
    use test_case::test_case;

    #[test_case("5S", Some(Duration::from_secs(5)) ; "seconds")]
    #[test_case("2H", Some(Duration::from_secs(7200)) ; "hours")]
    #[test_case("3M", Some(Duration::from_secs(180)) ; "minutes")]
    #[test_case("250m", Some(Duration::from_millis(250)) ; "millis")]
    #[test_case("99999999u", Some(Duration::from_micros(99_999_999)) ; "micros")]
    #[test_case("10n", Some(Duration::from_nanos(10)) ; "nanos")]
    #[test_case("S", None ; "missing digits")]
    #[test_case("123456789S", None ; "too many digits")]
    #[test_case("5x", None ; "unknown unit")]
    #[test_case("-5S", None ; "signed")]
    #[test_case("5é", None ; "non ascii")]
    fn grpc_timeout_parsing(raw: &str, expected: Option<Duration>) {
        assert_eq!(parse_grpc_timeout(raw), expected);
    }

    #[test]
    fn context_takes_deadline_from_header() {
        let mut request = Request::new(());
        request
            .metadata_mut()
            .insert("grpc-timeout", "30S".parse().unwrap());

        let ctx = call_context(&request);
        assert!(ctx.deadline().is_some());
        assert!(ctx.check().is_ok());
    }

    #[test]
    fn context_without_header_has_no_deadline() {
        let ctx = call_context(&Request::new(()));
        assert!(ctx.deadline().is_none());
    }

    #[tokio::test]
    async fn disconnect_cancels_context() {
        let ctx = CallContext::new();
        let (tx, rx) = mpsc::channel::<Result<(), Status>>(1);
        drop(rx);

        let result: Result<(), ServiceError> =
            cancel_on_disconnect(&ctx, &tx, std::future::pending()).await;

        assert_eq!(result.unwrap_err().kind(), StatusKind::Canceled);
        assert_eq!(ctx.check(), Err(Interrupted::Canceled));
    }

    #[tokio::test]
    async fn deadline_abandons_blocked_send() {
        let ctx = CallContext::new().with_timeout(Duration::from_millis(50));
        let (tx, _rx) = mpsc::channel::<Result<u32, Status>>(1);
        let mut sink = ResponseSink::new(tx.clone(), |n: u32| n);
        let lock = tokio::sync::RwLock::new(());

        let result = tokio::time::timeout(
            Duration::from_secs(2),
            cancel_on_disconnect(&ctx, &tx, async {
                let _guard = lock.read().await;
                while sink.send(1).await.is_ok() {}
                Err::<(), _>(ServiceError::internal("receiver closed"))
            }),
        )
        .await
        .expect("deadline should end the call");

        assert_eq!(result.unwrap_err().kind(), StatusKind::DeadlineExceeded);
        assert!(lock.try_write().is_ok());
    }

    #[tokio::test]
    async fn finished_operation_wins() {
        let ctx = CallContext::new().with_timeout(Duration::from_secs(60));
        let (tx, _rx) = mpsc::channel::<Result<(), Status>>(1);

        let result = cancel_on_disconnect(&ctx, &tx, async { Ok::<_, ServiceError>(7) }).await;

        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn response_sink_reports_closed_channel() {
        let (tx, rx) = mpsc::channel::<Result<u32, Status>>(1);
        let mut sink = ResponseSink::new(tx, |n: u8| u32::from(n));

        sink.send(7).await.unwrap();
        drop(rx);

        assert_eq!(sink.send(8).await, Err(StreamError::Closed));
    }
}
