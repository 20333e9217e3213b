//! Call Context
//!
//! Cancellation and deadline signal for a single in-flight call. The
//! service polls it at well-defined points: before the single mutation of a
//! unary call, and before every unit of work in a streaming loop. The
//! transport additionally races the whole operation against
//! [`CallContext::interrupted`], so a call blocked on a slow peer still
//! ends when its deadline passes.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

/// Why a call was interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Interrupted {
    /// The call's deadline has passed.
    #[error("deadline exceeded")]
    DeadlineExceeded,
    /// The caller went away or the call was cancelled explicitly.
    #[error("call canceled")]
    Canceled,
}

/// Cancellation/deadline state of one call.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl CallContext {
    /// Create a context with no deadline that is never cancelled unless
    /// [`CallContext::cancel`] is called.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an absolute deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set a deadline relative to now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Tie the call to an externally owned cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// The call's deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The token that cancels this call.
    #[must_use]
    pub const fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancel the call.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Check whether the call may continue.
    ///
    /// # Errors
    ///
    /// Returns the interruption if the deadline has passed or the call was
    /// cancelled.
    pub fn check(&self) -> Result<(), Interrupted> {
        if let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            return Err(Interrupted::DeadlineExceeded);
        }

        if self.cancel.is_cancelled() {
            return Err(Interrupted::Canceled);
        }

        Ok(())
    }

    /// Resolve once the call is cancelled or its deadline passes.
    ///
    /// Never resolves for a call without a deadline that is never
    /// cancelled.
    pub async fn interrupted(&self) -> Interrupted {
        match self.deadline {
            Some(deadline) => {
                let expired = tokio::time::sleep_until(deadline.into());
                tokio::select! {
                    () = self.cancel.cancelled() => Interrupted::Canceled,
                    () = expired => Interrupted::DeadlineExceeded,
                }
            }
            None => {
                self.cancel.cancelled().await;
                Interrupted::Canceled
            }
        }
    }
}
