//! Laptop Store Port (Driven Port)
//!
//! Interface for the concurrent registry of laptop records.

use async_trait::async_trait;

use super::{CallContext, Interrupted, MessageSink, StreamError};
use crate::domain::filter::Filter;
use crate::domain::laptop::Laptop;

/// Errors returned by a laptop store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A record with this identity is already stored.
    #[error("laptop {0} already exists")]
    AlreadyExists(String),

    /// No record with this identity is stored.
    #[error("laptop {0} not found")]
    NotFound(String),

    /// The call was interrupted between search candidates.
    #[error("search interrupted: {0}")]
    Interrupted(#[from] Interrupted),

    /// The search receiver rejected a match.
    #[error("cannot deliver search result: {0}")]
    Sink(#[from] StreamError),
}

/// Laptop store port.
///
/// Implementations must hand out independent copies: nothing a caller does
/// to a returned `Laptop` may affect the stored record.
#[async_trait]
pub trait LaptopStore: Send + Sync {
    /// Store a copy of `laptop`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if the identity is taken.
    async fn save(&self, laptop: &Laptop) -> Result<(), StoreError>;

    /// Look up a laptop by identity.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no such record exists.
    async fn find(&self, id: &str) -> Result<Laptop, StoreError>;

    /// Hand every record matching `filter` to `found`.
    ///
    /// Checks `ctx` before each candidate and stops at the first
    /// interruption or sink failure. Order is unspecified.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Interrupted` or `StoreError::Sink`.
    async fn search(
        &self,
        ctx: &CallContext,
        filter: &Filter,
        found: &mut dyn MessageSink<Laptop>,
    ) -> Result<(), StoreError>;

    /// Number of stored records.
    async fn len(&self) -> usize;

    /// Whether the store holds no records.
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
