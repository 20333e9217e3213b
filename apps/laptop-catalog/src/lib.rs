#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Laptop Catalog - gRPC Catalog Service
//!
//! A gRPC service that keeps an in-memory catalog of laptops and exposes
//! four operations over it, one per gRPC call shape:
//!
//! - `CreateLaptop` (unary): register a laptop, assigning an ID if needed
//! - `SearchLaptop` (server streaming): stream every laptop matching a filter
//! - `UploadImage` (client streaming): receive an image in chunks and store it
//! - `RateLaptop` (bidirectional): score laptops and stream back running means
//!
//! # Layers (inside -> outside)
//!
//! - **Domain**: Catalog types and business rules
//!   - `laptop`: Laptop record and its components
//!   - `filter`: Search predicate and memory normalization
//!   - `image`, `rating`: Upload messages and rating aggregates
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: Store interfaces, stream endpoints, call context
//!   - `services`: The catalog service implementing the four operations
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `grpc`: Wire messages, conversions and the tonic server
//!   - `persistence`: In-memory laptop and rating stores, on-disk images
//!   - `serializer`: Binary and JSON laptop encodings
//!   - `config`, `telemetry`, `metrics`, `health`: Process plumbing
//!
//! # Data Flow
//!
//! ```text
//!             +-------------+     +----------------+     +--------------+
//! Client ---->| gRPC Server |---->| CatalogService |---->| LaptopStore  |
//!        <----| (streams)   |<----| (CallContext)  |---->| ImageStore   |
//!             +-------------+     +----------------+     | RatingStore  |
//!                                                        +--------------+
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Catalog types with no transport or storage dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

/// Service errors and their gRPC status mapping.
pub mod error;

#[cfg(test)]
mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::filter::Filter;
pub use domain::image::{ImageInfo, SavedImage, UploadImageMessage};
pub use domain::laptop::{Laptop, Memory, MemoryUnit};
pub use domain::rating::{Rating, RatingRequest, RatingSummary};

// Application
pub use application::ports::{CallContext, Interrupted};
pub use application::services::{CatalogService, DEFAULT_MAX_IMAGE_SIZE};

// Errors
pub use error::{ServiceError, StatusKind};

// Infrastructure config
pub use infrastructure::config::{CatalogConfig, ConfigError, ServerSettings, StorageSettings};

// Stores
pub use infrastructure::persistence::{DiskImageStore, InMemoryLaptopStore, InMemoryRatingStore};

// Health server
pub use infrastructure::health::{HealthServer, HealthServerError, HealthServerState};

// gRPC server (for integration tests)
pub use infrastructure::grpc::{LaptopServer, LaptopServiceClient, LaptopServiceServer, proto};

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
