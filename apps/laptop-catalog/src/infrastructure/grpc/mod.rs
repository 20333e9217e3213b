//! gRPC Transport
//!
//! Exposes the catalog as the `laptop.v1.LaptopService` gRPC service.
//!
//! # Architecture
//!
//! The server is a thin adapter over `CatalogService`. Each RPC:
//!
//! 1. Derives a `CallContext` from the `grpc-timeout` header
//! 2. Converts wire messages to domain types
//! 3. Runs the service operation; streaming calls run it in a worker task
//!    that feeds a bounded response channel
//! 4. Cancels the call if the client drops the response stream
//! 5. Maps any `ServiceError` to a rich `Status`

pub mod converters;
pub mod server;

// Allow clippy warnings and missing docs in wire messages and generated code
#[allow(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]
pub mod proto;

pub use proto::laptop_service_client::LaptopServiceClient;
pub use proto::laptop_service_server::{LaptopService, LaptopServiceServer};
pub use server::{DEFAULT_STREAM_BUFFER, InboundStream, LaptopServer, ResponseSink};
