//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application layer.

/// Configuration loaded from the environment.
pub mod config;

/// gRPC transport for the laptop service.
pub mod grpc;

/// Health check HTTP endpoint.
pub mod health;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// In-memory and on-disk store adapters.
pub mod persistence;

/// Binary and JSON laptop serialization.
pub mod serializer;

/// OpenTelemetry tracing integration.
pub mod telemetry;
