//! Application Layer - Use cases and port definitions.
//!
//! This layer contains the catalog service and the port interfaces it
//! depends on: the stores, the message streams and the call context.

/// Port interfaces for stores and message streams.
pub mod ports;

/// Application services for the catalog operations.
pub mod services;
