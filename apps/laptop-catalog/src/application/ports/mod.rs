//! Port Interfaces
//!
//! Defines the interfaces (ports) the catalog service depends on, following
//! the Hexagonal Architecture pattern. Infrastructure adapters implement
//! them; the service only ever sees the traits.
//!
//! ## Driven Ports (Outbound)
//!
//! - `LaptopStore`: Concurrent registry of laptop records
//! - `ImageStore`: Persistence of uploaded image payloads
//! - `RatingStore`: Running rating aggregates
//!
//! ## Call Primitives
//!
//! - `MessageSource` / `MessageSink`: One direction of a message stream
//! - `CallContext`: Per-call cancellation and deadline signal

mod call_context;
mod image_store_port;
mod laptop_store_port;
mod rating_store_port;
mod stream_port;

pub use call_context::{CallContext, Interrupted};
pub use image_store_port::{ImageStore, ImageStoreError};
pub use laptop_store_port::{LaptopStore, StoreError};
pub use rating_store_port::RatingStore;
pub use stream_port::{MessageSink, MessageSource, StreamError};
