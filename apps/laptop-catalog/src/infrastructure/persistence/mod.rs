//! Persistence Adapters
//!
//! Implementations of the store ports:
//!
//! - `InMemoryLaptopStore`: Laptop records in a process-local map
//! - `DiskImageStore`: Image payloads as files, with an in-memory index
//! - `InMemoryRatingStore`: Rating aggregates in a process-local map
//!
//! Nothing here survives a restart except the image files themselves.

mod image_store;
mod laptop_store;
mod rating_store;

pub use image_store::DiskImageStore;
pub use laptop_store::InMemoryLaptopStore;
pub use rating_store::InMemoryRatingStore;
