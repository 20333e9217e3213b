//! Application Services
//!
//! Services that orchestrate domain logic and coordinate between ports.
//!
//! - `CatalogService`: The four catalog operations (create, search, upload,
//!   rate) over the laptop, image and rating stores

mod catalog_service;

pub use catalog_service::{CatalogService, DEFAULT_MAX_IMAGE_SIZE};
