//! Configuration Module
//!
//! Configuration loading for the catalog service.

mod settings;

pub use settings::{CatalogConfig, ConfigError, ServerSettings, StorageSettings};
