//! Domain Layer - Catalog types and business rules.
//!
//! This layer contains the laptop record, the search predicate and the
//! rating aggregate, with no dependency on transport or storage.

/// Laptop records and their components.
pub mod laptop;

/// Search filter and memory normalization.
pub mod filter;

/// Image upload messages and stored image metadata.
pub mod image;

/// Rating aggregates.
pub mod rating;
