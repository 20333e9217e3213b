//! Rating Store Port (Driven Port)
//!
//! Interface for per-laptop rating aggregates.

use crate::domain::rating::Rating;

/// Rating store port.
///
/// `add` is the only mutator and must be atomic across the whole table.
/// Scores are not validated here.
pub trait RatingStore: Send + Sync {
    /// Fold `score` into the aggregate of `laptop_id` and return the
    /// updated aggregate.
    fn add(&self, laptop_id: &str, score: f64) -> Rating;

    /// Current aggregate of `laptop_id`, if it has been rated.
    fn get(&self, laptop_id: &str) -> Option<Rating>;
}
