//! In-memory rating store.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::application::ports::RatingStore;
use crate::domain::rating::Rating;

/// In-memory implementation of `RatingStore`.
///
/// One mutex guards the whole table, so each `add` is atomic.
#[derive(Debug, Default)]
pub struct InMemoryRatingStore {
    ratings: Mutex<HashMap<String, Rating>>,
}

impl InMemoryRatingStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rated laptops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ratings.lock().len()
    }

    /// Check if no laptop has been rated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ratings.lock().is_empty()
    }
}

impl RatingStore for InMemoryRatingStore {
    fn add(&self, laptop_id: &str, score: f64) -> Rating {
        let mut ratings = self.ratings.lock();
        *ratings
            .entry(laptop_id.to_string())
            .and_modify(|rating| rating.record(score))
            .or_insert_with(|| Rating::first(score))
    }

    fn get(&self, laptop_id: &str) -> Option<Rating> {
        self.ratings.lock().get(laptop_id).copied()
    }
}
