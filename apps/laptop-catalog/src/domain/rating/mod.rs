//! Laptop Ratings
//!
//! Running aggregate of the scores a laptop has received.

use serde::{Deserialize, Serialize};

/// Cumulative rating state for one laptop.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rating {
    /// Number of scores received.
    pub count: u64,
    /// Sum of all scores received.
    pub sum: f64,
}

impl Rating {
    /// Start an aggregate from its first score.
    #[must_use]
    pub const fn first(score: f64) -> Self {
        Self {
            count: 1,
            sum: score,
        }
    }

    /// Fold another score into the aggregate.
    pub fn record(&mut self, score: f64) {
        self.count = self.count.saturating_add(1);
        self.sum += score;
    }

    /// Mean score, or `0.0` before any score was recorded.
    #[must_use]
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)] // exact below 2^53 ratings
        let count = self.count as f64;
        self.sum / count
    }
}

/// A single score submitted for a laptop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRequest {
    /// Laptop being rated.
    pub laptop_id: String,
    /// Submitted score.
    pub score: f64,
}

/// Result of rating a laptop, as reported back to the rater.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    /// Rated laptop.
    pub laptop_id: String,
    /// Number of ratings after this one, capped at `u32::MAX` on the wire.
    pub rated_count: u32,
    /// Mean score after this one.
    pub average_score: f64,
}

impl RatingSummary {
    /// Build the summary for `laptop_id` from its current aggregate.
    #[must_use]
    pub fn new(laptop_id: impl Into<String>, rating: &Rating) -> Self {
        Self {
            laptop_id: laptop_id.into(),
            rated_count: u32::try_from(rating.count).unwrap_or(u32::MAX),
            average_score: rating.average(),
        }
    }
}
