//! Cached score payloads written back by the recomputation pass.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-dish scores persisted together after the dish phase.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DishScores {
    /// Destination-Worthy Score in `0.0..=100.0`.
    pub destination_worthy_score: f64,
    /// Trending Score, never negative.
    pub trend_cache: f64,
}

/// Per-restaurant aggregates persisted together after the restaurant phase.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RestaurantScores {
    /// Mean of the top three dish destination scores.
    pub score_cache: f64,
    /// 1-based trending position, or `None` for restaurants without dishes.
    pub trending_rank: Option<u32>,
}
