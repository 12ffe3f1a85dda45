//! Public tuning types for the destination and trending scores.
#![forbid(unsafe_code)]

/// Tunable constants of the Destination-Worthy Score.
///
/// `Default` reproduces the production weighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DestinationWeights {
    /// Multiplier applied to `log10(votes + 1)`.
    pub popularity_multiplier: f64,
    /// Multiplier applied to `mean_rating - 1`.
    pub review_multiplier: f64,
    /// Reviews older than this many days are ignored.
    pub review_window_days: f64,
    /// Decay constant, in days, of the review term.
    pub review_decay_days: f64,
    /// Maximum number of most recent reviews considered.
    pub review_cap: usize,
    /// Multiplier applied to `log10(checkins + 1)`.
    pub checkin_multiplier: f64,
    /// Check-ins older than this many days are ignored.
    pub checkin_window_days: f64,
    /// Decay constant, in days, of the check-in term.
    pub checkin_decay_days: f64,
    /// Additive bonus for restaurants imported from the diners hitlist.
    pub provenance_bonus: f64,
    /// Minimum number of recent reviews before volatility is penalised.
    pub volatility_min_reviews: usize,
    /// Multiplier applied to the rating variance.
    pub volatility_multiplier: f64,
    /// Upper bound of the volatility penalty.
    pub volatility_cap: f64,
    /// Upper bound of the final score.
    pub max_score: f64,
}

impl Default for DestinationWeights {
    fn default() -> Self {
        Self {
            popularity_multiplier: 15.0,
            review_multiplier: 10.0,
            review_window_days: 365.0,
            review_decay_days: 365.0,
            review_cap: 50,
            checkin_multiplier: 5.0,
            checkin_window_days: 180.0,
            checkin_decay_days: 180.0,
            provenance_bonus: 5.0,
            volatility_min_reviews: 3,
            volatility_multiplier: 2.0,
            volatility_cap: 10.0,
            max_score: 100.0,
        }
    }
}

/// Tunable constants of the Trending Score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendingWeights {
    /// Events older than this many days are ignored.
    pub window_days: f64,
    /// Days after which an event's contribution halves.
    pub half_life_days: f64,
    /// Weight of a vote.
    pub vote: f64,
    /// Weight of a check-in.
    pub checkin: f64,
    /// Weight of a photo.
    pub photo: f64,
}

impl Default for TrendingWeights {
    fn default() -> Self {
        Self {
            window_days: 30.0,
            half_life_days: 10.0,
            vote: 1.0,
            checkin: 2.0,
            photo: 3.0,
        }
    }
}
