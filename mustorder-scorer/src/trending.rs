//! Trending Score: recency-weighted momentum over a short window.

use std::f64::consts::LN_2;

use crate::types::TrendingWeights;

/// Event ages, in days, feeding [`trending_score`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendingSignals {
    /// Ages of votes for the dish.
    pub vote_ages: Vec<f64>,
    /// Ages of check-ins naming the dish.
    pub checkin_ages: Vec<f64>,
    /// Ages of photos of the dish.
    pub photo_ages: Vec<f64>,
}

/// Sum `weight * 2^(-age / half_life)` over every event inside the window.
///
/// The result is never negative. Events older than `weights.window_days`
/// contribute nothing.
///
/// # Examples
/// ```
/// use mustorder_scorer::{TrendingSignals, TrendingWeights, trending_score};
///
/// let signals = TrendingSignals {
///     vote_ages: vec![0.0],
///     photo_ages: vec![0.0],
///     ..TrendingSignals::default()
/// };
/// assert!((trending_score(&signals, &TrendingWeights::default()) - 4.0).abs() < 1e-12);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "trending sums exponentially decayed weights"
)]
pub fn trending_score(signals: &TrendingSignals, weights: &TrendingWeights) -> f64 {
    let decay = LN_2 / weights.half_life_days;
    let contribution = |ages: &[f64], weight: f64| -> f64 {
        ages.iter()
            .filter(|&&age| age <= weights.window_days)
            .map(|&age| weight * (-age * decay).exp())
            .sum()
    };

    let total = contribution(&signals.vote_ages, weights.vote)
        + contribution(&signals.checkin_ages, weights.checkin)
        + contribution(&signals.photo_ages, weights.photo);
    if total.is_finite() { total.max(0.0) } else { 0.0 }
}
