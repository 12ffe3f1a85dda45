//! Destination-Worthy Score: how far a diner should travel for a dish.
//!
//! The score blends five signals into `0.0..=max_score`:
//!
//! 1. popularity, from the total vote count;
//! 2. review quality, from the mean rating of reviews inside the review
//!    window, decayed by the age of the most recent one;
//! 3. check-in momentum, from check-ins naming the dish inside the check-in
//!    window, decayed by the age of the most recent one;
//! 4. a provenance bonus for restaurants imported from the diners hitlist;
//! 5. a pluggable diversity bonus, zero by default.
//!
//! A volatility penalty proportional to the rating variance is subtracted
//! once enough recent reviews exist.

use mustorder_core::Dish;

use crate::decay::count_as_f64;
use crate::types::DestinationWeights;

/// Extension point for rewarding dishes that broaden a diner's choices.
///
/// Implementations must return finite values; the final score is clamped
/// regardless.
pub trait DiversityBonus: Send + Sync {
    /// Bonus points added to `dish`'s destination score.
    fn bonus(&self, dish: &Dish) -> f64;
}

/// [`DiversityBonus`] contributing nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDiversityBonus;

impl DiversityBonus for NoDiversityBonus {
    fn bonus(&self, _dish: &Dish) -> f64 {
        0.0
    }
}

/// A recent review reduced to what the score needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatedAge {
    /// Star rating in `1..=5`.
    pub rating: u8,
    /// Age in fractional days.
    pub age_days: f64,
}

/// Inputs of [`destination_worthy_score`], already windowed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DestinationSignals {
    /// Total number of votes.
    pub vote_count: usize,
    /// Reviews inside the review window.
    pub recent_reviews: Vec<RatedAge>,
    /// Ages in days of check-ins inside the check-in window.
    pub recent_checkin_ages: Vec<f64>,
    /// Whether the restaurant carries the provenance bonus.
    pub has_provenance: bool,
    /// Points contributed by the [`DiversityBonus`].
    pub diversity_bonus: f64,
}

/// Combine `signals` into a score clamped to `0.0..=weights.max_score`.
///
/// Non-finite intermediate results collapse to `0.0`.
///
/// # Examples
/// ```
/// use mustorder_scorer::{DestinationSignals, DestinationWeights, destination_worthy_score};
///
/// let weights = DestinationWeights::default();
/// assert_eq!(destination_worthy_score(&DestinationSignals::default(), &weights), 0.0);
///
/// let popular = DestinationSignals { vote_count: 99, ..DestinationSignals::default() };
/// assert!((destination_worthy_score(&popular, &weights) - 30.0).abs() < 1e-9);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "the score is a weighted sum of floating-point terms"
)]
pub fn destination_worthy_score(signals: &DestinationSignals, weights: &DestinationWeights) -> f64 {
    let popularity = (count_as_f64(signals.vote_count) + 1.0).log10() * weights.popularity_multiplier;
    let quality = review_quality(&signals.recent_reviews, weights);
    let momentum = checkin_momentum(&signals.recent_checkin_ages, weights);
    let provenance = if signals.has_provenance {
        weights.provenance_bonus
    } else {
        0.0
    };
    let penalty = volatility_penalty(&signals.recent_reviews, weights);

    let raw = popularity + quality + momentum + provenance + signals.diversity_bonus - penalty;
    if raw.is_finite() {
        raw.clamp(0.0, weights.max_score)
    } else {
        0.0
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "mean rating and exponential decay are floating-point"
)]
fn review_quality(reviews: &[RatedAge], weights: &DestinationWeights) -> f64 {
    let Some(newest) = most_recent(reviews.iter().map(|r| r.age_days)) else {
        return 0.0;
    };
    let mean = mean_rating(reviews);
    (mean - 1.0) * weights.review_multiplier * (-newest / weights.review_decay_days).exp()
}

#[expect(
    clippy::float_arithmetic,
    reason = "check-in momentum is a decayed logarithm"
)]
fn checkin_momentum(ages: &[f64], weights: &DestinationWeights) -> f64 {
    let Some(newest) = most_recent(ages.iter().copied()) else {
        return 0.0;
    };
    (count_as_f64(ages.len()) + 1.0).log10()
        * weights.checkin_multiplier
        * (-newest / weights.checkin_decay_days).exp()
}

#[expect(
    clippy::float_arithmetic,
    reason = "variance is the mean squared deviation of ratings"
)]
fn volatility_penalty(reviews: &[RatedAge], weights: &DestinationWeights) -> f64 {
    if reviews.len() < weights.volatility_min_reviews || reviews.is_empty() {
        return 0.0;
    }
    let mean = mean_rating(reviews);
    let squared: f64 = reviews
        .iter()
        .map(|r| (f64::from(r.rating) - mean).powi(2))
        .sum();
    let variance = squared / count_as_f64(reviews.len());
    (variance * weights.volatility_multiplier).min(weights.volatility_cap)
}

#[expect(clippy::float_arithmetic, reason = "mean of ratings")]
fn mean_rating(reviews: &[RatedAge]) -> f64 {
    let total: f64 = reviews.iter().map(|r| f64::from(r.rating)).sum();
    total / count_as_f64(reviews.len())
}

fn most_recent(ages: impl Iterator<Item = f64>) -> Option<f64> {
    ages.reduce(f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn weights() -> DestinationWeights {
        DestinationWeights::default()
    }

    fn reviews(ratings: &[u8], age_days: f64) -> Vec<RatedAge> {
        ratings
            .iter()
            .map(|&rating| RatedAge { rating, age_days })
            .collect()
    }

    fn approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[rstest]
    fn no_signals_score_zero(weights: DestinationWeights) {
        assert_eq!(
            destination_worthy_score(&DestinationSignals::default(), &weights),
            0.0
        );
    }

    #[rstest]
    #[case(9, 15.0)]
    #[case(99, 30.0)]
    #[case(999, 45.0)]
    fn popularity_grows_logarithmically(
        weights: DestinationWeights,
        #[case] votes: usize,
        #[case] expected: f64,
    ) {
        let signals = DestinationSignals {
            vote_count: votes,
            ..DestinationSignals::default()
        };
        approx(destination_worthy_score(&signals, &weights), expected);
    }

    #[rstest]
    fn fresh_perfect_reviews_add_forty(weights: DestinationWeights) {
        let signals = DestinationSignals {
            recent_reviews: reviews(&[5, 5], 0.0),
            ..DestinationSignals::default()
        };
        approx(destination_worthy_score(&signals, &weights), 40.0);
    }

    #[rstest]
    fn review_term_decays_by_most_recent_review(weights: DestinationWeights) {
        let signals = DestinationSignals {
            recent_reviews: vec![
                RatedAge {
                    rating: 5,
                    age_days: 365.0,
                },
                RatedAge {
                    rating: 5,
                    age_days: 100.0,
                },
            ],
            ..DestinationSignals::default()
        };
        approx(
            destination_worthy_score(&signals, &weights),
            40.0 * (-100.0_f64 / 365.0).exp(),
        );
    }

    #[rstest]
    fn checkins_add_momentum(weights: DestinationWeights) {
        let signals = DestinationSignals {
            recent_checkin_ages: vec![0.0; 9],
            ..DestinationSignals::default()
        };
        approx(destination_worthy_score(&signals, &weights), 5.0);
    }

    #[rstest]
    fn provenance_adds_five(weights: DestinationWeights) {
        let signals = DestinationSignals {
            has_provenance: true,
            ..DestinationSignals::default()
        };
        approx(destination_worthy_score(&signals, &weights), 5.0);
    }

    #[rstest]
    fn volatility_penalises_split_opinions(weights: DestinationWeights) {
        // ratings 1, 5, 5: mean 11/3, variance 32/9, penalty 64/9
        let signals = DestinationSignals {
            recent_reviews: reviews(&[1, 5, 5], 0.0),
            ..DestinationSignals::default()
        };
        let quality = (11.0 / 3.0 - 1.0) * 10.0;
        approx(
            destination_worthy_score(&signals, &weights),
            quality - 64.0 / 9.0,
        );
    }

    #[rstest]
    fn volatility_needs_three_reviews(weights: DestinationWeights) {
        let signals = DestinationSignals {
            recent_reviews: reviews(&[1, 5], 0.0),
            ..DestinationSignals::default()
        };
        approx(destination_worthy_score(&signals, &weights), 20.0);
    }

    #[rstest]
    fn volatility_penalty_is_capped(weights: DestinationWeights) {
        let ratings = reviews(&[1, 5, 1, 5], 0.0);
        let mut uncapped = weights;
        uncapped.volatility_cap = f64::INFINITY;
        assert!(volatility_penalty(&ratings, &uncapped) > 0.0);
        approx(volatility_penalty(&ratings, &weights), 8.0);
        let mut sensitive = weights;
        sensitive.volatility_multiplier = 10.0;
        approx(volatility_penalty(&ratings, &sensitive), 10.0);
    }

    #[rstest]
    fn score_is_clamped_to_maximum(weights: DestinationWeights) {
        let signals = DestinationSignals {
            vote_count: usize::MAX,
            recent_reviews: reviews(&[5; 10], 0.0),
            recent_checkin_ages: vec![0.0; 1000],
            has_provenance: true,
            diversity_bonus: 50.0,
        };
        assert_eq!(destination_worthy_score(&signals, &weights), 100.0);
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn non_finite_scores_collapse_to_zero(weights: DestinationWeights, #[case] bonus: f64) {
        let signals = DestinationSignals {
            diversity_bonus: bonus,
            ..DestinationSignals::default()
        };
        assert_eq!(destination_worthy_score(&signals, &weights), 0.0);
    }
}
