//! Restaurant aggregates derived from cached dish scores.

use std::{cmp::Ordering, collections::BTreeMap};

use mustorder_core::RestaurantId;

use crate::decay::count_as_f64;

const TOP_DISHES: usize = 3;

/// Mean of the three highest destination scores.
///
/// Fewer dishes average what is present; no dishes yields `0.0`.
///
/// # Examples
/// ```
/// use mustorder_scorer::restaurant_score_cache;
///
/// assert_eq!(restaurant_score_cache([90.0, 80.0, 70.0, 10.0]), 80.0);
/// assert_eq!(restaurant_score_cache([]), 0.0);
/// ```
#[must_use]
#[expect(clippy::float_arithmetic, reason = "score cache is an arithmetic mean")]
pub fn restaurant_score_cache(scores: impl IntoIterator<Item = f64>) -> f64 {
    let mut scores: Vec<f64> = scores.into_iter().collect();
    scores.sort_by(|a, b| b.total_cmp(a));
    scores.truncate(TOP_DISHES);
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / count_as_f64(scores.len())
}

/// Assign 1-based trending ranks from per-restaurant trend totals.
///
/// Restaurants whose total is `None` (no dishes) are left unranked and do not
/// occupy a position. Higher totals rank first; equal totals rank by
/// ascending restaurant id.
///
/// # Examples
/// ```
/// use mustorder_core::RestaurantId;
/// use mustorder_scorer::trending_ranks;
///
/// let ranks = trending_ranks([
///     (RestaurantId(1), Some(2.0)),
///     (RestaurantId(2), None),
///     (RestaurantId(3), Some(5.0)),
/// ]);
/// assert_eq!(ranks.get(&RestaurantId(3)), Some(&1));
/// assert_eq!(ranks.get(&RestaurantId(1)), Some(&2));
/// assert_eq!(ranks.get(&RestaurantId(2)), None);
/// ```
#[must_use]
pub fn trending_ranks(
    totals: impl IntoIterator<Item = (RestaurantId, Option<f64>)>,
) -> BTreeMap<RestaurantId, u32> {
    let mut ranked: Vec<(RestaurantId, f64)> = totals
        .into_iter()
        .filter_map(|(id, total)| total.map(|value| (id, value)))
        .collect();
    ranked.sort_by(|(a_id, a), (b_id, b)| match b.total_cmp(a) {
        Ordering::Equal => a_id.cmp(b_id),
        other => other,
    });
    ranked
        .into_iter()
        .zip(1_u32..)
        .map(|((id, _), rank)| (id, rank))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[90.0, 80.0, 70.0, 10.0], 80.0)]
    #[case(&[10.0, 90.0, 70.0, 80.0], 80.0)]
    #[case(&[60.0, 40.0], 50.0)]
    #[case(&[33.0], 33.0)]
    #[case(&[], 0.0)]
    fn averages_top_three(#[case] scores: &[f64], #[case] expected: f64) {
        assert_eq!(restaurant_score_cache(scores.iter().copied()), expected);
    }

    #[rstest]
    fn ties_rank_by_ascending_id() {
        let ranks = trending_ranks([
            (RestaurantId(9), Some(1.0)),
            (RestaurantId(4), Some(1.0)),
            (RestaurantId(7), Some(3.0)),
        ]);
        let ordered: Vec<_> = ranks.iter().map(|(id, rank)| (id.0, *rank)).collect();
        assert_eq!(ordered, vec![(4, 2), (7, 1), (9, 3)]);
    }

    #[rstest]
    fn restaurants_without_dishes_take_no_position() {
        let ranks = trending_ranks([
            (RestaurantId(1), None),
            (RestaurantId(2), Some(0.0)),
        ]);
        assert_eq!(ranks.len(), 1);
        assert_eq!(ranks.get(&RestaurantId(2)), Some(&1));
    }
}
