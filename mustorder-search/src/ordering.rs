//! Result ordering for semantic search.
//!
//! Similarities closer than [`SIMILARITY_TIE_BAND`] count as equal and fall
//! back to distance. That relation is not transitive, so the ordering is a
//! hand-written stable merge sort rather than `sort_by`, whose contract
//! requires a total order.

use std::cmp::Ordering;

use crate::SearchResult;

/// Similarities within this band of each other are considered tied.
pub const SIMILARITY_TIE_BAND: f64 = 0.01;

/// Order two results: higher similarity first, then nearer first.
///
/// Distance only decides when both results carry one; otherwise the pair is
/// equal and keeps its input order.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "tie band compares a difference")]
pub fn compare_results(a: &SearchResult, b: &SearchResult) -> Ordering {
    if (a.similarity - b.similarity).abs() > SIMILARITY_TIE_BAND {
        return b.similarity.total_cmp(&a.similarity);
    }
    match (a.distance_km, b.distance_km) {
        (Some(left), Some(right)) => left.total_cmp(&right),
        _ => Ordering::Equal,
    }
}

/// Stable merge sort of `results` by [`compare_results`].
pub(crate) fn rank(results: Vec<SearchResult>) -> Vec<SearchResult> {
    merge_sort(results, &compare_results)
}

fn merge_sort<T>(mut items: Vec<T>, compare: &impl Fn(&T, &T) -> Ordering) -> Vec<T> {
    if items.len() <= 1 {
        return items;
    }
    let right = items.split_off(items.len().div_ceil(2));
    merge(merge_sort(items, compare), merge_sort(right, compare), compare)
}

fn merge<T>(left: Vec<T>, right: Vec<T>, compare: &impl Fn(&T, &T) -> Ordering) -> Vec<T> {
    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => compare(r, l) == Ordering::Less,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        let next = if take_right { right.next() } else { left.next() };
        merged.extend(next);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use mustorder_core::{Dish, DishId, Restaurant, RestaurantId};
    use rstest::rstest;

    fn result(id: u64, similarity: f64, distance_km: Option<f64>) -> SearchResult {
        SearchResult {
            dish: Dish::new(DishId(id), RestaurantId(1), format!("dish {id}")),
            restaurant: Restaurant::new(RestaurantId(1), "Test", "Austin"),
            similarity,
            distance_km,
        }
    }

    fn ids(results: &[SearchResult]) -> Vec<u64> {
        results.iter().map(|r| r.dish.id.0).collect()
    }

    #[rstest]
    fn sorts_by_similarity_descending() {
        let ranked = rank(vec![
            result(1, 0.2, None),
            result(2, 0.9, None),
            result(3, 0.5, None),
        ]);
        assert_eq!(ids(&ranked), vec![2, 3, 1]);
    }

    #[rstest]
    fn near_ties_break_by_distance() {
        let ranked = rank(vec![
            result(1, 0.900, Some(12.0)),
            result(2, 0.905, Some(3.0)),
            result(3, 0.5, Some(1.0)),
        ]);
        assert_eq!(ids(&ranked), vec![2, 1, 3]);
    }

    #[rstest]
    fn near_ties_without_distance_keep_input_order() {
        let ranked = rank(vec![
            result(1, 0.900, None),
            result(2, 0.905, Some(3.0)),
            result(3, 0.902, None),
        ]);
        assert_eq!(ids(&ranked), vec![1, 2, 3]);
    }

    #[rstest]
    fn equal_similarity_defers_to_distance() {
        assert_eq!(
            compare_results(&result(1, 0.5, Some(9.0)), &result(2, 0.5, Some(1.0))),
            Ordering::Greater
        );
        assert_eq!(
            compare_results(&result(1, 0.75, Some(9.0)), &result(2, 0.5, Some(1.0))),
            Ordering::Less
        );
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(7)]
    fn preserves_every_result(#[case] count: u64) {
        let input: Vec<_> = (0..count).map(|id| result(id, 0.5, None)).collect();
        let ranked = rank(input);
        assert_eq!(ids(&ranked), (0..count).collect::<Vec<_>>());
    }
}
