//! Time arithmetic shared by the scores.

use std::time::{Duration, SystemTime};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Fractional days between `at` and `now`; negative when `at` is in the future.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "ages are fractional days derived from second counts"
)]
pub fn age_days(now: SystemTime, at: SystemTime) -> f64 {
    match now.duration_since(at) {
        Ok(age) => age.as_secs_f64() / SECONDS_PER_DAY,
        Err(ahead) => -(ahead.duration().as_secs_f64() / SECONDS_PER_DAY),
    }
}

/// Inclusive lower bound of a `days`-long window ending at `now`.
///
/// Returns `None` when the window cannot be represented, in which case
/// callers read the full history and rely on their own age filter.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "window lengths are configured in fractional days"
)]
pub fn window_start(now: SystemTime, days: f64) -> Option<SystemTime> {
    Duration::try_from_secs_f64(days * SECONDS_PER_DAY)
        .ok()
        .and_then(|span| now.checked_sub(span))
}

/// `count` as `f64`, saturating at `u32::MAX`.
#[must_use]
pub fn count_as_f64(count: usize) -> f64 {
    f64::from(u32::try_from(count).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mustorder_core::test_support::{days_ago, days_ahead, fixed_now};
    use rstest::rstest;

    #[rstest]
    #[case(days_ago(fixed_now(), 3), 3.0)]
    #[case(fixed_now(), 0.0)]
    #[case(days_ahead(fixed_now(), 2), -2.0)]
    fn measures_age_in_days(#[case] at: SystemTime, #[case] expected: f64) {
        assert_eq!(age_days(fixed_now(), at), expected);
    }

    #[rstest]
    fn window_start_subtracts_days() {
        let start = window_start(fixed_now(), 30.0);
        assert_eq!(start, Some(days_ago(fixed_now(), 30)));
    }

    #[rstest]
    #[case(-1.0)]
    #[case(f64::NAN)]
    fn unrepresentable_window_reads_full_history(#[case] days: f64) {
        assert_eq!(window_start(fixed_now(), days), None);
    }
}
