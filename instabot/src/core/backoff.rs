//! Retry delay schedule.
//!
//! The wait before retry `k` (1-indexed) is `k * base`, so after `n` failed
//! attempts the cumulative wait is `base * n * (n + 1) / 2`.

use std::time::Duration;

/// Delay to wait before retry number `retry` (1-indexed). Zero for `retry == 0`.
pub fn retry_delay(base: Duration, retry: u32) -> Duration {
    base.saturating_mul(retry)
}

/// Total time slept across the first `retries` retries.
pub fn cumulative_delay(base: Duration, retries: u32) -> Duration {
    (1..=retries).fold(Duration::ZERO, |total, retry| {
        total.saturating_add(retry_delay(base, retry))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_grows_linearly_per_retry() {
        let base = Duration::from_secs(2);
        assert_eq!(retry_delay(base, 0), Duration::ZERO);
        assert_eq!(retry_delay(base, 1), Duration::from_secs(2));
        assert_eq!(retry_delay(base, 3), Duration::from_secs(6));
    }

    #[test]
    fn cumulative_is_triangular() {
        let base = Duration::from_millis(10);
        assert_eq!(cumulative_delay(base, 2), Duration::from_millis(30));
        assert_eq!(cumulative_delay(base, 4), Duration::from_millis(100));
    }
}
