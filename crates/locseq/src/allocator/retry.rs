use core::time::Duration;

use rand::Rng;

/// Bounds how hard the allocator retries a contended counter before giving
/// up with [`Error::AllocationUnavailable`].
///
/// Backoff between attempts is exponential in the attempt number, starting at
/// `base_delay` and capped at `max_delay`, with full jitter so that callers
/// racing on one hot partition spread out instead of colliding again.
///
/// # Example
///
/// ```
/// use core::time::Duration;
/// use locseq::RetryPolicy;
///
/// let policy = RetryPolicy::new(3)
///     .with_base_delay(Duration::from_millis(2))
///     .with_max_delay(Duration::from_millis(20));
/// assert_eq!(policy.max_attempts(), 3);
/// assert!(policy.backoff(1) <= Duration::from_millis(2));
/// assert!(policy.backoff(10) <= Duration::from_millis(20));
/// ```
///
/// [`Error::AllocationUnavailable`]: crate::Error::AllocationUnavailable
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    /// Five attempts, 5 ms base delay, 100 ms cap.
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    /// A policy allowing `max_attempts` store calls per allocation, with the
    /// default delays. Zero is treated as one: every allocation makes at least
    /// one attempt.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    #[must_use]
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub const fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub const fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// The randomised delay to wait after failed attempt number `attempt`
    /// (1-based). Always within `0..=min(base_delay * 2^(attempt-1),
    /// max_delay)`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        let ceiling = self.base_delay.saturating_mul(1 << shift).min(self.max_delay);
        let micros = u64::try_from(ceiling.as_micros()).unwrap_or(u64::MAX);
        if micros == 0 {
            return Duration::ZERO;
        }
        Duration::from_micros(rand::rng().random_range(0..=micros))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_attempts_means_one() {
        assert_eq!(RetryPolicy::new(0).max_attempts(), 1);
    }

    #[test]
    fn backoff_stays_under_the_exponential_ceiling() {
        let policy = RetryPolicy::new(8)
            .with_base_delay(Duration::from_millis(4))
            .with_max_delay(Duration::from_millis(50));

        for _ in 0..200 {
            assert!(policy.backoff(1) <= Duration::from_millis(4));
            assert!(policy.backoff(2) <= Duration::from_millis(8));
            assert!(policy.backoff(3) <= Duration::from_millis(16));
            assert!(policy.backoff(7) <= Duration::from_millis(50));
            assert!(policy.backoff(u32::MAX) <= Duration::from_millis(50));
        }
    }

    #[test]
    fn zero_delays_never_sleep() {
        let policy = RetryPolicy::new(3).with_base_delay(Duration::ZERO);
        assert_eq!(policy.backoff(1), Duration::ZERO);
        assert_eq!(policy.backoff(3), Duration::ZERO);
    }
}
