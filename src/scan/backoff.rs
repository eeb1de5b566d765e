//! Interval growth between detection attempts.

use std::time::Duration;

use crate::config::ScanConfig;

/// Exponential backoff with a ceiling.
///
/// Each miss returns the current delay and multiplies it for next time, up to
/// `max`. A hit (or [`Backoff::reset`]) brings it back to `base`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    factor: u32,
    current: Duration,
}

impl Backoff {
    /// `max` below `base` is raised to `base`; a zero factor counts as 1.
    pub fn new(base: Duration, max: Duration, factor: u32) -> Self {
        Self {
            base,
            max: max.max(base),
            factor: factor.max(1),
            current: base,
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(
            Duration::from_millis(config.base_interval_ms),
            Duration::from_millis(config.max_interval_ms),
            config.backoff_factor,
        )
    }

    /// Delay before the next attempt.
    pub fn current(&self) -> Duration {
        self.current
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// Records a failed attempt and returns the delay to wait now.
    pub fn on_miss(&mut self) -> Duration {
        let delay = self.current;
        self.current = self
            .current
            .checked_mul(self.factor)
            .map_or(self.max, |next| next.min(self.max));
        delay
    }

    /// Records a successful attempt and returns the base delay.
    pub fn on_hit(&mut self) -> Duration {
        self.reset();
        self.current
    }

    pub fn reset(&mut self) {
        self.current = self.base;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_doubles_up_to_ceiling() {
        let mut backoff = Backoff::new(ms(100), ms(500), 2);
        let delays: Vec<_> = (0..5).map(|_| backoff.on_miss()).collect();
        assert_eq!(delays, vec![ms(100), ms(200), ms(400), ms(500), ms(500)]);
    }

    #[test]
    fn test_hit_resets_to_base() {
        let mut backoff = Backoff::new(ms(100), ms(1000), 2);
        backoff.on_miss();
        backoff.on_miss();
        assert_eq!(backoff.current(), ms(400));

        assert_eq!(backoff.on_hit(), ms(100));
        assert_eq!(backoff.on_miss(), ms(100));
    }

    #[test]
    fn test_factor_one_is_constant() {
        let mut backoff = Backoff::new(ms(250), ms(4000), 1);
        for _ in 0..10 {
            assert_eq!(backoff.on_miss(), ms(250));
        }
    }

    #[test]
    fn test_degenerate_parameters() {
        let backoff = Backoff::new(ms(300), ms(100), 0);
        assert_eq!(backoff.max(), ms(300));

        let mut backoff = Backoff::new(Duration::MAX, Duration::MAX, 3);
        assert_eq!(backoff.on_miss(), Duration::MAX);
        assert_eq!(backoff.current(), Duration::MAX);
    }

    #[test]
    fn test_from_config_defaults() {
        let backoff = Backoff::default();
        assert_eq!(backoff.base(), ms(250));
        assert_eq!(backoff.max(), ms(4000));
    }
}
