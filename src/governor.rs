//! Fixed request pacing

use crate::config::PacingConfig;
use std::time::Duration;
use tokio::time::sleep;

/// Time-based request pacing: a short pause between calls and a long
/// cooldown after every `cooldown_every` calls
#[derive(Debug, Clone)]
pub struct RateGovernor {
    short_delay: Duration,
    long_delay: Duration,
    cooldown_every: u32,
}

impl RateGovernor {
    pub fn new(short_delay: Duration, long_delay: Duration, cooldown_every: u32) -> Self {
        Self {
            short_delay,
            long_delay,
            cooldown_every,
        }
    }

    /// Governor that never sleeps, for tests and dry runs
    pub fn unpaced() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO, 0)
    }

    pub fn short_delay(&self) -> Duration {
        self.short_delay
    }

    pub fn long_delay(&self) -> Duration {
        self.long_delay
    }

    /// Suspends for the short interval
    pub async fn short_pause(&self) {
        if !self.short_delay.is_zero() {
            sleep(self.short_delay).await;
        }
    }

    /// True when `index` is a positive multiple of the cooldown period
    pub fn cooldown_due(&self, index: usize) -> bool {
        self.cooldown_every > 0 && index > 0 && index % self.cooldown_every as usize == 0
    }

    /// Suspends for the long interval when `index` is due; returns whether it did
    pub async fn cooldown_if_due(&self, index: usize) -> bool {
        if !self.cooldown_due(index) {
            return false;
        }

        tracing::info!(
            index,
            wait_secs = self.long_delay.as_secs(),
            "Cooling down for rate limit"
        );
        if !self.long_delay.is_zero() {
            sleep(self.long_delay).await;
        }
        true
    }
}

impl From<&PacingConfig> for RateGovernor {
    fn from(config: &PacingConfig) -> Self {
        Self::new(
            Duration::from_millis(config.short_delay_ms),
            Duration::from_millis(config.long_delay_ms),
            config.cooldown_every,
        )
    }
}

impl Default for RateGovernor {
    fn default() -> Self {
        Self::from(&PacingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_due_on_multiples() {
        let governor = RateGovernor::new(Duration::ZERO, Duration::ZERO, 20);
        assert!(!governor.cooldown_due(0));
        assert!(!governor.cooldown_due(19));
        assert!(governor.cooldown_due(20));
        assert!(!governor.cooldown_due(21));
        assert!(governor.cooldown_due(40));
    }

    #[test]
    fn test_cooldown_disabled() {
        let governor = RateGovernor::unpaced();
        assert!(!governor.cooldown_due(20));
    }

    #[test]
    fn test_defaults_from_pacing_config() {
        let governor = RateGovernor::default();
        assert_eq!(governor.short_delay(), Duration::from_secs(1));
        assert_eq!(governor.long_delay(), Duration::from_secs(60));
        assert!(governor.cooldown_due(20));
    }

    #[tokio::test]
    async fn test_cooldown_if_due_reports() {
        let governor = RateGovernor::new(Duration::ZERO, Duration::from_millis(1), 2);
        assert!(!governor.cooldown_if_due(1).await);
        assert!(governor.cooldown_if_due(2).await);
    }
}
