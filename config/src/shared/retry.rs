use std::time::Duration;

use serde::Deserialize;

use crate::shared::ValidationError;

/// Retry policy for operations against the metrics source.
#[derive(Clone, Debug, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts before giving up.
    pub max_attempts: u32,

    /// Initial delay, in milliseconds, before the first retry.
    pub initial_delay_ms: u64,

    /// Maximum delay between retries.
    pub max_delay_ms: u64,

    /// Exponential backoff multiplier applied to the delay after each attempt.
    pub backoff_factor: f32,
}

impl RetryConfig {
    /// Returns the delay to wait after the given failed attempt (1-based).
    ///
    /// The delay grows exponentially with [`RetryConfig::backoff_factor`] and
    /// is capped at [`RetryConfig::max_delay_ms`].
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.backoff_factor.max(1.0) as f64;
        let delay = self.initial_delay_ms as f64 * factor.powi(attempt.saturating_sub(1) as i32);

        Duration::from_millis((delay as u64).min(self.max_delay_ms))
    }

    /// Validates the [`RetryConfig`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_attempts == 0 {
            return Err(ValidationError::NoRetryAttempts);
        }

        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_ms: 500,
            max_delay_ms: 10_000,
            backoff_factor: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_grows_exponentially_and_caps() {
        let retry = RetryConfig::default();

        assert_eq!(retry.delay_for_attempt(1), Duration::from_millis(500));
        assert_eq!(retry.delay_for_attempt(2), Duration::from_millis(1_000));
        assert_eq!(retry.delay_for_attempt(3), Duration::from_millis(2_000));
        assert_eq!(retry.delay_for_attempt(10), Duration::from_millis(10_000));
    }

    #[test]
    fn test_zero_attempts_is_rejected() {
        let retry = RetryConfig {
            max_attempts: 0,
            ..Default::default()
        };

        assert!(matches!(
            retry.validate(),
            Err(ValidationError::NoRetryAttempts)
        ));
    }
}
