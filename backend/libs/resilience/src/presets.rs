/// Preset configurations for common outbound call types
use crate::retry::RetryConfig;
use crate::timeout::TimeoutConfig;
use std::time::Duration;

/// Timeout and retry settings for one kind of outbound call
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub timeout: TimeoutConfig,
    pub retry: RetryConfig,
}

impl ServiceConfig {
    /// Override the per-attempt deadline
    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout.duration = duration;
        self
    }

    /// Override the retry budget
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry.max_retries = max_retries;
        self
    }

    /// Override the first backoff delay
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.retry.initial_backoff = backoff;
        self
    }
}

/// Third-party HTTP data APIs (read-only, idempotent)
///
/// - Timeout: 30s per attempt
/// - Retry: 3 retries, backoff 1s, 2s, 4s (no jitter)
pub fn http_external_config() -> ServiceConfig {
    ServiceConfig {
        timeout: TimeoutConfig {
            duration: Duration::from_secs(30),
        },
        retry: RetryConfig {
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(8),
            backoff_multiplier: 2.0,
            jitter: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_external_config() {
        let config = http_external_config();
        assert_eq!(config.timeout.duration, Duration::from_secs(30));
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.backoff_for(2), Duration::from_secs(4));
    }

    #[test]
    fn test_overrides() {
        let config = http_external_config()
            .with_timeout(Duration::from_secs(5))
            .with_max_retries(1)
            .with_initial_backoff(Duration::from_millis(10));

        assert_eq!(config.timeout.duration, Duration::from_secs(5));
        assert_eq!(config.retry.max_retries, 1);
        assert_eq!(config.retry.initial_backoff, Duration::from_millis(10));
    }
}
