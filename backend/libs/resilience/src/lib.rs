/// Resilience patterns for outbound calls
///
/// - **Timeout**: per-attempt deadline that keeps the inner error type
/// - **Retry**: bounded exponential backoff, retrying only errors the caller
///   marks as transient
/// - **Presets**: pre-tuned settings for third-party HTTP APIs
///
/// # Example: third-party API call
///
/// ```rust,no_run
/// use resilience::{presets, with_retry, with_timeout_result};
///
/// #[tokio::main]
/// async fn main() {
///     let config = presets::http_external_config();
///
///     let result = with_retry(
///         &config.retry,
///         |e: &resilience::TimeoutError<String>| {
///             matches!(e, resilience::TimeoutError::Elapsed(_))
///         },
///         || with_timeout_result(config.timeout.duration, async {
///             // Your HTTP call here
///             Ok::<_, String>(())
///         }),
///     )
///     .await;
/// }
/// ```

pub mod presets;
pub mod retry;
pub mod timeout;

pub use presets::{http_external_config, ServiceConfig};
pub use retry::{with_retry, RetryConfig, RetryError};
pub use timeout::{with_timeout, with_timeout_result, TimeoutConfig, TimeoutError};
