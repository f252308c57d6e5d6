//! Retry with exponential back-off and jitter for catalog API calls.
//!
//! Bulk creation is not idempotent, so only failures where the server cannot
//! have created anything are retried: HTTP 429 and connection failures.
//! Timeouts are returned immediately since the request may have landed.

use std::future::Future;
use std::time::Duration;

use crate::error::ClientError;

/// Returns `true` for errors that are safe to retry after a back-off delay.
///
/// **Retriable:**
/// - [`ClientError::RateLimited`]: HTTP 429.
/// - [`ClientError::Http`] where the connection was never established.
///
/// Everything else, including timeouts and 5xx responses, is returned as-is.
pub(crate) fn is_retriable(err: &ClientError) -> bool {
    match err {
        ClientError::RateLimited { .. } => true,
        ClientError::Http(e) => e.is_connect(),
        ClientError::Deserialize { .. }
        | ClientError::Serialize { .. }
        | ClientError::Unauthorized { .. }
        | ClientError::UnexpectedStatus { .. }
        | ClientError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on retriable errors.
///
/// The wait before retry `n` is `backoff_base_secs * 2^(n-1)` seconds, scaled
/// by a random factor in `[0.75, 1.25)` and capped at 60 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    const MAX_DELAY_MS: u64 = 60_000;
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_secs
                    .saturating_mul(1_000)
                    .saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "catalog API unavailable, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
