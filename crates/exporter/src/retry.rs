// Retry logic for OTLP exports
use crate::constants::{
    DEFAULT_INITIAL_DELAY_MS, DEFAULT_JITTER_MS, DEFAULT_MAX_DELAY_MS, DEFAULT_MAX_RETRIES,
    EXPORT_OPERATION_NAME,
};
use crate::error::Result;
use opentelemetry_proto::tonic::collector::logs::v1::{
    logs_service_client::LogsServiceClient, ExportLogsServiceRequest,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;
use tonic::transport::Channel;
use tonic::{Code, Status};
use tonic_types::StatusExt;
use tracing::{debug, warn};

/// How a failed export should be handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryErrorType {
    /// Give up immediately
    NonRetryable,
    /// Retry with exponential backoff
    Retryable,
    /// Retry after the delay the collector asked for
    Throttled(Duration),
}

/// Exponential backoff policy
///
/// The first retry waits `initial_delay_ms` plus up to `jitter_ms` of random
/// jitter. Each further retryable failure doubles the base delay. No wait
/// exceeds `max_delay_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 disables retrying)
    pub max_retries: usize,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay_ms: DEFAULT_INITIAL_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            jitter_ms: DEFAULT_JITTER_MS,
        }
    }
}

impl RetryPolicy {
    /// Policy that makes exactly one attempt
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before the next retry for the given base delay
    ///
    /// Returns `min(base + jitter, max_delay)` with jitter drawn uniformly
    /// from `[0, jitter_ms]`.
    pub fn backoff_delay(&self, base_delay_ms: u64) -> Duration {
        let jitter = if self.jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=self.jitter_ms)
        };

        Duration::from_millis(base_delay_ms.saturating_add(jitter).min(self.max_delay_ms))
    }
}

/// Classify a gRPC status according to the OTLP retry rules
///
/// `RESOURCE_EXHAUSTED` is only retried when the collector attaches a
/// `RetryInfo` detail telling us how long to back off.
pub fn classify_tonic_status(status: &Status) -> RetryErrorType {
    match status.code() {
        Code::Cancelled
        | Code::DeadlineExceeded
        | Code::Aborted
        | Code::OutOfRange
        | Code::Unavailable
        | Code::DataLoss => RetryErrorType::Retryable,
        Code::ResourceExhausted => match status
            .get_details_retry_info()
            .and_then(|info| info.retry_delay)
        {
            Some(delay) => RetryErrorType::Throttled(delay),
            None => RetryErrorType::NonRetryable,
        },
        _ => RetryErrorType::NonRetryable,
    }
}

/// Run `operation` until it succeeds, fails permanently, or runs out of retries
///
/// Returns the last error when retries are exhausted.
///
/// # Example
///
/// ```text
/// let response = retry_with_backoff(&policy, "export", classify_tonic_status, || {
///     let mut client = client.clone();
///     let request = request.clone();
///     async move { client.export(request).await }
/// })
/// .await?;
/// ```
pub async fn retry_with_backoff<T, E, C, F, Fut>(
    policy: &RetryPolicy,
    operation_name: &str,
    classify: C,
    mut operation: F,
) -> std::result::Result<T, E>
where
    E: Debug,
    C: Fn(&E) -> RetryErrorType,
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let mut attempt = 0;
    let mut base_delay_ms = policy.initial_delay_ms;

    loop {
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        let delay = match classify(&error) {
            RetryErrorType::NonRetryable => {
                warn!(
                    operation = operation_name,
                    error = ?error,
                    "Non-retryable error, giving up"
                );
                return Err(error);
            }
            _ if attempt >= policy.max_retries => {
                warn!(
                    operation = operation_name,
                    attempts = attempt + 1,
                    error = ?error,
                    "Max retry attempts reached"
                );
                return Err(error);
            }
            RetryErrorType::Retryable => {
                let delay = policy.backoff_delay(base_delay_ms);
                base_delay_ms = base_delay_ms.saturating_mul(2).min(policy.max_delay_ms);
                delay
            }
            // Server-provided delay; the exponential base is left alone
            RetryErrorType::Throttled(delay) => delay,
        };

        attempt += 1;
        debug!(
            operation = operation_name,
            attempt,
            max_retries = policy.max_retries,
            delay_ms = delay_millis(delay),
            error = ?error,
            "Scheduling retry"
        );

        tokio::time::sleep(delay).await;
    }
}

/// Milliseconds in `delay`, saturating at `u64::MAX`
fn delay_millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

/// Send one export request, retrying per `policy`
///
/// A partial success from the collector is logged but not treated as a
/// failure: retrying would resend the records it already accepted.
pub async fn export_with_retry(
    client: &LogsServiceClient<Channel>,
    policy: &RetryPolicy,
    request: &ExportLogsServiceRequest,
) -> Result<()> {
    let response = retry_with_backoff(policy, EXPORT_OPERATION_NAME, classify_tonic_status, || {
        // Tonic clients are cheap handles over the shared channel
        let mut client = client.clone();
        let request = request.clone();
        async move { client.export(request).await }
    })
    .await?;

    if let Some(partial) = response.into_inner().partial_success {
        if partial.rejected_log_records > 0 {
            warn!(
                rejected_log_records = partial.rejected_log_records,
                message = %partial.error_message,
                "Collector rejected part of the batch"
            );
        }
    }

    Ok(())
}
