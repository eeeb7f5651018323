//! Uploader configuration.
//!
//! Serialized as camelCase JSON; every field has a default so a partial
//! (or empty) object is a valid configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use videohub_protocol::constants::DEFAULT_UPLOAD_ENDPOINT;
use videohub_transfer::DEFAULT_CHUNK_SIZE;

/// Default per-chunk request timeout.
const DEFAULT_CHUNK_TIMEOUT_SECS: u64 = 120;

/// Capacity of the progress event channel.
const DEFAULT_EVENT_BUFFER: usize = 256;

/// Settings for [`ResumableUploader`](crate::ResumableUploader).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UploaderConfig {
    /// Session-initiation endpoint.
    pub endpoint: String,
    /// Bytes per chunk request; 0 selects the 1 MiB default.
    pub chunk_size: usize,
    /// Per-chunk request timeout in seconds; 0 disables it.
    pub chunk_timeout_secs: u64,
    /// Capacity of the progress event channel.
    pub event_buffer: usize,
    pub retry: RetryConfig,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_UPLOAD_ENDPOINT.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_timeout_secs: DEFAULT_CHUNK_TIMEOUT_SECS,
            event_buffer: DEFAULT_EVENT_BUFFER,
            retry: RetryConfig::default(),
        }
    }
}

impl UploaderConfig {
    /// Effective chunk size.
    pub fn chunk_size(&self) -> usize {
        if self.chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            self.chunk_size
        }
    }

    /// Per-chunk timeout, `None` when disabled.
    pub fn chunk_timeout(&self) -> Option<Duration> {
        (self.chunk_timeout_secs > 0).then(|| Duration::from_secs(self.chunk_timeout_secs))
    }
}

/// Retry policy for transient chunk failures.
///
/// The default performs no retries: the first failure is surfaced to the
/// caller with its offset so the caller can decide whether to resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetryConfig {
    /// Retries allowed per chunk; the counter resets after each acknowledged chunk.
    pub max_retries: u32,
    /// Delay before the first retry, in milliseconds.
    pub initial_delay_ms: u64,
    /// Backoff cap, in milliseconds.
    pub max_delay_ms: u64,
    /// Multiplier for each subsequent attempt.
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            backoff_factor: 2.0,
        }
    }
}

impl RetryConfig {
    /// Calculates the delay before a given retry (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(63) as i32;
        let ms = self.initial_delay_ms as f64 * self.backoff_factor.powi(exp);
        let capped = ms.min(self.max_delay_ms as f64).max(0.0);
        Duration::from_secs_f64(capped / 1000.0)
    }
}
