use std::time::Duration;

use crate::TransferError;

/// Default chunk size: 1 MiB per ranged read.
pub const DEFAULT_CHUNK_SIZE: u64 = 1024 * 1024;

/// Default per-chunk watchdog deadline.
pub const DEFAULT_CHUNK_TIMEOUT: Duration = Duration::from_secs(10);

/// Fixed pause before restarting after a timeout or a retried error.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(10);

/// Tunables for one transfer session. Constant for the session's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferOptions {
    /// Bytes requested per ranged read.
    pub chunk_size: u64,
    /// Pause after each chunk (zero disables it).
    pub delay_between_chunks: Duration,
    /// Deadline for a single ranged read.
    pub chunk_timeout: Duration,
    /// Pause before restarting after a timeout or error.
    pub retry_backoff: Duration,
    /// Restart the session after any retryable error.
    pub retry_on_error: bool,
    /// Upper bound on consecutive attempts without a completed chunk.
    /// `None` retries until success or shutdown.
    pub max_attempts: Option<u32>,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            delay_between_chunks: Duration::ZERO,
            chunk_timeout: DEFAULT_CHUNK_TIMEOUT,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            retry_on_error: false,
            max_attempts: None,
        }
    }
}

impl TransferOptions {
    pub fn validate(&self) -> Result<(), TransferError> {
        if self.chunk_size == 0 {
            return Err(TransferError::Config("chunk size must be at least 1 byte".into()));
        }
        if self.chunk_timeout.is_zero() {
            return Err(TransferError::Config("chunk timeout must be non-zero".into()));
        }
        if self.max_attempts == Some(0) {
            return Err(TransferError::Config("max attempts must be at least 1".into()));
        }
        Ok(())
    }

    /// Whether another attempt is allowed after `attempt` consecutive ones.
    pub(crate) fn allows_attempt_after(&self, attempt: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempt < max)
    }
}
