//! Outer retry loop around a [`ResumableTransfer`]

use log::{info, warn};
use serde::Serialize;

use crate::transfer::suspend;
use crate::{
    deepest_cause, RemoteObjectReader, ResumableTransfer, TransferError, TransferEvent,
    TransferSummary,
};

/// Terminal status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Completed,
    Failed,
    Cancelled,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Completed => write!(f, "completed"),
            SessionStatus::Failed => write!(f, "failed"),
            SessionStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl SessionStatus {
    pub fn of(result: &Result<TransferSummary, TransferError>) -> Self {
        match result {
            Ok(_) => SessionStatus::Completed,
            Err(TransferError::Cancelled) => SessionStatus::Cancelled,
            Err(_) => SessionStatus::Failed,
        }
    }
}

/// Runs a transfer until it completes, fails for good, or is shut down.
///
/// With `retry_on_error`, every retryable error restarts the transfer from
/// Probing after the fixed backoff, the same way a chunk timeout does. The
/// number of restarts is unbounded unless `max_attempts` is set.
pub struct TransferSession<R> {
    transfer: ResumableTransfer<R>,
    runs: u32,
}

impl<R: RemoteObjectReader> TransferSession<R> {
    pub fn new(transfer: ResumableTransfer<R>) -> Self {
        Self { transfer, runs: 0 }
    }

    /// Number of times the transfer has been started by this session.
    pub fn runs(&self) -> u32 {
        self.runs
    }

    pub async fn run(&mut self) -> Result<TransferSummary, TransferError> {
        loop {
            self.runs += 1;
            match self.transfer.run().await {
                Ok(summary) => {
                    info!(
                        "Downloading done: {} bytes in {} chunks ({} resumed from disk)",
                        summary.bytes_transferred, summary.chunks, summary.initial_position
                    );
                    self.transfer.emit(TransferEvent::Completed {
                        object_length: summary.object_length,
                        bytes_transferred: summary.bytes_transferred,
                    });
                    return Ok(summary);
                }
                Err(err) => {
                    let cause = deepest_cause(&err);

                    if !self.should_retry(&err) {
                        self.transfer.emit(TransferEvent::Failed {
                            kind: err.kind(),
                            cause,
                        });
                        return Err(err);
                    }

                    let backoff = self.transfer.options().retry_backoff;
                    warn!("{}", cause);
                    info!("Retrying in {} seconds...", backoff.as_secs());
                    self.transfer.emit(TransferEvent::Retrying {
                        next_attempt: self.transfer.attempt() + 1,
                        backoff_secs: backoff.as_secs(),
                        cause,
                    });

                    if let Err(cancelled) = suspend(self.transfer.shutdown(), backoff).await {
                        self.transfer.emit(TransferEvent::Failed {
                            kind: cancelled.kind(),
                            cause: cancelled.to_string(),
                        });
                        return Err(cancelled);
                    }
                    self.transfer.next_attempt();
                }
            }
        }
    }

    fn should_retry(&self, err: &TransferError) -> bool {
        let options = self.transfer.options();
        options.retry_on_error
            && err.is_retryable()
            && options.allows_attempt_after(self.transfer.attempt())
    }
}
