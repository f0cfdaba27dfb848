//! Per-chunk deadline timer
//!
//! Arming spawns a timer task that cancels a fresh token when the deadline
//! passes. The transfer path races its read against [`ArmedWatchdog::fired`],
//! so a hung read is abandoned by dropping its future; the timer never calls
//! back into the transfer.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy)]
pub struct ChunkWatchdog {
    deadline: Duration,
}

impl ChunkWatchdog {
    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Starts the deadline for one chunk. Must be called inside a tokio runtime.
    pub fn arm(&self) -> ArmedWatchdog {
        let token = CancellationToken::new();
        let fire = token.clone();
        let deadline = self.deadline;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            fire.cancel();
        });
        ArmedWatchdog { token, timer }
    }
}

/// A running deadline. Dropping it disarms the timer.
#[derive(Debug)]
pub struct ArmedWatchdog {
    token: CancellationToken,
    timer: JoinHandle<()>,
}

impl ArmedWatchdog {
    /// Resolves once the deadline has passed.
    pub async fn fired(&self) {
        self.token.cancelled().await
    }

    #[cfg(test)]
    fn has_fired(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Stops the timer. Same as dropping the guard.
    pub fn disarm(self) {}
}

impl Drop for ArmedWatchdog {
    fn drop(&mut self) {
        self.timer.abort();
    }
}
