//! Per-chunk progress: percent complete, throughput and ETA
//!
//! Everything here is derived from the cursor, the object length and the
//! timing of the chunk that just completed. Nothing is retained between chunks.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Outcome of one completed read/write cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkResult {
    pub offset: u64,
    pub bytes_transferred: u64,
    pub elapsed: Duration,
}

/// Remaining time split for `dd:hh:mm:ss` display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Eta {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Eta {
    pub fn from_secs(total: u64) -> Self {
        Self {
            days: total / 86_400,
            hours: (total % 86_400) / 3_600,
            minutes: (total % 3_600) / 60,
            seconds: total % 60,
        }
    }

    #[cfg(test)]
    fn total_secs(&self) -> u64 {
        self.days * 86_400 + self.hours * 3_600 + self.minutes * 60 + self.seconds
    }
}

impl fmt::Display for Eta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:{}", self.days, self.hours, self.minutes, self.seconds)
    }
}

/// Progress snapshot emitted after every chunk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSample {
    pub percent_done: u64,
    pub bytes_done: u64,
    pub total_bytes: u64,
    pub chunk_bytes: u64,
    /// `None` when the chunk completed below timer resolution.
    pub speed_bytes_per_sec: Option<f64>,
    /// `None` whenever the speed is unknown.
    pub eta: Option<Eta>,
}

impl ProgressSample {
    /// Computes the sample for the cursor `start_position` after `chunk`.
    pub fn compute(start_position: u64, object_length: u64, chunk: &ChunkResult) -> Self {
        let percent_done = percent_done(start_position, object_length);
        let remaining = object_length.saturating_sub(start_position);

        let elapsed = chunk.elapsed.as_secs_f64();
        let speed_bytes_per_sec = if elapsed > 0.0 {
            Some(chunk.bytes_transferred as f64 / elapsed)
        } else {
            None
        };

        let eta = speed_bytes_per_sec
            .filter(|speed| *speed > 0.0)
            .map(|speed| Eta::from_secs((remaining as f64 / speed).round() as u64));

        Self {
            percent_done,
            bytes_done: start_position,
            total_bytes: object_length,
            chunk_bytes: chunk.bytes_transferred,
            speed_bytes_per_sec,
            eta,
        }
    }

    /// Throughput in KiB/s rounded to two decimals.
    pub fn kbytes_per_sec(&self) -> Option<f64> {
        self.speed_bytes_per_sec
            .map(|speed| (speed / 1024.0 * 100.0).round() / 100.0)
    }
}

/// Integer percentage, truncated toward zero. An empty object is 100% done.
fn percent_done(position: u64, length: u64) -> u64 {
    if length == 0 {
        return 100;
    }
    (position as u128 * 100 / length as u128) as u64
}

impl fmt::Display for ProgressSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}%, {}/{} bytes, ",
            self.percent_done, self.bytes_done, self.total_bytes
        )?;
        match self.kbytes_per_sec() {
            Some(kbps) => write!(f, "{kbps:.2} kbytes/sec, ")?,
            None => write!(f, "? kbytes/sec, ")?,
        }
        match self.eta {
            Some(eta) => write!(f, "remaining (dd:hh:mm:ss): {eta}"),
            None => write!(f, "remaining (dd:hh:mm:ss): unknown"),
        }
    }
}
