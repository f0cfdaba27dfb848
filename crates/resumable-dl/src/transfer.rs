//! Chunk loop and its state machine
//!
//! One attempt walks `Probing -> Seeking -> TransferringChunk -> Writing ->
//! Reporting -> (TransferringChunk | Done)`. A watchdog timeout ends the
//! attempt; [`ResumableTransfer::run`] backs off and starts over from Probing,
//! re-seeding the cursor from the local file. Errors end the attempt and are
//! returned to the caller untouched.

use bytes::Bytes;
use log::{debug, info, warn};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{
    noop_events, ChunkResult, ChunkWatchdog, EventCallback, LocalSink, ObjectId, ObjectLocation,
    ProgressSample, RemoteObjectReader, TransferError, TransferEvent, TransferOptions,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferPhase {
    Probing,
    Seeking,
    TransferringChunk,
    Writing,
    Reporting,
    TimedOut,
    Failed,
    Done,
}

impl std::fmt::Display for TransferPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferPhase::Probing => write!(f, "probing"),
            TransferPhase::Seeking => write!(f, "seeking"),
            TransferPhase::TransferringChunk => write!(f, "transferring"),
            TransferPhase::Writing => write!(f, "writing"),
            TransferPhase::Reporting => write!(f, "reporting"),
            TransferPhase::TimedOut => write!(f, "timed-out"),
            TransferPhase::Failed => write!(f, "failed"),
            TransferPhase::Done => write!(f, "done"),
        }
    }
}

/// Cursor state of one attempt.
///
/// `start_position <= object_length` and
/// `remaining == object_length - start_position` hold after every update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferState {
    pub object_length: u64,
    pub start_position: u64,
    pub remaining: u64,
    pub chunk_size: u64,
}

impl TransferState {
    fn new(object_length: u64, start_position: u64, chunk_size: u64) -> Self {
        debug_assert!(start_position <= object_length);
        Self {
            object_length,
            start_position,
            remaining: object_length - start_position,
            chunk_size,
        }
    }

    /// Length of the next read, clamped to what is left.
    pub fn next_chunk_len(&self) -> u64 {
        self.chunk_size.min(self.remaining)
    }

    fn advance(&mut self, written: u64) {
        debug_assert!(written <= self.remaining);
        self.start_position += written;
        self.remaining = self.object_length - self.start_position;
    }
}

/// Remote length and local cursor as Probing + Seeking see them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResumePoint {
    pub object_length: u64,
    pub start_position: u64,
}

impl ResumePoint {
    pub fn is_complete(&self) -> bool {
        self.start_position == self.object_length
    }
}

/// Totals accumulated across every attempt of a transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransferSummary {
    pub object_length: u64,
    /// Cursor seeded by the first attempt.
    pub initial_position: u64,
    pub bytes_transferred: u64,
    pub chunks: u64,
    pub timeouts: u32,
}

enum AttemptOutcome {
    Done,
    TimedOut { offset: u64 },
}

enum Step {
    Probing,
    Seeking(ObjectLocation),
    TransferringChunk(ObjectLocation, TransferState),
    Writing {
        location: ObjectLocation,
        state: TransferState,
        data: Bytes,
        started: Instant,
    },
    Reporting(ObjectLocation, TransferState, ChunkResult),
    Finished(AttemptOutcome),
}

impl Step {
    fn phase(&self) -> TransferPhase {
        match self {
            Step::Probing => TransferPhase::Probing,
            Step::Seeking(_) => TransferPhase::Seeking,
            Step::TransferringChunk(..) => TransferPhase::TransferringChunk,
            Step::Writing { .. } => TransferPhase::Writing,
            Step::Reporting(..) => TransferPhase::Reporting,
            Step::Finished(AttemptOutcome::Done) => TransferPhase::Done,
            Step::Finished(AttemptOutcome::TimedOut { .. }) => TransferPhase::TimedOut,
        }
    }
}

/// Drives the chunk loop for one object and one destination.
pub struct ResumableTransfer<R> {
    reader: R,
    object: ObjectId,
    sink: LocalSink,
    options: TransferOptions,
    watchdog: ChunkWatchdog,
    events: EventCallback,
    shutdown: CancellationToken,
    attempt: u32,
    seeded: bool,
    summary: TransferSummary,
}

impl<R: RemoteObjectReader> ResumableTransfer<R> {
    pub fn new(reader: R, object: ObjectId, sink: LocalSink, options: TransferOptions) -> Self {
        let watchdog = ChunkWatchdog::new(options.chunk_timeout);
        Self {
            reader,
            object,
            sink,
            options,
            watchdog,
            events: noop_events(),
            shutdown: CancellationToken::new(),
            attempt: 1,
            seeded: false,
            summary: TransferSummary::default(),
        }
    }

    pub fn with_events(mut self, events: EventCallback) -> Self {
        self.events = events;
        self
    }

    /// Token that interrupts reads, delays and backoffs when cancelled.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Consecutive attempt number; back to 1 after every written chunk.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn options(&self) -> &TransferOptions {
        &self.options
    }

    pub(crate) fn next_attempt(&mut self) {
        self.attempt += 1;
    }

    pub(crate) fn shutdown(&self) -> &CancellationToken {
        &self.shutdown
    }

    pub(crate) fn emit(&self, event: TransferEvent) {
        (self.events)(&event);
    }

    /// Runs Probing and Seeking only, without transferring anything.
    pub async fn inspect(&self) -> Result<ResumePoint, TransferError> {
        let object_length = self.probe().await?;
        let start_position = self.seek(object_length).await?;
        Ok(ResumePoint {
            object_length,
            start_position,
        })
    }

    /// Transfers until every byte is on disk, restarting after chunk timeouts.
    ///
    /// Errors are returned as soon as they happen; retrying them is the
    /// session's decision.
    pub async fn run(&mut self) -> Result<TransferSummary, TransferError> {
        self.options.validate()?;

        loop {
            info!("Attempt: {} ({})", self.attempt, self.object);
            self.emit(TransferEvent::AttemptStarted {
                attempt: self.attempt,
            });

            match self.run_attempt().await? {
                AttemptOutcome::Done => return Ok(self.summary.clone()),
                AttemptOutcome::TimedOut { offset } => {
                    self.summary.timeouts += 1;
                    warn!(
                        "Timeout happened: no data within {:?} at offset {}",
                        self.watchdog.deadline(),
                        offset
                    );
                    self.emit(TransferEvent::TimedOut {
                        attempt: self.attempt,
                        offset,
                        deadline_secs: self.watchdog.deadline().as_secs(),
                    });

                    if !self.options.allows_attempt_after(self.attempt) {
                        return Err(TransferError::network_msg(format!(
                            "chunk at offset {} timed out on {} consecutive attempts",
                            offset, self.attempt
                        )));
                    }

                    let backoff = self.options.retry_backoff;
                    info!("Retrying in {} seconds...", backoff.as_secs());
                    self.emit(TransferEvent::Retrying {
                        next_attempt: self.attempt + 1,
                        backoff_secs: backoff.as_secs(),
                        cause: "chunk read timed out".to_string(),
                    });
                    suspend(&self.shutdown, backoff).await?;
                    self.attempt += 1;
                }
            }
        }
    }

    async fn run_attempt(&mut self) -> Result<AttemptOutcome, TransferError> {
        let mut step = Step::Probing;

        loop {
            debug!("transfer phase: {}", step.phase());
            step = match step {
                Step::Probing => {
                    let object_length = self.probe().await?;
                    self.emit(TransferEvent::Probed { object_length });
                    Step::Seeking(ObjectLocation {
                        id: self.object.clone(),
                        object_length,
                    })
                }
                Step::Seeking(location) => {
                    let start_position = self.seek(location.object_length).await?;
                    if !self.seeded {
                        self.seeded = true;
                        self.summary.initial_position = start_position;
                    }
                    self.summary.object_length = location.object_length;

                    if start_position > 0 {
                        info!(
                            "Local file exists. Resuming download at {}/{} bytes...",
                            start_position, location.object_length
                        );
                        self.emit(TransferEvent::Resuming {
                            offset: start_position,
                            object_length: location.object_length,
                        });
                    }

                    let state = TransferState::new(
                        location.object_length,
                        start_position,
                        self.options.chunk_size,
                    );
                    if state.remaining == 0 {
                        // Zero-length objects still leave a destination file behind.
                        if state.object_length == 0 {
                            self.sink.touch().await?;
                        }
                        Step::Finished(AttemptOutcome::Done)
                    } else {
                        Step::TransferringChunk(location, state)
                    }
                }
                Step::TransferringChunk(location, state) => {
                    if self.shutdown.is_cancelled() {
                        return Err(TransferError::Cancelled);
                    }

                    let length = state.next_chunk_len();
                    let offset = state.start_position;
                    let started = Instant::now();
                    let watch = self.watchdog.arm();

                    let read = tokio::select! {
                        biased;
                        _ = self.shutdown.cancelled() => return Err(TransferError::Cancelled),
                        _ = watch.fired() => None,
                        result = self.reader.read_range(&location, offset, length) => Some(result),
                    };
                    watch.disarm();

                    match read {
                        None => Step::Finished(AttemptOutcome::TimedOut { offset }),
                        Some(result) => {
                            let data = result?;
                            if data.len() as u64 != length {
                                return Err(TransferError::network_msg(format!(
                                    "expected {} bytes at offset {}, received {}",
                                    length,
                                    offset,
                                    data.len()
                                )));
                            }
                            Step::Writing {
                                location,
                                state,
                                data,
                                started,
                            }
                        }
                    }
                }
                Step::Writing {
                    location,
                    mut state,
                    data,
                    started,
                } => {
                    self.sink.write_at(state.start_position, &data).await?;
                    let chunk = ChunkResult {
                        offset: state.start_position,
                        bytes_transferred: data.len() as u64,
                        elapsed: started.elapsed(),
                    };
                    state.advance(chunk.bytes_transferred);
                    self.attempt = 1;
                    self.summary.bytes_transferred += chunk.bytes_transferred;
                    self.summary.chunks += 1;
                    Step::Reporting(location, state, chunk)
                }
                Step::Reporting(location, state, chunk) => {
                    let sample =
                        ProgressSample::compute(state.start_position, location.object_length, &chunk);
                    debug!("{}", sample);
                    self.emit(TransferEvent::Progress(sample));

                    if state.remaining == 0 {
                        Step::Finished(AttemptOutcome::Done)
                    } else {
                        suspend(&self.shutdown, self.options.delay_between_chunks).await?;
                        Step::TransferringChunk(location, state)
                    }
                }
                Step::Finished(outcome) => return Ok(outcome),
            };
        }
    }

    async fn probe(&self) -> Result<u64, TransferError> {
        let object_length = cancellable(&self.shutdown, self.reader.probe_length(&self.object)).await?;
        debug!("{} is {} bytes", self.object, object_length);
        Ok(object_length)
    }

    /// The local length is trusted as-is; existing bytes are not compared with the remote.
    async fn seek(&self, object_length: u64) -> Result<u64, TransferError> {
        let start_position = self.sink.current_len().await?;
        if start_position > object_length {
            return Err(TransferError::Config(format!(
                "local file {} has {} bytes but the remote object only has {}",
                self.sink.path().display(),
                start_position,
                object_length
            )));
        }
        Ok(start_position)
    }
}

/// Sleeps for `duration` unless `shutdown` is cancelled first.
pub(crate) async fn suspend(
    shutdown: &CancellationToken,
    duration: Duration,
) -> Result<(), TransferError> {
    if duration.is_zero() {
        return Ok(());
    }
    tokio::select! {
        _ = shutdown.cancelled() => Err(TransferError::Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}

async fn cancellable<T>(
    shutdown: &CancellationToken,
    fut: impl Future<Output = Result<T, TransferError>>,
) -> Result<T, TransferError> {
    tokio::select! {
        biased;
        _ = shutdown.cancelled() => Err(TransferError::Cancelled),
        result = fut => result,
    }
}
