//! Resumable, chunked download of one remote object to a local file
//!
//! The engine is backend-agnostic. A storage provider implements
//! [`RemoteObjectReader`]; the engine drives it strictly sequentially:
//! - Probe the object length, then seed the resume cursor from the local file length
//! - Read one bounded range at a time under a per-chunk watchdog
//! - Write each chunk at its offset before advancing the cursor
//! - Report progress after every chunk
//! - Restart the whole attempt on chunk timeout, and optionally on any error

mod error;
mod events;
mod options;
mod progress;
mod reader;
mod session;
mod sink;
mod transfer;
mod watchdog;

pub use error::{deepest_cause, BoxError, ErrorKind, TransferError};
pub use events::{noop_events, EventCallback, TransferEvent};
pub use options::{
    TransferOptions, DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_TIMEOUT, DEFAULT_RETRY_BACKOFF,
};
pub use progress::{ChunkResult, Eta, ProgressSample};
pub use reader::{ObjectId, ObjectLocation, RemoteObjectReader};
pub use session::{SessionStatus, TransferSession};
pub use sink::LocalSink;
pub use transfer::{ResumePoint, ResumableTransfer, TransferPhase, TransferState, TransferSummary};
pub use watchdog::{ArmedWatchdog, ChunkWatchdog};
