//! Transfer event payloads

use serde::Serialize;
use std::sync::Arc;

use crate::{ErrorKind, ProgressSample};

/// Callback invoked synchronously for every [`TransferEvent`].
pub type EventCallback = Arc<dyn Fn(&TransferEvent) + Send + Sync>;

/// Callback that drops every event.
pub fn noop_events() -> EventCallback {
    Arc::new(|_: &TransferEvent| {})
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TransferEvent {
    /// A fresh attempt begins at Probing.
    AttemptStarted { attempt: u32 },
    /// The remote object length is known.
    Probed { object_length: u64 },
    /// An existing local file seeds the resume cursor.
    Resuming { offset: u64, object_length: u64 },
    /// A chunk was written.
    Progress(ProgressSample),
    /// The watchdog abandoned the read at `offset`.
    TimedOut {
        attempt: u32,
        offset: u64,
        deadline_secs: u64,
    },
    /// The session restarts after `backoff_secs`.
    Retrying {
        next_attempt: u32,
        backoff_secs: u64,
        cause: String,
    },
    Completed {
        object_length: u64,
        bytes_transferred: u64,
    },
    Failed { kind: ErrorKind, cause: String },
}
