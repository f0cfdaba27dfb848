//! Console rendering of transfer events

use std::sync::Arc;

use log::warn;
use resumable_dl::{EventCallback, TransferEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// One progress line per chunk; everything else goes to the log.
    Human,
    /// Every event as a JSON line.
    Json,
}

/// Renders one event as a stdout line, if the mode prints it.
pub fn render(mode: OutputMode, event: &TransferEvent) -> Option<String> {
    match mode {
        OutputMode::Human => match event {
            TransferEvent::Progress(sample) => Some(sample.to_string()),
            TransferEvent::Completed { object_length, .. } => {
                Some(format!("Downloading done, {} bytes", object_length))
            }
            _ => None,
        },
        OutputMode::Json => match serde_json::to_string(event) {
            Ok(line) => Some(line),
            Err(e) => {
                warn!("Failed to serialize event: {}", e);
                None
            }
        },
    }
}

pub fn event_printer(mode: OutputMode) -> EventCallback {
    Arc::new(move |event: &TransferEvent| {
        if let Some(line) = render(mode, event) {
            println!("{}", line);
        }
    })
}
