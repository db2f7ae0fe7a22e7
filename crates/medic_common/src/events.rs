//! Progress events emitted by the diagnostic and remediation runs.
//!
//! The core never talks to a user interface directly. Components receive an
//! injected [`EventSink`] and emit [`MedicEvent`]s through it; the frontend
//! subscribes on the other side of a channel.

use serde::{Deserialize, Serialize};
use std::sync::mpsc;
use std::sync::Mutex;

use crate::issue::Issue;

/// Event emitted during a diagnostic or remediation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MedicEvent {
    /// A human-readable narrative line
    Progress { text: String },
    /// A non-fatal failure that needs user attention
    Error { text: String },
    /// Diagnostic run completed with the merged issue list
    DiagnosticsFinished { issues: Vec<Issue> },
    /// Remediation run completed, whatever the per-kind outcomes
    RemediationFinished,
}

/// Sink for run events.
///
/// `progress` and `error` are conveniences over `emit`; implementors only
/// provide `emit`.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: MedicEvent);

    fn progress(&self, text: &str) {
        self.emit(MedicEvent::Progress {
            text: text.to_string(),
        });
    }

    fn error(&self, text: &str) {
        self.emit(MedicEvent::Error {
            text: text.to_string(),
        });
    }
}

/// Sink that forwards events over an mpsc channel to the frontend.
///
/// A disconnected receiver is not an error; late events from a finishing
/// worker are dropped.
pub struct ChannelSink {
    tx: mpsc::Sender<MedicEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::Receiver<MedicEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: MedicEvent) {
        let _ = self.tx.send(event);
    }
}

/// Sink that records every event, for tests and report assembly
#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<MedicEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<MedicEvent> {
        self.events.lock().expect("event sink poisoned").clone()
    }

    pub fn progress_lines(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                MedicEvent::Progress { text } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn error_lines(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                MedicEvent::Error { text } => Some(text),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: MedicEvent) {
        self.events.lock().expect("event sink poisoned").push(event);
    }
}

/// Sink that discards everything
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: MedicEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_sink_delivers_in_order() {
        let (sink, rx) = ChannelSink::new();
        sink.progress("first");
        sink.error("second");
        sink.emit(MedicEvent::RemediationFinished);

        assert_eq!(
            rx.recv().unwrap(),
            MedicEvent::Progress {
                text: "first".to_string()
            }
        );
        assert_eq!(
            rx.recv().unwrap(),
            MedicEvent::Error {
                text: "second".to_string()
            }
        );
        assert_eq!(rx.recv().unwrap(), MedicEvent::RemediationFinished);
    }

    #[test]
    fn test_channel_sink_survives_dropped_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.progress("nobody listening");
    }

    #[test]
    fn test_collecting_sink_partitions_levels() {
        let sink = CollectingSink::new();
        sink.progress("ok line");
        sink.error("bad line");

        assert_eq!(sink.progress_lines(), vec!["ok line".to_string()]);
        assert_eq!(sink.error_lines(), vec!["bad line".to_string()]);
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = MedicEvent::DiagnosticsFinished { issues: vec![] };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("diagnostics_finished"));
    }
}
