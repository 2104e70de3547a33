//! Status events: the human-readable log of what a run is doing.
//!
//! Events only observe the pipeline; nothing in the core waits on a subscriber.

use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub timestamp: DateTime<Local>,
    pub message: String,
}

impl StatusEvent {
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            message: message.into(),
        }
    }
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// Anything that wants to follow a run. `append` must return without waiting.
pub trait StatusSink: Send + Sync {
    fn append(&self, event: StatusEvent);
}

impl StatusSink for mpsc::UnboundedSender<StatusEvent> {
    fn append(&self, event: StatusEvent) {
        // A dropped receiver just means nobody is listening anymore.
        let _ = self.send(event);
    }
}

/// Sink that only traces.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl StatusSink for TracingSink {
    fn append(&self, _event: StatusEvent) {}
}

/// Keeps every event in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<StatusEvent>>>,
}

impl MemorySink {
    pub fn messages(&self) -> Vec<String> {
        self.events
            .lock()
            .map(|events| events.iter().map(|e| e.message.clone()).collect())
            .unwrap_or_default()
    }
}

impl StatusSink for MemorySink {
    fn append(&self, event: StatusEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Timestamps messages, traces them and forwards them to the sink.
#[derive(Clone)]
pub struct Reporter {
    sink: Arc<dyn StatusSink>,
}

impl Reporter {
    pub fn new(sink: impl StatusSink + 'static) -> Self {
        Self {
            sink: Arc::new(sink),
        }
    }

    pub fn emit(&self, message: impl Into<String>) {
        let event = StatusEvent::now(message);
        tracing::info!(target: "status", "{}", event.message);
        self.sink.append(event);
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(TracingSink)
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter").finish_non_exhaustive()
    }
}
