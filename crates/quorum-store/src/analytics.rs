//! Analytics sink.
//!
//! App events cross this boundary as flat [`AnalyticsEvent`] records:
//! a stable string event type plus a JSON metadata blob, so a real
//! store can persist them without knowing the enum.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use quorum_domain::AppEvent;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Failure writing to an analytics store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalyticsError {
    #[error("analytics store unavailable: {0}")]
    Unavailable(String),
}

/// One recorded event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    /// `room_created`, `room_closed`, `vote_cast`, or `vote_revealed`.
    pub event_type: String,
    pub room_id: String,
    /// Event payload minus the type tag.
    pub metadata: Value,
    /// Unix seconds.
    pub timestamp: u64,
}

impl From<&AppEvent> for AnalyticsEvent {
    fn from(event: &AppEvent) -> Self {
        let mut metadata = serde_json::to_value(&event.kind).unwrap_or(Value::Null);
        if let Some(object) = metadata.as_object_mut() {
            object.remove("type");
            object.insert("room_name".to_string(), Value::from(event.room_name.clone()));
        }
        Self {
            event_type: event.kind.event_type().to_string(),
            room_id: event.room_id.clone(),
            metadata,
            timestamp: event.timestamp,
        }
    }
}

/// Secondary port for analytics persistence. Returns a `Send` future
/// so the pump task can await it.
pub trait AnalyticsRecorder: Send + Sync + 'static {
    fn record_event(
        &self,
        event: AnalyticsEvent,
    ) -> impl Future<Output = Result<(), AnalyticsError>> + Send;
}

/// In-memory [`AnalyticsRecorder`] that keeps every record, mainly so
/// tests can assert on what crossed the boundary.
#[derive(Default)]
pub struct MemoryAnalyticsRecorder {
    events: Mutex<Vec<AnalyticsEvent>>,
}

impl MemoryAnalyticsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl AnalyticsRecorder for MemoryAnalyticsRecorder {
    async fn record_event(&self, event: AnalyticsEvent) -> Result<(), AnalyticsError> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
        Ok(())
    }
}
