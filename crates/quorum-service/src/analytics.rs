//! Pump from the app-event broker into the analytics sink.

use std::sync::Arc;

use quorum_broker::{AppEventPublisher, Subscription};
use quorum_store::{AnalyticsEvent, AnalyticsRecorder};
use tokio::task::JoinHandle;
use tracing::warn;

/// Handle for a running analytics pump.
pub struct AnalyticsPump {
    subscription: Subscription,
    task: JoinHandle<()>,
}

impl AnalyticsPump {
    /// Unsubscribes and waits for the pump to drain.
    pub async fn stop(self) {
        self.subscription.unsubscribe();
        let _ = self.task.await;
    }
}

/// Subscribes to the app-event stream and records every event.
///
/// Fire-and-forget: a failing recorder is logged and skipped, it never
/// feeds back into the rooms producing the events.
pub fn spawn_analytics_pump<A, S>(app_events: &A, recorder: Arc<S>) -> AnalyticsPump
where
    A: AppEventPublisher,
    S: AnalyticsRecorder,
{
    let (mut events, subscription) = app_events.subscribe_app_events();
    let task = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let record = AnalyticsEvent::from(&event);
            if let Err(err) = recorder.record_event(record).await {
                warn!(event_type = event.kind.event_type(), %err, "analytics record failed");
            }
        }
    });
    AnalyticsPump { subscription, task }
}
