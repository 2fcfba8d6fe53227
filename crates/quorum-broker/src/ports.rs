//! Ports the orchestration services are generic over.
//!
//! The concrete brokers in this crate are the only production
//! implementations; the traits exist so tests can swap in recording
//! fakes and so the service crate never names a concrete broker.

use quorum_domain::{AppEvent, RoomEvent, VoteEvent};
use tokio::sync::mpsc;

use crate::subscription::Subscription;
use crate::{AppEventBroker, EventBroker};

/// Publish/subscribe access to the two per-room event streams.
pub trait EventPublisher: Send + Sync + 'static {
    fn publish_room_event(&self, room_id: &str, event: RoomEvent);
    fn publish_vote_event(&self, room_id: &str, event: VoteEvent);
    fn subscribe_room_events(&self, room_id: &str) -> (mpsc::Receiver<RoomEvent>, Subscription);
    fn subscribe_vote_events(&self, room_id: &str) -> (mpsc::Receiver<VoteEvent>, Subscription);
    /// Ends every stream for a deleted room.
    fn cleanup_room(&self, room_id: &str);
}

/// Publish/subscribe access to the application-wide event stream.
pub trait AppEventPublisher: Send + Sync + 'static {
    fn publish_app_event(&self, event: AppEvent);
    fn subscribe_app_events(&self) -> (mpsc::Receiver<AppEvent>, Subscription);
}

impl EventPublisher for EventBroker {
    fn publish_room_event(&self, room_id: &str, event: RoomEvent) {
        EventBroker::publish_room_event(self, room_id, event);
    }

    fn publish_vote_event(&self, room_id: &str, event: VoteEvent) {
        EventBroker::publish_vote_event(self, room_id, event);
    }

    fn subscribe_room_events(&self, room_id: &str) -> (mpsc::Receiver<RoomEvent>, Subscription) {
        EventBroker::subscribe_room_events(self, room_id)
    }

    fn subscribe_vote_events(&self, room_id: &str) -> (mpsc::Receiver<VoteEvent>, Subscription) {
        EventBroker::subscribe_vote_events(self, room_id)
    }

    fn cleanup_room(&self, room_id: &str) {
        EventBroker::cleanup_room(self, room_id);
    }
}

impl AppEventPublisher for AppEventBroker {
    fn publish_app_event(&self, event: AppEvent) {
        self.publish(event);
    }

    fn subscribe_app_events(&self) -> (mpsc::Receiver<AppEvent>, Subscription) {
        self.subscribe()
    }
}
