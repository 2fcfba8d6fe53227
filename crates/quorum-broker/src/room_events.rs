//! Per-room fan-out of room and vote events.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use quorum_domain::{RoomEvent, VoteEvent};
use tokio::sync::mpsc;
use tracing::trace;

use crate::config::BrokerConfig;
use crate::subscription::Subscription;

struct Entry<E> {
    id: u64,
    tx: mpsc::Sender<E>,
}

/// room id -> subscriber queues. A plain std mutex: every operation is
/// a short in-memory walk and nothing holds the lock across an await.
type Registry<E> = Mutex<HashMap<String, Vec<Entry<E>>>>;

struct Inner {
    config: BrokerConfig,
    next_id: AtomicU64,
    room_subs: Registry<RoomEvent>,
    vote_subs: Registry<VoteEvent>,
}

/// Fan-out broker for the two per-room event streams.
///
/// Cheap to clone; all clones share the same registries.
#[derive(Clone)]
pub struct EventBroker {
    inner: Arc<Inner>,
}

impl Default for EventBroker {
    fn default() -> Self {
        Self::new(BrokerConfig::default())
    }
}

impl EventBroker {
    pub fn new(config: BrokerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                next_id: AtomicU64::new(1),
                room_subs: Mutex::new(HashMap::new()),
                vote_subs: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Delivers a room event to every subscriber of `room_id`.
    ///
    /// Never blocks: subscribers with a full queue are skipped and the
    /// event is dropped for them. Subscribers whose receiver is gone
    /// are pruned on the way through.
    pub fn publish_room_event(&self, room_id: &str, event: RoomEvent) {
        publish(&self.inner.room_subs, room_id, event, "room");
    }

    /// Delivers a vote event to every subscriber of `room_id`. Same
    /// drop-on-full semantics as [`Self::publish_room_event`].
    pub fn publish_vote_event(&self, room_id: &str, event: VoteEvent) {
        publish(&self.inner.vote_subs, room_id, event, "vote");
    }

    /// Opens a room-event subscription for `room_id`.
    pub fn subscribe_room_events(
        &self,
        room_id: &str,
    ) -> (mpsc::Receiver<RoomEvent>, Subscription) {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let rx = subscribe(
            &self.inner.room_subs,
            room_id,
            id,
            self.inner.config.room_queue_capacity,
        );
        let inner = Arc::clone(&self.inner);
        let room_id = room_id.to_string();
        let guard = Subscription::new(move || unsubscribe(&inner.room_subs, &room_id, id));
        (rx, guard)
    }

    /// Opens a vote-event subscription for `room_id`.
    pub fn subscribe_vote_events(
        &self,
        room_id: &str,
    ) -> (mpsc::Receiver<VoteEvent>, Subscription) {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let rx = subscribe(
            &self.inner.vote_subs,
            room_id,
            id,
            self.inner.config.room_queue_capacity,
        );
        let inner = Arc::clone(&self.inner);
        let room_id = room_id.to_string();
        let guard = Subscription::new(move || unsubscribe(&inner.vote_subs, &room_id, id));
        (rx, guard)
    }

    /// Drops every subscription for a deleted room. Each subscriber's
    /// receiver observes end of stream.
    pub fn cleanup_room(&self, room_id: &str) {
        lock(&self.inner.room_subs).remove(room_id);
        lock(&self.inner.vote_subs).remove(room_id);
    }

    /// Total live (room, vote) subscriber counts, across all rooms.
    pub fn subscriber_counts(&self) -> (usize, usize) {
        let rooms = lock(&self.inner.room_subs).values().map(Vec::len).sum();
        let votes = lock(&self.inner.vote_subs).values().map(Vec::len).sum();
        (rooms, votes)
    }
}

fn lock<E>(registry: &Registry<E>) -> std::sync::MutexGuard<'_, HashMap<String, Vec<Entry<E>>>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

fn subscribe<E>(registry: &Registry<E>, room_id: &str, id: u64, capacity: usize) -> mpsc::Receiver<E> {
    let (tx, rx) = mpsc::channel(capacity);
    lock(registry)
        .entry(room_id.to_string())
        .or_default()
        .push(Entry { id, tx });
    rx
}

fn unsubscribe<E>(registry: &Registry<E>, room_id: &str, id: u64) {
    let mut subs = lock(registry);
    if let Some(entries) = subs.get_mut(room_id) {
        entries.retain(|e| e.id != id);
        if entries.is_empty() {
            subs.remove(room_id);
        }
    }
}

fn publish<E: Clone>(registry: &Registry<E>, room_id: &str, event: E, stream: &str) {
    let mut subs = lock(registry);
    let Some(entries) = subs.get_mut(room_id) else {
        return;
    };
    entries.retain(|e| !e.tx.is_closed());
    for entry in entries.iter() {
        if let Err(mpsc::error::TrySendError::Full(_)) = entry.tx.try_send(event.clone()) {
            trace!(room_id, stream, subscriber = entry.id, "queue full, event dropped");
        }
    }
    if entries.is_empty() {
        subs.remove(room_id);
    }
}
