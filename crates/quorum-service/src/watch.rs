//! Watch-stream plumbing shared by `watch_room` and `watch_votes`.

use quorum_broker::Subscription;
use tokio::sync::mpsc;

/// Output queue depth for watch streams. Matches the broker's per-room
/// queues; the forwarder applies backpressure to itself, not to
/// publishers.
const WATCH_QUEUE_CAPACITY: usize = 10;

/// Bridges a broker subscription to a caller-facing receiver.
///
/// The forwarder task sends `first` (the snapshot) before any live
/// event, then relays until the broker closes the stream (room
/// deleted) or the caller drops the receiver. The subscription guard
/// lives inside the task, so either exit unsubscribes.
pub(crate) fn spawn_forwarder<E: Send + 'static>(
    first: E,
    mut events: mpsc::Receiver<E>,
    subscription: Subscription,
) -> mpsc::Receiver<E> {
    let (tx, rx) = mpsc::channel(WATCH_QUEUE_CAPACITY);
    tokio::spawn(async move {
        let _subscription = subscription;
        if tx.send(first).await.is_err() {
            return;
        }
        while let Some(event) = events.recv().await {
            if tx.send(event).await.is_err() {
                return;
            }
        }
    });
    rx
}
