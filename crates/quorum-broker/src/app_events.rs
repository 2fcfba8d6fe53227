//! Application-wide event fan-out.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use quorum_domain::AppEvent;
use tokio::sync::mpsc;
use tracing::trace;

use crate::config::BrokerConfig;
use crate::subscription::Subscription;

struct Entry {
    id: u64,
    tx: mpsc::Sender<AppEvent>,
}

struct Inner {
    config: BrokerConfig,
    next_id: AtomicU64,
    subscribers: Mutex<Vec<Entry>>,
}

/// Broker for events every room produces: created, closed, votes cast
/// and revealed. One flat subscriber list, larger queues than the
/// per-room broker, same drop-on-full publish.
#[derive(Clone)]
pub struct AppEventBroker {
    inner: Arc<Inner>,
}

impl Default for AppEventBroker {
    fn default() -> Self {
        Self::new(BrokerConfig::default())
    }
}

impl AppEventBroker {
    pub fn new(config: BrokerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                next_id: AtomicU64::new(1),
                subscribers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Delivers an event to every subscriber, dropping it for those
    /// with a full queue.
    pub fn publish(&self, event: AppEvent) {
        let mut subs = self.lock();
        subs.retain(|e| !e.tx.is_closed());
        for entry in subs.iter() {
            if let Err(mpsc::error::TrySendError::Full(_)) = entry.tx.try_send(event.clone()) {
                trace!(subscriber = entry.id, "app event queue full, event dropped");
            }
        }
    }

    /// Opens an app-wide subscription.
    pub fn subscribe(&self) -> (mpsc::Receiver<AppEvent>, Subscription) {
        let (tx, rx) = mpsc::channel(self.inner.config.app_queue_capacity);
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().push(Entry { id, tx });

        let inner = Arc::clone(&self.inner);
        let guard = Subscription::new(move || {
            inner
                .subscribers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|e| e.id != id);
        });
        (rx, guard)
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Entry>> {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
