//! Background sweep that closes inactive rooms.

use std::sync::Arc;
use std::time::Duration;

use quorum_broker::{AppEventPublisher, EventPublisher};
use quorum_domain::{AppEvent, RoomEvent};
use quorum_store::RoomRepository;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// How long a room may sit idle before the reaper closes it. Also the
/// horizon behind the `expires_at` field in room listings.
pub const ROOM_INACTIVITY_TIMEOUT: Duration = Duration::from_secs(15 * 60);

const CLOSE_REASON: &str = "inactivity timeout";

/// Sweep timing.
#[derive(Debug, Clone)]
pub struct ReaperConfig {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            timeout: ROOM_INACTIVITY_TIMEOUT,
            interval: Duration::from_secs(60),
        }
    }
}

/// Periodically closes every room whose activity clock is past the
/// timeout, through the same terminal path as a normal close: `Closed`
/// event, delete, stream teardown, app event.
pub struct RoomReaper<R, P, A> {
    repo: Arc<R>,
    events: Arc<P>,
    app_events: Arc<A>,
    config: ReaperConfig,
}

/// Stops the reaper task when asked (or when dropped, via the closed
/// shutdown channel).
pub struct ReaperHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl ReaperHandle {
    /// Signals shutdown and waits for the in-flight sweep to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        let _ = self.task.await;
    }
}

impl<R, P, A> RoomReaper<R, P, A>
where
    R: RoomRepository,
    P: EventPublisher,
    A: AppEventPublisher,
{
    pub fn new(repo: Arc<R>, events: Arc<P>, app_events: Arc<A>, config: ReaperConfig) -> Self {
        Self {
            repo,
            events,
            app_events,
            config,
        }
    }

    /// Spawns the sweep loop. The first sweep runs immediately, then
    /// one per interval.
    pub fn start(self) -> ReaperHandle {
        let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.config.interval);
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => return,
                    _ = ticker.tick() => self.sweep().await,
                }
            }
        });
        ReaperHandle { shutdown, task }
    }

    /// One pass over all rooms.
    pub async fn sweep(&self) {
        for room in self.repo.list_all().await {
            if !room.is_expired(self.config.timeout).await {
                continue;
            }
            self.events.publish_room_event(
                room.id(),
                RoomEvent::Closed {
                    reason: CLOSE_REASON.to_string(),
                },
            );
            if let Err(err) = self.repo.delete(room.id()).await {
                // Lost a race with a concurrent close; nothing to do.
                warn!(room_id = room.id(), %err, "expired room already gone");
                continue;
            }
            self.events.cleanup_room(room.id());
            info!(room_id = room.id(), room_name = room.name(), "inactive room closed");
            self.app_events
                .publish_app_event(AppEvent::room_closed(room.id(), room.name(), CLOSE_REASON));
        }
    }
}
