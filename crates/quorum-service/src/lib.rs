//! Orchestration layer for Quorum.
//!
//! Services wire the domain aggregate to the repository and the event
//! brokers, one use case per method. Every mutation follows the same
//! sequence: look the room up, validate the caller's session token,
//! mutate the aggregate, touch its activity clock, save, then publish
//! events — persistence always completes before anyone can observe the
//! change. Terminal transitions (last participant gone, inactivity)
//! publish a `Closed` event, delete the room, and tear down its event
//! streams.
//!
//! # Key types
//!
//! - [`RoomService`] — create/join/leave/kick/transfer/watch
//! - [`EstimationService`] — rounds: cast, reveal, reset, topic
//! - [`RoomReaper`] — background sweep closing inactive rooms
//! - [`spawn_analytics_pump`] — app events into the analytics sink

mod analytics;
mod estimation;
mod reaper;
mod room;
mod summary;
mod watch;

pub use analytics::{AnalyticsPump, spawn_analytics_pump};
pub use estimation::EstimationService;
pub use reaper::{ROOM_INACTIVITY_TIMEOUT, ReaperConfig, ReaperHandle, RoomReaper};
pub use room::RoomService;
pub use summary::{CreateRoomOutcome, JoinRoomOutcome, RoomSummary};
