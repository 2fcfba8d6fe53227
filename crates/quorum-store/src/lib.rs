//! Persistence and analytics ports for Quorum.
//!
//! The orchestration layer talks to storage through two traits:
//! [`RoomRepository`] owns room *membership* (which rooms exist and
//! their id/name index) and [`AnalyticsRecorder`] sinks app events.
//! Room *state* stays inside each [`quorum_domain::Room`] aggregate —
//! the repository hands out shared handles, it never copies rooms.
//!
//! The in-memory implementations here are the production ones for a
//! single-process deployment and the test doubles for everything else.

mod analytics;
mod repository;

pub use analytics::{AnalyticsError, AnalyticsEvent, AnalyticsRecorder, MemoryAnalyticsRecorder};
pub use repository::{MemoryRoomRepository, RoomRepository};
