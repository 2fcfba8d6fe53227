//! Result types returned by the room service.

use std::sync::Arc;

use quorum_domain::{Room, RoomPhase};
use serde::{Deserialize, Serialize};

/// A room as it appears in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub id: String,
    pub name: String,
    /// Connected participants only.
    pub participant_count: usize,
    pub phase: RoomPhase,
    /// Unix seconds.
    pub created_at: u64,
    /// Unix seconds; last activity plus the inactivity timeout.
    pub expires_at: u64,
}

/// Result of creating a room.
///
/// The session token is handed back exactly once, here. It is the
/// caller's credential for every later operation.
pub struct CreateRoomOutcome {
    pub room: Arc<Room>,
    pub participant_id: String,
    pub session_token: String,
}

/// Result of joining (or reconnecting to) a room.
#[derive(Debug)]
pub struct JoinRoomOutcome {
    pub room: Arc<Room>,
    pub participant_id: String,
    pub session_token: String,
    /// True when an existing participant reconnected by token instead
    /// of a new one being created.
    pub reconnected: bool,
}
