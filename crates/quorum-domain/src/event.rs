//! Event types published by the orchestration layer.
//!
//! Three streams exist: per-room room events (membership and phase),
//! per-room vote events (round progress), and application-wide events
//! (the analytics boundary). All serialize as externally visible JSON
//! with a `"type"` tag, so the shapes here are frozen by tests.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::room::{Participant, RoomPhase, RoomSnapshot};
use crate::vote::{VoteStatus, VoteSummary};

// ---------------------------------------------------------------------------
// Room events
// ---------------------------------------------------------------------------

/// Membership and lifecycle events for one room.
///
/// Every new subscriber receives a [`RoomEvent::Snapshot`] before any
/// live event. Because slow subscribers may silently lose events, the
/// snapshot is the re-sync point: reconnecting and reading the first
/// event always yields the full current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    Snapshot { room: RoomSnapshot },
    ParticipantJoined { participant: Participant },
    ParticipantLeft {
        participant_id: String,
        participant_name: String,
    },
    HostChanged { new_host_id: String },
    PhaseChanged { phase: RoomPhase },
    TopicChanged { topic: String },
    Closed { reason: String },
}

// ---------------------------------------------------------------------------
// Vote events
// ---------------------------------------------------------------------------

/// Round-progress events for one room.
///
/// `Cast` deliberately carries no vote value; values stay hidden until
/// the `Revealed` summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VoteEvent {
    Status { status: Vec<VoteStatus> },
    Cast {
        participant_id: String,
        participant_name: String,
    },
    Revealed { summary: VoteSummary },
    Reset,
}

// ---------------------------------------------------------------------------
// App events
// ---------------------------------------------------------------------------

/// An application-wide event, consumed by analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppEvent {
    pub room_id: String,
    pub room_name: String,
    /// Unix seconds.
    pub timestamp: u64,
    #[serde(flatten)]
    pub kind: AppEventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEventKind {
    RoomCreated { host_name: String },
    RoomClosed { reason: String },
    VoteCast {
        participant_name: String,
        votes_in_round: usize,
    },
    VoteRevealed {
        vote_count: usize,
        consensus: bool,
        average: Option<String>,
    },
}

impl AppEventKind {
    /// Stable string identifier for the analytics boundary.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::RoomCreated { .. } => "room_created",
            Self::RoomClosed { .. } => "room_closed",
            Self::VoteCast { .. } => "vote_cast",
            Self::VoteRevealed { .. } => "vote_revealed",
        }
    }
}

impl AppEvent {
    pub fn new(room_id: &str, room_name: &str, kind: AppEventKind) -> Self {
        Self {
            room_id: room_id.to_string(),
            room_name: room_name.to_string(),
            timestamp: now_unix_secs(),
            kind,
        }
    }

    pub fn room_created(room_id: &str, room_name: &str, host_name: &str) -> Self {
        Self::new(
            room_id,
            room_name,
            AppEventKind::RoomCreated {
                host_name: host_name.to_string(),
            },
        )
    }

    pub fn room_closed(room_id: &str, room_name: &str, reason: &str) -> Self {
        Self::new(
            room_id,
            room_name,
            AppEventKind::RoomClosed {
                reason: reason.to_string(),
            },
        )
    }

    pub fn vote_cast(room_id: &str, room_name: &str, participant_name: &str, votes_in_round: usize) -> Self {
        Self::new(
            room_id,
            room_name,
            AppEventKind::VoteCast {
                participant_name: participant_name.to_string(),
                votes_in_round,
            },
        )
    }

    pub fn vote_revealed(room_id: &str, room_name: &str, summary: &VoteSummary) -> Self {
        Self::new(
            room_id,
            room_name,
            AppEventKind::VoteRevealed {
                vote_count: summary.votes.len(),
                consensus: summary.has_consensus,
                average: summary.average.clone(),
            },
        )
    }
}

fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
