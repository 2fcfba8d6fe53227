//! The room aggregate.
//!
//! A [`Room`] is the unit of consistency for a planning session. Its
//! identity (`id`, `name`, `created_at`, deck) never changes; every
//! mutable piece — phase, topic, participants, votes, activity clock —
//! lives behind one `tokio::sync::RwLock`, so concurrent operations on
//! the same room serialize at the aggregate boundary.
//!
//! The phase machine is deliberately loose:
//!
//! ```text
//!            start_voting / set_topic
//!   Waiting ───────────────────────────▶ Voting
//!                                          │  ▲
//!                              reveal_votes│  │reset_round
//!                                          ▼  │
//!                                       Revealed
//! ```
//!
//! `reset_round` also works from `Voting` (abandon a round and start
//! over). The only hard gates are: casting requires `Voting`,
//! revealing requires `Voting`, reading a summary requires `Revealed`.

use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::cards::CardConfig;
use crate::error::DomainError;
use crate::vote::Vote;

// ---------------------------------------------------------------------------
// RoomPhase
// ---------------------------------------------------------------------------

/// The estimation phase a room is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomPhase {
    /// Fresh room, no round running yet.
    Waiting,
    /// A round is open, votes are hidden.
    Voting,
    /// Votes are on the table.
    Revealed,
}

impl std::fmt::Display for RoomPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Voting => write!(f, "voting"),
            Self::Revealed => write!(f, "revealed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Participant
// ---------------------------------------------------------------------------

/// A person in a room.
///
/// The session token is the bearer credential for this participant; it
/// is skipped by serde so snapshots and events can never leak it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
    #[serde(skip)]
    pub session_token: String,
    pub is_host: bool,
    pub is_connected: bool,
    pub is_spectator: bool,
    /// Unix milliseconds. Primary key for host succession order.
    pub joined_at: u64,
}

impl Participant {
    /// A connected, non-host participant joining now.
    pub fn new(id: String, name: String, session_token: String, is_spectator: bool) -> Self {
        Self {
            id,
            name,
            session_token,
            is_host: false,
            is_connected: true,
            is_spectator,
            joined_at: now_unix_millis(),
        }
    }
}

/// Succession order: earliest joiner first, participant id as the
/// deterministic tie break.
fn succession_key(p: &Participant) -> (u64, &str) {
    (p.joined_at, p.id.as_str())
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// A serializable copy of the full room state, used as the first event
/// on every room watch stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub id: String,
    pub name: String,
    pub phase: RoomPhase,
    pub topic: String,
    pub participants: Vec<Participant>,
    pub card_config: CardConfig,
    /// Unix seconds.
    pub created_at: u64,
}

#[derive(Debug)]
pub(crate) struct RoomInner {
    pub(crate) phase: RoomPhase,
    pub(crate) topic: String,
    pub(crate) participants: HashMap<String, Participant>,
    pub(crate) votes: HashMap<String, Vote>,
    pub(crate) last_activity: SystemTime,
}

/// The room aggregate. Shared as `Arc<Room>`; all methods take `&self`
/// and lock internally.
#[derive(Debug)]
pub struct Room {
    id: String,
    name: String,
    created_at: SystemTime,
    card_config: CardConfig,
    pub(crate) inner: RwLock<RoomInner>,
}

impl Room {
    /// Creates a room in the `Waiting` phase with `host` as its only
    /// participant. `host.is_host` is forced on.
    pub fn new(id: String, name: String, mut host: Participant, card_config: Option<CardConfig>) -> Self {
        host.is_host = true;
        let mut participants = HashMap::new();
        participants.insert(host.id.clone(), host);
        Self {
            id,
            name,
            created_at: SystemTime::now(),
            card_config: card_config.unwrap_or_default(),
            inner: RwLock::new(RoomInner {
                phase: RoomPhase::Waiting,
                topic: String::new(),
                participants,
                votes: HashMap::new(),
                last_activity: SystemTime::now(),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn card_config(&self) -> &CardConfig {
        &self.card_config
    }

    /// Creation time as unix seconds.
    pub fn created_at_unix(&self) -> u64 {
        unix_secs(self.created_at)
    }

    // -----------------------------------------------------------------------
    // Activity clock
    // -----------------------------------------------------------------------

    /// Marks the room as active now. Called by every mutating use case.
    pub async fn touch_activity(&self) {
        self.inner.write().await.last_activity = SystemTime::now();
    }

    /// Whether the room has been idle longer than `timeout`.
    pub async fn is_expired(&self, timeout: Duration) -> bool {
        let last = self.inner.read().await.last_activity;
        last.elapsed().map(|idle| idle > timeout).unwrap_or(false)
    }

    /// When the room will expire, as unix seconds.
    pub async fn expires_at_unix(&self, timeout: Duration) -> u64 {
        let last = self.inner.read().await.last_activity;
        unix_secs(last + timeout)
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    pub async fn add_participant(&self, participant: Participant) -> Result<(), DomainError> {
        let mut inner = self.inner.write().await;
        if inner.participants.contains_key(&participant.id) {
            return Err(DomainError::ParticipantExists(participant.id));
        }
        inner.participants.insert(participant.id.clone(), participant);
        Ok(())
    }

    /// Removes a participant and their vote. If the host was removed
    /// and eligible members remain, the earliest-joined connected
    /// non-spectator becomes host.
    pub async fn remove_participant(&self, participant_id: &str) -> Result<(), DomainError> {
        let mut inner = self.inner.write().await;
        if inner.participants.remove(participant_id).is_none() {
            return Err(DomainError::ParticipantNotFound(participant_id.to_string()));
        }
        inner.votes.remove(participant_id);

        let has_host = inner.participants.values().any(|p| p.is_host);
        if !has_host {
            if let Some(id) = successor_id(&inner.participants, None) {
                if let Some(p) = inner.participants.get_mut(&id) {
                    p.is_host = true;
                }
            }
        }
        Ok(())
    }

    /// Marks a participant as disconnected. If they were the host,
    /// the crown moves to the earliest-joined connected non-spectator;
    /// the new host's id is returned.
    pub async fn disconnect_participant(
        &self,
        participant_id: &str,
    ) -> Result<Option<String>, DomainError> {
        let mut inner = self.inner.write().await;
        let participant = inner
            .participants
            .get_mut(participant_id)
            .ok_or_else(|| DomainError::ParticipantNotFound(participant_id.to_string()))?;
        participant.is_connected = false;
        let was_host = participant.is_host;
        if !was_host {
            return Ok(None);
        }
        participant.is_host = false;

        let successor = successor_id(&inner.participants, Some(participant_id));
        if let Some(id) = &successor {
            if let Some(p) = inner.participants.get_mut(id) {
                p.is_host = true;
            }
        }
        Ok(successor)
    }

    /// Host-only removal of another participant.
    pub async fn kick_participant(&self, host_id: &str, target_id: &str) -> Result<(), DomainError> {
        let mut inner = self.inner.write().await;
        let host = inner
            .participants
            .get(host_id)
            .ok_or_else(|| DomainError::ParticipantNotFound(host_id.to_string()))?;
        if !host.is_host {
            return Err(DomainError::NotHost(host_id.to_string()));
        }
        if host_id == target_id {
            return Err(DomainError::CannotKickSelf);
        }
        if inner.participants.remove(target_id).is_none() {
            return Err(DomainError::ParticipantNotFound(target_id.to_string()));
        }
        inner.votes.remove(target_id);
        Ok(())
    }

    /// Moves host privileges to another non-spectator participant.
    pub async fn transfer_ownership(
        &self,
        current_host_id: &str,
        new_host_id: &str,
    ) -> Result<(), DomainError> {
        let mut inner = self.inner.write().await;
        let current = inner
            .participants
            .get(current_host_id)
            .ok_or_else(|| DomainError::ParticipantNotFound(current_host_id.to_string()))?;
        if !current.is_host {
            return Err(DomainError::NotHost(current_host_id.to_string()));
        }
        let target = inner
            .participants
            .get(new_host_id)
            .ok_or_else(|| DomainError::ParticipantNotFound(new_host_id.to_string()))?;
        if target.is_spectator {
            return Err(DomainError::CannotTransferToSpectator(new_host_id.to_string()));
        }

        if let Some(p) = inner.participants.get_mut(current_host_id) {
            p.is_host = false;
        }
        if let Some(p) = inner.participants.get_mut(new_host_id) {
            p.is_host = true;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub async fn participant(&self, participant_id: &str) -> Result<Participant, DomainError> {
        let inner = self.inner.read().await;
        inner
            .participants
            .get(participant_id)
            .cloned()
            .ok_or_else(|| DomainError::ParticipantNotFound(participant_id.to_string()))
    }

    /// Finds a participant by session token. Token comparison only,
    /// never exposed in any listing.
    pub async fn participant_by_token(&self, token: &str) -> Option<Participant> {
        let inner = self.inner.read().await;
        inner
            .participants
            .values()
            .find(|p| p.session_token == token)
            .cloned()
    }

    pub async fn is_host(&self, participant_id: &str) -> bool {
        let inner = self.inner.read().await;
        inner
            .participants
            .get(participant_id)
            .is_some_and(|p| p.is_host)
    }

    /// Checks that `token` is the credential of `participant_id`.
    /// An unknown participant and a wrong token are distinct errors.
    pub async fn validate_token(&self, participant_id: &str, token: &str) -> Result<(), DomainError> {
        let inner = self.inner.read().await;
        let participant = inner
            .participants
            .get(participant_id)
            .ok_or_else(|| DomainError::ParticipantNotFound(participant_id.to_string()))?;
        if participant.session_token != token {
            return Err(DomainError::InvalidToken);
        }
        Ok(())
    }

    /// Flips the connected flag and optionally renames, for
    /// reconnection by token.
    pub async fn reconnect_participant(
        &self,
        participant_id: &str,
        name: Option<String>,
    ) -> Result<Participant, DomainError> {
        let mut inner = self.inner.write().await;
        let participant = inner
            .participants
            .get_mut(participant_id)
            .ok_or_else(|| DomainError::ParticipantNotFound(participant_id.to_string()))?;
        participant.is_connected = true;
        if let Some(name) = name {
            if !name.is_empty() {
                participant.name = name;
            }
        }
        Ok(participant.clone())
    }

    pub async fn phase(&self) -> RoomPhase {
        self.inner.read().await.phase
    }

    pub async fn topic(&self) -> String {
        self.inner.read().await.topic.clone()
    }

    pub async fn participant_count(&self) -> usize {
        self.inner.read().await.participants.len()
    }

    pub async fn connected_count(&self) -> usize {
        self.inner
            .read()
            .await
            .participants
            .values()
            .filter(|p| p.is_connected)
            .count()
    }

    pub async fn has_connected_participants(&self) -> bool {
        self.connected_count().await > 0
    }

    /// All participants, in join order (id tie break) for stable output.
    pub async fn participants(&self) -> Vec<Participant> {
        let inner = self.inner.read().await;
        let mut participants: Vec<Participant> = inner.participants.values().cloned().collect();
        participants.sort_by(|a, b| succession_key(a).cmp(&succession_key(b)));
        participants
    }

    /// A full serializable copy of the room, tokens excluded by the
    /// `Participant` serde rules.
    pub async fn snapshot(&self) -> RoomSnapshot {
        let participants = self.participants().await;
        let inner = self.inner.read().await;
        RoomSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            phase: inner.phase,
            topic: inner.topic.clone(),
            participants,
            card_config: self.card_config.clone(),
            created_at: self.created_at_unix(),
        }
    }
}

/// Earliest-joined connected non-spectator, excluding `skip`.
fn successor_id(participants: &HashMap<String, Participant>, skip: Option<&str>) -> Option<String> {
    participants
        .values()
        .filter(|p| Some(p.id.as_str()) != skip && !p.is_spectator && p.is_connected)
        .min_by(|a, b| succession_key(a).cmp(&succession_key(b)))
        .map(|p| p.id.clone())
}

fn unix_secs(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

fn now_unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
