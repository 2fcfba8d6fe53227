//! Voting rounds: casting, status, reveal, and the tally.
//!
//! Votes stay hidden while the room is in `Voting`; the only thing
//! observable is *who* has voted ([`Room::vote_status`]). Revealing
//! flips the room to `Revealed` and produces a [`VoteSummary`].

use serde::{Deserialize, Serialize};

use crate::cards;
use crate::error::DomainError;
use crate::room::{Room, RoomPhase};

// ---------------------------------------------------------------------------
// Vote / VoteStatus / VoteSummary
// ---------------------------------------------------------------------------

/// A cast vote. The participant name is denormalized at cast time so
/// summaries stay readable even after the voter leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub participant_id: String,
    pub participant_name: String,
    pub value: String,
}

/// Who has voted, without the values. Spectators never appear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteStatus {
    pub participant_id: String,
    pub participant_name: String,
    pub has_voted: bool,
}

/// The tally of a revealed round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteSummary {
    /// All cast votes, ordered by (participant name, participant id).
    pub votes: Vec<Vote>,
    /// The deck card nearest to the numeric mean; `None` when no vote
    /// was numeric. Ties resolve to the lower card.
    pub average: Option<String>,
    /// The raw numeric mean behind `average`.
    pub mean: Option<f64>,
    /// Most common value; first occurrence in vote order wins a tie.
    pub mode: Option<String>,
    /// Whether every cast value is identical (textual comparison).
    pub has_consensus: bool,
}

impl Room {
    // -----------------------------------------------------------------------
    // Round lifecycle
    // -----------------------------------------------------------------------

    /// Opens a voting round. Valid from any phase.
    pub async fn start_voting(&self) {
        self.inner.write().await.phase = RoomPhase::Voting;
    }

    /// Clears all votes and opens a fresh round.
    pub async fn reset_round(&self) {
        let mut inner = self.inner.write().await;
        inner.votes.clear();
        inner.phase = RoomPhase::Voting;
    }

    /// Replaces the topic. Returns whether voting was auto-started
    /// because the room was still `Waiting`.
    pub async fn set_topic(&self, topic: String) -> bool {
        let mut inner = self.inner.write().await;
        inner.topic = topic;
        if inner.phase == RoomPhase::Waiting {
            inner.phase = RoomPhase::Voting;
            true
        } else {
            false
        }
    }

    // -----------------------------------------------------------------------
    // Casting
    // -----------------------------------------------------------------------

    /// Records (or replaces) a participant's vote for this round.
    ///
    /// Rejects unknown participants, spectators, rounds that are not
    /// open, and values outside the room's deck.
    pub async fn cast_vote(&self, participant_id: &str, value: &str) -> Result<(), DomainError> {
        let mut inner = self.inner.write().await;
        let participant = inner
            .participants
            .get(participant_id)
            .ok_or_else(|| DomainError::ParticipantNotFound(participant_id.to_string()))?;
        if participant.is_spectator {
            return Err(DomainError::SpectatorCannotVote(participant_id.to_string()));
        }
        if inner.phase != RoomPhase::Voting {
            return Err(DomainError::InvalidState(format!(
                "cannot vote while {}",
                inner.phase
            )));
        }
        self.card_config().validate_value(value)?;

        let vote = Vote {
            participant_id: participant_id.to_string(),
            participant_name: participant.name.clone(),
            value: value.to_string(),
        };
        inner.votes.insert(participant_id.to_string(), vote);
        Ok(())
    }

    pub async fn has_voted(&self, participant_id: &str) -> bool {
        self.inner.read().await.votes.contains_key(participant_id)
    }

    pub async fn vote_count(&self) -> usize {
        self.inner.read().await.votes.len()
    }

    /// Per-participant has-voted flags, spectators excluded, ordered
    /// by (name, id).
    pub async fn vote_status(&self) -> Vec<VoteStatus> {
        let inner = self.inner.read().await;
        let mut status: Vec<VoteStatus> = inner
            .participants
            .values()
            .filter(|p| !p.is_spectator)
            .map(|p| VoteStatus {
                participant_id: p.id.clone(),
                participant_name: p.name.clone(),
                has_voted: inner.votes.contains_key(&p.id),
            })
            .collect();
        status.sort_by(|a, b| {
            (&a.participant_name, &a.participant_id).cmp(&(&b.participant_name, &b.participant_id))
        });
        status
    }

    // -----------------------------------------------------------------------
    // Reveal
    // -----------------------------------------------------------------------

    /// Ends the round: flips to `Revealed` and tallies. Rejected
    /// unless a round is open.
    pub async fn reveal_votes(&self) -> Result<VoteSummary, DomainError> {
        let mut inner = self.inner.write().await;
        if inner.phase != RoomPhase::Voting {
            return Err(DomainError::InvalidState(format!(
                "cannot reveal while {}",
                inner.phase
            )));
        }
        inner.phase = RoomPhase::Revealed;
        Ok(self.tally(inner.votes.values().cloned().collect()))
    }

    /// Re-reads the summary of an already revealed round.
    pub async fn vote_summary(&self) -> Result<VoteSummary, DomainError> {
        let inner = self.inner.read().await;
        if inner.phase != RoomPhase::Revealed {
            return Err(DomainError::InvalidState(format!(
                "no revealed round while {}",
                inner.phase
            )));
        }
        Ok(self.tally(inner.votes.values().cloned().collect()))
    }

    fn tally(&self, mut votes: Vec<Vote>) -> VoteSummary {
        votes.sort_by(|a, b| {
            (&a.participant_name, &a.participant_id).cmp(&(&b.participant_name, &b.participant_id))
        });
        let values: Vec<&str> = votes.iter().map(|v| v.value.as_str()).collect();
        let mean = self.card_config().numeric_mean(values.iter().copied());
        let average = mean
            .and_then(|m| self.card_config().nearest_card(m))
            .map(|c| c.value.clone());
        VoteSummary {
            mode: cards::mode_value(values.iter().copied()),
            has_consensus: cards::has_consensus(values),
            votes,
            average,
            mean,
        }
    }
}
