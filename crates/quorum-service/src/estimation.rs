//! Estimation-round use cases.

use std::sync::Arc;

use quorum_broker::{AppEventPublisher, EventPublisher};
use quorum_domain::{AppEvent, DomainError, RoomEvent, RoomPhase, VoteEvent, VoteSummary};
use quorum_store::RoomRepository;
use tokio::sync::mpsc;
use tracing::debug;

use crate::watch::spawn_forwarder;

/// Round orchestration: casting and revealing votes, resetting rounds,
/// topics, and the vote watch stream.
pub struct EstimationService<R, P, A> {
    repo: Arc<R>,
    events: Arc<P>,
    app_events: Arc<A>,
}

impl<R, P, A> Clone for EstimationService<R, P, A> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            events: Arc::clone(&self.events),
            app_events: Arc::clone(&self.app_events),
        }
    }
}

impl<R, P, A> EstimationService<R, P, A>
where
    R: RoomRepository,
    P: EventPublisher,
    A: AppEventPublisher,
{
    pub fn new(repo: Arc<R>, events: Arc<P>, app_events: Arc<A>) -> Self {
        Self {
            repo,
            events,
            app_events,
        }
    }

    /// Casts (or replaces) the caller's vote for the open round.
    ///
    /// The published event says who voted, never what — values stay
    /// hidden until reveal.
    pub async fn cast_vote(
        &self,
        room_id: &str,
        participant_id: &str,
        session_token: &str,
        value: &str,
    ) -> Result<(), DomainError> {
        let room = self.repo.find_by_id(room_id).await?;
        room.validate_token(participant_id, session_token).await?;
        let participant = room.participant(participant_id).await?;

        room.cast_vote(participant_id, value).await?;
        room.touch_activity().await;
        self.repo.save(Arc::clone(&room)).await?;

        debug!(room_id, participant_id, "vote cast");
        self.events.publish_vote_event(
            room_id,
            VoteEvent::Cast {
                participant_id: participant_id.to_string(),
                participant_name: participant.name.clone(),
            },
        );
        self.app_events.publish_app_event(AppEvent::vote_cast(
            room_id,
            room.name(),
            &participant.name,
            room.vote_count().await,
        ));
        Ok(())
    }

    /// Ends the round and returns the tally. Host only.
    pub async fn reveal_votes(
        &self,
        room_id: &str,
        participant_id: &str,
        session_token: &str,
    ) -> Result<VoteSummary, DomainError> {
        let room = self.repo.find_by_id(room_id).await?;
        room.validate_token(participant_id, session_token).await?;
        if !room.is_host(participant_id).await {
            return Err(DomainError::NotHost(participant_id.to_string()));
        }

        let summary = room.reveal_votes().await?;
        room.touch_activity().await;
        self.repo.save(Arc::clone(&room)).await?;

        debug!(room_id, votes = summary.votes.len(), "votes revealed");
        self.events.publish_vote_event(
            room_id,
            VoteEvent::Revealed {
                summary: summary.clone(),
            },
        );
        self.events.publish_room_event(
            room_id,
            RoomEvent::PhaseChanged {
                phase: RoomPhase::Revealed,
            },
        );
        self.app_events
            .publish_app_event(AppEvent::vote_revealed(room_id, room.name(), &summary));
        Ok(summary)
    }

    /// Clears all votes and opens a fresh round. Host only.
    pub async fn reset_round(
        &self,
        room_id: &str,
        participant_id: &str,
        session_token: &str,
    ) -> Result<(), DomainError> {
        let room = self.repo.find_by_id(room_id).await?;
        room.validate_token(participant_id, session_token).await?;
        if !room.is_host(participant_id).await {
            return Err(DomainError::NotHost(participant_id.to_string()));
        }

        room.reset_round().await;
        room.touch_activity().await;
        self.repo.save(Arc::clone(&room)).await?;

        debug!(room_id, "round reset");
        self.events.publish_vote_event(room_id, VoteEvent::Reset);
        self.events.publish_room_event(
            room_id,
            RoomEvent::PhaseChanged {
                phase: RoomPhase::Voting,
            },
        );
        Ok(())
    }

    /// Opens the first round of a waiting room. Host only; rejected
    /// once a round has ever started (use `reset_round` after that).
    pub async fn start_round(
        &self,
        room_id: &str,
        participant_id: &str,
        session_token: &str,
    ) -> Result<(), DomainError> {
        let room = self.repo.find_by_id(room_id).await?;
        room.validate_token(participant_id, session_token).await?;
        if !room.is_host(participant_id).await {
            return Err(DomainError::NotHost(participant_id.to_string()));
        }
        let phase = room.phase().await;
        if phase != RoomPhase::Waiting {
            return Err(DomainError::InvalidState(format!(
                "cannot start a round while {phase}"
            )));
        }

        room.start_voting().await;
        room.touch_activity().await;
        self.repo.save(Arc::clone(&room)).await?;

        debug!(room_id, "round started");
        self.events.publish_room_event(
            room_id,
            RoomEvent::PhaseChanged {
                phase: RoomPhase::Voting,
            },
        );
        Ok(())
    }

    /// Replaces the current topic. Host only; a topic set while the
    /// room is still waiting starts the first round.
    pub async fn set_topic(
        &self,
        room_id: &str,
        participant_id: &str,
        session_token: &str,
        topic: &str,
    ) -> Result<(), DomainError> {
        let room = self.repo.find_by_id(room_id).await?;
        room.validate_token(participant_id, session_token).await?;
        if !room.is_host(participant_id).await {
            return Err(DomainError::NotHost(participant_id.to_string()));
        }

        let started_voting = room.set_topic(topic.to_string()).await;
        room.touch_activity().await;
        self.repo.save(Arc::clone(&room)).await?;

        debug!(room_id, topic, "topic changed");
        self.events.publish_room_event(
            room_id,
            RoomEvent::TopicChanged {
                topic: topic.to_string(),
            },
        );
        if started_voting {
            self.events.publish_room_event(
                room_id,
                RoomEvent::PhaseChanged {
                    phase: RoomPhase::Voting,
                },
            );
        }
        Ok(())
    }

    /// Opens a vote-event stream. The first event is always a
    /// [`VoteEvent::Status`] with the current has-voted flags.
    pub async fn watch_votes(&self, room_ref: &str) -> Result<mpsc::Receiver<VoteEvent>, DomainError> {
        let room = match self.repo.find_by_id(room_ref).await {
            Ok(room) => room,
            Err(_) => self.repo.find_by_name(room_ref).await?,
        };
        let (events, subscription) = self.events.subscribe_vote_events(room.id());
        let status = VoteEvent::Status {
            status: room.vote_status().await,
        };
        Ok(spawn_forwarder(status, events, subscription))
    }
}
