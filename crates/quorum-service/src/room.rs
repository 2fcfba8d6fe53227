//! Room lifecycle use cases.

use std::sync::Arc;

use quorum_broker::{AppEventPublisher, EventPublisher};
use quorum_domain::{
    AppEvent, CardConfig, DomainError, Participant, Room, RoomEvent, generate_id,
    generate_room_name, generate_session_token,
};
use quorum_store::RoomRepository;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::reaper::ROOM_INACTIVITY_TIMEOUT;
use crate::summary::{CreateRoomOutcome, JoinRoomOutcome, RoomSummary};
use crate::watch::spawn_forwarder;

/// Room lifecycle orchestration: creation, membership, host changes,
/// and the room watch stream.
pub struct RoomService<R, P, A> {
    repo: Arc<R>,
    events: Arc<P>,
    app_events: Arc<A>,
}

impl<R, P, A> Clone for RoomService<R, P, A> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            events: Arc::clone(&self.events),
            app_events: Arc::clone(&self.app_events),
        }
    }
}

impl<R, P, A> RoomService<R, P, A>
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

    /// Creates a room with a generated id and name, the caller as its
    /// host. A caller-supplied session token (from a previous session)
    /// is honored; otherwise one is generated.
    pub async fn create_room(
        &self,
        host_name: &str,
        session_token: Option<String>,
        card_config: Option<CardConfig>,
    ) -> Result<CreateRoomOutcome, DomainError> {
        let room_id = generate_id();
        let room_name = generate_room_name();
        let participant_id = generate_id();
        let session_token = session_token
            .filter(|t| !t.is_empty())
            .unwrap_or_else(generate_session_token);

        let host = Participant::new(
            participant_id.clone(),
            host_name.to_string(),
            session_token.clone(),
            false,
        );
        let room = Arc::new(Room::new(room_id.clone(), room_name.clone(), host, card_config));

        self.repo.save(Arc::clone(&room)).await?;
        info!(%room_id, %room_name, "room created");
        self.app_events
            .publish_app_event(AppEvent::room_created(&room_id, &room_name, host_name));

        Ok(CreateRoomOutcome {
            room,
            participant_id,
            session_token,
        })
    }

    /// Joins a room, found by id or by name.
    ///
    /// A caller presenting the token of an existing participant
    /// reconnects as them (optionally renaming) instead of creating a
    /// second seat.
    pub async fn join_room(
        &self,
        room_ref: &str,
        participant_name: &str,
        session_token: Option<String>,
        is_spectator: bool,
    ) -> Result<JoinRoomOutcome, DomainError> {
        let room = self.find_room(room_ref).await?;
        let session_token = session_token.filter(|t| !t.is_empty());

        if let Some(token) = &session_token {
            if let Some(existing) = room.participant_by_token(token).await {
                let name = (!participant_name.is_empty()).then(|| participant_name.to_string());
                let participant = room.reconnect_participant(&existing.id, name).await?;
                room.touch_activity().await;
                self.repo.save(Arc::clone(&room)).await?;

                debug!(room_id = room.id(), participant_id = %participant.id, "participant reconnected");
                self.events.publish_room_event(
                    room.id(),
                    RoomEvent::ParticipantJoined {
                        participant: participant.clone(),
                    },
                );
                return Ok(JoinRoomOutcome {
                    participant_id: participant.id,
                    session_token: token.clone(),
                    reconnected: true,
                    room,
                });
            }
        }

        let participant_id = generate_id();
        let token = session_token.unwrap_or_else(generate_session_token);
        let participant = Participant::new(
            participant_id.clone(),
            participant_name.to_string(),
            token.clone(),
            is_spectator,
        );
        room.add_participant(participant.clone()).await?;
        room.touch_activity().await;
        self.repo.save(Arc::clone(&room)).await?;

        debug!(room_id = room.id(), %participant_id, is_spectator, "participant joined");
        self.events
            .publish_room_event(room.id(), RoomEvent::ParticipantJoined { participant });

        Ok(JoinRoomOutcome {
            room,
            participant_id,
            session_token: token,
            reconnected: false,
        })
    }

    /// Gracefully disconnects a participant. The seat is kept so they
    /// can reconnect by token; when the last connected participant
    /// leaves, the room closes.
    pub async fn leave_room(
        &self,
        room_id: &str,
        participant_id: &str,
        session_token: &str,
    ) -> Result<(), DomainError> {
        let room = self.repo.find_by_id(room_id).await?;
        room.validate_token(participant_id, session_token).await?;

        let participant = room.participant(participant_id).await?;
        let new_host = room.disconnect_participant(participant_id).await?;

        if !room.has_connected_participants().await {
            return self.close_room(&room, "all participants left").await;
        }

        room.touch_activity().await;
        self.repo.save(Arc::clone(&room)).await?;

        debug!(room_id, participant_id, "participant left");
        self.events.publish_room_event(
            room_id,
            RoomEvent::ParticipantLeft {
                participant_id: participant_id.to_string(),
                participant_name: participant.name,
            },
        );
        if let Some(new_host_id) = new_host {
            info!(room_id, %new_host_id, "host transferred");
            self.events
                .publish_room_event(room_id, RoomEvent::HostChanged { new_host_id });
        }
        Ok(())
    }

    /// Looks a room up by id, falling back to name.
    pub async fn get_room(&self, room_ref: &str) -> Result<Arc<Room>, DomainError> {
        self.find_room(room_ref).await
    }

    /// Summaries of every active room.
    pub async fn list_rooms(&self) -> Vec<RoomSummary> {
        let mut summaries = Vec::new();
        for room in self.repo.list_all().await {
            summaries.push(RoomSummary {
                id: room.id().to_string(),
                name: room.name().to_string(),
                participant_count: room.connected_count().await,
                phase: room.phase().await,
                created_at: room.created_at_unix(),
                expires_at: room.expires_at_unix(ROOM_INACTIVITY_TIMEOUT).await,
            });
        }
        summaries
    }

    /// Host-only removal of another participant. The kicked seat is
    /// gone for good — the token no longer reconnects.
    pub async fn kick_participant(
        &self,
        room_id: &str,
        participant_id: &str,
        session_token: &str,
        target_id: &str,
    ) -> Result<(), DomainError> {
        let room = self.repo.find_by_id(room_id).await?;
        room.validate_token(participant_id, session_token).await?;

        let target = room.participant(target_id).await.ok();
        room.kick_participant(participant_id, target_id).await?;

        if room.participant_count().await == 0 {
            return self.close_room(&room, "all participants left").await;
        }

        room.touch_activity().await;
        self.repo.save(Arc::clone(&room)).await?;

        info!(room_id, target_id, "participant kicked");
        self.events.publish_room_event(
            room_id,
            RoomEvent::ParticipantLeft {
                participant_id: target_id.to_string(),
                participant_name: target.map(|p| p.name).unwrap_or_default(),
            },
        );
        Ok(())
    }

    /// Hands host privileges to another participant.
    pub async fn transfer_ownership(
        &self,
        room_id: &str,
        participant_id: &str,
        session_token: &str,
        new_host_id: &str,
    ) -> Result<(), DomainError> {
        let room = self.repo.find_by_id(room_id).await?;
        room.validate_token(participant_id, session_token).await?;
        room.transfer_ownership(participant_id, new_host_id).await?;

        room.touch_activity().await;
        self.repo.save(Arc::clone(&room)).await?;

        info!(room_id, new_host_id, "ownership transferred");
        self.events.publish_room_event(
            room_id,
            RoomEvent::HostChanged {
                new_host_id: new_host_id.to_string(),
            },
        );
        Ok(())
    }

    /// Opens a room-event stream. The first event is always a full
    /// [`RoomEvent::Snapshot`]; live events follow until the room is
    /// deleted or the receiver is dropped.
    pub async fn watch_room(&self, room_ref: &str) -> Result<mpsc::Receiver<RoomEvent>, DomainError> {
        let room = self.find_room(room_ref).await?;
        let (events, subscription) = self.events.subscribe_room_events(room.id());
        let snapshot = RoomEvent::Snapshot {
            room: room.snapshot().await,
        };
        Ok(spawn_forwarder(snapshot, events, subscription))
    }

    async fn find_room(&self, room_ref: &str) -> Result<Arc<Room>, DomainError> {
        match self.repo.find_by_id(room_ref).await {
            Ok(room) => Ok(room),
            Err(_) => self.repo.find_by_name(room_ref).await,
        }
    }

    /// Terminal path: closed event, delete, stream teardown, app event.
    pub(crate) async fn close_room(&self, room: &Arc<Room>, reason: &str) -> Result<(), DomainError> {
        self.events.publish_room_event(
            room.id(),
            RoomEvent::Closed {
                reason: reason.to_string(),
            },
        );
        self.repo.delete(room.id()).await?;
        self.events.cleanup_room(room.id());
        info!(room_id = room.id(), reason, "room closed");
        self.app_events
            .publish_app_event(AppEvent::room_closed(room.id(), room.name(), reason));
        Ok(())
    }
}
