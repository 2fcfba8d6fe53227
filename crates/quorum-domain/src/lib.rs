//! Domain core for Quorum's planning-poker rooms.
//!
//! Everything here is pure coordination state — no I/O, no channels,
//! no persistence. The [`Room`] aggregate owns one planning session;
//! the broker, store, and service crates build on top of it.
//!
//! # Key types
//!
//! - [`Room`] — the aggregate: participants, phase, topic, votes
//! - [`CardConfig`] — the deck a room plays with
//! - [`VoteSummary`] — the tally of a revealed round
//! - [`RoomEvent`] / [`VoteEvent`] / [`AppEvent`] — published events
//! - [`DomainError`] — every deterministic rejection

mod cards;
mod error;
mod event;
mod ident;
mod room;
mod vote;

pub use cards::{Card, CardConfig, CardPreset, has_consensus, mode_value};
pub use error::{DomainError, ErrorKind};
pub use event::{AppEvent, AppEventKind, RoomEvent, VoteEvent};
pub use ident::{generate_id, generate_room_name, generate_session_token};
pub use room::{Participant, Room, RoomPhase, RoomSnapshot};
pub use vote::{Vote, VoteStatus, VoteSummary};
