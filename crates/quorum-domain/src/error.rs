//! Error taxonomy for the Quorum domain.
//!
//! Every rejection the aggregate or the orchestration layer can produce
//! is a variant here. These are deterministic rejections, never
//! transient failures — nothing in the core retries.

use serde::{Deserialize, Serialize};

/// Errors produced by room, card, and vote operations.
///
/// The transport layer (out of scope here) maps each variant to a
/// status code through [`DomainError::kind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// No room with the given id or name exists.
    #[error("room {0} not found")]
    RoomNotFound(String),

    /// No participant with the given id exists in the room.
    #[error("participant {0} not found")]
    ParticipantNotFound(String),

    /// A participant with the given id is already in the room.
    #[error("participant {0} already exists")]
    ParticipantExists(String),

    /// The presented session token does not match the participant's.
    ///
    /// Distinguished from [`Self::ParticipantNotFound`] so clients can
    /// tell a stale session from a wrong room. Carries no payload —
    /// tokens are bearer credentials and must never be echoed.
    #[error("invalid session token")]
    InvalidToken,

    /// Only the host can perform this action.
    #[error("participant {0} is not the host")]
    NotHost(String),

    /// The operation is not valid in the room's current phase.
    #[error("invalid room phase for this action: {0}")]
    InvalidState(String),

    /// The vote value is not part of the room's card deck.
    #[error("invalid card value {0:?}")]
    InvalidCardValue(String),

    /// Spectators never vote.
    #[error("spectator {0} cannot vote")]
    SpectatorCannotVote(String),

    /// The host tried to kick themselves.
    #[error("cannot kick yourself")]
    CannotKickSelf,

    /// Ownership cannot be handed to a spectator.
    #[error("cannot transfer ownership to spectator {0}")]
    CannotTransferToSpectator(String),

    /// A custom deck string contained no card values.
    #[error("custom cards cannot be empty")]
    EmptyCustomCards,

    /// A custom deck needs at least 2 cards.
    #[error("at least 2 cards are required, got {0}")]
    TooFewCards(usize),

    /// A custom deck is capped at 15 cards.
    #[error("maximum 15 cards allowed, got {0}")]
    TooManyCards(usize),

    /// A single card value is capped at 10 characters.
    #[error("card value {0:?} is longer than 10 characters")]
    CardValueTooLong(String),
}

/// Coarse classification used by the transport boundary to pick a
/// status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Unknown room or participant.
    NotFound,
    /// Token mismatch, non-host caller, or spectator voting.
    PermissionDenied,
    /// Operation not allowed in the current phase.
    FailedPrecondition,
    /// Malformed or out-of-range input.
    InvalidArgument,
}

impl DomainError {
    /// Classifies this error for status-code mapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RoomNotFound(_) | Self::ParticipantNotFound(_) => ErrorKind::NotFound,
            Self::InvalidToken | Self::NotHost(_) | Self::SpectatorCannotVote(_) => {
                ErrorKind::PermissionDenied
            }
            Self::InvalidState(_) => ErrorKind::FailedPrecondition,
            Self::ParticipantExists(_)
            | Self::InvalidCardValue(_)
            | Self::CannotKickSelf
            | Self::CannotTransferToSpectator(_)
            | Self::EmptyCustomCards
            | Self::TooFewCards(_)
            | Self::TooManyCards(_)
            | Self::CardValueTooLong(_) => ErrorKind::InvalidArgument,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_not_found_errors() {
        assert_eq!(
            DomainError::RoomNotFound("r1".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            DomainError::ParticipantNotFound("p1".into()).kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_kind_permission_errors() {
        assert_eq!(DomainError::InvalidToken.kind(), ErrorKind::PermissionDenied);
        assert_eq!(
            DomainError::NotHost("p1".into()).kind(),
            ErrorKind::PermissionDenied
        );
        assert_eq!(
            DomainError::SpectatorCannotVote("p1".into()).kind(),
            ErrorKind::PermissionDenied
        );
    }

    #[test]
    fn test_kind_precondition_and_validation_errors() {
        assert_eq!(
            DomainError::InvalidState("not voting".into()).kind(),
            ErrorKind::FailedPrecondition
        );
        assert_eq!(
            DomainError::InvalidCardValue("99".into()).kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(DomainError::CannotKickSelf.kind(), ErrorKind::InvalidArgument);
        assert_eq!(DomainError::TooFewCards(1).kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_invalid_token_message_contains_no_token() {
        // Bearer credentials must never leak through error text.
        let msg = DomainError::InvalidToken.to_string();
        assert_eq!(msg, "invalid session token");
    }
}
