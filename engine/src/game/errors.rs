//! Errors raised by [`Game`](super::Game)'s lifecycle guards, plus the lower layers'
//! errors wrapped transparently so a renderer can match on a single type.

use thiserror::Error;

use crate::entity::{EntityError, EntityKind};
use crate::field::FieldError;

/// Any reason a [`Game`](super::Game) operation can fail: a lifecycle guard in this layer,
/// or a [`FieldError`]/[`EntityError`] bubbled up from a delegated call.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GameError {
    /// The operation isn't permitted in the game's current state.
    #[error("operation not permitted in the current state")]
    WrongState,

    /// `set_player` with a name already in use.
    #[error("a player named {0:?} already exists")]
    DuplicateName(String),

    /// `set_player` beyond the two-player limit.
    #[error("only two players are supported")]
    TooManyPlayers,

    /// A name that doesn't refer to either player.
    #[error("no player named {0:?}")]
    UnknownPlayer(String),

    /// `shoot` called by a player who isn't the current shooter.
    #[error("it is not {0:?}'s turn")]
    NotYourTurn(String),

    /// `place_entity`/`autoplace` for a kind with nothing left to place.
    #[error("no pending {0:?} to place")]
    NoPendingEntity(EntityKind),

    /// SETUP's planets-first rule: pending planets must reach zero before any other kind
    /// may be placed.
    #[error("planets must be placed before other entities")]
    MustPlacePlanetsFirst,

    /// `ready`'s capacity heuristic rejected the fleet as too large for the field.
    #[error("fleet is too large for the field")]
    CapacityExceeded,

    /// `ready` called without exactly two players, each with a generated field and a
    /// non-empty pending inventory.
    #[error("ready requires exactly two players, each with a field and pending entities")]
    NotReady,

    /// `start` called while some player has unplaced pending entities or has placed
    /// nothing at all.
    #[error("start requires every player to have placed at least one entity and zero pending")]
    NotReadyToStart,

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    Entity(#[from] EntityError),
}
