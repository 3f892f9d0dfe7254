//! Errors raised by entity-internal bookkeeping.

use thiserror::Error;

use crate::coord::Coord;

/// An entity-internal violation: damaging a coordinate the entity doesn't occupy, or
/// constructing a ship with an out-of-range size. These never come from the field or
/// game layers misusing coordinates the player chose — they indicate an engine bug if
/// they fire on a coordinate that already passed `Field` validation.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum EntityError {
    #[error("{coord} is not occupied by this entity")]
    NotOccupied { coord: Coord },

    #[error("ship size must be in 1..=4, got {size}")]
    InvalidShipSize { size: usize },
}
