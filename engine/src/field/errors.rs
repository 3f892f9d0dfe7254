//! Errors raised by [`Field`](super::Field) placement and shot operations.

use thiserror::Error;

use crate::coord::Coord;

/// Reasons a [`Field`](super::Field) operation can fail. All are structural: they
/// describe the geometry, not game lifecycle (see
/// [`GameError`](crate::game::errors::GameError)) or entity bookkeeping (see
/// [`EntityError`](crate::entity::errors::EntityError)).
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum FieldError {
    /// The field holds no cells at all.
    #[error("field has no cells")]
    Empty,

    /// The requested coordinate isn't part of the field.
    #[error("{0} does not exist on this field")]
    MissingCell(Coord),

    /// Placement would occupy a structural void cell.
    #[error("{0} is void")]
    IntoVoid(Coord),

    /// Placement would occupy a cell another entity already holds.
    #[error("{0} is already occupied")]
    AlreadyOccupied(Coord),

    /// Placement would put a non-planet entity adjacent to another non-planet entity.
    #[error("{0} is too close to another entity")]
    TouchesOther(Coord),

    /// The cell can't be shot: it's void or was already shot.
    #[error("{0} is not a valid target")]
    NotATarget(Coord),

    /// A planet's orbit never crosses the field, on or off its border.
    #[error("orbit never crosses the field")]
    OrbitNeverCrosses,

    /// The requested field shape isn't supported.
    #[error("unsupported field shape")]
    UnsupportedShape,

    /// The requested dimensions/parameters are invalid (zero, negative, etc).
    #[error("invalid field dimensions")]
    InvalidDimensions,
}
