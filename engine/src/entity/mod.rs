//! Ships, relays and planets: the things a [`Player`](crate::player::Player) places and
//! damages.

use std::collections::HashSet;

use log::debug;
use rand::Rng;

use crate::coord::Coord;
use crate::geometry;

pub mod errors;
pub use errors::EntityError;

/// Monotonically-assigned, stable identifier for an entity. Used instead of storing live
/// entity references in [`Field`](crate::field::Field) cells, which would otherwise need
/// a cyclic `Cell <-> Entity` reference.
pub type EntityId = u64;

/// What an entity is. Determines its size (for ships/relays/planets alike — planets are
/// placed by orbit, not by size, but every entity needs a uniform `size` for the
/// placement math) and how a shot against it resolves.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EntityKind {
    Corvette,
    Frigate,
    Destroyer,
    Cruiser,
    Relay,
    Planet,
}

impl EntityKind {
    /// Number of cells this entity type reserves in a straight line from its anchor.
    /// Planets ignore this — they're placed by orbit, see [`Planet`].
    pub fn size(self) -> usize {
        match self {
            EntityKind::Corvette => 1,
            EntityKind::Frigate => 2,
            EntityKind::Destroyer => 3,
            EntityKind::Cruiser => 4,
            EntityKind::Relay => 1,
            EntityKind::Planet => 1,
        }
    }
}

/// Lifecycle status shared by every entity kind.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EntityStatus {
    NotPlaced,
    FullHealth,
    Damaged,
    Destroyed,
}

/// Normalizes a rotation value to `0..4`.
pub fn normalize_rotation(rotation: i32) -> i32 {
    ((rotation % 4) + 4) % 4
}

/// The `(dy, dx)` step for a normalized rotation. Screen coordinates: `y` grows downward,
/// so rotation is effectively counterclockwise on a normal math plane. This is an
/// intentional part of the contract, not a place to substitute trigonometry.
fn rotation_delta(rotation: i32) -> (i32, i32) {
    match normalize_rotation(rotation) {
        0 => (0, 1),  // right
        1 => (1, 0),  // down
        2 => (0, -1), // left
        3 => (-1, 0), // up
        _ => unreachable!(),
    }
}

/// The `size` consecutive cells from `anchor` along `rotation`'s direction, plus the
/// normalized rotation. Pure geometry: doesn't check occupancy or field bounds.
pub fn reserve_coords(anchor: Coord, rotation: i32, size: usize) -> (Vec<Coord>, i32) {
    let rotation = normalize_rotation(rotation);
    let (dy, dx) = rotation_delta(rotation);
    let coords = (0..size as i32)
        .map(|i| Coord::new(anchor.y + i * dy, anchor.x + i * dx))
        .collect();
    (coords, rotation)
}

/// A ship or a relay: both occupy a straight run of cells from an anchor and take damage
/// one cell at a time. They differ only in how [`Player::take_shot`](crate::player::Player::take_shot)
/// treats a hit on them — relays reflect, ships don't — so they share this
/// representation rather than each getting their own struct.
#[derive(Debug, Clone)]
pub struct Hull {
    id: EntityId,
    kind: EntityKind,
    status: EntityStatus,
    anchor: Option<Coord>,
    rotation: i32,
    cells_occupied: Vec<Coord>,
    cells_damaged: HashSet<usize>,
}

impl Hull {
    pub(crate) fn new(id: EntityId, kind: EntityKind) -> Self {
        Self {
            id,
            kind,
            status: EntityStatus::NotPlaced,
            anchor: None,
            rotation: 0,
            cells_occupied: Vec::new(),
            cells_damaged: HashSet::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn size(&self) -> usize {
        self.kind.size()
    }

    pub fn status(&self) -> EntityStatus {
        self.status
    }

    pub fn anchor(&self) -> Option<Coord> {
        self.anchor
    }

    pub fn rotation(&self) -> i32 {
        self.rotation
    }

    pub fn cells_occupied(&self) -> &[Coord] {
        &self.cells_occupied
    }

    /// Called by [`Field::occupy_cells`](crate::field::Field::occupy_cells) success: syncs
    /// this entity's view of its own placement.
    pub(crate) fn mark_placed(&mut self, anchor: Coord, cells: Vec<Coord>, rotation: i32) {
        self.anchor = Some(anchor);
        self.cells_occupied = cells;
        self.rotation = rotation;
        self.status = EntityStatus::FullHealth;
    }

    /// Damages the cell at `coord`, which must be one this entity occupies. Destroyed
    /// once every occupied cell has been damaged.
    pub fn make_damage(&mut self, coord: Coord) -> Result<(), EntityError> {
        let index = self
            .cells_occupied
            .iter()
            .position(|&c| c == coord)
            .ok_or(EntityError::NotOccupied { coord })?;
        self.cells_damaged.insert(index);
        let old = self.status;
        self.status = if self.cells_damaged.len() == self.size() {
            EntityStatus::Destroyed
        } else {
            EntityStatus::Damaged
        };
        debug!("{:?}#{}: {:?} -> {:?}", self.kind, self.id, old, self.status);
        Ok(())
    }
}

/// A planet: a decoy that orbits a center and moves one cell per turn. Its `anchor`
/// tracks the *current* position on its orbit and lives on the entity (not derived from
/// field state), because an orbit can extend off the field.
#[derive(Debug, Clone)]
pub struct Planet {
    id: EntityId,
    status: EntityStatus,
    orbit_radius: i32,
    orbit_center: Coord,
    orbit_cells: Vec<Coord>,
    position: usize,
    rotation_sign: i32,
    cells_occupied: Vec<Coord>,
}

impl Planet {
    /// Builds a planet with its orbit already rasterized (sorted by polar angle) and a
    /// uniformly random starting position. `rotation_sign` is `+1` or `-1`; if `None`, one
    /// is chosen uniformly at random.
    pub(crate) fn new(
        id: EntityId,
        radius: i32,
        center: Coord,
        rotation_sign: Option<i32>,
        rng: &mut impl Rng,
    ) -> Self {
        let orbit_cells = if radius == 0 {
            vec![center]
        } else {
            geometry::sort_by_angle(center, geometry::circle_coords(radius, center))
        };
        let position = rng.gen_range(0..orbit_cells.len());
        let rotation_sign = rotation_sign.unwrap_or_else(|| if rng.gen_bool(0.5) { 1 } else { -1 });
        Self {
            id,
            status: EntityStatus::NotPlaced,
            orbit_radius: radius,
            orbit_center: center,
            orbit_cells,
            position,
            rotation_sign,
            cells_occupied: Vec::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn status(&self) -> EntityStatus {
        self.status
    }

    pub fn orbit_radius(&self) -> i32 {
        self.orbit_radius
    }

    pub fn orbit_center(&self) -> Coord {
        self.orbit_center
    }

    pub fn orbit_cells(&self) -> &[Coord] {
        &self.orbit_cells
    }

    pub fn rotation_sign(&self) -> i32 {
        self.rotation_sign
    }

    pub fn cells_occupied(&self) -> &[Coord] {
        &self.cells_occupied
    }

    /// The planet's current position, or `None` if it's been destroyed.
    pub fn anchor(&self) -> Option<Coord> {
        if self.status == EntityStatus::Destroyed {
            None
        } else {
            Some(self.orbit_cells[self.position])
        }
    }

    /// Called by [`Field::setup_a_planet`](crate::field::Field::setup_a_planet) success.
    /// Planets start `Damaged`, not `FullHealth`, so a direct hit on the anchor doesn't
    /// change their status — planets never take damage, they only collide.
    pub(crate) fn mark_placed(&mut self, cells_occupied: Vec<Coord>) {
        self.cells_occupied = cells_occupied;
        self.status = EntityStatus::Damaged;
    }

    /// Advances `position` by `step` in this planet's rotation direction, wrapping modulo
    /// the orbit length. Returns the new anchor.
    pub(crate) fn advance(&mut self, step: i32) -> Coord {
        let len = self.orbit_cells.len() as i32;
        let delta = step * self.rotation_sign;
        self.position = (self.position as i32 + delta).rem_euclid(len) as usize;
        self.orbit_cells[self.position]
    }

    /// Collision with another planet on the same anchor: both are destroyed immediately,
    /// bypassing the damage bookkeeping ships/relays use.
    pub(crate) fn destroy(&mut self) {
        self.status = EntityStatus::Destroyed;
    }
}

/// A placed or pending game object: either a [`Hull`] (ship/relay) or a [`Planet`].
#[derive(Debug, Clone)]
pub enum Entity {
    Hull(Hull),
    Planet(Planet),
}

impl Entity {
    pub fn id(&self) -> EntityId {
        match self {
            Entity::Hull(h) => h.id(),
            Entity::Planet(p) => p.id(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Hull(h) => h.kind(),
            Entity::Planet(_) => EntityKind::Planet,
        }
    }

    pub fn status(&self) -> EntityStatus {
        match self {
            Entity::Hull(h) => h.status(),
            Entity::Planet(p) => p.status(),
        }
    }

    pub fn anchor(&self) -> Option<Coord> {
        match self {
            Entity::Hull(h) => h.anchor(),
            Entity::Planet(p) => p.anchor(),
        }
    }

    pub fn cells_occupied(&self) -> &[Coord] {
        match self {
            Entity::Hull(h) => h.cells_occupied(),
            Entity::Planet(p) => p.cells_occupied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_normalizes_negative_and_overflow() {
        assert_eq!(normalize_rotation(-1), 3);
        assert_eq!(normalize_rotation(5), 1);
        assert_eq!(normalize_rotation(4), 0);
    }

    #[test]
    fn reserve_coords_runs_in_rotation_direction() {
        let (coords, rot) = reserve_coords(Coord::new(2, 2), 1, 3);
        assert_eq!(rot, 1);
        assert_eq!(coords, vec![Coord::new(2, 2), Coord::new(3, 2), Coord::new(4, 2)]);
    }

    #[test]
    fn hull_damage_and_destruction() {
        let mut hull = Hull::new(1, EntityKind::Destroyer);
        hull.mark_placed(
            Coord::new(0, 0),
            vec![Coord::new(0, 0), Coord::new(0, 1), Coord::new(0, 2)],
            0,
        );
        hull.make_damage(Coord::new(0, 0)).unwrap();
        assert_eq!(hull.status(), EntityStatus::Damaged);
        hull.make_damage(Coord::new(0, 1)).unwrap();
        assert_eq!(hull.status(), EntityStatus::Damaged);
        hull.make_damage(Coord::new(0, 2)).unwrap();
        assert_eq!(hull.status(), EntityStatus::Destroyed);
    }

    #[test]
    fn hull_damage_rejects_foreign_coord() {
        let mut hull = Hull::new(1, EntityKind::Corvette);
        hull.mark_placed(Coord::new(0, 0), vec![Coord::new(0, 0)], 0);
        assert!(hull.make_damage(Coord::new(5, 5)).is_err());
    }

    #[test]
    fn planet_advance_wraps_with_rotation_sign() {
        let mut rng = rand::thread_rng();
        let mut planet = Planet::new(1, 3, Coord::new(5, 5), Some(1), &mut rng);
        planet.mark_placed(vec![]);
        let start = planet.position;
        planet.advance(1);
        assert_eq!(planet.position, (start + 1) % planet.orbit_cells.len());

        let mut planet = Planet::new(2, 3, Coord::new(5, 5), Some(-1), &mut rng);
        planet.mark_placed(vec![]);
        let start = planet.position;
        planet.advance(1);
        let len = planet.orbit_cells.len();
        assert_eq!(planet.position, (start + len - 1) % len);
    }
}
