//! A single player: their field, their pending inventory and their placed entities.

use std::collections::HashMap;

use log::info;
use rand::Rng;

use crate::coord::Coord;
use crate::entity::{self, Entity, EntityId, EntityKind, EntityStatus};
use crate::field::Field;
use crate::game::errors::GameError;

/// The fixed color palette. Anything else collapses to [`PlayerColor::White`] — see
/// [`colorize`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PlayerColor {
    Blue,
    Green,
    Orange,
    Pink,
    Purple,
    Red,
    Yellow,
    White,
}

/// Maps a free-form color name onto the fixed palette, falling back to white for anything
/// unrecognized rather than rejecting it.
pub fn colorize(name: &str) -> PlayerColor {
    match name.to_ascii_lowercase().as_str() {
        "blue" => PlayerColor::Blue,
        "green" => PlayerColor::Green,
        "orange" => PlayerColor::Orange,
        "pink" => PlayerColor::Pink,
        "purple" => PlayerColor::Purple,
        "red" => PlayerColor::Red,
        "yellow" => PlayerColor::Yellow,
        _ => PlayerColor::White,
    }
}

/// Where to place a ship/relay or a planet. Ships and relays share a shape (anchor plus
/// rotation); planets are placed by orbit instead.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Placement {
    Ship {
        anchor: Coord,
        rotation: i32,
    },
    Planet {
        center: Coord,
        radius: i32,
        rotation_sign: Option<i32>,
    },
}

/// What a successful `place_entity` call produced — enough to build the engine's `Place`
/// event without the caller reaching back into the entity map.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementOutcome {
    pub entity_id: EntityId,
    pub anchor: Coord,
    pub rotation: Option<i32>,
    pub cells_occupied: Vec<Coord>,
    pub radius: Option<i32>,
    pub orbit_cells: Option<Vec<Coord>>,
    pub orbit_center: Option<Coord>,
}

/// The three ways a shot can resolve against an occupied cell. A miss on an empty cell, or
/// a miss on a planet's non-anchor orbit cell, is folded into `Miss`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShotOutcome {
    Miss,
    Hit,
    Relay,
}

/// What happened to a player's planets after a `move_planets` tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanetMotionReport {
    /// Every surviving planet's new anchor, for the event's `planets_anchors` list.
    pub anchors: Vec<Coord>,
    /// Coordinates where two planets ended up on the same cell; both are destroyed and
    /// the cell is reported as a `Hit` in the shot event.
    pub collisions: Vec<Coord>,
}

/// Owns one side of the game: a name, a color, a shaped [`Field`], the inventory still
/// owed before SETUP can finish, and every entity placed so far keyed by id.
#[derive(Debug, Clone)]
pub struct Player {
    name: String,
    color: PlayerColor,
    field: Field,
    pending: HashMap<EntityKind, u32>,
    entities: HashMap<EntityId, Entity>,
}

impl Player {
    pub fn new(name: String) -> Self {
        Self {
            name,
            color: PlayerColor::White,
            field: Field::empty(),
            pending: HashMap::new(),
            entities: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> PlayerColor {
        self.color
    }

    pub fn set_color(&mut self, color_name: &str) {
        self.color = colorize(color_name);
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Regenerating the field invalidates every previous placement: pending inventory
    /// stays as set separately, but anything already placed no longer has cells to occupy.
    pub fn set_field(&mut self, field: Field) {
        self.field = field;
        self.entities.clear();
    }

    pub fn pending(&self) -> &HashMap<EntityKind, u32> {
        &self.pending
    }

    pub fn set_pending(&mut self, pending: HashMap<EntityKind, u32>) {
        self.pending = pending;
    }

    pub fn pending_total(&self) -> u32 {
        self.pending.values().sum()
    }

    pub fn pending_count(&self, kind: EntityKind) -> u32 {
        *self.pending.get(&kind).unwrap_or(&0)
    }

    pub fn entities(&self) -> &HashMap<EntityId, Entity> {
        &self.entities
    }

    /// True when every non-planet entity this player owns is destroyed. Vacuously true
    /// for an all-planet loadout, same as the original's `all(...)` over an empty
    /// filtered generator. Planets never count toward victory in either direction.
    pub fn non_planet_fleet_destroyed(&self) -> bool {
        self.entities.values().filter(|e| e.kind() != EntityKind::Planet).all(|e| e.status() == EntityStatus::Destroyed)
    }

    /// Places one unit of `kind`. Fails if nothing of that kind is pending, or if the
    /// underlying field/entity validation rejects the placement — in which case nothing
    /// is mutated.
    pub fn place_entity(
        &mut self,
        id: EntityId,
        kind: EntityKind,
        placement: Placement,
        rng: &mut impl Rng,
    ) -> Result<PlacementOutcome, GameError> {
        if self.pending_count(kind) == 0 {
            return Err(GameError::NoPendingEntity(kind));
        }

        let outcome = match (kind, placement) {
            (EntityKind::Planet, Placement::Planet { center, radius, rotation_sign }) => {
                let mut planet = entity::Planet::new(id, radius, center, rotation_sign, rng);
                let on_field = self.field.setup_a_planet(id, planet.orbit_cells())?;
                planet.mark_placed(on_field.clone());
                let anchor = planet.anchor().expect("just placed, not destroyed");
                let outcome = PlacementOutcome {
                    entity_id: id,
                    anchor,
                    rotation: None,
                    cells_occupied: on_field,
                    radius: Some(radius),
                    orbit_cells: Some(planet.orbit_cells().to_vec()),
                    orbit_center: Some(center),
                };
                self.entities.insert(id, Entity::Planet(planet));
                outcome
            }
            (kind, Placement::Ship { anchor, rotation }) if kind != EntityKind::Planet => {
                let (cells, rotation) = self.field.occupy_cells(id, kind, kind.size(), anchor, rotation, &[])?;
                let mut hull = entity::Hull::new(id, kind);
                hull.mark_placed(anchor, cells.clone(), rotation);
                let outcome = PlacementOutcome {
                    entity_id: id,
                    anchor,
                    rotation: Some(rotation),
                    cells_occupied: cells,
                    radius: None,
                    orbit_cells: None,
                    orbit_center: None,
                };
                self.entities.insert(id, Entity::Hull(hull));
                outcome
            }
            _ => return Err(GameError::WrongState),
        };

        *self.pending.entry(kind).or_insert(0) -= 1;
        info!("{} placed {:?}#{} at {}", self.name, kind, id, outcome.anchor);
        Ok(outcome)
    }

    /// Fires at `coords` on this player's own field, resolving the hit against whatever
    /// entity (if any) occupies it.
    pub fn take_shot(&mut self, coords: Coord) -> Result<ShotOutcome, GameError> {
        let occupant = match self.field.shoot_cell(coords)? {
            None => return Ok(ShotOutcome::Miss),
            Some(occupant) => occupant,
        };

        match self.entities.get_mut(&occupant.id) {
            Some(Entity::Planet(planet)) => {
                if planet.anchor() == Some(coords) {
                    Ok(ShotOutcome::Hit)
                } else {
                    Ok(ShotOutcome::Miss)
                }
            }
            Some(Entity::Hull(hull)) => {
                hull.make_damage(coords)?;
                if hull.kind() == EntityKind::Relay {
                    Ok(ShotOutcome::Relay)
                } else {
                    Ok(ShotOutcome::Hit)
                }
            }
            None => Ok(ShotOutcome::Miss),
        }
    }

    /// Advances every surviving planet by `step` cells along its own rotation, then
    /// resolves any collisions between planets that landed on the same cell.
    pub fn move_planets(&mut self, step: i32) -> PlanetMotionReport {
        let planet_ids: Vec<EntityId> = self
            .entities
            .iter()
            .filter_map(|(id, e)| match e {
                Entity::Planet(p) if p.status() != EntityStatus::Destroyed => Some(*id),
                _ => None,
            })
            .collect();

        for id in &planet_ids {
            if let Some(Entity::Planet(p)) = self.entities.get_mut(id) {
                p.advance(step);
            }
        }

        let mut by_anchor: HashMap<Coord, Vec<EntityId>> = HashMap::new();
        for id in &planet_ids {
            if let Some(Entity::Planet(p)) = self.entities.get(id) {
                if let Some(anchor) = p.anchor() {
                    by_anchor.entry(anchor).or_default().push(*id);
                }
            }
        }

        let mut collisions = Vec::new();
        for (coord, ids) in &by_anchor {
            if ids.len() > 1 {
                collisions.push(*coord);
                info!("{}: planets {:?} collided at {}", self.name, ids, coord);
                for id in ids {
                    if let Some(Entity::Planet(p)) = self.entities.get_mut(id) {
                        p.destroy();
                    }
                }
            }
        }

        let anchors = planet_ids
            .iter()
            .filter_map(|id| match self.entities.get(id) {
                Some(Entity::Planet(p)) => p.anchor(),
                _ => None,
            })
            .collect();

        PlanetMotionReport { anchors, collisions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldSpec;
    use rand::rngs::mock::StepRng;

    fn sample_player() -> Player {
        let mut player = Player::new("P1".to_string());
        player.set_field(Field::generate(FieldSpec::Rectangle { height: 10, width: 10 }).unwrap());
        let mut pending = HashMap::new();
        pending.insert(EntityKind::Corvette, 1);
        pending.insert(EntityKind::Relay, 1);
        player.set_pending(pending);
        player
    }

    #[test]
    fn colorize_falls_back_to_white() {
        assert_eq!(colorize("Blue"), PlayerColor::Blue);
        assert_eq!(colorize("chartreuse"), PlayerColor::White);
    }

    #[test]
    fn place_entity_rejects_when_nothing_pending() {
        let mut player = sample_player();
        let mut rng = StepRng::new(0, 1);
        let err = player
            .place_entity(1, EntityKind::Cruiser, Placement::Ship { anchor: Coord::new(0, 0), rotation: 0 }, &mut rng)
            .unwrap_err();
        assert_eq!(err, GameError::NoPendingEntity(EntityKind::Cruiser));
    }

    #[test]
    fn place_then_shoot_destroys_a_corvette() {
        let mut player = sample_player();
        let mut rng = StepRng::new(0, 1);
        player
            .place_entity(1, EntityKind::Corvette, Placement::Ship { anchor: Coord::new(0, 0), rotation: 0 }, &mut rng)
            .unwrap();
        assert_eq!(player.take_shot(Coord::new(0, 0)).unwrap(), ShotOutcome::Hit);
        assert!(player.non_planet_fleet_destroyed());
    }

    #[test]
    fn relay_shot_reports_relay() {
        let mut player = sample_player();
        let mut rng = StepRng::new(0, 1);
        player
            .place_entity(2, EntityKind::Relay, Placement::Ship { anchor: Coord::new(5, 5), rotation: 0 }, &mut rng)
            .unwrap();
        assert_eq!(player.take_shot(Coord::new(5, 5)).unwrap(), ShotOutcome::Relay);
    }

    #[test]
    fn miss_on_empty_cell() {
        let mut player = sample_player();
        assert_eq!(player.take_shot(Coord::new(9, 9)).unwrap(), ShotOutcome::Miss);
    }
}
