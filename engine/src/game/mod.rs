//! The lifecycle state machine: turn order, placement guards, shoot resolution and win
//! conditions. Everything else (field geometry, entity bookkeeping) is delegated to
//! [`Player`](crate::player::Player).

use std::collections::HashMap;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub mod errors;
pub use errors::GameError;

use crate::coord::Coord;
use crate::entity::{EntityId, EntityKind};
use crate::event::{CellStatus, Event, LobbySubkind};
use crate::field::{Field, FieldError, FieldSpec, Shape};
use crate::player::{Placement, Player, PlayerColor, ShotOutcome};

/// Where the game is in its lifecycle. Every public operation is only legal from specific
/// states; anything else fails with [`GameError::WrongState`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum GameState {
    Lobby,
    Setup,
    Active,
    Over,
}

/// How a finished game ended.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Winner {
    Player(String),
    Draw,
    /// Both players opened a relay loop on the same turn: an immediate, scoreless end.
    BlackHole,
}

impl Winner {
    pub fn label(&self) -> String {
        match self {
            Winner::Player(name) => name.clone(),
            Winner::Draw => "Draw".to_string(),
            Winner::BlackHole => "Black Hole".to_string(),
        }
    }
}

/// A read-only snapshot of a player's public state, for `get_player_meta`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerMeta {
    pub name: String,
    pub color: PlayerColor,
    pub pending: HashMap<EntityKind, u32>,
    pub field_shape: Shape,
    pub field_height: usize,
    pub field_width: usize,
}

/// Every pending kind a player can owe, in the order `autoplace` iterates them before
/// reversing — planets and relays last, so the reversed walk tries planets first and
/// works down to single-cell ships last.
const PLACEMENT_ORDER: [EntityKind; 6] = [
    EntityKind::Corvette,
    EntityKind::Frigate,
    EntityKind::Destroyer,
    EntityKind::Cruiser,
    EntityKind::Relay,
    EntityKind::Planet,
];

const MAX_AUTOPLACE_ATTEMPTS: u32 = 50_000;

/// Multiplier in the `ready` capacity heuristic: `3.4 * sum(amount * size) < usable cells`.
const CAPACITY_FACTOR: f64 = 3.4;

/// Two players, their shared turn order, and the append-only event log. This is the whole
/// engine: a renderer holds one `Game` and advances it step by step.
#[derive(Debug, Clone)]
pub struct Game {
    id: String,
    players: HashMap<String, Player>,
    /// Fixed once both players are added; used for "insertion order" operations like
    /// planet motion, which don't follow the (reversible) turn order.
    insertion_order: Vec<String>,
    /// The active shooting order; reversed after a `Hit` so the same player shoots again.
    turn_order: Vec<String>,
    turn: u64,
    state: GameState,
    winner: Option<Winner>,
    events: Vec<Event>,
    next_entity_id: EntityId,
    rng: StdRng,
    /// Open configuration point: some engine variants clamp `pending[T]` to a small
    /// ceiling. `None` means no clamp.
    inventory_cap: Option<u32>,
}

impl Game {
    pub fn new(id: String, seed: Option<u64>, inventory_cap: Option<u32>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            id,
            players: HashMap::new(),
            insertion_order: Vec::new(),
            turn_order: Vec::new(),
            turn: 0,
            state: GameState::Lobby,
            winner: None,
            events: Vec::new(),
            next_entity_id: 0,
            rng,
            inventory_cap,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    fn next_id(&mut self) -> EntityId {
        self.next_entity_id += 1;
        self.next_entity_id
    }

    /// Appends `event` to the log and traces it. This is the only place events enter
    /// `self.events`, so every mutating call is visible at debug level even though its
    /// return value is the only channel a renderer actually has.
    fn record_event(&mut self, event: Event) -> Event {
        debug!("game {}: event #{}: {:?}", self.id, self.events.len() + 1, event);
        self.events.push(event.clone());
        event
    }

    fn lobby_event(&self, subkind: LobbySubkind, payload: String) -> Event {
        Event::Lobby {
            game_state: self.state,
            subkind,
            turn_order: self.turn_order.clone(),
            winner: self.winner.as_ref().map(Winner::label),
            payload,
        }
    }

    fn require_state(&self, expected: GameState) -> Result<(), GameError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(GameError::WrongState)
        }
    }

    fn player_mut(&mut self, name: &str) -> Result<&mut Player, GameError> {
        self.players.get_mut(name).ok_or_else(|| GameError::UnknownPlayer(name.to_string()))
    }

    fn player(&self, name: &str) -> Result<&Player, GameError> {
        self.players.get(name).ok_or_else(|| GameError::UnknownPlayer(name.to_string()))
    }

    pub fn set_player(&mut self, name: String) -> Result<Vec<Event>, GameError> {
        self.require_state(GameState::Lobby)?;
        if self.players.len() >= 2 {
            return Err(GameError::TooManyPlayers);
        }
        if self.players.contains_key(&name) {
            return Err(GameError::DuplicateName(name));
        }
        self.players.insert(name.clone(), Player::new(name.clone()));
        self.insertion_order.push(name.clone());
        self.turn_order.push(name);
        let event = self.lobby_event(LobbySubkind::PlayerAdded, "player added".to_string());
        let event = self.record_event(event);
        Ok(vec![event])
    }

    pub fn del_player(&mut self, name: &str) -> Result<Vec<Event>, GameError> {
        self.require_state(GameState::Lobby)?;
        if self.players.remove(name).is_none() {
            return Err(GameError::UnknownPlayer(name.to_string()));
        }
        self.insertion_order.retain(|n| n != name);
        self.turn_order.retain(|n| n != name);
        let event = self.lobby_event(LobbySubkind::PlayerDeleted, "player deleted".to_string());
        let event = self.record_event(event);
        Ok(vec![event])
    }

    pub fn change_player_color(&mut self, name: &str, color_name: &str) -> Result<Vec<Event>, GameError> {
        self.require_state(GameState::Lobby)?;
        self.player_mut(name)?.set_color(color_name);
        let event = self.lobby_event(LobbySubkind::PlayerChanged, format!("{} changed color", name));
        let event = self.record_event(event);
        Ok(vec![event])
    }

    pub fn change_player_field(&mut self, name: &str, spec: FieldSpec) -> Result<Vec<Event>, GameError> {
        self.require_state(GameState::Lobby)?;
        let field = Field::generate(spec)?;
        self.player_mut(name)?.set_field(field);
        let event = self.lobby_event(LobbySubkind::PlayerChanged, format!("{} changed field", name));
        let event = self.record_event(event);
        Ok(vec![event])
    }

    pub fn change_entity_list(&mut self, name: &str, mut pending: HashMap<EntityKind, u32>) -> Result<Vec<Event>, GameError> {
        self.require_state(GameState::Lobby)?;
        if let Some(cap) = self.inventory_cap {
            for count in pending.values_mut() {
                *count = (*count).min(cap);
            }
        }
        self.player_mut(name)?.set_pending(pending);
        let event = self.lobby_event(LobbySubkind::PlayerChanged, format!("{} changed entity list", name));
        let event = self.record_event(event);
        Ok(vec![event])
    }

    /// `3.4 * sum(amount * size) < usable cells`, checked independently for each player.
    pub fn ready(&mut self) -> Result<Vec<Event>, GameError> {
        self.require_state(GameState::Lobby)?;
        if self.players.len() != 2 {
            return Err(GameError::NotReady);
        }
        for name in &self.insertion_order {
            let player = &self.players[name];
            if player.field().is_empty() || player.pending_total() == 0 {
                return Err(GameError::NotReady);
            }
            let weighted: u32 = player.pending().iter().map(|(kind, count)| kind.size() as u32 * count).sum();
            let usable = player.field().useful_cells().len() as f64;
            if CAPACITY_FACTOR * weighted as f64 >= usable {
                return Err(GameError::CapacityExceeded);
            }
        }
        self.state = GameState::Setup;
        info!("game {}: lobby ready, entering setup", self.id);
        let event = self.lobby_event(LobbySubkind::StateChanged, "ready".to_string());
        let event = self.record_event(event);
        Ok(vec![event])
    }

    /// While a player still owes planets, only planets may be placed — placing ships
    /// first could let a later planet's orbit cut through an already-placed ship.
    pub fn place_entity(&mut self, player_name: &str, kind: EntityKind, placement: Placement) -> Result<Vec<Event>, GameError> {
        self.require_state(GameState::Setup)?;
        if kind != EntityKind::Planet && self.player(player_name)?.pending_count(EntityKind::Planet) > 0 {
            return Err(GameError::MustPlacePlanetsFirst);
        }
        let id = self.next_id();
        let outcome = self.player_mut(player_name)?.place_entity(id, kind, placement, &mut self.rng)?;
        let event = Event::Place {
            game_state: self.state,
            player_name: player_name.to_string(),
            entity_id: outcome.entity_id,
            entity_type: kind,
            anchor: outcome.anchor,
            rotation: outcome.rotation,
            cells_occupied: outcome.cells_occupied,
            radius: outcome.radius,
            orbit_cells: outcome.orbit_cells,
            orbit_center: outcome.orbit_center,
        };
        let event = self.record_event(event);
        Ok(vec![event])
    }

    /// Tries the largest, most constrained kinds first (planets, then ships largest to
    /// smallest) so later placements have the most room. Stops a given kind's attempts
    /// after `MAX_AUTOPLACE_ATTEMPTS` failures and reports what it managed via the summary
    /// string rather than failing the whole call.
    pub fn autoplace(&mut self, player_name: &str) -> Result<(Vec<Event>, String), GameError> {
        self.require_state(GameState::Setup)?;
        let (height, width) = {
            let player = self.player(player_name)?;
            (player.field().height(), player.field().width())
        };

        let mut events = Vec::new();
        let mut placed = 0u32;
        let mut exhausted = false;

        'kinds: for &kind in PLACEMENT_ORDER.iter().rev() {
            loop {
                if self.player(player_name)?.pending_count(kind) == 0 {
                    break;
                }
                let mut succeeded = false;
                for _ in 0..MAX_AUTOPLACE_ATTEMPTS {
                    let placement = random_placement(kind, height, width, &mut self.rng);
                    let id = self.next_id();
                    let result = self.player_mut(player_name)?.place_entity(id, kind, placement, &mut self.rng);
                    match result {
                        Ok(outcome) => {
                            let event = Event::Place {
                                game_state: self.state,
                                player_name: player_name.to_string(),
                                entity_id: outcome.entity_id,
                                entity_type: kind,
                                anchor: outcome.anchor,
                                rotation: outcome.rotation,
                                cells_occupied: outcome.cells_occupied,
                                radius: outcome.radius,
                                orbit_cells: outcome.orbit_cells,
                                orbit_center: outcome.orbit_center,
                            };
                            let event = self.record_event(event);
                            events.push(event);
                            placed += 1;
                            succeeded = true;
                            break;
                        }
                        Err(GameError::Field(_)) | Err(GameError::Entity(_)) => {
                            self.next_entity_id -= 1;
                            continue;
                        }
                        Err(err) => return Err(err),
                    }
                }
                if !succeeded {
                    exhausted = true;
                    info!("game {}: autoplace for {:?} exhausted {} attempts on {:?}", self.id, player_name, MAX_AUTOPLACE_ATTEMPTS, kind);
                    break 'kinds;
                }
            }
        }

        let summary = if exhausted {
            format!("autoplace placed {} entities before exhausting attempts on the remaining kind", placed)
        } else {
            format!("autoplace placed {} entities", placed)
        };
        info!("game {}: autoplace for {:?} finished: {}", self.id, player_name, summary);
        Ok((events, summary))
    }

    pub fn start(&mut self) -> Result<Vec<Event>, GameError> {
        self.require_state(GameState::Setup)?;
        for name in &self.insertion_order {
            let player = &self.players[name];
            if player.entities().is_empty() || player.pending_total() != 0 {
                return Err(GameError::NotReadyToStart);
            }
        }
        self.state = GameState::Active;
        self.turn = 0;
        info!("game {}: all entities placed, starting", self.id);
        let event = self.lobby_event(LobbySubkind::StateChanged, "start".to_string());
        let event = self.record_event(event);
        Ok(vec![event])
    }

    pub fn whos_turn(&self) -> &str {
        &self.turn_order[self.turn as usize % self.turn_order.len()]
    }

    pub fn whos_winner(&self) -> Option<&Winner> {
        self.winner.as_ref()
    }

    pub fn get_player_names(&self) -> &[String] {
        &self.insertion_order
    }

    pub fn get_player_meta(&self, name: &str) -> Option<PlayerMeta> {
        let player = self.players.get(name)?;
        Some(PlayerMeta {
            name: player.name().to_string(),
            color: player.color(),
            pending: player.pending().clone(),
            field_shape: player.field().shape(),
            field_height: player.field().height(),
            field_width: player.field().width(),
        })
    }

    /// Resolves one shot: identifies the target, applies the hit, reflects relay shots
    /// back at the shooter, advances both players' planets, and checks for a win. Returns
    /// `(shooter_event, target_event)` — the shooter-side event carries reflection and the
    /// shooter's own planet motion; the target-side event carries the primary shot result
    /// and the target's planet motion.
    pub fn shoot(&mut self, shooter_name: &str, coords: Coord) -> Result<(Event, Event), GameError> {
        self.require_state(GameState::Active)?;
        if shooter_name != self.whos_turn() {
            return Err(GameError::NotYourTurn(shooter_name.to_string()));
        }
        let target_name = self
            .insertion_order
            .iter()
            .find(|name| name.as_str() != shooter_name)
            .cloned()
            .ok_or_else(|| GameError::UnknownPlayer(shooter_name.to_string()))?;

        let mut shooter_results: HashMap<Coord, CellStatus> = HashMap::new();
        let mut target_results: HashMap<Coord, CellStatus> = HashMap::new();
        let mut black_hole = false;

        let target_outcome = self.player_mut(&target_name)?.take_shot(coords)?;
        match target_outcome {
            ShotOutcome::Miss => {
                target_results.insert(coords, CellStatus::Miss);
            }
            ShotOutcome::Hit => {
                target_results.insert(coords, CellStatus::Hit);
                self.turn_order.reverse();
            }
            ShotOutcome::Relay => {
                target_results.insert(coords, CellStatus::Hit);
                match self.player_mut(shooter_name)?.take_shot(coords) {
                    Ok(ShotOutcome::Miss) => {
                        shooter_results.insert(coords, CellStatus::Miss);
                    }
                    Ok(ShotOutcome::Hit) => {
                        shooter_results.insert(coords, CellStatus::Hit);
                        self.turn_order.reverse();
                    }
                    Ok(ShotOutcome::Relay) => {
                        shooter_results.insert(coords, CellStatus::Relay);
                        black_hole = true;
                    }
                    Err(GameError::Field(FieldError::NotATarget(_))) => {}
                    Err(err) => return Err(err),
                }
            }
        }

        self.turn += 1;

        let mut shooter_planet_anchors = Vec::new();
        let mut target_planet_anchors = Vec::new();

        for name in self.insertion_order.clone() {
            let report = self.player_mut(&name)?.move_planets(1);
            let (results, anchors) = if name == target_name {
                (&mut target_results, &mut target_planet_anchors)
            } else {
                (&mut shooter_results, &mut shooter_planet_anchors)
            };
            for coord in report.collisions {
                results.insert(coord, CellStatus::Hit);
            }
            anchors.extend(report.anchors);
        }

        if black_hole {
            self.state = GameState::Over;
            self.winner = Some(Winner::BlackHole);
            info!("game {}: relay reflection looped at {} — Black Hole", self.id, coords);
        } else {
            let shooter_destroyed = self.player(shooter_name)?.non_planet_fleet_destroyed();
            let target_destroyed = self.player(&target_name)?.non_planet_fleet_destroyed();
            if shooter_destroyed && target_destroyed {
                self.state = GameState::Over;
                self.winner = Some(Winner::Draw);
            } else if shooter_destroyed {
                self.state = GameState::Over;
                self.winner = Some(Winner::Player(target_name.clone()));
            } else if target_destroyed {
                self.state = GameState::Over;
                self.winner = Some(Winner::Player(shooter_name.to_string()));
            }
            if self.state == GameState::Over {
                info!("game {}: over, winner {:?}", self.id, self.winner.as_ref().map(Winner::label));
            }
        }

        let shooter_destroyed_cells = destroyed_cells_of(self.player(shooter_name)?);
        let target_destroyed_cells = destroyed_cells_of(self.player(&target_name)?);

        let shooter_event = Event::Shot {
            game_state: self.state,
            turn: self.turn,
            shooter: shooter_name.to_string(),
            target: target_name.clone(),
            coords,
            shot_results: shooter_results,
            planets_anchors: shooter_planet_anchors,
            destroyed_cells: shooter_destroyed_cells,
        };
        let target_event = Event::Shot {
            game_state: self.state,
            turn: self.turn,
            shooter: shooter_name.to_string(),
            target: target_name,
            coords,
            shot_results: target_results,
            planets_anchors: target_planet_anchors,
            destroyed_cells: target_destroyed_cells,
        };

        debug!("game {}: {} shot {}: {:?}", self.id, shooter_name, coords, target_outcome);
        let shooter_event = self.record_event(shooter_event);
        let target_event = self.record_event(target_event);
        Ok((shooter_event, target_event))
    }
}

fn destroyed_cells_of(player: &Player) -> Vec<Coord> {
    player
        .entities()
        .values()
        .filter(|e| e.kind() != EntityKind::Planet && e.status() == crate::entity::EntityStatus::Destroyed)
        .flat_map(|e| e.cells_occupied().iter().copied())
        .collect()
}

fn random_placement(kind: EntityKind, height: usize, width: usize, rng: &mut impl Rng) -> Placement {
    if kind == EntityKind::Planet {
        let max_radius = (height.max(width) / 2).max(3) as i32;
        let radius = rng.gen_range(3..=max_radius);
        let center = Coord::new(rng.gen_range(0..height as i32), rng.gen_range(0..width as i32));
        Placement::Planet { center, radius, rotation_sign: None }
    } else {
        let anchor = Coord::new(rng.gen_range(0..height as i32), rng.gen_range(0..width as i32));
        let rotation = rng.gen_range(0..4);
        Placement::Ship { anchor, rotation }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityStatus;

    fn two_player_game(seed: u64) -> Game {
        let mut game = Game::new("test".to_string(), Some(seed), None);
        game.set_player("P1".to_string()).unwrap();
        game.set_player("P2".to_string()).unwrap();
        game
    }

    fn rect_field(game: &mut Game, name: &str, size: usize) {
        game.change_player_field(name, FieldSpec::Rectangle { height: size, width: size }).unwrap();
    }

    fn set_pending(game: &mut Game, name: &str, entries: &[(EntityKind, u32)]) {
        let mut pending = HashMap::new();
        for &(kind, count) in entries {
            pending.insert(kind, count);
        }
        game.change_entity_list(name, pending).unwrap();
    }

    /// S1: straight-to-win. Both fleets autoplaced, P1 shoots every P2 ship cell in order.
    #[test]
    fn s1_classic_game_straight_to_win() {
        let fleet = [
            (EntityKind::Corvette, 4),
            (EntityKind::Frigate, 3),
            (EntityKind::Destroyer, 2),
            (EntityKind::Cruiser, 1),
        ];
        let mut game = two_player_game(1);
        rect_field(&mut game, "P1", 10);
        rect_field(&mut game, "P2", 10);
        set_pending(&mut game, "P1", &fleet);
        set_pending(&mut game, "P2", &fleet);
        game.ready().unwrap();
        game.autoplace("P1").unwrap();
        game.autoplace("P2").unwrap();
        game.start().unwrap();

        let p2_cells: Vec<Coord> = game
            .player("P2")
            .unwrap()
            .entities()
            .values()
            .flat_map(|e| e.cells_occupied().iter().copied())
            .collect();

        for coord in p2_cells {
            if game.state() == GameState::Over {
                break;
            }
            game.shoot("P1", coord).unwrap();
        }

        assert_eq!(game.state(), GameState::Over);
        assert_eq!(game.whos_winner(), Some(&Winner::Player("P1".to_string())));
    }

    /// S2: a miss passes the turn, a hit doesn't.
    #[test]
    fn s2_miss_does_not_change_turn_hit_does() {
        let mut game = two_player_game(2);
        rect_field(&mut game, "P1", 10);
        rect_field(&mut game, "P2", 10);
        set_pending(&mut game, "P1", &[(EntityKind::Corvette, 1)]);
        set_pending(&mut game, "P2", &[(EntityKind::Corvette, 1)]);
        game.ready().unwrap();
        game.place_entity("P1", EntityKind::Corvette, Placement::Ship { anchor: Coord::new(0, 0), rotation: 0 }).unwrap();
        game.place_entity("P2", EntityKind::Corvette, Placement::Ship { anchor: Coord::new(0, 0), rotation: 0 }).unwrap();
        game.start().unwrap();

        assert_eq!(game.whos_turn(), "P1");
        game.shoot("P1", Coord::new(9, 9)).unwrap();
        assert_eq!(game.whos_turn(), "P2");

        game.shoot("P2", Coord::new(0, 0)).unwrap();
        assert_eq!(game.whos_turn(), "P2");

        game.shoot("P2", Coord::new(0, 1)).unwrap();
        assert_eq!(game.whos_turn(), "P1");
    }

    /// S3: a destroyer's three cells shot in order end up damaged, damaged, destroyed, and
    /// destroying a player's sole entity ends the game.
    #[test]
    fn s3_ship_destruction_closes_a_destroyer() {
        let mut game = two_player_game(3);
        rect_field(&mut game, "P1", 10);
        rect_field(&mut game, "P2", 10);
        set_pending(&mut game, "P1", &[(EntityKind::Corvette, 1)]);
        set_pending(&mut game, "P2", &[(EntityKind::Destroyer, 1)]);
        game.ready().unwrap();
        game.place_entity("P1", EntityKind::Corvette, Placement::Ship { anchor: Coord::new(5, 5), rotation: 0 }).unwrap();
        game.place_entity("P2", EntityKind::Destroyer, Placement::Ship { anchor: Coord::new(0, 0), rotation: 0 }).unwrap();
        game.start().unwrap();

        game.shoot("P1", Coord::new(0, 0)).unwrap();
        let destroyer_id = game.player("P2").unwrap().entities().keys().copied().next().unwrap();
        assert_eq!(game.player("P2").unwrap().entities()[&destroyer_id].status(), EntityStatus::Damaged);

        game.shoot("P1", Coord::new(0, 1)).unwrap();
        assert_eq!(game.player("P2").unwrap().entities()[&destroyer_id].status(), EntityStatus::Damaged);
        assert_eq!(game.state(), GameState::Active);

        game.shoot("P1", Coord::new(0, 2)).unwrap();
        assert_eq!(game.player("P2").unwrap().entities()[&destroyer_id].status(), EntityStatus::Destroyed);
        assert_eq!(game.state(), GameState::Over);
        assert_eq!(game.whos_winner(), Some(&Winner::Player("P1".to_string())));
    }

    /// S4: a relay hit reflects onto the shooter's own relay, ending the game in a Black Hole.
    #[test]
    fn s4_relay_reflection_loop_ends_in_black_hole() {
        let mut game = two_player_game(4);
        rect_field(&mut game, "P1", 10);
        rect_field(&mut game, "P2", 10);
        set_pending(&mut game, "P1", &[(EntityKind::Relay, 1)]);
        set_pending(&mut game, "P2", &[(EntityKind::Relay, 1)]);
        game.ready().unwrap();
        let e5 = crate::coord::parse_coord("E5").unwrap();
        game.place_entity("P1", EntityKind::Relay, Placement::Ship { anchor: e5, rotation: 0 }).unwrap();
        game.place_entity("P2", EntityKind::Relay, Placement::Ship { anchor: e5, rotation: 0 }).unwrap();
        game.start().unwrap();

        let (shooter_event, target_event) = game.shoot("P1", e5).unwrap();
        match target_event {
            Event::Shot { shot_results, .. } => assert_eq!(shot_results.get(&e5), Some(&CellStatus::Hit)),
            _ => panic!("expected a Shot event"),
        }
        match shooter_event {
            Event::Shot { shot_results, .. } => assert_eq!(shot_results.get(&e5), Some(&CellStatus::Relay)),
            _ => panic!("expected a Shot event"),
        }
        assert_eq!(game.state(), GameState::Over);
        assert_eq!(game.whos_winner(), Some(&Winner::BlackHole));
    }

    /// S5: a planet advances exactly one orbit step per successful shot, in its own
    /// rotation direction.
    #[test]
    fn s5_planet_motion_between_turns() {
        let mut game = two_player_game(5);
        rect_field(&mut game, "P1", 20);
        rect_field(&mut game, "P2", 20);
        set_pending(&mut game, "P1", &[(EntityKind::Corvette, 1), (EntityKind::Planet, 1)]);
        set_pending(&mut game, "P2", &[(EntityKind::Corvette, 1)]);
        game.ready().unwrap();
        game.place_entity(
            "P1",
            EntityKind::Planet,
            Placement::Planet { center: Coord::new(5, 5), radius: 3, rotation_sign: Some(1) },
        )
        .unwrap();
        game.place_entity("P1", EntityKind::Corvette, Placement::Ship { anchor: Coord::new(0, 0), rotation: 0 }).unwrap();
        game.place_entity("P2", EntityKind::Corvette, Placement::Ship { anchor: Coord::new(0, 0), rotation: 0 }).unwrap();
        game.start().unwrap();

        let planet_id = *game.player("P1").unwrap().entities().keys().next().unwrap();
        let (orbit_cells, before) = match &game.player("P1").unwrap().entities()[&planet_id] {
            crate::entity::Entity::Planet(p) => (p.orbit_cells().to_vec(), p.anchor().unwrap()),
            _ => panic!("expected a planet"),
        };
        let before_index = orbit_cells.iter().position(|&c| c == before).unwrap();

        game.shoot("P1", Coord::new(9, 9)).unwrap();

        let after = match &game.player("P1").unwrap().entities()[&planet_id] {
            crate::entity::Entity::Planet(p) => p.anchor().unwrap(),
            _ => panic!("expected a planet"),
        };
        let after_index = orbit_cells.iter().position(|&c| c == after).unwrap();
        assert_eq!(after_index, (before_index + 1) % orbit_cells.len());
    }

    /// S6: planets must be placed before any other pending entity.
    #[test]
    fn s6_planets_first() {
        let mut game = two_player_game(6);
        rect_field(&mut game, "P1", 10);
        rect_field(&mut game, "P2", 10);
        set_pending(&mut game, "P1", &[(EntityKind::Corvette, 1), (EntityKind::Planet, 1)]);
        set_pending(&mut game, "P2", &[(EntityKind::Corvette, 1)]);
        game.ready().unwrap();

        let err = game
            .place_entity("P1", EntityKind::Corvette, Placement::Ship { anchor: Coord::new(0, 0), rotation: 0 })
            .unwrap_err();
        assert_eq!(err, GameError::MustPlacePlanetsFirst);

        game.place_entity(
            "P1",
            EntityKind::Planet,
            Placement::Planet { center: Coord::new(5, 5), radius: 2, rotation_sign: Some(1) },
        )
        .unwrap();
        game.place_entity("P1", EntityKind::Corvette, Placement::Ship { anchor: Coord::new(0, 0), rotation: 0 }).unwrap();
    }

    #[test]
    fn turn_order_is_always_a_permutation_of_players() {
        let mut game = two_player_game(7);
        rect_field(&mut game, "P1", 10);
        rect_field(&mut game, "P2", 10);
        set_pending(&mut game, "P1", &[(EntityKind::Corvette, 1)]);
        set_pending(&mut game, "P2", &[(EntityKind::Corvette, 1)]);
        game.ready().unwrap();
        game.place_entity("P1", EntityKind::Corvette, Placement::Ship { anchor: Coord::new(0, 0), rotation: 0 }).unwrap();
        game.place_entity("P2", EntityKind::Corvette, Placement::Ship { anchor: Coord::new(5, 5), rotation: 0 }).unwrap();
        game.start().unwrap();

        game.shoot("P1", Coord::new(9, 9)).unwrap();
        let mut order: Vec<&String> = game.turn_order.iter().collect();
        order.sort();
        let mut names: Vec<&String> = game.insertion_order.iter().collect();
        names.sort();
        assert_eq!(order, names);
    }

    #[test]
    fn ready_rejects_oversized_fleet_for_field() {
        let mut game = two_player_game(8);
        rect_field(&mut game, "P1", 3);
        rect_field(&mut game, "P2", 3);
        set_pending(&mut game, "P1", &[(EntityKind::Cruiser, 4)]);
        set_pending(&mut game, "P2", &[(EntityKind::Corvette, 1)]);
        assert_eq!(game.ready().unwrap_err(), GameError::CapacityExceeded);
    }

    #[test]
    fn wrong_state_operations_are_rejected() {
        let mut game = two_player_game(9);
        assert_eq!(game.start().unwrap_err(), GameError::WrongState);
        assert_eq!(
            game.shoot("P1", Coord::new(0, 0)).unwrap_err(),
            GameError::WrongState
        );
    }
}
