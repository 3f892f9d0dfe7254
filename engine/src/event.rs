//! The append-only log: the only channel a renderer has into what the engine did.

use std::collections::HashMap;

use crate::coord::Coord;
use crate::entity::EntityId;
use crate::entity::EntityKind;
use crate::game::GameState;

/// The label attached to a coordinate in a [`Event::Shot`] or snapshot. `Miss`/`Hit`/
/// `Relay` appear in shot deltas; `Entity`/`Free`/`Void`/`Planet` appear only in initial
/// placement or full-field snapshots.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CellStatus {
    Miss,
    Hit,
    Relay,
    Entity,
    Planet,
    Free,
    Void,
}

/// What kind of lobby change a [`Event::Lobby`] reports.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum LobbySubkind {
    StateChanged,
    PlayerAdded,
    PlayerDeleted,
    PlayerChanged,
}

/// One record in the engine's event log. Every mutating operation on [`Game`](crate::game::Game)
/// returns one or more of these; nothing else is observable from outside the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Lobby {
        game_state: GameState,
        subkind: LobbySubkind,
        turn_order: Vec<String>,
        winner: Option<String>,
        payload: String,
    },
    Place {
        game_state: GameState,
        player_name: String,
        entity_id: EntityId,
        entity_type: EntityKind,
        anchor: Coord,
        rotation: Option<i32>,
        cells_occupied: Vec<Coord>,
        radius: Option<i32>,
        orbit_cells: Option<Vec<Coord>>,
        orbit_center: Option<Coord>,
    },
    Shot {
        game_state: GameState,
        turn: u64,
        shooter: String,
        target: String,
        coords: Coord,
        shot_results: HashMap<Coord, CellStatus>,
        planets_anchors: Vec<Coord>,
        destroyed_cells: Vec<Coord>,
    },
}
