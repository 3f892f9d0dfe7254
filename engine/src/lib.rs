//! A turn-based naval/orbital combat engine: shaped fields, ships, relays and planets, a
//! relay-reflection shoot resolver, autoplacement, and hunt-neighbors bots.
//!
//! The engine is a plain value advanced step by step by a renderer: every mutating call
//! returns the [`Event`](event::Event)s it produced, and that's the only channel out.
//! There is no hidden state and no I/O in this crate.

pub mod bots;
pub mod coord;
pub mod entity;
pub mod event;
pub mod field;
pub mod game;
pub mod geometry;
pub mod player;

pub use coord::{format_coord, parse_coord, Coord};
pub use event::Event;
pub use game::{Game, GameError, GameState, Winner};
