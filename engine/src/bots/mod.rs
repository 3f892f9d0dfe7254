//! Bot shot selection. A bot never touches engine internals — it maintains its own shadow
//! of the opponent's field built entirely from events the renderer forwards to it.

use std::collections::HashMap;

use log::warn;
use rand::Rng;

use crate::coord::Coord;
use crate::event::CellStatus;

mod hunter;
mod randomer;

pub use hunter::Hunter;
pub use randomer::Randomer;

/// Shared state every bot keeps: its own view of the opponent's field, built up one
/// `shot_result` at a time. Bots never read `Field`/`Entity` directly — the renderer is
/// the only thing that sees engine state, and it forwards only event contents.
#[derive(Debug, Clone, Default)]
pub struct OpponentView {
    cells: HashMap<Coord, CellStatus>,
}

impl OpponentView {
    pub fn new() -> Self {
        Self { cells: HashMap::new() }
    }

    /// Seeds every coordinate of a freshly-known field as `Free`, so `free_coords` has
    /// something to draw from before any shot has been taken.
    pub fn seed_free(&mut self, coords: impl IntoIterator<Item = Coord>) {
        for coord in coords {
            self.cells.entry(coord).or_insert(CellStatus::Free);
        }
    }

    /// Records the result of a shot the bot (or the opponent, mirrored back) took.
    pub fn shot_result(&mut self, coord: Coord, status: CellStatus) {
        self.cells.insert(coord, status);
    }

    /// Marks every neighbor of each destroyed cell as `Miss`: a fully-sunk entity has
    /// nothing left to hunt around.
    pub fn validate_destruction(&mut self, destroyed_cells: &[Coord]) {
        for &cell in destroyed_cells {
            for (dy, dx) in [(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)] {
                let neighbor = Coord::new(cell.y + dy, cell.x + dx);
                if let Some(status) = self.cells.get_mut(&neighbor) {
                    if *status == CellStatus::Free {
                        *status = CellStatus::Miss;
                    }
                }
            }
        }
    }

    pub fn free_coords(&self) -> Vec<Coord> {
        self.cells
            .iter()
            .filter(|(_, status)| **status == CellStatus::Free)
            .map(|(coord, _)| *coord)
            .collect()
    }

    pub fn status_of(&self, coord: Coord) -> Option<CellStatus> {
        self.cells.get(&coord).copied()
    }
}

/// Picks a uniformly random coordinate from `choices`. Both bots bottom out here once
/// they've narrowed down their candidate set.
fn pick_uniform(choices: &[Coord], rng: &mut impl Rng) -> Option<Coord> {
    if choices.is_empty() {
        warn!("bot has no available cells left to shoot");
        None
    } else {
        let index = rng.gen_range(0..choices.len());
        Some(choices[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_destruction_marks_neighbors_miss() {
        let mut view = OpponentView::new();
        view.seed_free([Coord::new(0, 0), Coord::new(0, 1), Coord::new(1, 0), Coord::new(1, 1)]);
        view.shot_result(Coord::new(0, 0), CellStatus::Hit);
        view.validate_destruction(&[Coord::new(0, 0)]);
        assert_eq!(view.status_of(Coord::new(0, 1)), Some(CellStatus::Miss));
        assert_eq!(view.status_of(Coord::new(1, 0)), Some(CellStatus::Miss));
    }

    #[test]
    fn free_coords_excludes_shot_cells() {
        let mut view = OpponentView::new();
        view.seed_free([Coord::new(0, 0), Coord::new(0, 1)]);
        view.shot_result(Coord::new(0, 0), CellStatus::Miss);
        assert_eq!(view.free_coords(), vec![Coord::new(0, 1)]);
    }
}
