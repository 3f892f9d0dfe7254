//! A bot that presses its advantage: once it lands a hit, it keeps shooting that hit's
//! orthogonal neighbors before falling back to a random guess.

use std::collections::HashSet;

use rand::Rng;

use crate::coord::Coord;
use crate::event::CellStatus;

use super::{pick_uniform, OpponentView};

#[derive(Debug, Clone, Default)]
pub struct Hunter {
    view: OpponentView,
    hunt: HashSet<Coord>,
}

impl Hunter {
    pub fn new() -> Self {
        Self { view: OpponentView::new(), hunt: HashSet::new() }
    }

    pub fn seed_free(&mut self, coords: impl IntoIterator<Item = Coord>) {
        self.view.seed_free(coords);
    }

    /// Records a shot's outcome. A `Hit` (or `Relay`, which resolves as a hit) seeds the
    /// four orthogonal neighbors of `coord` into the hunt set.
    pub fn shot_result(&mut self, coord: Coord, status: CellStatus) {
        self.view.shot_result(coord, status);
        if status == CellStatus::Hit || status == CellStatus::Relay {
            for (dy, dx) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
                self.hunt.insert(Coord::new(coord.y + dy, coord.x + dx));
            }
        }
    }

    pub fn validate_destruction(&mut self, destroyed_cells: &[Coord]) {
        self.view.validate_destruction(destroyed_cells);
        let view = &self.view;
        self.hunt.retain(|c| view.status_of(*c) == Some(CellStatus::Free));
    }

    /// Shoots from the hunt set if any of it is still free; otherwise falls back to a
    /// uniformly random free cell.
    pub fn shoot(&self, rng: &mut impl Rng) -> Option<Coord> {
        let free = self.view.free_coords();
        let candidates: Vec<Coord> = self.hunt.iter().copied().filter(|c| free.contains(c)).collect();
        if candidates.is_empty() {
            pick_uniform(&free, rng)
        } else {
            pick_uniform(&candidates, rng)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn hit_seeds_orthogonal_neighbors() {
        let mut bot = Hunter::new();
        bot.seed_free([
            Coord::new(5, 4),
            Coord::new(5, 6),
            Coord::new(4, 5),
            Coord::new(6, 5),
            Coord::new(0, 0),
        ]);
        bot.shot_result(Coord::new(5, 5), CellStatus::Hit);
        let mut rng = StepRng::new(0, 1);
        let shot = bot.shoot(&mut rng).unwrap();
        assert!([Coord::new(5, 4), Coord::new(5, 6), Coord::new(4, 5), Coord::new(6, 5)].contains(&shot));
    }

    #[test]
    fn falls_back_to_random_when_hunt_is_empty() {
        let mut bot = Hunter::new();
        bot.seed_free([Coord::new(0, 0)]);
        let mut rng = StepRng::new(0, 1);
        assert_eq!(bot.shoot(&mut rng), Some(Coord::new(0, 0)));
    }
}
