//! The baseline bot: no memory beyond what's free.

use rand::Rng;

use crate::coord::Coord;

use super::{pick_uniform, OpponentView};

/// Shoots a uniformly random cell among those it has not yet learned aren't free.
#[derive(Debug, Clone, Default)]
pub struct Randomer {
    view: OpponentView,
}

impl Randomer {
    pub fn new() -> Self {
        Self { view: OpponentView::new() }
    }

    pub fn seed_free(&mut self, coords: impl IntoIterator<Item = Coord>) {
        self.view.seed_free(coords);
    }

    pub fn shot_result(&mut self, coord: Coord, status: crate::event::CellStatus) {
        self.view.shot_result(coord, status);
    }

    pub fn validate_destruction(&mut self, destroyed_cells: &[Coord]) {
        self.view.validate_destruction(destroyed_cells);
    }

    pub fn shoot(&self, rng: &mut impl Rng) -> Option<Coord> {
        pick_uniform(&self.view.free_coords(), rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::CellStatus;
    use rand::rngs::mock::StepRng;

    #[test]
    fn never_reshoots_a_known_cell() {
        let mut bot = Randomer::new();
        bot.seed_free([Coord::new(0, 0), Coord::new(0, 1)]);
        bot.shot_result(Coord::new(0, 0), CellStatus::Miss);
        let mut rng = StepRng::new(0, 1);
        assert_eq!(bot.shoot(&mut rng), Some(Coord::new(0, 1)));
    }

    #[test]
    fn no_shot_when_nothing_free() {
        let bot = Randomer::new();
        let mut rng = StepRng::new(0, 1);
        assert_eq!(bot.shoot(&mut rng), None);
    }
}
