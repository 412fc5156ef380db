use rand::Rng;
use rand::seq::SliceRandom;

use crate::Cell;
use crate::grid::Grid;

/// Rejected draws per grid cell before giving up on sampling.
const DRAWS_PER_CELL: usize = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Food {
    position: Cell,
}

impl Food {
    pub fn at(position: Cell) -> Self {
        Food { position }
    }

    /// Places food on a random cell outside `busy`, or `None` if the grid is full.
    pub fn spawn<'a, I, R>(grid: &Grid, busy: I, rng: &mut R) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Cell> + Clone,
        R: Rng + ?Sized,
    {
        randomize_position(grid, busy, rng).map(Food::at)
    }

    pub fn position(&self) -> Cell {
        self.position
    }
}

/// Draws a uniformly random free cell.
///
/// Rejection sampling is cheap while the board is mostly empty. Once the
/// snake covers most of it, the draw budget runs out and the free cells are
/// enumerated instead, so this always terminates.
pub fn randomize_position<'a, I, R>(grid: &Grid, busy: I, rng: &mut R) -> Option<Cell>
where
    I: IntoIterator<Item = &'a Cell> + Clone,
    R: Rng + ?Sized,
{
    let is_busy = |cell: &Cell| busy.clone().into_iter().any(|b| b == cell);

    for _ in 0..grid.area() * DRAWS_PER_CELL {
        let cell = (rng.gen_range(0..grid.width()), rng.gen_range(0..grid.height()));
        if !is_busy(&cell) {
            return Some(cell);
        }
    }

    let choices: Vec<Cell> = grid.cells().filter(|cell| !is_busy(cell)).collect();
    choices.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn never_returns_busy_cell() {
        let grid = Grid::new(6, 4).unwrap();
        let busy: Vec<Cell> = grid.cells().filter(|(x, _)| x % 2 == 0).collect();
        let mut rng = SmallRng::seed_from_u64(7);

        for _ in 0..200 {
            let cell = randomize_position(&grid, &busy, &mut rng).unwrap();
            assert!(grid.contains(cell));
            assert!(!busy.contains(&cell));
        }
    }

    #[test]
    fn single_free_cell_is_always_found() {
        let grid = Grid::new(32, 24).unwrap();
        let free = (13, 20);
        let busy: Vec<Cell> = grid.cells().filter(|c| *c != free).collect();
        let mut rng = SmallRng::seed_from_u64(42);

        for _ in 0..5 {
            assert_eq!(randomize_position(&grid, &busy, &mut rng), Some(free));
        }
    }

    #[test]
    fn full_grid_yields_none() {
        let grid = Grid::new(3, 2).unwrap();
        let busy: Vec<Cell> = grid.cells().collect();
        let mut rng = SmallRng::seed_from_u64(1);

        assert_eq!(randomize_position(&grid, &busy, &mut rng), None);
        assert_eq!(Food::spawn(&grid, &busy, &mut rng), None);
    }

    #[test]
    fn spawn_with_empty_busy_set() {
        let grid = Grid::new(32, 24).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);

        let food = Food::spawn(&grid, &Vec::<Cell>::new(), &mut rng).unwrap();
        assert!(grid.contains(food.position()));
    }
}
