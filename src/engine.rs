use rand::{rngs::SmallRng, SeedableRng};
use tracing::{debug, info, instrument, trace, warn};

use crate::Cell;
use crate::config::{EngineConfig, TailRule};
use crate::food::Food;
use crate::grid::Grid;
use crate::snake::{Direction, Snake};

/// Snake and food, owned by the engine and replaced wholesale on reset.
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub food: Food,
}

impl GameState {
    /// A fresh game: one segment in the middle heading right, food elsewhere.
    pub fn initial(grid: &Grid, rng: &mut SmallRng) -> Self {
        let start = grid.center();
        let snake = Snake::new(start);
        // A one-segment snake always leaves a free cell on a grid Grid::new accepted
        let food = Food::spawn(grid, snake.body(), rng)
            .unwrap_or_else(|| Food::at(free_neighbour(grid, start)));

        GameState { snake, food }
    }
}

/// A cell next to `cell` that differs from it. Grids have at least two
/// cells, so one of the two axes is at least two wide.
fn free_neighbour(grid: &Grid, cell: Cell) -> Cell {
    let right = grid.step(cell, Direction::Right);
    if right != cell {
        right
    } else {
        grid.step(cell, Direction::Down)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickResult {
    pub grew: bool,
    pub reset_occurred: bool,
}

/// True if `next_head` lands on the body. With `tail_vacates` the last
/// segment is left out, since it moves away this same tick.
pub fn check_self_collision<'a, I>(next_head: Cell, body: I, tail_vacates: bool) -> bool
where
    I: IntoIterator<Item = &'a Cell>,
    I::IntoIter: ExactSizeIterator,
{
    let body = body.into_iter();
    let checked = if tail_vacates { body.len().saturating_sub(1) } else { body.len() };

    body.take(checked).any(|cell| *cell == next_head)
}

pub fn check_food(next_head: Cell, food: &Food) -> bool {
    next_head == food.position()
}

pub struct Engine {
    grid: Grid,
    tail_rule: TailRule,
    rng: SmallRng,
    state: GameState,
    vacated: Option<Cell>,
    ticks: u64,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let state = GameState::initial(&config.grid, &mut rng);

        info!(width = config.grid.width(), height = config.grid.height(), tail_rule = ?config.tail_rule, "engine ready");

        Engine { grid: config.grid, tail_rule: config.tail_rule, rng, state, vacated: None, ticks: 0 }
    }

    /// Replaces the snake and food with a given layout.
    #[cfg(test)]
    pub fn with_state(mut self, snake: Snake, food: Food) -> Self {
        self.state = GameState { snake, food };
        self.vacated = None;
        self
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn get_snake_cells(&self) -> Vec<Cell> {
        self.state.snake.body().iter().copied().collect()
    }

    pub fn get_food_cell(&self) -> Cell {
        self.state.food.position()
    }

    /// The cell the tail left on the last tick, if nothing occupies it now.
    pub fn get_vacated_cell(&self) -> Option<Cell> {
        self.vacated
    }

    pub fn get_direction(&self) -> Direction {
        self.state.snake.get_direction()
    }

    pub fn request_direction(&mut self, direction: Direction) {
        let snake = &mut self.state.snake;
        if !snake.request_direction(direction) {
            trace!(?direction, pending = ?snake.get_pending_direction(), "ignored reversing turn");
        }
    }

    pub fn reset(&mut self) {
        self.state = GameState::initial(&self.grid, &mut self.rng);
        self.vacated = None;
    }

    #[instrument(level = "trace", skip_all)]
    pub fn tick(&mut self) -> TickResult {
        self.ticks += 1;
        self.vacated = None;

        let snake = &mut self.state.snake;
        snake.apply_pending_direction();
        let next_head = snake.next_head(&self.grid);

        let eats = check_food(next_head, &self.state.food);
        let tail_vacates = !eats && self.tail_rule == TailRule::Vacate;

        if check_self_collision(next_head, snake.body(), tail_vacates) {
            info!(length = snake.len(), cell = ?next_head, tail = ?snake.tail(), "snake bit itself, resetting");
            self.reset();
            return TickResult { grew: false, reset_occurred: true };
        }

        let vacated = snake.advance(next_head, eats);
        self.vacated = vacated.filter(|cell| !snake.body().contains(cell));

        if !eats {
            return TickResult::default();
        }

        debug!(length = snake.len(), cell = ?next_head, "ate food");

        match Food::spawn(&self.grid, snake.body(), &mut self.rng) {
            Some(food) => {
                self.state.food = food;
                TickResult { grew: true, reset_occurred: false }
            },
            None => {
                warn!(length = snake.len(), "board filled, starting over");
                self.reset();
                TickResult { grew: true, reset_occurred: true }
            },
        }
    }
}
