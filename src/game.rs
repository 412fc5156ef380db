use std::{thread::sleep, time::{Duration, Instant}};

use anyhow::{bail, Context, Result};
use crossterm::event::{KeyEvent, KeyModifiers, KeyCode};
use tracing::{debug, info};

use crate::{Cell, TermInt};
use crate::engine::{Engine, TickResult};
use crate::grid::Grid;
use crate::snake::Direction::{*, self};
use crate::term::{TermManager, TermCoords};

const POLL_INTERVAL_MS: u64 = 5;

const SNAKE_BODY_CHAR: char = '█';
const FOOD_CHAR: char = 'O';
const EMPTY_CHAR: char = ' ';

/// Each grid cell is drawn two columns wide so the board looks square.
const CELL_COLUMNS: TermInt = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Turn(Direction),
    Pause,
    Quit,
}

pub fn key_command(ev: &KeyEvent) -> Option<Command> {
    if is_ctrl_c(ev) {
        return Some(Command::Quit);
    }

    match ev.code {
        KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => Some(Command::Turn(Up)),
        KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => Some(Command::Turn(Left)),
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => Some(Command::Turn(Down)),
        KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => Some(Command::Turn(Right)),
        KeyCode::Esc | KeyCode::Char('p') => Some(Command::Pause),
        KeyCode::Char('q') => Some(Command::Quit),
        _ => None,
    }
}

pub struct SnakeGame {
    term: TermManager,
    engine: Engine,
    tick_interval: Duration,
    paused: bool,
    best_length: usize,
    drawn_food: Cell,
    board: TermCoords,
}

impl SnakeGame {
    pub fn new(engine: Engine, tick_interval: Duration) -> Result<Self> {
        let grid = engine.grid();
        let board = board_size(grid)
            .with_context(|| format!("a {}x{} grid is too large to draw", grid.width(), grid.height()))?;
        let term = TermManager::new().context("Failed to query terminal size")?;
        let drawn_food = engine.get_food_cell();
        Ok(SnakeGame { term, engine, tick_interval, paused: false, best_length: 1, drawn_food, board })
    }

    pub fn initialize(&mut self) -> Result<()> {
        let (need_w, need_h) = self.board;
        let (w, h) = self.term.get_terminal_size();

        if w < need_w || h < need_h {
            bail!("terminal is {}x{}, the board needs at least {}x{}", w, h, need_w, need_h);
        }

        self.term.setup().context("Failed to set up terminal")
    }

    pub fn show_intro(&mut self) -> Result<bool> {
        let lines = &[
            "Arrow keys or WASD to move",
            "Esc or P to pause",
            "Q or CTRL+C to quit",
            "",
            "Press any key to begin"
        ];

        self.term.show_message(lines)?;

        let key = self.term.read_key_blocking()?;
        if key_command(&key) == Some(Command::Quit) {
            return Ok(false);
        }

        self.term.hide_message()?;
        Ok(true)
    }

    /// Runs until the player quits.
    pub fn run(&mut self) -> Result<()> {
        self.redraw()?;
        let mut next_tick = Instant::now() + self.tick_interval;

        loop {
            sleep(Duration::from_millis(POLL_INTERVAL_MS));

            for key_ev in self.term.read_key_events_queue()? {
                match key_command(&key_ev) {
                    Some(Command::Quit) => {
                        info!(ticks = self.engine.ticks(), best = self.best_length, "player quit");
                        return Ok(());
                    },
                    Some(Command::Pause) => self.toggle_pause()?,
                    Some(Command::Turn(dir)) if !self.paused => self.engine.request_direction(dir),
                    _ => {},
                }
            }

            if self.paused {
                next_tick = Instant::now() + self.tick_interval;
                continue;
            }

            if Instant::now() < next_tick {
                continue;
            }
            next_tick = next_deadline(next_tick, Instant::now(), self.tick_interval);

            let old_head = self.engine.get_snake_cells()[0];
            let result = self.engine.tick();
            self.best_length = self.best_length.max(self.engine.state().snake.len());

            if result.reset_occurred {
                debug!(best = self.best_length, "redrawing after reset");
                self.redraw()?;
            } else {
                self.draw_update(old_head, result)?;
            }
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn status_line(&self) -> String {
        let title = format!(" Length: {}  Best: {} ", self.engine.state().snake.len(), self.best_length);
        fit_title(&title, self.board.0)
    }

    fn print_cell(&mut self, cell: Cell, ch: char) -> Result<()> {
        let x = 1 + cell.0 * CELL_COLUMNS;
        let y = 1 + cell.1;
        for dx in 0..CELL_COLUMNS {
            self.term.print_at((x + dx, y), ch)?;
        }
        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        self.term.clear()?;
        let title = self.status_line();
        self.term.draw_borders(self.board, &title)?;

        let cells = self.engine.get_snake_cells();
        for (i, cell) in cells.iter().enumerate() {
            let ch = if i == 0 {head_char(self.engine.get_direction())} else {SNAKE_BODY_CHAR};
            self.print_cell(*cell, ch)?;
        }

        self.drawn_food = self.engine.get_food_cell();
        self.print_cell(self.drawn_food, FOOD_CHAR)?;
        self.term.flush()?;
        Ok(())
    }

    fn draw_update(&mut self, old_head: Cell, result: TickResult) -> Result<()> {
        // Erase first: with the tail-chasing rule the new head may sit where the tail was
        if let Some(vacated) = self.engine.get_vacated_cell() {
            self.print_cell(vacated, EMPTY_CHAR)?;
        }

        let cells = self.engine.get_snake_cells();
        if cells.len() > 1 {
            self.print_cell(old_head, SNAKE_BODY_CHAR)?;
        }
        self.print_cell(cells[0], head_char(self.engine.get_direction()))?;

        let food = self.engine.get_food_cell();
        if food != self.drawn_food {
            self.drawn_food = food;
            self.print_cell(food, FOOD_CHAR)?;
        }

        if result.grew {
            let title = self.status_line();
            self.term.print_str_at((2, 0), &title)?;
        }

        self.term.flush()?;
        Ok(())
    }

    fn toggle_pause(&mut self) -> Result<()> {
        if !self.paused {
            self.term.show_message(&["Paused", "Press Esc to resume", "or Q to quit"])?;
        } else {
            self.term.hide_message()?;
        }

        self.paused = !self.paused;
        Ok(())
    }
}

/// Terminal area of the framed board, `None` if it does not fit in terminal coordinates.
fn board_size(grid: &Grid) -> Option<TermCoords> {
    let width = u32::from(grid.width()).checked_mul(u32::from(CELL_COLUMNS))?.checked_add(2)?;
    let height = u32::from(grid.height()).checked_add(2)?;
    Some((TermInt::try_from(width).ok()?, TermInt::try_from(height).ok()?))
}

/// Cuts `title` so it stays inside the top edge, corners and padding included.
fn fit_title(title: &str, board_width: TermInt) -> String {
    title.chars().take(board_width.saturating_sub(4) as usize).collect()
}

/// Next tick time. After a stall the schedule restarts from `now` instead of
/// replaying every missed tick.
fn next_deadline(deadline: Instant, now: Instant, interval: Duration) -> Instant {
    let next = deadline + interval;
    if next <= now {
        now + interval
    } else {
        next
    }
}

fn head_char(direction: Direction) -> char {
    match direction {
        Up => '^',
        Down => 'v',
        Left => '<',
        Right => '>',
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    ev.code == KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL)
}
