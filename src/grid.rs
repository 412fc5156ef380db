use crate::{Cell, GridInt};
use crate::config::ConfigError;
use crate::snake::Direction;

/// Fixed-size toroidal playfield, measured in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    width: GridInt,
    height: GridInt,
}

impl Grid {
    pub fn new(width: GridInt, height: GridInt) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::ZeroDimension { width, height });
        }

        // One cell for the snake and at least one more for the food
        if (width as usize) * (height as usize) < 2 {
            return Err(ConfigError::GridTooSmall { width, height });
        }

        Ok(Grid { width, height })
    }

    pub fn width(&self) -> GridInt {
        self.width
    }

    pub fn height(&self) -> GridInt {
        self.height
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn center(&self) -> Cell {
        (self.width / 2, self.height / 2)
    }

    #[cfg(test)]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.0 < self.width && cell.1 < self.height
    }

    /// Neighbouring cell in `direction`, wrapping around the edges.
    pub fn step(&self, cell: Cell, direction: Direction) -> Cell {
        let (dx, dy) = direction.delta();
        let x = (cell.0 as i32 + dx).rem_euclid(self.width as i32);
        let y = (cell.1 as i32 + dy).rem_euclid(self.height as i32);
        (x as GridInt, y as GridInt)
    }

    /// Every cell, row by row.
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let (width, height) = (self.width, self.height);
        (0..height).flat_map(move |y| (0..width).map(move |x| (x, y)))
    }
}
