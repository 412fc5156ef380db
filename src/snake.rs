use std::collections::VecDeque;

use crate::Cell;
use crate::grid::Grid;
use Direction::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    /// Unit step (dx, dy) on the grid; rows grow downwards.
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    pub fn is_opposite(&self, other: Direction) -> bool {
        self.opposite() == other
    }
}

/// The player's snake. The head is always at the front of `body`.
#[derive(Clone, Debug, PartialEq)]
pub struct Snake {
    body: VecDeque<Cell>,
    direction: Direction,
    pending_direction: Option<Direction>,
}

impl Snake {
    pub fn new(start: Cell) -> Self {
        Snake { body: VecDeque::from(vec![start]), direction: Right, pending_direction: None }
    }

    /// Builds a snake from explicit segments, head first.
    #[cfg(test)]
    pub fn from_body(body: Vec<Cell>, direction: Direction) -> Self {
        assert!(!body.is_empty(), "a snake needs at least one segment");
        Snake { body: body.into(), direction, pending_direction: None }
    }

    pub fn body(&self) -> &VecDeque<Cell> {
        &self.body
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn tail(&self) -> Cell {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn get_direction(&self) -> Direction {
        self.direction
    }

    pub fn get_pending_direction(&self) -> Option<Direction> {
        self.pending_direction
    }

    /// Queues a turn for the next tick. Turning back onto the neck is ignored,
    /// checked against the direction currently travelled, not the queued one.
    /// Returns whether the request was kept.
    pub fn request_direction(&mut self, requested: Direction) -> bool {
        if self.direction.is_opposite(requested) {
            return false;
        }

        self.pending_direction = Some(requested);
        true
    }

    pub fn apply_pending_direction(&mut self) {
        if let Some(dir) = self.pending_direction.take() {
            self.direction = dir;
        }
    }

    pub fn next_head(&self, grid: &Grid) -> Cell {
        grid.step(self.head(), self.direction)
    }

    /// Pushes `new_head` and, unless growing, drops the tail.
    /// Returns the dropped tail cell.
    pub fn advance(&mut self, new_head: Cell, grow: bool) -> Option<Cell> {
        self.body.push_front(new_head);

        if grow {
            None
        } else {
            self.body.pop_back()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::new(32, 24).unwrap()
    }

    #[test]
    fn opposites() {
        assert!(Up.is_opposite(Down));
        assert!(Down.is_opposite(Up));
        assert!(Left.is_opposite(Right));
        assert!(Right.is_opposite(Left));

        assert!(!Up.is_opposite(Up));
        assert!(!Up.is_opposite(Left));
        assert!(!Right.is_opposite(Down));
    }

    #[test]
    fn new_snake_starts_right_with_one_segment() {
        let snake = Snake::new((16, 12));

        assert_eq!(snake.len(), 1);
        assert_eq!(snake.head(), (16, 12));
        assert_eq!(snake.tail(), (16, 12));
        assert_eq!(snake.get_direction(), Right);
        assert_eq!(snake.get_pending_direction(), None);
    }

    #[test]
    fn reverse_request_is_ignored() {
        let mut snake = Snake::new((16, 12));

        assert!(!snake.request_direction(Left));
        assert_eq!(snake.get_pending_direction(), None);

        snake.apply_pending_direction();
        assert_eq!(snake.get_direction(), Right);
    }

    #[test]
    fn later_request_overwrites_earlier_one() {
        let mut snake = Snake::new((16, 12));

        assert!(snake.request_direction(Up));
        assert!(snake.request_direction(Down));
        assert_eq!(snake.get_pending_direction(), Some(Down));

        snake.apply_pending_direction();
        assert_eq!(snake.get_direction(), Down);
        assert_eq!(snake.get_pending_direction(), None);
    }

    #[test]
    fn reverse_is_judged_against_current_direction() {
        // Moving right with Up queued: Left is still the reverse of Right
        let mut snake = Snake::new((16, 12));
        snake.request_direction(Up);

        assert!(!snake.request_direction(Left));
        assert_eq!(snake.get_pending_direction(), Some(Up));
    }

    #[test]
    fn next_head_wraps() {
        let snake = Snake::from_body(vec![(31, 3)], Right);
        assert_eq!(snake.next_head(&grid()), (0, 3));

        let snake = Snake::from_body(vec![(4, 0)], Up);
        assert_eq!(snake.next_head(&grid()), (4, 23));
    }

    #[test]
    fn advance_keeps_length_unless_growing() {
        let mut snake = Snake::from_body(vec![(5, 5), (4, 5), (3, 5)], Right);

        assert_eq!(snake.tail(), (3, 5));

        let vacated = snake.advance((6, 5), false);
        assert_eq!(vacated, Some((3, 5)));
        assert_eq!(snake.tail(), (4, 5));
        assert_eq!(snake.body().iter().copied().collect::<Vec<_>>(), vec![(6, 5), (5, 5), (4, 5)]);

        let vacated = snake.advance((7, 5), true);
        assert_eq!(vacated, None);
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.head(), (7, 5));
        assert_eq!(snake.tail(), (4, 5));
    }
}
