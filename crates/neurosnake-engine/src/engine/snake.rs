use std::collections::VecDeque;

use crate::core::{Direction, Position};

/// The agent's body, head first, and its current heading.
///
/// The body only stores coordinates; occupancy questions are answered by
/// scanning them, so the snake never holds a reference to the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    body: VecDeque<Position>,
    heading: Direction,
}

impl Snake {
    /// Creates a single-cell snake.
    #[must_use]
    pub fn new(head: Position, heading: Direction) -> Self {
        Self {
            body: VecDeque::from([head]),
            heading,
        }
    }

    #[must_use]
    pub fn head(&self) -> Position {
        self.body[0]
    }

    #[must_use]
    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    #[must_use]
    pub fn heading(&self) -> Direction {
        self.heading
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Always `false`; a snake has at least its head.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Body cells, head first.
    pub fn body(&self) -> impl ExactSizeIterator<Item = Position> + '_ {
        self.body.iter().copied()
    }

    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.body.contains(&position)
    }

    /// Whether moving the head onto `position` bites the body.
    ///
    /// The tail is excluded because it vacates its cell during the same step.
    #[must_use]
    pub fn bites_itself_at(&self, position: Position) -> bool {
        self.body
            .iter()
            .take(self.body.len() - 1)
            .any(|p| *p == position)
    }

    /// Moves the head to `new_head`, keeping the tail when `grow` is set.
    pub(crate) fn advance(&mut self, new_head: Position, heading: Direction, grow: bool) {
        self.body.push_front(new_head);
        if !grow {
            self.body.pop_back();
        }
        self.heading = heading;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_without_growth_keeps_length() {
        let mut snake = Snake::new(Position::new(2, 2), Direction::Right);
        snake.advance(Position::new(3, 2), Direction::Right, false);
        assert_eq!(snake.len(), 1);
        assert_eq!(snake.head(), Position::new(3, 2));
    }

    #[test]
    fn test_advance_with_growth_prepends_head() {
        let mut snake = Snake::new(Position::new(2, 2), Direction::Right);
        snake.advance(Position::new(2, 1), Direction::Up, true);
        assert_eq!(
            snake.body().collect::<Vec<_>>(),
            [Position::new(2, 1), Position::new(2, 2)]
        );
        assert_eq!(snake.heading(), Direction::Up);
        assert_eq!(snake.tail(), Position::new(2, 2));
    }

    #[test]
    fn test_tail_is_not_a_collision() {
        let mut snake = Snake::new(Position::new(0, 0), Direction::Right);
        snake.advance(Position::new(1, 0), Direction::Right, true);
        snake.advance(Position::new(1, 1), Direction::Down, true);
        snake.advance(Position::new(0, 1), Direction::Left, true);
        // body: (0,1) (1,1) (1,0) (0,0); tail (0,0) moves away
        assert!(!snake.bites_itself_at(Position::new(0, 0)));
        assert!(snake.bites_itself_at(Position::new(1, 0)));
    }
}
