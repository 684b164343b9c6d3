use serde::{Deserialize, Serialize};

use crate::EngineError;

use super::position::Position;

/// Board dimensions and the cell addressing scheme.
///
/// Cells are addressed row-major: `index = y * width + x`. The same index is
/// what the move log stores for a newly placed food.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
}

impl Grid {
    /// Creates a grid of `width × height` cells.
    ///
    /// Both dimensions must be non-zero, fit in an `i32` coordinate, and the
    /// board must hold at least two cells (one for the agent, one for food).
    pub fn new(width: usize, height: usize) -> Result<Self, EngineError> {
        let fits = i32::try_from(width).is_ok() && i32::try_from(height).is_ok();
        let cells = width.checked_mul(height);
        if width == 0 || height == 0 || !fits || !cells.is_some_and(|c| c >= 2) {
            return Err(EngineError::InvalidGrid { width, height });
        }
        Ok(Self { width, height })
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub const fn cells(&self) -> usize {
        self.width * self.height
    }

    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.index_of(position).is_some()
    }

    /// Row-major index of `position`, or `None` when it lies off the board.
    #[must_use]
    pub fn index_of(&self, position: Position) -> Option<usize> {
        let x = usize::try_from(position.x).ok()?;
        let y = usize::try_from(position.y).ok()?;
        (x < self.width && y < self.height).then_some(y * self.width + x)
    }

    /// Inverse of [`index_of`](Self::index_of).
    #[must_use]
    pub fn position_of(&self, index: usize) -> Option<Position> {
        if index >= self.cells() {
            return None;
        }
        let x = i32::try_from(index % self.width).ok()?;
        let y = i32::try_from(index / self.width).ok()?;
        Some(Position::new(x, y))
    }

    /// Iterates over every cell position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.cells()).filter_map(|i| self.position_of(i))
    }
}
