use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    EngineError,
    core::{Direction, Grid, Position},
};

use super::simulation::{EpisodeState, Simulation};

/// One step of the move log.
///
/// The value is the direction code when no new food was placed, and
/// `10 * (food_index + 1) + direction` when the step ate food and a new food
/// appeared at row-major index `food_index`. Together with the initial
/// placement this reproduces an episode exactly without storing boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveRecord(u64);

impl MoveRecord {
    #[must_use]
    pub const fn direction_only(direction: Direction) -> Self {
        Self(direction.code() as u64)
    }

    #[must_use]
    pub const fn with_food(direction: Direction, food_index: usize) -> Self {
        Self(10 * (food_index as u64 + 1) + direction.code() as u64)
    }

    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Decodes the direction part; `None` when the digit is not a direction.
    #[must_use]
    pub fn direction(self) -> Option<Direction> {
        u8::try_from(self.0 % 10)
            .ok()
            .and_then(|code| Direction::try_from(code).ok())
    }

    /// Decodes the row-major index of the food placed by this step.
    #[must_use]
    pub fn food_index(self) -> Option<usize> {
        match self.0 / 10 {
            0 => None,
            n => usize::try_from(n - 1).ok(),
        }
    }
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Everything needed to replay an episode bit-exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeReplay {
    pub world_width: usize,
    pub world_height: usize,
    pub initial_agent_position: Position,
    pub initial_heading: Direction,
    pub initial_food_position: Position,
    pub move_log: Vec<MoveRecord>,
}

impl EpisodeReplay {
    /// Replays the whole log, returning the board after every step.
    ///
    /// The first frame is the initial placement, so the result holds
    /// `move_log.len() + 1` frames.
    pub fn frames(&self) -> Result<Vec<Frame>, EngineError> {
        let mut sim = Simulation::from_replay(self)?;
        let mut frames = Vec::with_capacity(self.move_log.len() + 1);
        frames.push(Frame::capture(&sim));
        for record in &self.move_log {
            sim.replay(*record)?;
            frames.push(Frame::capture(&sim));
        }
        Ok(frames)
    }

    /// Replays the whole log and returns the final simulation state.
    pub fn replay_to_end(&self) -> Result<Simulation, EngineError> {
        let mut sim = Simulation::from_replay(self)?;
        for record in &self.move_log {
            sim.replay(*record)?;
        }
        Ok(sim)
    }
}

/// A snapshot of the board for inspection and text rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub grid: Grid,
    pub body: Vec<Position>,
    pub heading: Direction,
    pub food: Option<Position>,
    pub moves: usize,
    pub state: EpisodeState,
}

impl Frame {
    #[must_use]
    pub fn capture(sim: &Simulation) -> Self {
        Self {
            grid: *sim.grid(),
            body: sim.snake().body().collect(),
            heading: sim.snake().heading(),
            food: sim.visible_food(),
            moves: sim.moves(),
            state: sim.state(),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.grid.width();
        writeln!(f, "+{}+", "-".repeat(width))?;
        for y in 0..self.grid.height() {
            write!(f, "|")?;
            for x in 0..width {
                let cell = self.grid.position_of(y * width + x);
                let ch = match cell {
                    Some(p) if self.body.first() == Some(&p) => '@',
                    Some(p) if self.body.contains(&p) => 'o',
                    Some(p) if self.food == Some(p) => '*',
                    _ => '.',
                };
                write!(f, "{ch}")?;
            }
            writeln!(f, "|")?;
        }
        write!(f, "+{}+", "-".repeat(width))
    }
}
