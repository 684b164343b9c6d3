//! Deterministic snake simulation used as the fitness environment.
//!
//! - [`core`] - Positions, directions and grid addressing
//! - [`engine`] - The episode state machine and its replay encoding

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum EngineError {
    #[display("invalid grid dimensions {width}x{height}")]
    InvalidGrid { width: usize, height: usize },
    #[display("episode already terminated")]
    InvalidState,
    #[display("replay starts with the agent or food off the board, or on the same cell")]
    InvalidReplayStart,
    #[display("invalid move record {record} at step {step}: {reason}")]
    InvalidReplay {
        step: usize,
        record: MoveRecord,
        reason: ReplayMismatch,
    },
}

/// How a recorded step disagrees with the board it is replayed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ReplayMismatch {
    #[display("direction digit is not 0-3")]
    InvalidDirection,
    #[display("food recorded but none was eaten")]
    UnexpectedFood,
    #[display("food eaten but no new food recorded")]
    MissingFood,
    #[display("food index {index} is off the board")]
    FoodOutOfRange { index: usize },
    #[display("food index {index} is covered by the agent")]
    FoodOnAgent { index: usize },
}
