//! Episode logic on top of the board geometry.
//!
//! - [`Snake`] - The agent's body and heading
//! - [`Simulation`] - One episode: agent, food, counters, termination and the move log
//! - [`MoveRecord`] / [`EpisodeReplay`] - Compact move log and what is needed to replay it
//! - [`Frame`] - Board snapshot produced while replaying, printable as text
//!
//! # Episode Flow
//!
//! 1. [`Simulation::reset`] picks a random head, heading and food cell
//! 2. [`Simulation::step`] moves the head one cell per call
//! 3. Eating grows the snake and places a new food on a free cell
//! 4. Reversing, leaving the board, biting itself, starving or filling the
//!    board ends the episode
//!
//! Replaying a recorded episode follows the same rules but takes food
//! placements from the log instead of the random generator.

pub use self::{replay::*, simulation::*, snake::*};

mod replay;
mod simulation;
mod snake;
