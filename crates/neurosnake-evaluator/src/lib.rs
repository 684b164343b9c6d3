//! Neural controller and fitness evaluation for snake agents.
//!
//! The crate has three layers:
//!
//! ```text
//! Episode runner (play trials, collect length/moves/replay)
//!     ↓ uses
//! Network (feature vector → direction)
//!     ↓ uses
//! Feature encoder (simulation state → 25 values)
//! ```
//!
//! - [`feature`] - The controller's entire sensory input
//! - [`network`] - Feed-forward network, its export format and genetic
//!   operators
//! - [`fitness`] - Scalar score of a finished trial
//! - [`session`] - Reusable per-thread runner that plays trials
//!
//! # Example
//!
//! ```
//! use neurosnake_engine::Grid;
//! use neurosnake_evaluator::{
//!     feature::FEATURE_COUNT,
//!     network::{Activation, Network, OUTPUT_LENGTH, layer_chain},
//!     session::EpisodeRunner,
//! };
//!
//! let shapes = layer_chain(FEATURE_COUNT, &[16], OUTPUT_LENGTH);
//! let network =
//!     Network::random(FEATURE_COUNT, shapes, Activation::Tanh, &mut rand::rng()).unwrap();
//! let grid = Grid::new(10, 10).unwrap();
//! let mut runner = EpisodeRunner::new(grid);
//! let trial = runner.play(&network).unwrap();
//! let fitness = trial.fitness(grid.cells());
//! println!("length {} after {} moves: {fitness}", trial.length, trial.moves);
//! ```

pub mod feature;
pub mod fitness;
pub mod network;
pub mod session;
