//! Neuro-evolution of snake controllers.
//!
//! A population of feed-forward networks is evolved with a genetic
//! algorithm. Fitness comes from playing whole episodes on a worker pool.
//!
//! # Architecture
//!
//! ```text
//! Evolution (one generation per evolve call)
//!     ↓ submits one task per individual to
//! EvaluationPool (fixed worker threads, each with its own episode runner)
//!     ↓ returns trials to
//! Population (record → select → crossover → mutate)
//!     ↓ produces
//! GenerationSummary
//! ```
//!
//! - [`config`] - Evolution parameters and their validation
//! - [`pool`] - Worker threads evaluating networks in parallel
//! - [`genetic`] - Individuals, population and genetic operators
//! - [`evolution`] - The generation loop, snapshots and resuming
//! - [`summary`] - Per-generation statistics
//! - [`snapshot`] - Saved population format
//!
//! # Example
//!
//! ```no_run
//! use neurosnake_training::{config::EvolutionConfig, evolution::Evolution};
//!
//! let evolution = Evolution::new(EvolutionConfig::default())?;
//! for summary in evolution.evolve_many(10)? {
//!     println!("{}: best {}", summary.generation, summary.stats.fitness.max);
//! }
//! let snapshot = evolution.snapshot()?;
//! evolution.shutdown();
//! # let _ = snapshot;
//! # Ok::<(), neurosnake_training::evolution::EvolveError>(())
//! ```

pub mod config;
pub mod evolution;
pub mod genetic;
pub mod pool;
pub mod snapshot;
pub mod summary;
