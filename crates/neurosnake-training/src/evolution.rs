//! Generation loop driving the population through the evaluation pool.

use std::{
    sync::{Mutex, MutexGuard, TryLockError},
    time::Instant,
};

use chrono::Utc;
use neurosnake_engine::Grid;
use neurosnake_evaluator::{
    feature::FEATURE_COUNT,
    network::NetworkError,
};
use tracing::info;

use crate::{
    config::{ConfigError, EvolutionConfig},
    genetic::Population,
    pool::{EvaluationPool, EvaluationTask, PoolError},
    snapshot::PopulationSnapshot,
    summary::GenerationSummary,
};

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum EvolveError {
    #[display("invalid configuration: {_0}")]
    InvalidConfig(ConfigError),
    #[display("invalid network: {_0}")]
    InvalidNetwork(NetworkError),
    #[display("evaluation failed: {_0}")]
    Evaluation(PoolError),
    #[display("a generation is already running")]
    #[from(ignore)]
    AlreadyRunning,
    #[display("a previous generation panicked")]
    #[from(ignore)]
    Poisoned,
    #[display("population is empty")]
    #[from(ignore)]
    EmptyPopulation,
}

#[derive(Debug)]
struct EvolutionState {
    population: Population,
    generation: usize,
}

/// Owns the population, its configuration, and the evaluation pool.
///
/// [`evolve`](Self::evolve) takes `&self` and refuses to start while another
/// generation holds the population.
#[derive(Debug)]
pub struct Evolution {
    config: EvolutionConfig,
    grid: Grid,
    pool: EvaluationPool,
    state: Mutex<EvolutionState>,
}

impl Evolution {
    /// Starts from a random population.
    pub fn new(config: EvolutionConfig) -> Result<Self, EvolveError> {
        config.validate()?;
        let population = Population::random(
            config.population_size,
            FEATURE_COUNT,
            &config.layer_shapes(),
            config.activation,
            &mut rand::rng(),
        )?;
        Self::with_population(config, population, 0)
    }

    /// Continues from a saved population, keeping its generation count.
    pub fn resume(snapshot: PopulationSnapshot) -> Result<Self, EvolveError> {
        let PopulationSnapshot {
            generation,
            config,
            individuals,
            ..
        } = snapshot;
        config.validate()?;
        if individuals.len() != config.population_size {
            return Err(ConfigError::PopulationSize {
                expected: config.population_size,
                actual: individuals.len(),
            }
            .into());
        }
        let shapes = config.layer_shapes();
        if let Some(index) = individuals.iter().position(|ind| {
            ind.network().input_length() != FEATURE_COUNT || ind.network().layer_shapes() != shapes
        }) {
            return Err(ConfigError::TopologyMismatch { index }.into());
        }
        Self::with_population(config, Population::from_individuals(individuals), generation)
    }

    fn with_population(
        config: EvolutionConfig,
        population: Population,
        generation: usize,
    ) -> Result<Self, EvolveError> {
        let grid = config.grid()?;
        let pool = EvaluationPool::new(config.threads)?;
        info!(
            population = population.len(),
            threads = pool.size(),
            width = grid.width(),
            height = grid.height(),
            generation,
            "evolution ready"
        );
        Ok(Self {
            config,
            grid,
            pool,
            state: Mutex::new(EvolutionState {
                population,
                generation,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Number of completed generations.
    pub fn generation(&self) -> Result<usize, EvolveError> {
        Ok(self.lock()?.generation)
    }

    /// Runs one generation: evaluate, select, crossover, mutate.
    ///
    /// Fails with [`EvolveError::AlreadyRunning`] when another call is in
    /// progress. A failed evaluation leaves the population untouched.
    pub fn evolve(&self) -> Result<GenerationSummary, EvolveError> {
        let mut state = match self.state.try_lock() {
            Ok(state) => state,
            Err(TryLockError::WouldBlock) => return Err(EvolveError::AlreadyRunning),
            Err(TryLockError::Poisoned(_)) => return Err(EvolveError::Poisoned),
        };
        let start = Instant::now();
        let mut rng = rand::rng();

        let tasks = state
            .population
            .individuals()
            .iter()
            .map(|ind| EvaluationTask {
                grid: self.grid,
                trials: self.config.trials,
                network: ind.network().to_model(),
            })
            .collect();
        let results = self.pool.evaluate_batch(tasks)?;

        let population = &mut state.population;
        population.record_evaluation(results, self.grid.cells());
        population.select(self.config.survive_count());
        let stats = population
            .compute_stats()
            .ok_or(EvolveError::EmptyPopulation)?;
        let best_individual = population
            .best()
            .cloned()
            .ok_or(EvolveError::EmptyPopulation)?;
        population.crossover(&mut rng);
        population.mutate(
            self.config.protected_count(),
            self.config.effective_mutation_rate(),
            self.config.gene_mutation_rate,
            self.config.mutation_amount,
            &mut rng,
        );

        state.generation += 1;
        let summary = GenerationSummary {
            generation: state.generation,
            best_individual,
            time_spent_seconds: start.elapsed().as_secs_f64(),
            stats,
        };
        info!(
            generation = summary.generation,
            best_fitness = summary.stats.fitness.max,
            mean_fitness = summary.stats.fitness.mean,
            best_length = summary.best_individual.length(),
            mean_length = summary.stats.length.mean,
            mean_moves = summary.stats.moves.mean,
            seconds = summary.time_spent_seconds,
            "generation evolved"
        );
        Ok(summary)
    }

    /// Runs `times` generations and returns their summaries.
    pub fn evolve_many(&self, times: usize) -> Result<Vec<GenerationSummary>, EvolveError> {
        (0..times).map(|_| self.evolve()).collect()
    }

    /// Copies the current population, waiting for a running generation to
    /// finish.
    pub fn snapshot(&self) -> Result<PopulationSnapshot, EvolveError> {
        let state = self.lock()?;
        Ok(PopulationSnapshot {
            generation: state.generation,
            saved_at: Utc::now(),
            config: self.config.clone(),
            individuals: state.population.individuals().to_vec(),
        })
    }

    /// Stops the evaluation workers after their current tasks.
    pub fn shutdown(self) {
        let Self { mut pool, .. } = self;
        pool.shutdown();
        info!("evolution shut down");
    }

    fn lock(&self) -> Result<MutexGuard<'_, EvolutionState>, EvolveError> {
        self.state.lock().map_err(|_| EvolveError::Poisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> EvolutionConfig {
        EvolutionConfig {
            world_width: 6,
            world_height: 6,
            hidden_layers: vec![4],
            population_size: 8,
            survive_rate: 0.5,
            trials: 1,
            threads: 2,
            ..EvolutionConfig::default()
        }
    }

    #[test]
    fn test_evolve_while_running_is_rejected() {
        let evolution = Evolution::new(small_config()).unwrap();
        let _guard = evolution.state.lock().unwrap();
        assert!(matches!(evolution.evolve(), Err(EvolveError::AlreadyRunning)));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EvolutionConfig {
            population_size: 3,
            ..small_config()
        };
        assert!(matches!(
            Evolution::new(config),
            Err(EvolveError::InvalidConfig(ConfigError::TooFewSurvivors { .. }))
        ));
    }

    #[test]
    fn test_generation_counter() {
        let evolution = Evolution::new(small_config()).unwrap();
        assert_eq!(evolution.generation().unwrap(), 0);
        let summaries = evolution.evolve_many(2).unwrap();
        assert_eq!(summaries[0].generation, 1);
        assert_eq!(summaries[1].generation, 2);
        assert_eq!(evolution.generation().unwrap(), 2);
        evolution.shutdown();
    }

    #[test]
    fn test_resume_rejects_mismatched_population() {
        let evolution = Evolution::new(small_config()).unwrap();
        let mut snapshot = evolution.snapshot().unwrap();
        snapshot.individuals.pop();
        assert!(matches!(
            Evolution::resume(snapshot.clone()),
            Err(EvolveError::InvalidConfig(ConfigError::PopulationSize {
                expected: 8,
                actual: 7
            }))
        ));

        snapshot.config.population_size = 7;
        snapshot.config.hidden_layers = vec![5];
        assert!(matches!(
            Evolution::resume(snapshot),
            Err(EvolveError::InvalidConfig(ConfigError::TopologyMismatch { index: 0 }))
        ));
    }
}
