//! Evolution parameters.
//!
//! The JSON form uses camelCase keys and every field is optional:
//!
//! ```json
//! {
//!   "worldWidth": 20,
//!   "worldHeight": 20,
//!   "hiddenLayers": [18, 18],
//!   "activation": "TANH",
//!   "populationSize": 200,
//!   "surviveRate": 0.5,
//!   "populationMutationRate": 0.1,
//!   "geneMutationRate": 0.1,
//!   "mutationAmount": 0.5,
//!   "trials": 2,
//!   "threads": 8
//! }
//! ```

use std::{num::NonZero, thread};

use neurosnake_engine::Grid;
use neurosnake_evaluator::{
    feature::FEATURE_COUNT,
    network::{Activation, LayerShape, OUTPUT_LENGTH, TopologyError, layer_chain, validate_topology},
};
use serde::{Deserialize, Serialize};

/// Share of the survivors that is never mutated.
const PROTECTED_DIVISOR: usize = 20;
const UNPROTECTED_SHARE: f64 = 0.95;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("invalid world size {width}x{height}")]
    InvalidGrid { width: usize, height: usize },
    #[display("invalid hidden layers: {_0}")]
    InvalidTopology(TopologyError),
    #[display("{population} individuals at survive rate {rate} keep {survivors} survivors, need 2")]
    TooFewSurvivors {
        population: usize,
        rate: f64,
        survivors: usize,
    },
    #[display("{name} must be within [0, 1], got {value}")]
    RateOutOfRange { name: &'static str, value: f64 },
    #[display("mutation amount must be a non-negative number, got {amount}")]
    InvalidMutationAmount { amount: f32 },
    #[display("trials must be at least 1")]
    ZeroTrials,
    #[display("threads must be at least 1")]
    ZeroThreads,
    #[display("population has {actual} individuals, configuration expects {expected}")]
    PopulationSize { expected: usize, actual: usize },
    #[display("individual {index} does not match the configured network topology")]
    TopologyMismatch { index: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvolutionConfig {
    pub world_width: usize,
    pub world_height: usize,
    /// Hidden layer sizes between the feature vector and the four outputs.
    pub hidden_layers: Vec<usize>,
    pub activation: Activation,
    pub population_size: usize,
    /// Fraction of the population kept unchanged by crossover.
    pub survive_rate: f64,
    /// Probability that an individual is mutated at all.
    pub population_mutation_rate: f64,
    /// Probability that a single weight or bias of a mutated individual changes.
    pub gene_mutation_rate: f64,
    /// Largest perturbation applied to a mutated weight or bias.
    pub mutation_amount: f32,
    /// Episodes played per individual and generation.
    pub trials: usize,
    /// Evaluation worker threads.
    pub threads: usize,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            world_width: 20,
            world_height: 20,
            hidden_layers: vec![18, 18],
            activation: Activation::Tanh,
            population_size: 200,
            survive_rate: 0.5,
            population_mutation_rate: 0.1,
            gene_mutation_rate: 0.1,
            mutation_amount: 0.5,
            trials: 2,
            threads: thread::available_parallelism().map_or(1, NonZero::get),
        }
    }
}

impl EvolutionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid()?;
        validate_topology(FEATURE_COUNT, &self.layer_shapes())
            .map_err(ConfigError::InvalidTopology)?;

        let survivors = self.survive_count();
        if survivors < 2 {
            return Err(ConfigError::TooFewSurvivors {
                population: self.population_size,
                rate: self.survive_rate,
                survivors,
            });
        }
        for (name, value) in [
            ("surviveRate", self.survive_rate),
            ("populationMutationRate", self.population_mutation_rate),
            ("geneMutationRate", self.gene_mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RateOutOfRange { name, value });
            }
        }
        if !(self.mutation_amount >= 0.0 && self.mutation_amount.is_finite()) {
            return Err(ConfigError::InvalidMutationAmount {
                amount: self.mutation_amount,
            });
        }
        if self.trials == 0 {
            return Err(ConfigError::ZeroTrials);
        }
        if self.threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        Ok(())
    }

    pub fn grid(&self) -> Result<Grid, ConfigError> {
        Grid::new(self.world_width, self.world_height).map_err(|_| ConfigError::InvalidGrid {
            width: self.world_width,
            height: self.world_height,
        })
    }

    /// Layer chain from the feature vector through the hidden layers to the
    /// four outputs.
    #[must_use]
    pub fn layer_shapes(&self) -> Vec<LayerShape> {
        layer_chain(FEATURE_COUNT, &self.hidden_layers, OUTPUT_LENGTH)
    }

    /// `floor(population_size · survive_rate)`.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    #[must_use]
    pub fn survive_count(&self) -> usize {
        let count = (self.population_size as f64 * self.survive_rate).floor();
        if count.is_nan() || count < 0.0 {
            0
        } else {
            (count as usize).min(self.population_size)
        }
    }

    /// Leading individuals that are never mutated, 5% of the survivors.
    #[must_use]
    pub fn protected_count(&self) -> usize {
        self.survive_count() / PROTECTED_DIVISOR
    }

    /// Per-individual mutation probability for the unprotected individuals.
    ///
    /// Scaled up so the population as a whole is mutated at roughly
    /// `population_mutation_rate`.
    #[must_use]
    pub fn effective_mutation_rate(&self) -> f64 {
        (self.population_mutation_rate / UNPROTECTED_SHARE).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EvolutionConfig {
        EvolutionConfig {
            threads: 2,
            ..EvolutionConfig::default()
        }
    }

    #[test]
    fn test_default_is_valid() {
        config().validate().unwrap();
    }

    #[test]
    fn test_survivor_counts() {
        let config = EvolutionConfig {
            population_size: 200,
            survive_rate: 0.5,
            ..config()
        };
        assert_eq!(config.survive_count(), 100);
        assert_eq!(config.protected_count(), 5);

        let config = EvolutionConfig {
            population_size: 7,
            survive_rate: 0.3,
            ..config
        };
        assert_eq!(config.survive_count(), 2);
        assert_eq!(config.protected_count(), 0);
    }

    #[test]
    fn test_too_few_survivors() {
        let config = EvolutionConfig {
            population_size: 5,
            survive_rate: 0.3,
            ..config()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooFewSurvivors { survivors: 1, .. })
        ));
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let cases = [
            EvolutionConfig {
                world_width: 0,
                ..config()
            },
            EvolutionConfig {
                hidden_layers: vec![8, 0],
                ..config()
            },
            EvolutionConfig {
                gene_mutation_rate: 1.5,
                ..config()
            },
            EvolutionConfig {
                population_mutation_rate: -0.1,
                ..config()
            },
            EvolutionConfig {
                mutation_amount: -1.0,
                ..config()
            },
            EvolutionConfig {
                trials: 0,
                ..config()
            },
            EvolutionConfig {
                threads: 0,
                ..config()
            },
        ];
        for case in cases {
            assert!(case.validate().is_err(), "{case:?}");
        }
    }

    #[test]
    fn test_effective_mutation_rate() {
        let config = EvolutionConfig {
            population_mutation_rate: 0.19,
            ..config()
        };
        assert!((config.effective_mutation_rate() - 0.2).abs() < 1e-12);
        let config = EvolutionConfig {
            population_mutation_rate: 1.0,
            ..config
        };
        assert!((config.effective_mutation_rate() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_json() {
        let json = r#"{ "worldWidth": 12, "hiddenLayers": [], "activation": "RELU" }"#;
        let config: EvolutionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.world_width, 12);
        assert_eq!(config.world_height, 20);
        assert_eq!(config.activation, Activation::Relu);
        assert_eq!(config.layer_shapes(), [LayerShape::new(4, 25)]);
    }
}
