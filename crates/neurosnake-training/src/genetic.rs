//! Population of network controllers and the genetic operators over it.
//!
//! One generation runs these steps in order:
//!
//! 1. **Evaluate** - [`Population::record_evaluation`] stores the mean
//!    length, moves and fitness of each individual's trials, and the replay
//!    of its best trial
//! 2. **Select** - [`Population::select`] sorts by fitness, best first, and
//!    marks a prefix of survivors
//! 3. **Crossover** - [`Population::crossover`] overwrites every non-survivor
//!    with a uniform crossover of two distinct survivors chosen by
//!    fitness-proportional selection
//! 4. **Mutate** - [`Population::mutate`] perturbs individuals behind a
//!    protected prefix
//!
//! # Parent Selection
//!
//! The survivors' networks and fitness values are snapshotted before any
//! child is written, so a child overwritten earlier in the same pass can
//! never become a parent. The second parent is drawn with the first one
//! excluded. When every candidate has zero fitness, parents are drawn
//! uniformly.

use neurosnake_engine::EpisodeReplay;
use neurosnake_evaluator::{
    fitness,
    network::{Activation, LayerShape, Network, NetworkError, NetworkModel},
    session::TrialResult,
};
use neurosnake_stats::{descriptive::DescriptiveStats, weighted};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::summary::GenerationStats;

/// A network controller and its most recent evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "IndividualModel", into = "IndividualModel")]
pub struct Individual {
    network: Network,
    length: f64,
    moves: f64,
    fitness: f64,
    survive: bool,
    replay: Option<EpisodeReplay>,
}

/// Export format of an [`Individual`]: the network fields plus its stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualModel {
    #[serde(flatten)]
    pub network: NetworkModel,
    pub length: f64,
    pub moves: f64,
    pub fitness: f64,
    pub survive: bool,
    pub replay: Option<EpisodeReplay>,
}

impl Individual {
    /// Creates an unevaluated individual.
    #[must_use]
    pub fn new(network: Network) -> Self {
        Self {
            network,
            length: 0.0,
            moves: 0.0,
            fitness: 0.0,
            survive: false,
            replay: None,
        }
    }

    #[must_use]
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Mean final length over the last evaluation's trials.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }

    #[must_use]
    pub fn moves(&self) -> f64 {
        self.moves
    }

    #[must_use]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    #[must_use]
    pub fn survive(&self) -> bool {
        self.survive
    }

    /// Replay of the best-fitness trial of the last evaluation.
    #[must_use]
    pub fn replay(&self) -> Option<&EpisodeReplay> {
        self.replay.as_ref()
    }

    /// Folds the trials of one evaluation into the individual's stats.
    ///
    /// `cells` is the board size, the largest reachable length.
    #[expect(clippy::cast_precision_loss)]
    pub fn record_trials(&mut self, trials: Vec<TrialResult>, cells: usize) {
        let scores = trials.iter().map(|t| t.fitness(cells)).collect::<Vec<_>>();
        let lengths = trials.iter().map(|t| t.length as f64).collect::<Vec<_>>();
        let moves = trials.iter().map(|t| t.moves as f64).collect::<Vec<_>>();
        self.length = fitness::mean(&lengths);
        self.moves = fitness::mean(&moves);
        self.fitness = fitness::mean(&scores);

        let mut best: Option<(f64, EpisodeReplay)> = None;
        for (score, trial) in scores.into_iter().zip(trials) {
            if best.as_ref().is_none_or(|(b, _)| score > *b) {
                best = Some((score, trial.replay));
            }
        }
        self.replay = best.map(|(_, replay)| replay);
    }

    #[must_use]
    pub fn to_model(&self) -> IndividualModel {
        self.clone().into()
    }
}

impl TryFrom<IndividualModel> for Individual {
    type Error = NetworkError;

    fn try_from(model: IndividualModel) -> Result<Self, Self::Error> {
        Ok(Self {
            network: Network::from_model(model.network)?,
            length: model.length,
            moves: model.moves,
            fitness: model.fitness,
            survive: model.survive,
            replay: model.replay,
        })
    }
}

impl From<Individual> for IndividualModel {
    fn from(individual: Individual) -> Self {
        Self {
            network: individual.network.into(),
            length: individual.length,
            moves: individual.moves,
            fitness: individual.fitness,
            survive: individual.survive,
            replay: individual.replay,
        }
    }
}

/// Fixed-size list of individuals.
///
/// Order only carries meaning after [`select`](Self::select): index 0 is
/// then the generation's best.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// Creates `count` individuals with random networks.
    pub fn random<R>(
        count: usize,
        input_length: usize,
        layer_shapes: &[LayerShape],
        activation: Activation,
        rng: &mut R,
    ) -> Result<Self, NetworkError>
    where
        R: Rng + ?Sized,
    {
        let individuals = (0..count)
            .map(|_| {
                Network::random(input_length, layer_shapes.to_vec(), activation, rng)
                    .map(Individual::new)
                    .map_err(NetworkError::from)
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { individuals })
    }

    #[must_use]
    pub fn from_individuals(individuals: Vec<Individual>) -> Self {
        Self { individuals }
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// The first individual; the best one after [`select`](Self::select).
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.individuals.first()
    }

    /// Stores one evaluation per individual, in population order.
    ///
    /// # Panics
    ///
    /// Panics if `results` does not hold one entry per individual.
    pub fn record_evaluation(&mut self, results: Vec<Vec<TrialResult>>, cells: usize) {
        assert_eq!(results.len(), self.individuals.len(), "one result per individual");
        for (individual, trials) in self.individuals.iter_mut().zip(results) {
            individual.record_trials(trials, cells);
        }
    }

    /// Sorts by fitness, best first, and marks the first `survive_count`
    /// individuals as survivors.
    pub fn select(&mut self, survive_count: usize) {
        self.individuals.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
        for (i, individual) in self.individuals.iter_mut().enumerate() {
            individual.survive = i < survive_count;
        }
    }

    /// Replaces every non-survivor's network by a crossover of two distinct
    /// survivors.
    ///
    /// # Panics
    ///
    /// Panics if there are non-survivors but fewer than two survivors.
    pub fn crossover<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let parents = self
            .individuals
            .iter()
            .filter(|ind| ind.survive)
            .map(|ind| (ind.network.clone(), ind.fitness))
            .collect::<Vec<_>>();
        if parents.len() == self.individuals.len() {
            return;
        }
        assert!(parents.len() >= 2, "crossover needs at least two survivors");

        for child in self.individuals.iter_mut().filter(|ind| !ind.survive) {
            let first = pick_parent(&parents, None, rng);
            let second = pick_parent(&parents, Some(first), rng);
            child
                .network
                .crossover(&parents[first].0, &parents[second].0, rng);
        }
    }

    /// Mutates each individual after the first `protected` with probability
    /// `rate`, using `gene_rate` and `amount` per weight.
    pub fn mutate<R>(
        &mut self,
        protected: usize,
        rate: f64,
        gene_rate: f64,
        amount: f32,
        rng: &mut R,
    ) where
        R: Rng + ?Sized,
    {
        for individual in self.individuals.iter_mut().skip(protected) {
            if rng.random_bool(rate) {
                individual.network.mutate(gene_rate, amount, rng);
            }
        }
    }

    /// Fitness, length and moves statistics over all individuals.
    ///
    /// Returns `None` for an empty population.
    #[must_use]
    pub fn compute_stats(&self) -> Option<GenerationStats> {
        let stats_of =
            |f: fn(&Individual) -> f64| DescriptiveStats::new(self.individuals.iter().map(f));
        Some(GenerationStats {
            fitness: stats_of(Individual::fitness)?,
            length: stats_of(Individual::length)?,
            moves: stats_of(Individual::moves)?,
        })
    }
}

/// Fitness-proportional pick among `parents`, skipping `exclude`.
fn pick_parent<R>(parents: &[(Network, f64)], exclude: Option<usize>, rng: &mut R) -> usize
where
    R: Rng + ?Sized,
{
    let weight = |i: usize| {
        if Some(i) == exclude {
            0.0
        } else {
            parents[i].1
        }
    };
    weighted::select_index_by(parents.len(), weight, rng).unwrap_or_else(|| {
        // No positive fitness left: uniform over the allowed candidates.
        match exclude {
            Some(skip) => {
                let i = rng.random_range(0..parents.len() - 1);
                if i >= skip { i + 1 } else { i }
            }
            None => rng.random_range(0..parents.len()),
        }
    })
}
