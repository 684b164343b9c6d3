//! Runs a controller through whole episodes.
//!
//! [`EpisodeRunner`] owns one [`Simulation`] and one [`FeatureEncoder`] and
//! reuses them across trials. Evaluation workers keep a runner per thread
//! and only rebuild it when the board size changes.

use neurosnake_engine::{EngineError, EpisodeReplay, Grid, Simulation, TerminalCause};

use crate::{
    feature::{FEATURE_COUNT, FeatureEncoder},
    fitness,
    network::Network,
};

/// Why an episode could not be played.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PlayError {
    #[display("network takes {actual} inputs, features have {expected}")]
    InputLength { expected: usize, actual: usize },
    #[display("simulation failed: {_0}")]
    Simulation(EngineError),
}

/// Outcome of one trial episode.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialResult {
    pub length: usize,
    pub moves: usize,
    pub cause: Option<TerminalCause>,
    pub replay: EpisodeReplay,
}

impl TrialResult {
    /// Fitness of this trial on a board of `cells` cells.
    #[must_use]
    pub fn fitness(&self, cells: usize) -> f64 {
        fitness::fitness(self.moves, self.length, cells)
    }
}

/// Reusable simulation and encoder for one board size.
#[derive(Debug, Clone)]
pub struct EpisodeRunner {
    sim: Simulation,
    encoder: FeatureEncoder,
    features: [f32; FEATURE_COUNT],
}

impl EpisodeRunner {
    #[must_use]
    pub fn new(grid: Grid) -> Self {
        Self::from_simulation(Simulation::new(grid))
    }

    /// Creates a runner whose food and start placements derive from `seed`.
    #[must_use]
    pub fn with_seed(grid: Grid, seed: u64) -> Self {
        Self::from_simulation(Simulation::with_seed(grid, seed))
    }

    fn from_simulation(sim: Simulation) -> Self {
        let encoder = FeatureEncoder::new(*sim.grid());
        Self {
            sim,
            encoder,
            features: [0.0; FEATURE_COUNT],
        }
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        self.sim.grid()
    }

    /// Rebuilds the runner when `grid` differs from the current one.
    pub fn ensure_grid(&mut self, grid: Grid) {
        if *self.grid() != grid {
            *self = Self::new(grid);
        }
    }

    /// Plays one fresh episode to the end.
    ///
    /// Fails without touching the simulation when the network does not take
    /// [`FEATURE_COUNT`] inputs.
    pub fn play(&mut self, network: &Network) -> Result<TrialResult, PlayError> {
        if network.input_length() != FEATURE_COUNT {
            return Err(PlayError::InputLength {
                expected: FEATURE_COUNT,
                actual: network.input_length(),
            });
        }
        self.sim.reset();
        while !self.sim.is_terminal() {
            self.encoder.encode_into(&self.sim, &mut self.features);
            let direction = network.compute(&self.features);
            self.sim.step(direction).map_err(PlayError::Simulation)?;
        }
        Ok(TrialResult {
            length: self.sim.len(),
            moves: self.sim.moves(),
            cause: self.sim.terminal_cause(),
            replay: self.sim.to_replay(),
        })
    }

    /// Plays `trials` episodes in sequence.
    pub fn play_trials(
        &mut self,
        network: &Network,
        trials: usize,
    ) -> Result<Vec<TrialResult>, PlayError> {
        (0..trials).map(|_| self.play(network)).collect()
    }
}
