//! Accepted input file shapes.

use neurosnake_engine::EpisodeReplay;
use neurosnake_evaluator::network::{Network, NetworkModel};
use neurosnake_training::{genetic::IndividualModel, summary::GenerationSummary};
use serde::Deserialize;

/// A stored controller: an individual export or a bare network export.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ControllerFile {
    Individual(IndividualModel),
    Network(NetworkModel),
}

impl ControllerFile {
    pub fn into_network(self) -> anyhow::Result<Network> {
        let model = match self {
            ControllerFile::Individual(individual) => individual.network,
            ControllerFile::Network(network) => network,
        };
        Ok(Network::from_model(model)?)
    }
}

/// Anything that carries an episode replay.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ReplayFile {
    Replay(EpisodeReplay),
    Summary(Box<GenerationSummary>),
    Individual(Box<IndividualModel>),
}

impl ReplayFile {
    pub fn into_replay(self) -> anyhow::Result<EpisodeReplay> {
        match self {
            ReplayFile::Replay(replay) => Ok(replay),
            ReplayFile::Summary(summary) => summary
                .best_individual
                .replay()
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("best individual has no replay")),
            ReplayFile::Individual(individual) => individual
                .replay
                .ok_or_else(|| anyhow::anyhow!("individual has no replay")),
        }
    }
}
