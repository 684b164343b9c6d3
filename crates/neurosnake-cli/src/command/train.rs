use std::path::PathBuf;

use anyhow::Context as _;
use neurosnake_evaluator::network::Activation;
use neurosnake_training::{
    config::EvolutionConfig, evolution::Evolution, summary::GenerationSummary,
};
use tracing::info;

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Evolution configuration file (JSON format)
    #[arg(long, conflicts_with = "resume")]
    config: Option<PathBuf>,
    /// Population snapshot to continue from
    #[arg(long)]
    resume: Option<PathBuf>,
    /// Number of generations to run
    #[arg(long, default_value_t = 100)]
    generations: usize,
    /// Write a snapshot to the output file every N generations (0 disables)
    #[arg(long, default_value_t = 0, requires = "output")]
    backup_every: usize,
    /// Snapshot output path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Write the best individual of the last generation to this file
    #[arg(long)]
    best: Option<PathBuf>,
    /// Number of evaluation threads
    #[arg(long)]
    threads: Option<usize>,
    /// Episodes per individual and generation
    #[arg(long)]
    trials: Option<usize>,
    /// Board width
    #[arg(long)]
    width: Option<usize>,
    /// Board height
    #[arg(long)]
    height: Option<usize>,
    /// Number of individuals
    #[arg(long)]
    population_size: Option<usize>,
    /// Hidden layer activation (linear, tanh or relu)
    #[arg(long)]
    activation: Option<Activation>,
}

impl TrainArg {
    fn apply_overrides(&self, config: &mut EvolutionConfig) {
        let overrides = [
            (self.threads, &mut config.threads),
            (self.trials, &mut config.trials),
            (self.width, &mut config.world_width),
            (self.height, &mut config.world_height),
            (self.population_size, &mut config.population_size),
        ];
        for (value, field) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }
        if let Some(activation) = self.activation {
            config.activation = activation;
        }
    }
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let evolution = if let Some(path) = &arg.resume {
        let mut snapshot = util::read_snapshot_file(path)?;
        arg.apply_overrides(&mut snapshot.config);
        eprintln!(
            "Resuming {} individuals at generation {} from {}",
            snapshot.individuals.len(),
            snapshot.generation,
            path.display()
        );
        Evolution::resume(snapshot)
            .with_context(|| format!("Failed to resume from {}", path.display()))?
    } else {
        let mut config = match &arg.config {
            Some(path) => util::read_config_file(path)?,
            None => EvolutionConfig::default(),
        };
        arg.apply_overrides(&mut config);
        Evolution::new(config).context("Failed to start evolution")?
    };

    let mut last: Option<GenerationSummary> = None;
    for done in 1..=arg.generations {
        let summary = evolution.evolve()?;
        if arg.backup_every > 0
            && done % arg.backup_every == 0
            && done < arg.generations
            && let Some(path) = &arg.output
        {
            Output::save_json(&evolution.snapshot()?, Some(path.as_path()))?;
            info!(generation = summary.generation, path = %path.display(), "backup saved");
        }
        last = Some(summary);
    }

    let snapshot = evolution.snapshot()?;
    evolution.shutdown();
    Output::save_json(&snapshot, arg.output.as_deref())?;

    eprintln!();
    eprintln!("Training completed");
    if let Some(path) = &arg.output {
        eprintln!("  Snapshot: {}", path.display());
    }
    eprintln!("  Generation: {}", snapshot.generation);
    if let Some(summary) = &last {
        let best = &summary.best_individual;
        eprintln!("  Best fitness: {:.3}", best.fitness());
        eprintln!("  Best length: {:.2}", best.length());
        eprintln!("  Best moves: {:.2}", best.moves());
        if let Some(path) = &arg.best {
            Output::save_json(best, Some(path.as_path()))?;
            eprintln!("  Best individual: {}", path.display());
        }
    }

    Ok(())
}
