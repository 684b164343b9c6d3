use std::path::PathBuf;

use anyhow::Context as _;
use neurosnake_engine::Grid;
use neurosnake_evaluator::session::EpisodeRunner;

use crate::{
    schema::ControllerFile,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Network or individual file (JSON format)
    #[arg(long)]
    model: PathBuf,
    /// Board width
    #[arg(long, default_value_t = 20)]
    width: usize,
    /// Board height
    #[arg(long, default_value_t = 20)]
    height: usize,
    /// Seed for start and food placement
    #[arg(long)]
    seed: Option<u64>,
    /// Replay output path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        model,
        width,
        height,
        seed,
        output,
    } = arg;

    let controller: ControllerFile = util::read_json_file("model", model)?;
    let network = controller.into_network()?;
    let grid = Grid::new(*width, *height)?;
    let mut runner = match seed {
        Some(seed) => EpisodeRunner::with_seed(grid, *seed),
        None => EpisodeRunner::new(grid),
    };
    let trial = runner
        .play(&network)
        .with_context(|| format!("Failed to play {}", model.display()))?;

    eprintln!("Episode finished");
    if let Some(cause) = trial.cause {
        eprintln!("  Cause: {cause}");
    }
    eprintln!("  Length: {}", trial.length);
    eprintln!("  Moves: {}", trial.moves);
    eprintln!("  Fitness: {:.3}", trial.fitness(grid.cells()));

    Output::save_json(&trial.replay, output.as_deref())
}
