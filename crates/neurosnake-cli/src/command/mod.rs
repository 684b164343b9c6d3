use clap::{Parser, Subcommand};

use self::{play::PlayArg, replay::ReplayArg, train::TrainArg};

mod play;
mod replay;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve snake controllers with a genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Play one episode with a trained controller and print its replay
    Play(#[clap(flatten)] PlayArg),
    /// Print every board of a recorded episode
    Replay(#[clap(flatten)] ReplayArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Replay(arg) => replay::run(&arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_every_requires_output() {
        let err = CommandArgs::try_parse_from(["neurosnake", "train", "--backup-every", "5"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let args = CommandArgs::try_parse_from([
            "neurosnake",
            "train",
            "--backup-every",
            "5",
            "--output",
            "population.json",
        ])
        .unwrap();
        assert!(matches!(args.mode, Mode::Train(_)));
        assert!(CommandArgs::try_parse_from(["neurosnake", "train"]).is_ok());
    }
}
