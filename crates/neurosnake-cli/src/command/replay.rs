use std::{
    io::{self, Write as _},
    path::PathBuf,
    thread,
    time::Duration,
};

use anyhow::Context as _;

use crate::{schema::ReplayFile, util};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ReplayArg {
    /// Replay, individual, or generation summary file (JSON format)
    #[arg(long)]
    input: PathBuf,
    /// Pause between frames in milliseconds
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,
}

pub(crate) fn run(arg: &ReplayArg) -> anyhow::Result<()> {
    let ReplayArg { input, delay_ms } = arg;

    let file: ReplayFile = util::read_json_file("replay", input)?;
    let replay = file.into_replay()?;
    let frames = replay
        .frames()
        .with_context(|| format!("Failed to replay {}", input.display()))?;
    eprintln!("Loaded {} moves", replay.move_log.len());

    let mut stdout = io::stdout().lock();
    for frame in &frames {
        writeln!(stdout, "move {} length {}", frame.moves, frame.body.len())?;
        writeln!(stdout, "{frame}")?;
        stdout.flush()?;
        if *delay_ms > 0 {
            thread::sleep(Duration::from_millis(*delay_ms));
        }
    }
    if let Some(cause) = frames.last().and_then(|f| f.state.terminal_cause()) {
        writeln!(stdout, "ended: {cause}")?;
    }
    Ok(())
}
