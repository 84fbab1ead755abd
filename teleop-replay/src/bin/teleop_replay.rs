use anyhow::{Context, Result};
use clap::Parser;
use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
use teleop_controller::arm_config::TeleopConfig;
use teleop_replay::{
    logging,
    session::{Replay, SessionEvent},
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Parser)]
#[command(author, version)]
struct Args {
    /// Recorded session, one JSON event per line
    #[arg()]
    session: PathBuf,

    /// Teleop configuration in json or yaml, the included one if omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sets the level of verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::setup_tracing(args.verbose);

    let config = match &args.config {
        Some(path) => TeleopConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => TeleopConfig::included(),
    };
    let mut replay = Replay::new(&config)?;

    let session = tokio::fs::File::open(&args.session)
        .await
        .with_context(|| format!("Failed to open session {}", args.session.display()))?;
    let mut lines = BufReader::new(session).lines();
    let mut stdout = tokio::io::stdout();

    let keep_running = Arc::new(AtomicBool::new(true));

    tokio::spawn({
        let keep_running = keep_running.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Detected Ctrl+c");
                keep_running.store(false, Ordering::Relaxed);
            }
        }
    });

    let mut line_number = 0;
    while keep_running.load(Ordering::Relaxed) {
        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break,
        };
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }
        let event: SessionEvent = serde_json::from_str(&line)
            .with_context(|| format!("Malformed event on line {}", line_number))?;
        let outputs = replay
            .apply(event)
            .with_context(|| format!("Failed to replay line {}", line_number))?;
        for output in outputs.iter().filter(|output| output.has_command()) {
            let mut json = serde_json::to_vec(output)?;
            json.push(b'\n');
            stdout.write_all(&json).await?;
        }
    }
    stdout.flush().await?;

    let stats = replay.stats();
    tracing::info!(
        lines = line_number,
        tracking = stats.tracking_updates,
        feedback = stats.feedback_updates,
        accepted = stats.accepted,
        rejected = stats.rejected,
        no_solution = stats.no_solution,
        "Replay finished"
    );
    Ok(())
}
