use anyhow::{Context, Result};
use artifact_recorder::replay::{ReplayDriver, Trace};
use artifact_recorder::{AudioFile, ChannelMicrophone, Config, NullEnvironment, PhaseController, ScriptedTracker};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn, Level};

/// Replay a recorded gaze trace through a recording session
#[derive(Debug, Parser)]
#[command(name = "artifact-recorder", version)]
struct Args {
    /// Gaze trace (JSON) to replay
    #[arg(long)]
    trace: PathBuf,

    /// Config file, without extension
    #[arg(long, default_value = "config/artifact-recorder")]
    config: String,

    /// Session name; a random one is generated when omitted
    #[arg(long)]
    session: Option<String>,

    /// WAV file played into the microphone; silence when omitted
    #[arg(long)]
    audio: Option<PathBuf>,

    /// Pace ticks in wall-clock time
    #[arg(long)]
    realtime: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let cfg = Config::load(&args.config)?;
    let session_config = cfg.session_config(args.session.clone())?;
    let sample_rate = session_config.sample_rate;
    let channels = cfg.audio.channels;

    info!("Artifact Recorder v{}", env!("CARGO_PKG_VERSION"));
    info!("Session directory: {}", session_config.session_dir().display());

    let trace = Trace::load(&args.trace)?;

    let tracker = ScriptedTracker::new();
    let (microphone, feed) = ChannelMicrophone::new(channels);
    let mut controller = PhaseController::new(
        session_config,
        Box::new(tracker.clone()),
        Box::new(microphone),
        Box::new(NullEnvironment),
    );

    let mut driver = ReplayDriver::new(tracker, feed, sample_rate, channels).realtime(args.realtime);
    if let Some(path) = &args.audio {
        let audio = AudioFile::open(path)?;
        anyhow::ensure!(
            audio.sample_rate == sample_rate,
            "Audio file is {}Hz but the session records at {}Hz",
            audio.sample_rate,
            sample_rate
        );
        driver = driver.with_audio(audio.to_channels(channels)?);
    }

    let stats = driver.run(&trace, &mut controller).await?;

    if let Some(report) = controller.last_export() {
        if !report.is_complete() {
            warn!("{} of the session files could not be written", report.errors().len());
        }
        info!("Output written to {}", report.artifact_dir.display());
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&stats).context("Failed to serialize session stats")?
    );

    Ok(())
}
