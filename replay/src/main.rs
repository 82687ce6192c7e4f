//! Drive the Cadence core from a scripted transcript.
//!
//! Loads timelines, replays host events at a fixed tick rate and prints
//! every signal plus a summary of the rendered overlay frames.

mod logging;
mod runner;
mod transcript;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use cadence_core::storage::parse_timeline_document;
use cadence_core::{
    AppConfig, JsonDirectoryStore, MemoryStore, OverlaySession, RecordingStore, TimelineLibrary,
    TimelineStore,
};
use cadence_overlay::TimelineOverlay;
use cadence_types::TimelineLayout;
use clap::{Parser, ValueEnum};

use crate::runner::{ReplayError, ReplayOptions, Reporter};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LayoutArg {
    Horizontal,
    VerticalList,
    VerticalScroll,
}

impl From<LayoutArg> for TimelineLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Horizontal => TimelineLayout::Horizontal,
            LayoutArg::VerticalList => TimelineLayout::VerticalList,
            LayoutArg::VerticalScroll => TimelineLayout::VerticalScroll,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "cadence-replay", about = "Replay a host event transcript against timelines")]
struct Args {
    /// Host event transcript
    #[arg(long)]
    transcript: PathBuf,

    /// Timeline JSON document (repeatable)
    #[arg(long = "timeline", short = 't')]
    timelines: Vec<PathBuf>,

    /// Storage root to load timelines from (`<root>/timelines/*.json`)
    #[arg(long = "store")]
    store: Option<PathBuf>,

    /// Load this timeline up front instead of waiting for a territory change
    #[arg(long)]
    activate: Option<String>,

    /// TOML config file (defaults to the user config)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,

    /// Seconds of timeline shown ahead of the current time
    #[arg(long = "look-ahead")]
    look_ahead: Option<f32>,

    #[arg(long, default_value_t = 420)]
    width: u32,

    #[arg(long, default_value_t = 110)]
    height: u32,

    #[arg(long = "tick-ms", default_value_t = 100)]
    tick_ms: u64,

    /// Minimum simulated seconds between printed frames
    #[arg(long = "frame-every", default_value_t = 1.0)]
    frame_every: f32,

    /// Save recordings here instead of keeping them in memory
    #[arg(long = "record-dir")]
    record_dir: Option<PathBuf>,

    /// Write a PNG of every printed frame into this directory
    #[arg(long = "snapshot-dir")]
    snapshot_dir: Option<PathBuf>,

    #[arg(long = "log-dir", env = "CADENCE_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let _guard = logging::init_logging(args.log_dir.as_deref(), args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Replay failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), ReplayError> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from_path(path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Using default config");
            AppConfig::default()
        }),
        None => AppConfig::load(),
    };
    if let Some(layout) = args.layout {
        config.overlay.layout = layout.into();
    }
    if let Some(look_ahead) = args.look_ahead {
        config.overlay.look_ahead_secs = look_ahead;
    }

    let library = load_library(&args)?;
    tracing::info!(timelines = library.len(), "Timelines loaded");

    let entries = transcript::load(&args.transcript)?;
    tracing::info!(entries = entries.len(), path = %args.transcript.display(), "Transcript loaded");

    let mut overlay = TimelineOverlay::new(args.width, args.height, config.overlay.clone(), "Timeline")?;
    let mut session = OverlaySession::new(config, library);
    if let Some(id) = &args.activate
        && !session.activate_timeline(id)
    {
        return Err(ReplayError::UnknownTimeline(id.clone()));
    }

    let mut store: Box<dyn RecordingStore> = match &args.record_dir {
        Some(dir) => Box::new(JsonDirectoryStore::new(dir)),
        None => Box::new(MemoryStore::new()),
    };

    let options = ReplayOptions {
        tick: Duration::from_millis(args.tick_ms.max(1)),
        frame_every_secs: args.frame_every.max(0.0),
        snapshot_dir: args.snapshot_dir.clone(),
        ..ReplayOptions::default()
    };

    let stdout = std::io::stdout();
    let mut reporter = Reporter::new(stdout.lock());
    let summary = runner::run(
        &mut session,
        &mut overlay,
        &entries,
        store.as_mut(),
        &mut reporter,
        &options,
    )?;
    drop(reporter);

    println!(
        "{} ticks, {} frames, {} signals, {} recordings saved",
        summary.ticks, summary.frames, summary.signals, summary.recordings_saved
    );
    Ok(())
}

fn load_library(args: &Args) -> Result<TimelineLibrary, ReplayError> {
    let mut timelines = match &args.store {
        Some(root) => JsonDirectoryStore::new(root).load_timelines()?,
        None => Vec::new(),
    };
    for path in &args.timelines {
        let text = std::fs::read_to_string(path).map_err(|source| {
            cadence_core::StorageError::Io {
                path: path.clone(),
                source,
            }
        })?;
        timelines.push(parse_timeline_document(path, &text)?);
    }
    Ok(TimelineLibrary::from_timelines(timelines))
}
