//! Fixed-step replay of a transcript through the overlay session.

use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use cadence_core::storage::{RecordingStore, StorageError};
use cadence_core::{CoreSignal, OverlaySession, SignalHandler};
use cadence_overlay::{FrameError, TimelineOverlay, TimelineView};
use thiserror::Error;

use crate::transcript::{Command, TranscriptEntry};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error(transparent)]
    Transcript(#[from] crate::transcript::TranscriptError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("no timeline with id '{0}'")]
    UnknownTimeline(String),
}

#[derive(Debug, Clone)]
pub struct ReplayOptions {
    pub tick: Duration,
    /// Minimum simulated time between printed frames
    pub frame_every_secs: f32,
    /// Extra time simulated after the last transcript entry
    pub tail_secs: f32,
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            frame_every_secs: 1.0,
            tail_secs: 1.0,
            snapshot_dir: None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReplaySummary {
    pub ticks: u64,
    pub frames: usize,
    pub signals: usize,
    pub recordings_saved: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────────────────────────────────────

/// Writes signals and frame summaries, one line each, prefixed with the
/// simulated time
pub struct Reporter<W: Write> {
    out: W,
    at_secs: f32,
    signals: usize,
    recordings_saved: usize,
    error: Option<std::io::Error>,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            at_secs: 0.0,
            signals: 0,
            recordings_saved: 0,
            error: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = writeln!(self.out, "[{:>7.1}s] {}", self.at_secs, text) {
            self.error = Some(e);
        }
    }

    fn frame(&mut self, overlay: &TimelineOverlay) {
        let layout = overlay.layout();
        let header = layout
            .header
            .as_ref()
            .map_or("-", |h| h.text.as_str())
            .to_string();
        let next = layout
            .markers
            .iter()
            .min_by(|a, b| a.time_until.total_cmp(&b.time_until))
            .map(|m| format!(" | next {} in {:.1}s", m.action_id, m.time_until))
            .unwrap_or_default();
        let text = format!(
            "frame {} | {} icons, {} texts, {} bands{}",
            header,
            layout.markers.len(),
            layout.texts.len(),
            layout.bands.len(),
            next
        );
        self.line(&text);
    }

    fn take_error(&mut self) -> Result<(), std::io::Error> {
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<W: Write> SignalHandler for Reporter<W> {
    fn handle_signal(&mut self, signal: &CoreSignal) {
        self.signals += 1;
        if matches!(signal, CoreSignal::RecordingSaved { .. }) {
            self.recordings_saved += 1;
        }
        self.line(&describe(signal));
    }
}

fn describe(signal: &CoreSignal) -> String {
    match signal {
        CoreSignal::TimelineActivated {
            timeline_id,
            territory_id,
        } => format!("timeline {} activated for territory {}", timeline_id, territory_id),
        CoreSignal::TimelineDeactivated { territory_id } => {
            format!("timeline deactivated (territory {})", territory_id)
        }
        CoreSignal::CountdownStarted { seconds } => format!("countdown started: {}s", seconds),
        CoreSignal::CountdownCancelled => "countdown cancelled".to_string(),
        CoreSignal::PullDetected { source } => format!("pull detected ({:?})", source),
        CoreSignal::PlaybackStateChanged { from, to } => format!("playback {:?} -> {:?}", from, to),
        CoreSignal::PlaybackCompleted { timeline_id } => {
            format!("playback of {} completed", timeline_id)
        }
        CoreSignal::RecordingArmed => "recording armed, waiting for pull".to_string(),
        CoreSignal::RecordingStarted => "recording started".to_string(),
        CoreSignal::RecordingSaved {
            recording_id,
            action_count,
        } => format!("recording {} saved ({} actions)", recording_id, action_count),
        CoreSignal::RecordingFailed { reason } => format!("recording failed: {}", reason),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Replay loop
// ─────────────────────────────────────────────────────────────────────────────

/// Step the session at a fixed tick until the transcript is exhausted and
/// playback has stopped.
pub fn run<W: Write>(
    session: &mut OverlaySession,
    overlay: &mut TimelineOverlay,
    entries: &[TranscriptEntry],
    store: &mut dyn RecordingStore,
    reporter: &mut Reporter<W>,
    options: &ReplayOptions,
) -> Result<ReplaySummary, ReplayError> {
    let tick_secs = options.tick.as_secs_f64().max(0.001);
    let end_secs = entries.last().map_or(0.0, |e| e.at_secs) + options.tail_secs.max(0.0);
    let start = Instant::now();

    if let Some(dir) = &options.snapshot_dir {
        std::fs::create_dir_all(dir)?;
    }

    let mut summary = ReplaySummary::default();
    let mut next_entry = 0;
    let mut last_frame: Option<f32> = None;
    let mut dirty = false;
    let mut step: u64 = 0;

    loop {
        let elapsed = step as f64 * tick_secs;
        let at_secs = elapsed as f32;
        if at_secs > end_secs && !session.engine().is_running() {
            break;
        }
        let now = start + Duration::from_secs_f64(elapsed);
        reporter.at_secs = at_secs;

        while let Some(entry) = entries.get(next_entry).filter(|e| e.at_secs <= at_secs) {
            apply(session, &entry.command, now, store, reporter);
            next_entry += 1;
        }

        let signals = session.tick(now, store);
        reporter.handle_signals(&signals);

        let look_ahead = session.config().overlay.effective_look_ahead();
        let view =
            TimelineView::from_engine(session.engine(), look_ahead, session.countdown_remaining(now));
        dirty |= overlay.update_data(view);
        let due = last_frame.is_none_or(|t| at_secs - t >= options.frame_every_secs);
        if dirty && due {
            overlay.render();
            reporter.frame(overlay);
            if let Some(dir) = &options.snapshot_dir {
                let millis = (elapsed * 1000.0).round() as u64;
                overlay
                    .frame()
                    .save_png(dir.join(format!("frame_{:08}.png", millis)))?;
            }
            last_frame = Some(at_secs);
            dirty = false;
            summary.frames += 1;
        }

        reporter.take_error()?;
        step += 1;
    }

    summary.ticks = step;
    summary.signals = reporter.signals;
    summary.recordings_saved = reporter.recordings_saved;
    tracing::info!(
        ticks = summary.ticks,
        frames = summary.frames,
        signals = summary.signals,
        "Replay finished"
    );
    Ok(summary)
}

fn apply<W: Write>(
    session: &mut OverlaySession,
    command: &Command,
    now: Instant,
    store: &mut dyn RecordingStore,
    reporter: &mut Reporter<W>,
) {
    match command {
        Command::Event(event) => session.push_event(event.clone()),
        Command::StartRecording(mode) => {
            if !session.start_recording(*mode, now) {
                tracing::warn!(?mode, "Recording not started");
            }
        }
        Command::StopRecording => {
            if session.stop_recording(now, store).is_none() {
                tracing::warn!("stop_record with no active recording");
            }
        }
    }
    // Tick per command so each one sees the effects of the one before
    let signals = session.tick(now, store);
    reporter.handle_signals(&signals);
}
