//! Per-tick orchestration of the overlay core.
//!
//! ```text
//!  host feeds ──push_event──► pending queue
//!                                  │ tick(now)
//!                                  ▼
//!   TerritoryChanged ──► DutyBinder ──► PlaybackEngine
//!   SystemMessage ─────► CountdownDetector ──► engine / recorder
//!   CombatStateChanged ► engine auto-start / stop, recorder triggers
//!   ActionUsed ────────► ActionRecorder
//!                                  │
//!            detector.update ──► engine.update ──► drained CoreSignals
//! ```

#[cfg(test)]
mod session_tests;

use std::collections::VecDeque;
use std::time::Instant;

use cadence_types::RecordingMode;

use crate::context::AppConfig;
use crate::countdown::{CountdownDetector, CountdownSignal};
use crate::duty::DutyBinder;
use crate::events::{CoreSignal, HostEvent, PullSource};
use crate::playback::{PlaybackEngine, PlaybackEvent, PlaybackState};
use crate::recorder::{ActionRecorder, RecordedEncounter, RecorderState};
use crate::storage::{RecordingStore, StorageError};
use crate::timeline::{Timeline, TimelineLibrary};

/// A pull signal this close to time zero re-synchronises a running playback
const PULL_RESYNC_WINDOW_SECS: f32 = 1.0;

pub struct OverlaySession {
    config: AppConfig,
    library: TimelineLibrary,
    engine: PlaybackEngine,
    detector: CountdownDetector,
    binder: DutyBinder,
    recorder: ActionRecorder,
    pending: VecDeque<HostEvent>,
    signals: Vec<CoreSignal>,
    in_combat: bool,
}

impl OverlaySession {
    pub fn new(config: AppConfig, library: TimelineLibrary) -> Self {
        Self {
            recorder: ActionRecorder::new(config.recorder.clone()),
            config,
            library,
            engine: PlaybackEngine::new(),
            detector: CountdownDetector::new(),
            binder: DutyBinder::new(),
            pending: VecDeque::new(),
            signals: Vec::new(),
            in_combat: false,
        }
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn engine(&self) -> &PlaybackEngine {
        &self.engine
    }

    pub fn library(&self) -> &TimelineLibrary {
        &self.library
    }

    pub fn recorder(&self) -> &ActionRecorder {
        &self.recorder
    }

    pub fn binder(&self) -> &DutyBinder {
        &self.binder
    }

    pub fn in_combat(&self) -> bool {
        self.in_combat
    }

    /// Seconds left on a detected countdown
    pub fn countdown_remaining(&self, now: Instant) -> Option<f32> {
        self.detector.remaining(now)
    }

    pub fn set_config(&mut self, config: AppConfig) {
        self.recorder.set_config(config.recorder.clone());
        self.config = config;
    }

    // ─── Input ──────────────────────────────────────────────────────────────

    /// Queue a host event for the next tick
    pub fn push_event(&mut self, event: HostEvent) {
        self.pending.push_back(event);
    }

    /// Apply queued events, advance the countdown and playback clocks, and
    /// drain every signal produced since the last tick.
    pub fn tick(&mut self, now: Instant, store: &mut dyn RecordingStore) -> Vec<CoreSignal> {
        while let Some(event) = self.pending.pop_front() {
            self.handle_event(event, now, store);
        }

        if let Some(signal) = self.detector.update(now) {
            self.handle_countdown(signal, now);
        }

        self.engine.update(now);
        self.drain_playback_events();

        std::mem::take(&mut self.signals)
    }

    // ─── Library ────────────────────────────────────────────────────────────

    /// Add or replace a timeline and re-bind the current territory
    pub fn upsert_timeline(&mut self, timeline: Timeline) {
        self.library.upsert(timeline);
        self.rebind();
    }

    pub fn remove_timeline(&mut self, id: &str) -> bool {
        let removed = self.library.remove(id).is_some();
        if removed {
            self.rebind();
        }
        removed
    }

    /// Load a timeline by id regardless of territory (editor preview)
    pub fn activate_timeline(&mut self, id: &str) -> bool {
        let Some(timeline) = self.library.get(id).cloned() else {
            tracing::debug!(timeline_id = id, "activate_timeline: unknown id");
            return false;
        };
        self.engine.load_timeline(Some(timeline));
        self.drain_playback_events();
        true
    }

    // ─── Recording ──────────────────────────────────────────────────────────

    /// Start a recording. Side-by-side binds to the loaded timeline, if any.
    pub fn start_recording(&mut self, mode: RecordingMode, now: Instant) -> bool {
        let state = match (mode, self.engine.timeline_id()) {
            (RecordingMode::SideBySide, Some(id)) => {
                let id = id.to_string();
                self.recorder.start_side_by_side(id, now)
            }
            _ => self.recorder.start(mode, now),
        };
        match state {
            Some(RecorderState::WaitingForStart) => {
                self.signals.push(CoreSignal::RecordingArmed);
                true
            }
            Some(RecorderState::Recording) => {
                self.signals.push(CoreSignal::RecordingStarted);
                true
            }
            _ => false,
        }
    }

    pub fn stop_recording(
        &mut self,
        now: Instant,
        store: &mut dyn RecordingStore,
    ) -> Option<RecordedEncounter> {
        let result = self.recorder.stop(now, store)?;
        self.report_saved(result)
    }

    // ─── Event handling ─────────────────────────────────────────────────────

    fn handle_event(&mut self, event: HostEvent, now: Instant, store: &mut dyn RecordingStore) {
        match event {
            HostEvent::TerritoryChanged(territory_id) => {
                tracing::debug!(territory_id, "Territory changed");
                self.recorder.set_territory(territory_id);
                self.detector.reset();
                if self.config.playback.auto_load_by_territory
                    && let Some(signal) =
                        self.binder
                            .on_territory_changed(territory_id, &self.library, &mut self.engine)
                {
                    self.signals.push(signal);
                }
                self.drain_playback_events();
            }
            HostEvent::SystemMessage(text) => {
                if let Some(signal) = self.detector.process_message(&text, now) {
                    self.handle_countdown(signal, now);
                }
            }
            HostEvent::CombatStateChanged(true) => {
                if !self.in_combat {
                    self.in_combat = true;
                    self.handle_combat_start(now);
                }
            }
            HostEvent::CombatStateChanged(false) => {
                if self.in_combat {
                    self.in_combat = false;
                    self.handle_combat_end(now, store);
                }
            }
            HostEvent::ActionUsed(usage) => {
                self.recorder.on_action(&usage, now);
            }
            HostEvent::DutyCompleted => {
                self.recorder.mark_cleared();
            }
        }
    }

    fn handle_countdown(&mut self, signal: CountdownSignal, now: Instant) {
        match signal {
            CountdownSignal::Tick { seconds, .. } => {
                self.signals.push(CoreSignal::CountdownStarted { seconds });
                if self.in_combat {
                    tracing::debug!("Countdown during combat, playback left alone");
                    return;
                }
                self.engine.start_with_countdown(seconds as f32, now);
            }
            CountdownSignal::Cancelled => {
                self.signals.push(CoreSignal::CountdownCancelled);
                if self.engine.is_running() && self.engine.current_time() < 0.0 {
                    self.engine.rewind();
                }
            }
            CountdownSignal::ImmediateStart => self.handle_pull(PullSource::GoPhrase, now),
            CountdownSignal::ReachedZero => self.handle_pull(PullSource::CountdownZero, now),
        }
    }

    fn handle_pull(&mut self, source: PullSource, now: Instant) {
        self.signals.push(CoreSignal::PullDetected { source });

        if self.recorder.on_countdown_reached(now) {
            self.signals.push(CoreSignal::RecordingStarted);
        }

        let resync = self.engine.is_awaiting_pull()
            || (self.engine.is_running()
                && self.engine.current_time() < PULL_RESYNC_WINDOW_SECS);
        if resync {
            self.engine.start_with_countdown(0.0, now);
        }
    }

    fn handle_combat_start(&mut self, now: Instant) {
        // A countdown that expired by now is the pull, not the combat start
        if let Some(signal) = self.detector.update(now) {
            self.handle_countdown(signal, now);
        }
        if self.recorder.on_combat_start(now) {
            self.signals.push(CoreSignal::RecordingStarted);
        }
        self.detector.reset();

        if !self.config.playback.auto_start_on_combat || self.engine.timeline().is_none() {
            return;
        }
        let prepull = self.engine.is_running() && self.engine.current_time() < 0.0;
        if !self.engine.is_running() || prepull {
            tracing::info!(prepull, "Combat started, starting playback");
            self.engine.start_with_countdown(0.0, now);
            self.signals.push(CoreSignal::PullDetected {
                source: PullSource::CombatStart,
            });
        }
    }

    fn handle_combat_end(&mut self, now: Instant, store: &mut dyn RecordingStore) {
        self.detector.reset();
        if let Some(result) = self.recorder.on_combat_end(now, store) {
            self.report_saved(result);
        }
        let playing = matches!(
            self.engine.state(),
            PlaybackState::Running | PlaybackState::Paused
        );
        if self.config.playback.stop_on_combat_end && playing {
            tracing::info!("Combat ended, stopping playback");
            self.engine.rewind();
        }
    }

    // ─── Internals ──────────────────────────────────────────────────────────

    fn rebind(&mut self) {
        if let Some(signal) = self.binder.refresh(&self.library, &mut self.engine) {
            self.signals.push(signal);
        }
        self.drain_playback_events();
    }

    fn report_saved(
        &mut self,
        result: Result<RecordedEncounter, StorageError>,
    ) -> Option<RecordedEncounter> {
        match result {
            Ok(encounter) => {
                self.signals.push(CoreSignal::RecordingSaved {
                    recording_id: encounter.id.clone(),
                    action_count: encounter.actions.len(),
                });
                Some(encounter)
            }
            Err(e) => {
                self.signals.push(CoreSignal::RecordingFailed {
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    fn drain_playback_events(&mut self) {
        for event in self.engine.take_events() {
            self.signals.push(match event {
                PlaybackEvent::StateChanged { from, to } => {
                    CoreSignal::PlaybackStateChanged { from, to }
                }
                PlaybackEvent::Completed { timeline_id } => {
                    CoreSignal::PlaybackCompleted { timeline_id }
                }
            });
        }
    }
}
