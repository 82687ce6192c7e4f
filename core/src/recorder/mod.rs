//! Action recorder.
//!
//! ```text
//!                 start(Manual|Automatic)
//!   NotRecording ─────────────────────────────► Recording ──stop/combat end──► NotRecording
//!        │                                          ▲                            (persisted)
//!        │ start(Fresh|SideBySide)                  │ countdown zero | combat start
//!        └──────────────────► WaitingForStart ──────┘ (first trigger wins)
//! ```
//!
//! Timestamps are seconds since the zero point chosen by the start trigger.

mod encounter;

pub use encounter::{RecordedAction, RecordedEncounter};

use std::time::Instant;

use cadence_types::{RecorderConfig, RecordingMode};

use crate::events::ActionUsage;
use crate::storage::{RecordingStore, StorageError};
use crate::timeline::generate_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecorderState {
    #[default]
    NotRecording,
    WaitingForStart,
    Recording,
}

/// What set the recording's zero point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartTrigger {
    Immediate,
    CountdownZero,
    CombatStart,
}

#[derive(Debug, Default)]
pub struct ActionRecorder {
    config: RecorderConfig,
    state: RecorderState,
    mode: RecordingMode,
    trigger: Option<StartTrigger>,
    started_at: Option<Instant>,
    recorded_at: Option<chrono::NaiveDateTime>,
    territory_id: u32,
    compared_timeline_id: Option<String>,
    party_members: Vec<String>,
    actions: Vec<RecordedAction>,
    is_cleared: bool,
}

impl ActionRecorder {
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn mode(&self) -> RecordingMode {
        self.mode
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Recording
    }

    pub fn is_armed(&self) -> bool {
        self.state == RecorderState::WaitingForStart
    }

    pub fn start_trigger(&self) -> Option<StartTrigger> {
        self.trigger
    }

    pub fn actions(&self) -> &[RecordedAction] {
        &self.actions
    }

    pub fn compared_timeline_id(&self) -> Option<&str> {
        self.compared_timeline_id.as_deref()
    }

    /// Seconds since the zero point, 0 until recording
    pub fn elapsed(&self, now: Instant) -> f32 {
        self.started_at
            .map_or(0.0, |at| now.saturating_duration_since(at).as_secs_f32())
    }

    pub fn set_config(&mut self, config: RecorderConfig) {
        self.config = config;
    }

    pub fn set_territory(&mut self, territory_id: u32) {
        self.territory_id = territory_id;
    }

    // ─── Control ────────────────────────────────────────────────────────────

    /// Begin a session. Ignored while one is already armed or running.
    ///
    /// Returns the state entered, or `None` if the request was ignored.
    pub fn start(&mut self, mode: RecordingMode, now: Instant) -> Option<RecorderState> {
        if self.state != RecorderState::NotRecording {
            tracing::debug!(state = ?self.state, "Recorder start ignored");
            return None;
        }
        self.reset_session();
        self.mode = mode;

        if mode.waits_for_pull() {
            self.state = RecorderState::WaitingForStart;
            tracing::info!(?mode, "Recording armed, waiting for pull");
        } else {
            self.begin(StartTrigger::Immediate, now);
        }
        Some(self.state)
    }

    /// Arm a side-by-side recording against the timeline being played
    pub fn start_side_by_side(
        &mut self,
        timeline_id: impl Into<String>,
        now: Instant,
    ) -> Option<RecorderState> {
        let state = self.start(RecordingMode::SideBySide, now)?;
        self.compared_timeline_id = Some(timeline_id.into());
        Some(state)
    }

    /// Countdown hit zero (or the go phrase was seen)
    pub fn on_countdown_reached(&mut self, now: Instant) -> bool {
        if self.state != RecorderState::WaitingForStart {
            return false;
        }
        self.begin(StartTrigger::CountdownZero, now);
        true
    }

    /// Combat began. Starts an armed session, or a fresh automatic one when
    /// configured. Returns whether recording began.
    pub fn on_combat_start(&mut self, now: Instant) -> bool {
        match self.state {
            RecorderState::WaitingForStart => {
                self.begin(StartTrigger::CombatStart, now);
                true
            }
            RecorderState::NotRecording if self.config.auto_record_on_combat => {
                self.start(RecordingMode::Automatic, now) == Some(RecorderState::Recording)
            }
            _ => false,
        }
    }

    /// Combat ended: a running session is stopped and persisted
    pub fn on_combat_end(
        &mut self,
        now: Instant,
        store: &mut dyn RecordingStore,
    ) -> Option<Result<RecordedEncounter, StorageError>> {
        if self.state != RecorderState::Recording {
            return None;
        }
        self.stop(now, store)
    }

    pub fn on_action(&mut self, usage: &ActionUsage, now: Instant) -> bool {
        if self.state != RecorderState::Recording {
            return false;
        }
        if self.config.party_only && !usage.source_is_party_member {
            tracing::trace!(source = %usage.source_name, "Skipping non-party action");
            return false;
        }

        if !self.party_members.contains(&usage.source_name) && usage.source_is_party_member {
            self.party_members.push(usage.source_name.clone());
        }
        self.actions.push(RecordedAction {
            timestamp_secs: self.elapsed(now),
            action_id: usage.action_id,
            player_name: usage.source_name.clone(),
            job_id: usage.source_job_id,
            target_name: usage.target_name.clone(),
        });
        true
    }

    /// The duty was cleared while recording
    pub fn mark_cleared(&mut self) {
        if self.state == RecorderState::Recording {
            self.is_cleared = true;
        }
    }

    /// End the session.
    ///
    /// Armed and running sessions are both persisted, even with no actions.
    /// An armed session never got a zero point, so its duration is 0. State
    /// is cleared even when the save fails.
    pub fn stop(
        &mut self,
        now: Instant,
        store: &mut dyn RecordingStore,
    ) -> Option<Result<RecordedEncounter, StorageError>> {
        if self.state == RecorderState::NotRecording {
            return None;
        }
        if self.state == RecorderState::WaitingForStart {
            tracing::info!("Armed recording stopped before pull");
        }
        let encounter = self.finish(now);
        self.reset_session();
        let result = store.save_recording(&encounter).map(|()| encounter);
        match &result {
            Ok(encounter) => tracing::info!(
                recording_id = %encounter.id,
                actions = encounter.actions.len(),
                duration_secs = encounter.duration_secs,
                "Recording saved"
            ),
            Err(e) => tracing::error!(error = %e, "Failed to save recording"),
        }
        Some(result)
    }

    // ─── Internals ──────────────────────────────────────────────────────────

    fn begin(&mut self, trigger: StartTrigger, now: Instant) {
        self.state = RecorderState::Recording;
        self.trigger = Some(trigger);
        self.started_at = Some(now);
        self.recorded_at = Some(chrono::Local::now().naive_local());
        tracing::info!(mode = ?self.mode, ?trigger, "Recording started");
    }

    fn finish(&mut self, now: Instant) -> RecordedEncounter {
        RecordedEncounter {
            id: generate_id("rec"),
            territory_id: self.territory_id,
            recorded_at: self
                .recorded_at
                .unwrap_or_else(|| chrono::Local::now().naive_local()),
            duration_secs: self.elapsed(now),
            party_members: std::mem::take(&mut self.party_members),
            is_cleared: self.is_cleared,
            compared_timeline_id: self.compared_timeline_id.take(),
            actions: std::mem::take(&mut self.actions),
        }
    }

    fn reset_session(&mut self) {
        self.state = RecorderState::NotRecording;
        self.mode = RecordingMode::default();
        self.trigger = None;
        self.started_at = None;
        self.recorded_at = None;
        self.compared_timeline_id = None;
        self.party_members.clear();
        self.actions.clear();
        self.is_cleared = false;
    }
}

#[cfg(test)]
mod recorder_tests;
