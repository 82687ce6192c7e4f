//! Playback state machine.
//!
//! All time-dependent operations take the monotonic instant `now` from the
//! caller. The host tick supplies it in production; tests construct it.

use std::sync::Arc;
use std::time::Instant;

use crate::marker::Marker;
use crate::timeline::Timeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    /// Timeline loaded, pull not yet seen. The engine itself never enters this
    /// state; callers derive it via [`PlaybackEngine::is_awaiting_pull`].
    WaitingForCountdown,
    Running,
    Paused,
    Stopped,
}

/// Notifications queued by the engine, drained once per tick
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    StateChanged {
        from: PlaybackState,
        to: PlaybackState,
    },
    /// Playback reached the end of the timeline
    Completed { timeline_id: String },
}

/// Monotonic clock that can be frozen and re-anchored.
///
/// Elapsed time is `banked_secs` plus the time since `anchor` while running.
#[derive(Debug, Clone, Copy, Default)]
struct PlaybackClock {
    anchor: Option<Instant>,
    banked_secs: f64,
}

impl PlaybackClock {
    fn started_at(now: Instant, elapsed_secs: f64) -> Self {
        Self {
            anchor: Some(now),
            banked_secs: elapsed_secs,
        }
    }

    fn elapsed(&self, now: Instant) -> f64 {
        let running = self
            .anchor
            .map_or(0.0, |anchor| now.saturating_duration_since(anchor).as_secs_f64());
        self.banked_secs + running
    }

    fn freeze(&mut self, now: Instant) {
        self.banked_secs = self.elapsed(now);
        self.anchor = None;
    }

    fn unfreeze(&mut self, now: Instant) {
        self.anchor = Some(now);
    }
}

/// Plays back one timeline against a monotonic clock.
///
/// Every operation on missing state (no timeline, wrong state) is a silent
/// no-op: triggers come from chat parsing and zone events and may arrive
/// duplicated or out of order.
#[derive(Debug, Default)]
pub struct PlaybackEngine {
    timeline: Option<Arc<Timeline>>,
    state: PlaybackState,
    current_time: f32,
    countdown_offset: f32,
    clock: PlaybackClock,
    events: Vec<PlaybackEvent>,
}

impl PlaybackEngine {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn timeline(&self) -> Option<&Arc<Timeline>> {
        self.timeline.as_ref()
    }

    pub fn timeline_id(&self) -> Option<&str> {
        self.timeline.as_deref().map(|t| t.id.as_str())
    }

    /// Encounter time in seconds; negative during prepull
    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    pub fn countdown_offset(&self) -> f32 {
        self.countdown_offset
    }

    pub fn is_running(&self) -> bool {
        self.state == PlaybackState::Running
    }

    /// Timeline loaded but not started: the "waiting for countdown" phase
    pub fn is_awaiting_pull(&self) -> bool {
        self.state == PlaybackState::Idle && self.timeline.is_some()
    }

    /// Fraction of the timeline played, 0.0 - 1.0
    pub fn progress(&self) -> f32 {
        match self.timeline.as_deref() {
            Some(t) if matches!(self.state, PlaybackState::Running | PlaybackState::Paused) => {
                (self.current_time / t.duration_secs).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    /// Drain queued notifications
    pub fn take_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.events)
    }

    // ─── Timeline management ────────────────────────────────────────────────

    /// Stop any playback and make `timeline` active. `None` is ignored.
    pub fn load_timeline(&mut self, timeline: Option<Arc<Timeline>>) {
        let Some(timeline) = timeline else {
            tracing::debug!("load_timeline called without a timeline, ignoring");
            return;
        };
        self.stop();
        tracing::debug!(timeline_id = %timeline.id, "Timeline loaded");
        self.timeline = Some(timeline);
        self.transition(PlaybackState::Idle);
    }

    /// Stop and drop the active timeline
    pub fn unload_timeline(&mut self) {
        self.stop();
        if self.timeline.take().is_some() {
            tracing::debug!("Timeline unloaded");
        }
        self.transition(PlaybackState::Idle);
    }

    // ─── Transport ──────────────────────────────────────────────────────────

    /// Start (or restart) playback at `-countdown_offset`.
    ///
    /// Restarting while running re-synchronises the clock, which is what a
    /// repeated countdown announcement should do.
    pub fn start(&mut self, now: Instant) {
        if self.timeline.is_none() {
            tracing::debug!("start ignored: no timeline loaded");
            return;
        }
        self.clock = PlaybackClock::started_at(now, 0.0);
        self.current_time = -self.countdown_offset;
        self.transition(PlaybackState::Running);
    }

    /// Start so that time zero lands `seconds` from now
    pub fn start_with_countdown(&mut self, seconds: f32, now: Instant) {
        if self.timeline.is_none() {
            tracing::debug!("start_with_countdown ignored: no timeline loaded");
            return;
        }
        self.countdown_offset = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        self.start(now);
    }

    pub fn pause(&mut self, now: Instant) {
        if self.state != PlaybackState::Running {
            tracing::debug!(state = ?self.state, "pause ignored");
            return;
        }
        self.clock.freeze(now);
        self.current_time = self.clock_time(now);
        self.transition(PlaybackState::Paused);
    }

    pub fn resume(&mut self, now: Instant) {
        if self.state != PlaybackState::Paused {
            tracing::debug!(state = ?self.state, "resume ignored");
            return;
        }
        self.clock.unfreeze(now);
        self.transition(PlaybackState::Running);
    }

    /// Stop from any state, resetting time and countdown offset
    pub fn stop(&mut self) {
        self.current_time = 0.0;
        self.countdown_offset = 0.0;
        self.clock = PlaybackClock::default();
        if matches!(self.state, PlaybackState::Running | PlaybackState::Paused) {
            self.transition(PlaybackState::Stopped);
        }
    }

    /// Stop and return to waiting for the pull, keeping the timeline
    pub fn rewind(&mut self) {
        self.stop();
        if self.timeline.is_some() {
            self.transition(PlaybackState::Idle);
        }
    }

    /// Advance the clock. Call once per tick.
    ///
    /// Reaching the timeline duration stops playback and queues exactly one
    /// [`PlaybackEvent::Completed`].
    pub fn update(&mut self, now: Instant) {
        if self.state != PlaybackState::Running {
            return;
        }
        let Some(duration) = self.timeline.as_deref().map(|t| t.duration_secs) else {
            return;
        };

        self.current_time = self.clock_time(now);
        if self.current_time >= duration {
            let timeline_id = self.timeline_id().unwrap_or_default().to_string();
            tracing::info!(timeline_id = %timeline_id, "Timeline playback completed");
            self.stop();
            self.events.push(PlaybackEvent::Completed { timeline_id });
        }
    }

    /// Jump to `seconds` (clamped to the timeline).
    ///
    /// While running the clock is re-anchored at `now` so that subsequent
    /// updates continue from the target: `elapsed - countdown_offset == target`.
    /// While paused the frozen position moves. Idle and stopped engines ignore
    /// seeks.
    pub fn seek_to(&mut self, seconds: f32, now: Instant) {
        let Some(duration) = self.timeline.as_deref().map(|t| t.duration_secs) else {
            return;
        };
        let target = if seconds.is_finite() { seconds.clamp(0.0, duration) } else { 0.0 };
        let elapsed = f64::from(target) + f64::from(self.countdown_offset);

        match self.state {
            PlaybackState::Running => {
                self.clock = PlaybackClock::started_at(now, elapsed);
            }
            PlaybackState::Paused => {
                self.clock = PlaybackClock {
                    anchor: None,
                    banked_secs: elapsed,
                };
            }
            PlaybackState::Idle | PlaybackState::WaitingForCountdown | PlaybackState::Stopped => {
                tracing::debug!(state = ?self.state, "seek ignored");
                return;
            }
        }
        self.current_time = target;
    }

    // ─── Queries ────────────────────────────────────────────────────────────

    /// Markers with timestamps in `[current_time, current_time + look_ahead]`.
    ///
    /// Empty unless running.
    pub fn visible_markers(&self, look_ahead_secs: f32) -> &[Marker] {
        if self.state != PlaybackState::Running {
            return &[];
        }
        let Some(timeline) = self.timeline.as_deref() else {
            return &[];
        };
        let from = self.current_time;
        timeline.markers.window(from, from + look_ahead_secs.max(0.0))
    }

    /// Markers whose duration band is still active at the current time but
    /// whose start has already passed
    pub fn active_duration_markers(&self) -> impl Iterator<Item = &Marker> {
        let now = self.current_time;
        let markers = match (self.state, self.timeline.as_deref()) {
            (PlaybackState::Running, Some(t)) => t.markers.window(f32::MIN, now),
            _ => &[][..],
        };
        markers
            .iter()
            .filter(move |m| m.timestamp_secs < now && m.end_secs() > now)
    }

    // ─── Internals ──────────────────────────────────────────────────────────

    fn clock_time(&self, now: Instant) -> f32 {
        (self.clock.elapsed(now) - f64::from(self.countdown_offset)) as f32
    }

    fn transition(&mut self, to: PlaybackState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        tracing::debug!(?from, ?to, "Playback state changed");
        self.events.push(PlaybackEvent::StateChanged { from, to });
    }
}
