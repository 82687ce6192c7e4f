use crate::playback::PlaybackState;

/// Input delivered by the host, queued and applied on the next tick
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// The player entered a new zone
    TerritoryChanged(u32),
    /// A system chat line (countdown announcements arrive here)
    SystemMessage(String),
    /// The local player entered (`true`) or left (`false`) combat
    CombatStateChanged(bool),
    ActionUsed(ActionUsage),
    /// The duty was cleared; marks an in-progress recording as cleared
    DutyCompleted,
}

/// One observed action use.
///
/// `action_id` is `None` for events the host could not resolve (item use,
/// emotes); these are still recorded so the timing is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionUsage {
    pub action_id: Option<u32>,
    pub source_name: String,
    pub source_job_id: Option<u8>,
    pub target_name: Option<String>,
    pub source_is_party_member: bool,
}

impl ActionUsage {
    pub fn new(action_id: u32, source_name: impl Into<String>) -> Self {
        Self {
            action_id: Some(action_id),
            source_name: source_name.into(),
            source_job_id: None,
            target_name: None,
            source_is_party_member: true,
        }
    }

    pub fn with_job(mut self, job_id: u8) -> Self {
        self.source_job_id = Some(job_id);
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target_name = Some(target.into());
        self
    }

    pub fn outside_party(mut self) -> Self {
        self.source_is_party_member = false;
        self
    }
}

/// Signals emitted by the overlay session for the host and any listeners.
/// These are the "interesting things that happened" during a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreSignal {
    // Duty binding
    TimelineActivated {
        timeline_id: String,
        territory_id: u32,
    },
    TimelineDeactivated {
        territory_id: u32,
    },

    // Countdown
    CountdownStarted {
        seconds: u32,
    },
    CountdownCancelled,
    PullDetected {
        source: PullSource,
    },

    // Playback
    PlaybackStateChanged {
        from: PlaybackState,
        to: PlaybackState,
    },
    PlaybackCompleted {
        timeline_id: String,
    },

    // Recording
    RecordingArmed,
    RecordingStarted,
    RecordingSaved {
        recording_id: String,
        action_count: usize,
    },
    RecordingFailed {
        reason: String,
    },
}

/// What established time zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullSource {
    /// The local countdown timer ran out
    CountdownZero,
    /// The go phrase was printed
    GoPhrase,
    /// Combat began without a countdown
    CombatStart,
}
