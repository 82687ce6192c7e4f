//! Pull-timer detection from system chat.
//!
//! ```text
//!   "Battle commencing in 10 seconds!" ──► Tick(10) ──► local timer armed
//!                                                            │ update(now)
//!   "Engage!" ──► ImmediateStart                             ▼
//!                                                        ReachedZero
//!   "Countdown canceled by ..." ──► Cancelled (timer discarded)
//! ```
//!
//! `ImmediateStart` and `ReachedZero` both mean "the pull happened now".
//! Some clients only print the go phrase, others only the numeric ticks, and
//! many print both within a second of each other; a go phrase arriving right
//! after the local timer already fired is swallowed.

mod locales;

pub use locales::{LOCALE_PRIORITY, Locale, LocalePatterns};

use std::time::{Duration, Instant};

/// A go phrase this soon after a local zero is the same pull
pub const PULL_DEBOUNCE: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownSignal {
    Tick { seconds: u32, locale: Locale },
    Cancelled,
    ImmediateStart,
    /// The local timer armed by the last tick expired
    ReachedZero,
}

impl CountdownSignal {
    /// Whether callers should treat this as the pull
    pub fn is_pull(&self) -> bool {
        matches!(self, Self::ImmediateStart | Self::ReachedZero)
    }
}

#[derive(Debug, Default)]
pub struct CountdownDetector {
    deadline: Option<Instant>,
    last_pull: Option<Instant>,
}

impl CountdownDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.deadline.is_some()
    }

    /// Seconds left on the local timer
    pub fn remaining(&self, now: Instant) -> Option<f32> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now).as_secs_f32())
    }

    pub fn reset(&mut self) {
        self.deadline = None;
        self.last_pull = None;
    }

    /// Classify one system message.
    ///
    /// Go phrases are checked first, then cancellations, then numeric ticks in
    /// [`LOCALE_PRIORITY`] order. Anything else is ignored.
    pub fn process_message(&mut self, text: &str, now: Instant) -> Option<CountdownSignal> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        if LOCALE_PRIORITY.iter().any(|l| l.patterns().is_go(trimmed)) {
            self.deadline = None;
            if self.recently_pulled(now) {
                tracing::debug!("Go phrase right after local zero, ignoring");
                return None;
            }
            self.last_pull = Some(now);
            tracing::info!("Pull detected from go phrase");
            return Some(CountdownSignal::ImmediateStart);
        }

        if LOCALE_PRIORITY.iter().any(|l| l.patterns().is_cancel(trimmed)) {
            if self.deadline.take().is_none() {
                tracing::debug!("Countdown cancel without an active countdown");
                return None;
            }
            tracing::info!("Countdown cancelled");
            return Some(CountdownSignal::Cancelled);
        }

        for locale in LOCALE_PRIORITY {
            let Some(seconds) = locale.patterns().parse_tick(trimmed) else {
                continue;
            };
            if seconds == 0 {
                tracing::debug!(text = trimmed, "Zero-second countdown tick, ignoring");
                return None;
            }
            self.deadline = Some(now + Duration::from_secs(u64::from(seconds)));
            tracing::info!(seconds, ?locale, "Countdown tick");
            return Some(CountdownSignal::Tick { seconds, locale });
        }

        None
    }

    /// Check the local timer. Returns `ReachedZero` exactly once per countdown.
    pub fn update(&mut self, now: Instant) -> Option<CountdownSignal> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        self.deadline = None;
        self.last_pull = Some(deadline);
        tracing::info!("Countdown reached zero");
        Some(CountdownSignal::ReachedZero)
    }

    fn recently_pulled(&self, now: Instant) -> bool {
        self.last_pull
            .is_some_and(|at| now.saturating_duration_since(at) <= PULL_DEBOUNCE)
    }
}
