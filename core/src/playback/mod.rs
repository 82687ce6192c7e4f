//! Timeline playback
//!
//! The [`PlaybackEngine`] owns the encounter clock for the active timeline and
//! answers which markers fall inside the look-ahead window.
//!
//! ```text
//!   Idle ──start──▶ Running ──pause──▶ Paused
//!    ▲                │  ▲               │
//!    │              stop └────resume─────┘
//!  unload             ▼
//!    └──────────── Stopped ◀── update() reaches duration
//! ```

mod engine;


pub use engine::{PlaybackEngine, PlaybackEvent, PlaybackState};
