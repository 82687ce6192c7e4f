//! Scenario tests for the overlay session

use std::time::{Duration, Instant};

use cadence_types::RecordingMode;

use super::OverlaySession;
use crate::context::AppConfig;
use crate::events::{ActionUsage, CoreSignal, HostEvent, PullSource};
use crate::marker::ActionMarker;
use crate::playback::PlaybackState;
use crate::recorder::StartTrigger;
use crate::storage::MemoryStore;
use crate::timeline::{Timeline, TimelineLibrary};

const TERRITORY: u32 = 1122;

fn at(base: Instant, secs: f32) -> Instant {
    base + Duration::from_secs_f32(secs)
}

fn session_with(config: AppConfig) -> OverlaySession {
    let mut timeline = Timeline::new("P1S", TERRITORY, 60.0);
    timeline.add_action(0.0, ActionMarker::new(7535));
    timeline.add_action(30.0, ActionMarker::new(16536));
    OverlaySession::new(config, TimelineLibrary::from_timelines([timeline]))
}

fn session() -> OverlaySession {
    session_with(AppConfig::default())
}

fn enter_duty(session: &mut OverlaySession, store: &mut MemoryStore, now: Instant) -> Vec<CoreSignal> {
    session.push_event(HostEvent::TerritoryChanged(TERRITORY));
    session.tick(now, store)
}

fn pulls(signals: &[CoreSignal]) -> Vec<PullSource> {
    signals
        .iter()
        .filter_map(|s| match s {
            CoreSignal::PullDetected { source } => Some(*source),
            _ => None,
        })
        .collect()
}

fn message(session: &mut OverlaySession, text: &str) {
    session.push_event(HostEvent::SystemMessage(text.to_string()));
}

// ─────────────────────────────────────────────────────────────────────────────
// Duty binding
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_entering_duty_activates_timeline() {
    let base = Instant::now();
    let mut store = MemoryStore::new();
    let mut session = session();

    let signals = enter_duty(&mut session, &mut store, base);
    assert!(signals.iter().any(|s| matches!(
        s,
        CoreSignal::TimelineActivated { territory_id: TERRITORY, .. }
    )));
    assert!(session.engine().is_awaiting_pull());
}

#[test]
fn test_auto_load_disabled() {
    let base = Instant::now();
    let mut store = MemoryStore::new();
    let mut config = AppConfig::default();
    config.playback.auto_load_by_territory = false;
    let mut session = session_with(config);

    let signals = enter_duty(&mut session, &mut store, base);
    assert!(signals.is_empty());
    assert!(session.engine().timeline().is_none());
}

#[test]
fn test_upsert_for_current_territory_activates() {
    let base = Instant::now();
    let mut store = MemoryStore::new();
    let mut session = OverlaySession::new(AppConfig::default(), TimelineLibrary::new());
    assert!(enter_duty(&mut session, &mut store, base).is_empty());

    session.upsert_timeline(Timeline::new("New plan", TERRITORY, 120.0));
    let signals = session.tick(base, &mut store);
    assert!(signals
        .iter()
        .any(|s| matches!(s, CoreSignal::TimelineActivated { .. })));
    assert_eq!(session.engine().timeline().unwrap().name, "New plan");
}

// ─────────────────────────────────────────────────────────────────────────────
// Countdown and pull
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_countdown_drives_prepull_and_pull() {
    let base = Instant::now();
    let mut store = MemoryStore::new();
    let mut session = session();
    enter_duty(&mut session, &mut store, base);

    message(&mut session, "Battle commencing in 10 seconds! (Alice Smith)");
    let signals = session.tick(base, &mut store);
    assert!(signals.contains(&CoreSignal::CountdownStarted { seconds: 10 }));
    assert_eq!(session.engine().state(), PlaybackState::Running);

    session.tick(at(base, 4.0), &mut store);
    assert!((session.engine().current_time() + 6.0).abs() < 1e-3);
    assert_eq!(session.countdown_remaining(at(base, 4.0)), Some(6.0));

    let signals = session.tick(at(base, 10.0), &mut store);
    assert_eq!(pulls(&signals), vec![PullSource::CountdownZero]);
    assert!(session.engine().current_time().abs() < 1e-3);

    // The go phrase printed right after is the same pull
    message(&mut session, "Engage!");
    let signals = session.tick(at(base, 10.3), &mut store);
    assert!(pulls(&signals).is_empty());
    assert!((session.engine().current_time() - 0.3).abs() < 1e-3);
}

#[test]
fn test_go_phrase_without_ticks_starts_playback() {
    let base = Instant::now();
    let mut store = MemoryStore::new();
    let mut session = session();
    enter_duty(&mut session, &mut store, base);

    message(&mut session, "戦闘開始！");
    let signals = session.tick(base, &mut store);
    assert_eq!(pulls(&signals), vec![PullSource::GoPhrase]);
    session.tick(at(base, 2.0), &mut store);
    assert!((session.engine().current_time() - 2.0).abs() < 1e-3);
}

#[test]
fn test_cancel_rewinds_prepull() {
    let base = Instant::now();
    let mut store = MemoryStore::new();
    let mut session = session();
    enter_duty(&mut session, &mut store, base);

    message(&mut session, "Battle commencing in 15 seconds!");
    session.tick(base, &mut store);
    message(&mut session, "Countdown canceled by Alice Smith.");
    let signals = session.tick(at(base, 3.0), &mut store);
    assert!(signals.contains(&CoreSignal::CountdownCancelled));
    assert!(session.engine().is_awaiting_pull());

    // The cancelled countdown never reaches zero
    let signals = session.tick(at(base, 20.0), &mut store);
    assert!(pulls(&signals).is_empty());
}

#[test]
fn test_combat_start_without_countdown() {
    let base = Instant::now();
    let mut store = MemoryStore::new();
    let mut session = session();
    enter_duty(&mut session, &mut store, base);

    session.push_event(HostEvent::CombatStateChanged(true));
    let signals = session.tick(base, &mut store);
    assert_eq!(pulls(&signals), vec![PullSource::CombatStart]);
    assert!(session.in_combat());
    assert_eq!(session.engine().current_time(), 0.0);
}

#[test]
fn test_combat_start_during_prepull_resyncs() {
    let base = Instant::now();
    let mut store = MemoryStore::new();
    let mut session = session();
    enter_duty(&mut session, &mut store, base);

    message(&mut session, "Battle commencing in 10 seconds!");
    session.tick(base, &mut store);
    // Someone pulled early
    session.push_event(HostEvent::CombatStateChanged(true));
    session.tick(at(base, 7.0), &mut store);
    session.tick(at(base, 8.0), &mut store);
    assert!((session.engine().current_time() - 1.0).abs() < 1e-3);

    // Detector was reset, so its timer does not fire later
    let signals = session.tick(at(base, 10.0), &mut store);
    assert!(pulls(&signals).is_empty());
}

#[test]
fn test_combat_start_respects_config() {
    let base = Instant::now();
    let mut store = MemoryStore::new();
    let mut config = AppConfig::default();
    config.playback.auto_start_on_combat = false;
    let mut session = session_with(config);
    enter_duty(&mut session, &mut store, base);

    session.push_event(HostEvent::CombatStateChanged(true));
    session.tick(base, &mut store);
    assert!(session.engine().is_awaiting_pull());
}

#[test]
fn test_combat_end_rewinds_playback() {
    let base = Instant::now();
    let mut store = MemoryStore::new();
    let mut session = session();
    enter_duty(&mut session, &mut store, base);

    session.push_event(HostEvent::CombatStateChanged(true));
    session.tick(base, &mut store);
    session.push_event(HostEvent::CombatStateChanged(false));
    session.tick(at(base, 20.0), &mut store);
    assert!(session.engine().is_awaiting_pull());
}

#[test]
fn test_completion_signalled_once() {
    let base = Instant::now();
    let mut store = MemoryStore::new();
    let mut session = session();
    enter_duty(&mut session, &mut store, base);
    session.push_event(HostEvent::CombatStateChanged(true));
    session.tick(base, &mut store);

    let mut completed = 0;
    for step in 1..=80 {
        completed += session
            .tick(at(base, step as f32), &mut store)
            .iter()
            .filter(|s| matches!(s, CoreSignal::PlaybackCompleted { .. }))
            .count();
    }
    assert_eq!(completed, 1);
    assert_eq!(session.engine().state(), PlaybackState::Stopped);
}

// ─────────────────────────────────────────────────────────────────────────────
// Recording
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_fresh_recording_follows_countdown() {
    let base = Instant::now();
    let mut store = MemoryStore::new();
    let mut session = session();
    enter_duty(&mut session, &mut store, base);

    assert!(session.start_recording(RecordingMode::Fresh, base));
    let signals = session.tick(base, &mut store);
    assert!(signals.contains(&CoreSignal::RecordingArmed));

    message(&mut session, "Battle commencing in 5 seconds!");
    session.tick(base, &mut store);
    let signals = session.tick(at(base, 5.0), &mut store);
    assert!(signals.contains(&CoreSignal::RecordingStarted));

    session.push_event(HostEvent::CombatStateChanged(true));
    session.push_event(HostEvent::ActionUsed(
        ActionUsage::new(7535, "Alice").with_job(21),
    ));
    session.tick(at(base, 7.0), &mut store);
    session.push_event(HostEvent::DutyCompleted);
    session.push_event(HostEvent::CombatStateChanged(false));
    let signals = session.tick(at(base, 65.0), &mut store);

    assert!(signals.contains(&CoreSignal::RecordingSaved {
        recording_id: store.recordings()[0].id.clone(),
        action_count: 1,
    }));
    let recording = &store.recordings()[0];
    assert_eq!(recording.territory_id, TERRITORY);
    assert_eq!(recording.actions[0].timestamp_secs, 2.0);
    assert_eq!(recording.duration_secs, 60.0);
    assert!(recording.is_cleared);
}

#[test]
fn test_expired_countdown_wins_over_combat_start() {
    let base = Instant::now();
    let mut store = MemoryStore::new();
    let mut session = session();
    enter_duty(&mut session, &mut store, base);

    session.start_recording(RecordingMode::Fresh, base);
    message(&mut session, "Battle commencing in 5 seconds!");
    session.tick(base, &mut store);

    // Combat starts on the same tick the countdown runs out
    session.push_event(HostEvent::CombatStateChanged(true));
    let signals = session.tick(at(base, 5.0), &mut store);

    assert_eq!(pulls(&signals), vec![PullSource::CountdownZero]);
    assert_eq!(session.recorder().start_trigger(), Some(StartTrigger::CountdownZero));
    assert_eq!(session.engine().state(), PlaybackState::Running);
    assert_eq!(session.engine().current_time(), 0.0);
}

#[test]
fn test_stopping_armed_recording_saves_it() {
    let base = Instant::now();
    let mut store = MemoryStore::new();
    let mut session = session();
    enter_duty(&mut session, &mut store, base);

    session.start_recording(RecordingMode::Fresh, base);
    session.tick(base, &mut store);
    let saved = session.stop_recording(at(base, 3.0), &mut store).unwrap();
    let signals = session.tick(at(base, 3.0), &mut store);

    assert!(signals.contains(&CoreSignal::RecordingSaved {
        recording_id: saved.id.clone(),
        action_count: 0,
    }));
    assert_eq!(store.recordings().len(), 1);
    assert_eq!(saved.duration_secs, 0.0);
    assert!(!session.recorder().is_armed());
}

#[test]
fn test_side_by_side_binds_loaded_timeline() {
    let base = Instant::now();
    let mut store = MemoryStore::new();
    let mut session = session();
    enter_duty(&mut session, &mut store, base);
    let timeline_id = session.engine().timeline_id().unwrap().to_string();

    session.start_recording(RecordingMode::SideBySide, base);
    assert_eq!(session.recorder().compared_timeline_id(), Some(timeline_id.as_str()));

    session.push_event(HostEvent::CombatStateChanged(true));
    session.tick(base, &mut store);
    let saved = session.stop_recording(at(base, 3.0), &mut store).unwrap();
    assert_eq!(saved.compared_timeline_id, Some(timeline_id));
}

#[test]
fn test_second_start_is_rejected() {
    let base = Instant::now();
    let mut session = session();
    assert!(session.start_recording(RecordingMode::Manual, base));
    assert!(!session.start_recording(RecordingMode::Fresh, base));
}
