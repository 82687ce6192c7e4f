//! Tests for the action recorder state machine

use std::time::{Duration, Instant};

use cadence_types::{RecorderConfig, RecordingMode};

use super::{ActionRecorder, RecorderState, StartTrigger};
use crate::events::ActionUsage;
use crate::storage::{MemoryStore, RecordingStore, StorageError};

fn at(base: Instant, secs: f32) -> Instant {
    base + Duration::from_secs_f32(secs)
}

fn recorder() -> ActionRecorder {
    ActionRecorder::new(RecorderConfig::default())
}

/// A store whose writes always fail
struct FailingStore;

impl RecordingStore for FailingStore {
    fn save_recording(
        &mut self,
        _recording: &super::RecordedEncounter,
    ) -> Result<(), StorageError> {
        Err(StorageError::NoStorageDirectory)
    }

    fn load_recordings(&self) -> Result<Vec<super::RecordedEncounter>, StorageError> {
        Ok(Vec::new())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Starting
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_manual_starts_immediately() {
    let base = Instant::now();
    let mut rec = recorder();
    assert_eq!(rec.start(RecordingMode::Manual, base), Some(RecorderState::Recording));
    assert_eq!(rec.start_trigger(), Some(StartTrigger::Immediate));
    assert!(rec.on_action(&ActionUsage::new(16536, "Alice"), at(base, 2.5)));
    assert_eq!(rec.actions()[0].timestamp_secs, 2.5);
}

#[test]
fn test_start_while_active_is_ignored() {
    let base = Instant::now();
    let mut rec = recorder();
    rec.start(RecordingMode::Fresh, base);
    assert_eq!(rec.start(RecordingMode::Manual, base), None);
    assert_eq!(rec.state(), RecorderState::WaitingForStart);
}

#[test]
fn test_fresh_waits_for_countdown() {
    let base = Instant::now();
    let mut rec = recorder();
    assert_eq!(rec.start(RecordingMode::Fresh, base), Some(RecorderState::WaitingForStart));
    assert!(!rec.on_action(&ActionUsage::new(1, "Alice"), at(base, 1.0)));

    assert!(rec.on_countdown_reached(at(base, 10.0)));
    assert_eq!(rec.start_trigger(), Some(StartTrigger::CountdownZero));
    rec.on_action(&ActionUsage::new(1, "Alice"), at(base, 13.0));
    assert_eq!(rec.actions()[0].timestamp_secs, 3.0);
}

#[test]
fn test_countdown_wins_over_later_combat_start() {
    let base = Instant::now();
    let mut rec = recorder();
    rec.start(RecordingMode::Fresh, base);
    rec.on_countdown_reached(at(base, 10.0));
    assert!(!rec.on_combat_start(at(base, 11.0)));
    assert_eq!(rec.start_trigger(), Some(StartTrigger::CountdownZero));
    assert_eq!(rec.elapsed(at(base, 12.0)), 2.0);
}

#[test]
fn test_combat_start_when_no_countdown() {
    let base = Instant::now();
    let mut rec = recorder();
    rec.start(RecordingMode::Fresh, base);
    assert!(rec.on_combat_start(at(base, 4.0)));
    assert_eq!(rec.start_trigger(), Some(StartTrigger::CombatStart));
    assert!(!rec.on_countdown_reached(at(base, 5.0)));
    assert_eq!(rec.start_trigger(), Some(StartTrigger::CombatStart));
}

#[test]
fn test_side_by_side_keeps_timeline_reference() {
    let base = Instant::now();
    let mut rec = recorder();
    let mut store = MemoryStore::new();
    rec.start_side_by_side("tl-abc", base);
    assert_eq!(rec.mode(), RecordingMode::SideBySide);
    assert_eq!(rec.compared_timeline_id(), Some("tl-abc"));

    rec.on_countdown_reached(at(base, 5.0));
    let saved = rec.stop(at(base, 65.0), &mut store).unwrap().unwrap();
    assert_eq!(saved.compared_timeline_id.as_deref(), Some("tl-abc"));
    assert_eq!(rec.compared_timeline_id(), None);
}

#[test]
fn test_auto_record_on_combat() {
    let base = Instant::now();
    let mut rec = ActionRecorder::new(RecorderConfig {
        auto_record_on_combat: true,
        ..RecorderConfig::default()
    });
    assert!(rec.on_combat_start(base));
    assert_eq!(rec.mode(), RecordingMode::Automatic);
    assert!(rec.is_recording());

    let mut manual_only = recorder();
    assert!(!manual_only.on_combat_start(base));
    assert_eq!(manual_only.state(), RecorderState::NotRecording);
}

// ─────────────────────────────────────────────────────────────────────────────
// Capturing
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_party_filter() {
    let base = Instant::now();
    let mut rec = recorder();
    rec.start(RecordingMode::Manual, base);
    assert!(!rec.on_action(&ActionUsage::new(1, "Stranger").outside_party(), base));

    let mut everyone = ActionRecorder::new(RecorderConfig {
        party_only: false,
        ..RecorderConfig::default()
    });
    everyone.start(RecordingMode::Manual, base);
    assert!(everyone.on_action(&ActionUsage::new(1, "Stranger").outside_party(), base));
}

#[test]
fn test_actions_keep_details() {
    let base = Instant::now();
    let mut rec = recorder();
    let mut store = MemoryStore::new();
    rec.set_territory(1122);
    rec.start(RecordingMode::Manual, base);
    rec.on_action(
        &ActionUsage::new(7433, "Alice").with_job(24).with_target("Alice"),
        at(base, 1.0),
    );
    rec.on_action(&ActionUsage::new(3540, "Bob"), at(base, 2.0));
    rec.on_action(&ActionUsage::new(7433, "Alice"), at(base, 9.0));
    rec.mark_cleared();

    let saved = rec.stop(at(base, 30.0), &mut store).unwrap().unwrap();
    assert_eq!(saved.territory_id, 1122);
    assert_eq!(saved.party_members, vec!["Alice".to_string(), "Bob".to_string()]);
    assert_eq!(saved.actions[0].job_id, Some(24));
    assert_eq!(saved.actions[0].target_name.as_deref(), Some("Alice"));
    assert!(saved.is_cleared);
    assert_eq!(saved.duration_secs, 30.0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Stopping
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_stop_persists_empty_recording() {
    let base = Instant::now();
    let mut rec = recorder();
    let mut store = MemoryStore::new();
    rec.start(RecordingMode::Manual, base);
    let saved = rec.stop(at(base, 5.0), &mut store).unwrap().unwrap();
    assert!(saved.actions.is_empty());
    assert_eq!(store.recordings().len(), 1);
    assert_eq!(rec.state(), RecorderState::NotRecording);
    assert!(rec.actions().is_empty());
}

#[test]
fn test_stop_while_armed_persists_empty_session() {
    let base = Instant::now();
    let mut rec = recorder();
    let mut store = MemoryStore::new();
    rec.set_territory(1122);
    rec.start_side_by_side("tl-abc", base);

    let result = rec.stop(at(base, 3.0), &mut store);
    let encounter = match result {
        Some(Ok(encounter)) => encounter,
        other => panic!("expected a saved recording, got {:?}", other),
    };
    assert_eq!(encounter.duration_secs, 0.0);
    assert!(encounter.actions.is_empty());
    assert_eq!(encounter.territory_id, 1122);
    assert_eq!(encounter.compared_timeline_id.as_deref(), Some("tl-abc"));

    assert_eq!(rec.state(), RecorderState::NotRecording);
    assert_eq!(rec.compared_timeline_id(), None);
    assert_eq!(store.recordings().len(), 1);
}

#[test]
fn test_stop_when_idle_is_noop() {
    let mut store = MemoryStore::new();
    assert!(recorder().stop(Instant::now(), &mut store).is_none());
}

#[test]
fn test_combat_end_stops_and_persists() {
    let base = Instant::now();
    let mut rec = recorder();
    let mut store = MemoryStore::new();

    rec.start(RecordingMode::Fresh, base);
    assert!(rec.on_combat_end(at(base, 1.0), &mut store).is_none());
    assert!(rec.is_armed());

    rec.on_combat_start(at(base, 2.0));
    let result = rec.on_combat_end(at(base, 62.0), &mut store);
    assert!(matches!(result, Some(Ok(_))));
    assert_eq!(store.recordings()[0].duration_secs, 60.0);
}

#[test]
fn test_failed_save_still_clears_state() {
    let base = Instant::now();
    let mut rec = recorder();
    rec.start(RecordingMode::Manual, base);
    rec.on_action(&ActionUsage::new(1, "Alice"), base);
    let result = rec.stop(at(base, 1.0), &mut FailingStore);
    assert!(matches!(result, Some(Err(StorageError::NoStorageDirectory))));
    assert_eq!(rec.state(), RecorderState::NotRecording);
    assert!(rec.actions().is_empty());
}
