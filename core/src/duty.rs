//! Binds the active timeline to the player's current territory.

use std::sync::Arc;

use crate::events::CoreSignal;
use crate::playback::PlaybackEngine;
use crate::timeline::TimelineLibrary;

/// Tracks which territory the player is in and which timeline the engine was
/// given for it.
#[derive(Debug, Default)]
pub struct DutyBinder {
    current_territory: Option<u32>,
    active_timeline_id: Option<String>,
}

impl DutyBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_territory(&self) -> Option<u32> {
        self.current_territory
    }

    pub fn active_timeline_id(&self) -> Option<&str> {
        self.active_timeline_id.as_deref()
    }

    /// Swap the engine's timeline for the one bound to `territory_id`.
    ///
    /// Re-entering a territory whose timeline is already active leaves a
    /// running playback untouched.
    pub fn on_territory_changed(
        &mut self,
        territory_id: u32,
        library: &TimelineLibrary,
        engine: &mut PlaybackEngine,
    ) -> Option<CoreSignal> {
        self.current_territory = Some(territory_id);
        self.bind(territory_id, library, engine)
    }

    /// Re-evaluate the current territory after the library changed
    pub fn refresh(
        &mut self,
        library: &TimelineLibrary,
        engine: &mut PlaybackEngine,
    ) -> Option<CoreSignal> {
        let territory_id = self.current_territory?;
        self.bind(territory_id, library, engine)
    }

    fn bind(
        &mut self,
        territory_id: u32,
        library: &TimelineLibrary,
        engine: &mut PlaybackEngine,
    ) -> Option<CoreSignal> {
        match library.for_territory(territory_id) {
            Some(timeline) => {
                let unchanged = self.active_timeline_id.as_deref() == Some(timeline.id.as_str())
                    && engine
                        .timeline()
                        .is_some_and(|loaded| Arc::ptr_eq(loaded, timeline));
                if unchanged {
                    tracing::debug!(territory_id, timeline_id = %timeline.id, "Timeline already active");
                    return None;
                }
                tracing::info!(
                    territory_id,
                    timeline_id = %timeline.id,
                    name = %timeline.name,
                    "Activating timeline for territory"
                );
                self.active_timeline_id = Some(timeline.id.clone());
                engine.load_timeline(Some(timeline.clone()));
                Some(CoreSignal::TimelineActivated {
                    timeline_id: timeline.id.clone(),
                    territory_id,
                })
            }
            None => {
                self.active_timeline_id.take()?;
                tracing::info!(territory_id, "No timeline for territory, unloading");
                engine.unload_timeline();
                Some(CoreSignal::TimelineDeactivated { territory_id })
            }
        }
    }
}
