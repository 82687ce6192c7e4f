//! Conversion of fetched combat-log fights into timelines.
//!
//! Fetching is done by the host; it hands over the fight's cast list as plain
//! data and this module turns it into a timeline.

use serde::{Deserialize, Serialize};

use crate::game_data::{ActionCatalog, is_auto_attack, job_id_from_log_name};
use crate::grouping::{DEDUP_WINDOW_SECS, dedupe_by_source};
use crate::marker::ActionMarker;
use crate::timeline::Timeline;

/// One cast from an imported log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedCast {
    /// Milliseconds since the fight started
    pub timestamp_ms: i64,
    pub source_name: String,
    /// Job type name as reported by the log service (e.g. "WhiteMage")
    #[serde(default)]
    pub source_job: Option<String>,
    pub ability_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedFight {
    pub name: String,
    #[serde(default)]
    pub territory_id: u32,
    pub duration_ms: u64,
    #[serde(default)]
    pub casts: Vec<ImportedCast>,
}

impl ImportedCast {
    fn timestamp_secs(&self) -> f32 {
        self.timestamp_ms as f32 / 1000.0
    }
}

/// Build a timeline from an imported fight.
///
/// Auto-attacks and casts outside the fight window are dropped, rapid repeats
/// are collapsed per source, and the fight length becomes the duration.
pub fn fight_to_timeline(fight: &ImportedFight, catalog: &dyn ActionCatalog) -> Timeline {
    let fight_secs = fight.duration_ms as f32 / 1000.0;

    let candidates: Vec<&ImportedCast> = fight
        .casts
        .iter()
        .filter(|cast| !is_auto_attack(cast.ability_id))
        .filter(|cast| cast.timestamp_ms >= 0 && cast.timestamp_secs() <= fight_secs)
        .collect();
    let dropped = fight.casts.len() - candidates.len();

    let casts = dedupe_by_source(
        candidates,
        DEDUP_WINDOW_SECS,
        |cast| cast.source_name.as_str(),
        |cast| (Some(cast.ability_id), cast.timestamp_secs()),
    );

    let mut timeline = Timeline::new(fight.name.clone(), fight.territory_id, fight_secs);
    for cast in &casts {
        let job_id = cast.source_job.as_deref().and_then(job_id_from_log_name);
        let marker = ActionMarker::new(cast.ability_id)
            .with_player(cast.source_name.clone(), job_id)
            .with_icon(catalog.icon_id(cast.ability_id));
        timeline.add_action(cast.timestamp_secs(), marker);
    }

    tracing::info!(
        fight = %fight.name,
        markers = timeline.markers.len(),
        dropped,
        "Imported fight converted to timeline"
    );
    timeline
}
