//! Static game data tables.
//!
//! The job tables and the auto-attack ability set are generated at build time
//! from `data/` into `phf` maps, so lookups are allocation-free and the tables
//! are immutable for the lifetime of the process.

mod catalog;

pub use catalog::{ActionCatalog, ActionInfo, StaticActionCatalog};

mod generated {
    include!(concat!(env!("OUT_DIR"), "/jobs.rs"));
    include!(concat!(env!("OUT_DIR"), "/auto_attacks.rs"));
}

pub use generated::{
    AUTO_ATTACK_ABILITIES, JOB_ABBREVIATIONS, JOB_IDS_BY_ABBREVIATION, JOB_IDS_BY_LOG_NAME,
    JOB_ROLES,
};

/// Combat role of a job, used to order party members in editors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Tank,
    Healer,
    Melee,
    Ranged,
    Caster,
}

impl Role {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "tank" => Some(Self::Tank),
            "healer" => Some(Self::Healer),
            "melee" => Some(Self::Melee),
            "ranged" => Some(Self::Ranged),
            "caster" => Some(Self::Caster),
            _ => None,
        }
    }
}

/// Three-letter abbreviation for a job id (e.g. 24 -> "WHM")
pub fn job_abbreviation(job_id: u8) -> Option<&'static str> {
    JOB_ABBREVIATIONS.get(&job_id).copied()
}

pub fn job_role(job_id: u8) -> Option<Role> {
    JOB_ROLES.get(&job_id).and_then(|tag| Role::from_tag(tag))
}

/// Resolve a job from the log-import job type name (e.g. "WhiteMage").
///
/// Falls back to abbreviation matching so hand-edited imports using "WHM"
/// resolve as well.
pub fn job_id_from_log_name(name: &str) -> Option<u8> {
    let trimmed = name.trim();
    JOB_IDS_BY_LOG_NAME
        .get(trimmed)
        .or_else(|| JOB_IDS_BY_ABBREVIATION.get(trimmed.to_ascii_uppercase().as_str()))
        .copied()
}

/// Auto-attacks are never placed on a timeline
pub fn is_auto_attack(action_id: u32) -> bool {
    AUTO_ATTACK_ABILITIES.contains(&action_id)
}
