//! Action catalog lookup.
//!
//! The host owns the real action sheet; the core only needs a name and an
//! icon for an action id, and must keep working when either is missing.

use std::path::Path;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::storage::StorageError;

/// Display data for one action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionInfo {
    pub name: String,
    /// Icon identifier, 0 when the host could not resolve one
    #[serde(default)]
    pub icon_id: u32,
}

/// Lookup from action id to display data.
///
/// Implementations must never fail: unknown ids return `None` and callers
/// fall back to placeholders.
pub trait ActionCatalog {
    fn action_info(&self, action_id: u32) -> Option<ActionInfo>;

    /// Icon id for an action, 0 when unknown
    fn icon_id(&self, action_id: u32) -> u32 {
        self.action_info(action_id).map_or(0, |info| info.icon_id)
    }

    /// Display name for an action, with a generic fallback
    fn display_name(&self, action_id: u32) -> String {
        self.action_info(action_id)
            .map(|info| info.name)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("Action #{}", action_id))
    }
}

/// In-memory catalog, typically filled from a host-exported JSON sheet
#[derive(Debug, Clone, Default)]
pub struct StaticActionCatalog {
    actions: HashMap<u32, ActionInfo>,
}

impl StaticActionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, action_id: u32, name: impl Into<String>, icon_id: u32) {
        self.actions.insert(
            action_id,
            ActionInfo {
                name: name.into(),
                icon_id,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Parse a `{"<action id>": {"name": .., "icon_id": ..}}` document.
    ///
    /// Entries whose key is not a number are skipped.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: std::collections::HashMap<String, ActionInfo> = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for (key, info) in raw {
            match key.trim().parse::<u32>() {
                Ok(id) => {
                    catalog.actions.insert(id, info);
                }
                Err(_) => tracing::debug!(key = %key, "Skipping non-numeric action catalog key"),
            }
        }
        Ok(catalog)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, StorageError> {
        let content = std::fs::read_to_string(path).map_err(|source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| StorageError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl ActionCatalog for StaticActionCatalog {
    fn action_info(&self, action_id: u32) -> Option<ActionInfo> {
        self.actions.get(&action_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_action_falls_back() {
        let catalog = StaticActionCatalog::new();
        assert_eq!(catalog.icon_id(7431), 0);
        assert_eq!(catalog.display_name(7431), "Action #7431");
    }

    #[test]
    fn test_from_json_skips_bad_keys() {
        let catalog = StaticActionCatalog::from_json(
            r#"{
                "7431": {"name": "Stoneskin II", "icon_id": 2011},
                "16536": {"name": "Temperance"},
                "oops": {"name": "Nothing", "icon_id": 1}
            }"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.icon_id(7431), 2011);
        assert_eq!(catalog.icon_id(16536), 0);
        assert_eq!(catalog.display_name(16536), "Temperance");
    }

    #[test]
    fn test_empty_name_uses_fallback() {
        let mut catalog = StaticActionCatalog::new();
        catalog.insert(1, "", 5);
        assert_eq!(catalog.display_name(1), "Action #1");
        assert_eq!(catalog.icon_id(1), 5);
    }
}
