//! Preset persistence (§6 "Persisted state — Presets file")
//!
//! A presets file is a JSON document mapping preset name to its stored
//! query. `tag_query` is authoritative; `tag_expression` is a display-only
//! human string and is never parsed back.

use std::collections::HashMap;
use std::path::Path;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::aggregator::error::{AggregatorError, AggregatorResult};
use crate::aggregator::tags::query::TagQuery;

/// A single persisted preset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Preset {
    /// Strategy used when the preset was authored (`or`/`and`/`advanced`),
    /// kept for round-tripping the authoring UI; not consulted by
    /// [`super::tags::filter::resolve_filter`], which uses `tag_query` directly.
    pub strategy: String,
    /// Optional explicit server name list (informational).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<String>>,
    /// The authoritative query.
    pub tag_query: TagQuery,
    /// Human display expression; never parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_expression: Option<String>,
    /// ISO-8601 creation timestamp.
    pub created: String,
    /// ISO-8601 last-modified timestamp.
    pub last_modified: String,
    /// Optional human description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Read-many/write-few in-memory preset registry.
#[derive(Debug, Default)]
pub struct PresetStore {
    presets: RwLock<HashMap<String, Preset>>,
}

impl PresetStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a presets JSON document into a populated store.
    ///
    /// # Errors
    /// Returns [`AggregatorError::InputInvalid`] if the document isn't valid JSON
    /// or doesn't match the persisted shape.
    pub fn from_json(json: &str) -> AggregatorResult<Self> {
        let presets: HashMap<String, Preset> =
            serde_json::from_str(json).map_err(|e| AggregatorError::InputInvalid(e.to_string()))?;
        Ok(Self {
            presets: RwLock::new(presets),
        })
    }

    /// Load a presets store from a file path.
    ///
    /// # Errors
    /// Returns [`AggregatorError::Transient`] on I/O failure, or
    /// [`AggregatorError::InputInvalid`] on malformed content.
    pub fn load(path: &Path) -> AggregatorResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AggregatorError::Transient(format!("reading presets file: {e}")))?;
        Self::from_json(&content)
    }

    /// Serialize the current presets to a pretty JSON string.
    ///
    /// # Errors
    /// Returns [`AggregatorError::InputInvalid`] if serialization fails.
    pub fn to_json(&self) -> AggregatorResult<String> {
        serde_json::to_string_pretty(&*self.presets.read())
            .map_err(|e| AggregatorError::InputInvalid(e.to_string()))
    }

    /// Look up a preset by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Preset> {
        self.presets.read().get(name).cloned()
    }

    /// Insert or replace a preset.
    pub fn put(&self, name: String, preset: Preset) {
        self.presets.write().insert(name, preset);
    }

    /// Remove a preset by name.
    pub fn remove(&self, name: &str) -> Option<Preset> {
        self.presets.write().remove(name)
    }

    /// All preset names, in arbitrary order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.presets.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::tags::query::{string_to_query, Strategy};

    #[test]
    fn load_and_lookup_roundtrip() {
        let store = PresetStore::new();
        store.put(
            "web-only".to_string(),
            Preset {
                strategy: "or".to_string(),
                servers: None,
                tag_query: string_to_query("web", Strategy::Or),
                tag_expression: Some("web".to_string()),
                created: "2026-01-01T00:00:00Z".to_string(),
                last_modified: "2026-01-01T00:00:00Z".to_string(),
                description: None,
            },
        );
        let json = store.to_json().unwrap();
        let reloaded = PresetStore::from_json(&json).unwrap();
        assert!(reloaded.get("web-only").is_some());
        assert!(reloaded.get("missing").is_none());
    }
}
