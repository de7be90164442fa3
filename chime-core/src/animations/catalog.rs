//! Animation catalog: named animations plus JSON load/save.

use std::collections::HashMap;
use std::sync::Arc;

use crate::animations::defaults::default_animations;
use crate::animations::types::{Animation, AnimationsFile};
use crate::error::{Error, Result};
use crate::storage::Storage;

/// Mapping from name to animation, backed by a JSON settings file.
///
/// Names are either event kind names (RING_START, READY, ...) or arbitrary
/// context strings such as a chime sound name, letting a specific sound carry
/// its own light show.
///
/// Updates merge: entries in a new payload add or overwrite by name, and
/// names absent from the payload keep their current animation. This is the
/// opposite of the webhook registry's replace-on-update and is intentional.
pub struct AnimationCatalog {
    storage: Arc<dyn Storage>,
    settings_file: String,
    animations: HashMap<String, Animation>,
}

impl AnimationCatalog {
    /// Creates a catalog pre-seeded with the built-in default animations.
    pub fn new(storage: Arc<dyn Storage>, settings_file: impl Into<String>) -> Self {
        Self {
            storage,
            settings_file: settings_file.into(),
            animations: default_animations(),
        }
    }

    /// Creates a catalog with no entries at all.
    pub fn empty(storage: Arc<dyn Storage>, settings_file: impl Into<String>) -> Self {
        Self {
            storage,
            settings_file: settings_file.into(),
            animations: HashMap::new(),
        }
    }

    /// Loads saved animations from the settings file and merges them over
    /// the current set.
    pub fn load(&mut self) -> Result<()> {
        if !self.storage.exists(&self.settings_file) {
            tracing::info!("No animations file at {}", self.settings_file);
            return Err(Error::StorageRead(self.settings_file.clone()));
        }
        let raw = self.storage.read(&self.settings_file);
        self.apply(raw.trim())?;
        tracing::info!("Loaded animations from {}", self.settings_file);
        Ok(())
    }

    /// Parses a JSON payload and merges its animations into the catalog.
    ///
    /// A payload that fails to parse leaves the catalog untouched. Bad color
    /// cells inside an otherwise valid payload coerce to 0 instead of
    /// rejecting the entry.
    pub fn apply(&mut self, raw: &str) -> Result<()> {
        let parsed: AnimationsFile = serde_json::from_str(raw)
            .map_err(|e| Error::Malformed(self.settings_file.clone(), e.to_string()))?;
        for (name, spec) in parsed.animations {
            self.animations.insert(name, Animation::from(spec));
        }
        Ok(())
    }

    /// Merges a new payload and persists the resulting catalog.
    pub fn update(&mut self, raw: &str) -> Result<()> {
        self.apply(raw)?;
        if !self.persist() {
            return Err(Error::StorageWrite(self.settings_file.clone()));
        }
        Ok(())
    }

    /// Serializes the full catalog and writes it to the settings file.
    pub fn persist(&self) -> bool {
        let file = AnimationsFile {
            animations: self
                .animations
                .iter()
                .map(|(name, animation)| (name.clone(), animation.to_spec()))
                .collect(),
        };
        let raw = match serde_json::to_string(&file) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!("Could not serialize animations: {}", e);
                return false;
            }
        };
        self.storage.write(&self.settings_file, &raw)
    }

    /// Returns the stored settings file exactly as persisted, or an empty
    /// string when no file exists yet.
    pub fn get_raw(&self) -> String {
        if self.storage.exists(&self.settings_file) {
            self.storage.read(&self.settings_file)
        } else {
            String::new()
        }
    }

    pub fn get(&self, name: &str) -> Option<&Animation> {
        self.animations.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.animations.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }
}
