//! Chime sound selection and its JSON settings file.
//!
//! Audio decoding belongs to the hardware shell; the core only picks which
//! configured sound to play and hands the path to the `AudioSink`
//! collaborator.

use std::sync::Arc;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::Storage;

/// Play/volume capability of the audio hardware.
pub trait AudioSink: Send {
    /// Starts playing the file at `path`. Returns false if the device
    /// refused it.
    fn play(&mut self, path: &str) -> bool;

    /// True while a sound is still playing.
    fn is_busy(&self) -> bool;

    /// Sets the output volume (0-21).
    fn set_volume(&mut self, level: u8);
}

fn default_volume() -> u8 {
    10
}

/// Persisted chime settings: output volume plus the candidate sound files a
/// ring picks from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChimeSettings {
    #[serde(default = "default_volume")]
    pub volume: u8,
    #[serde(default)]
    pub files: Vec<String>,
}

impl Default for ChimeSettings {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            files: Vec::new(),
        }
    }
}

/// Chime selector: owns the settings and the audio device.
pub struct ChimePlayer {
    storage: Arc<dyn Storage>,
    settings_file: String,
    sink: Box<dyn AudioSink>,
    settings: ChimeSettings,
}

impl ChimePlayer {
    pub fn new(
        storage: Arc<dyn Storage>,
        settings_file: impl Into<String>,
        mut sink: Box<dyn AudioSink>,
    ) -> Self {
        let settings = ChimeSettings::default();
        sink.set_volume(settings.volume);
        Self {
            storage,
            settings_file: settings_file.into(),
            sink,
            settings,
        }
    }

    /// Loads settings from the settings file. A missing or empty file is not
    /// an error: the defaults are written out as the starting point.
    pub fn load(&mut self) -> Result<()> {
        tracing::info!("Loading chime settings");
        let raw = self.storage.read(&self.settings_file);
        if raw.is_empty() {
            if !self.persist() {
                return Err(Error::StorageWrite(self.settings_file.clone()));
            }
            return Ok(());
        }
        self.apply(raw.trim())
    }

    /// Parses a JSON payload and replaces the current settings, applying the
    /// new volume to the audio device immediately. The file list is replaced
    /// wholesale.
    pub fn apply(&mut self, raw: &str) -> Result<()> {
        let settings: ChimeSettings = serde_json::from_str(raw)
            .map_err(|e| Error::Malformed(self.settings_file.clone(), e.to_string()))?;
        self.sink.set_volume(settings.volume);
        self.settings = settings;
        Ok(())
    }

    /// Replaces the current settings and persists the result.
    pub fn update(&mut self, raw: &str) -> Result<()> {
        self.apply(raw)?;
        if !self.persist() {
            return Err(Error::StorageWrite(self.settings_file.clone()));
        }
        Ok(())
    }

    /// Serializes the current settings and writes them to the settings file.
    pub fn persist(&self) -> bool {
        let raw = match serde_json::to_string(&self.settings) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!("Could not serialize chime settings: {}", e);
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

    /// Picks a random configured sound and plays it, returning the chosen
    /// path. None when no files are configured.
    pub fn play_random(&mut self) -> Option<String> {
        let path = self.settings.files.choose(&mut rand::thread_rng())?.clone();
        self.play(&path);
        Some(path)
    }

    /// Plays a specific sound file.
    pub fn play(&mut self, path: &str) -> bool {
        tracing::info!("Playing: {}", path);
        self.sink.play(path)
    }

    /// True while a chime is still playing.
    pub fn is_playing(&self) -> bool {
        self.sink.is_busy()
    }

    pub fn settings(&self) -> &ChimeSettings {
        &self.settings
    }
}
