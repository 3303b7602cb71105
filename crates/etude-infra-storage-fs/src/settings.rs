use etude_ports::storage::{PracticeSettings, StorageError, StoragePort};
use std::fs;
use std::path::{Path, PathBuf};

/// Commented settings file matching `PracticeSettings::default()`.
pub const DEFAULT_SETTINGS_TOML: &str = r#"# etude settings

# "random", a key name (C, Bb, F#, Am, Ebm, ...) or seven notes: "C, D, E, F, G, A, B"
key = "random"

# "major" or "minor"; a minor key name implies minor, otherwise minor is the default
# tonality = "major"

# minor_swing, dark_eyes, major_cadence or minor_cadence
progression = "minor_swing"

# Chord duration is four beats
tempo_bpm = 120

# Volumes from 0.0 to 1.0
melody_volume = 1.0
chord_volume = 0.35
harmony_volume = 0.5
speech_volume = 0.7

# Inclusive octave ranges
scale_octaves = { min = 3, max = 5 }
chord_octaves = { min = 2, max = 3 }
melody_octaves = { min = 5, max = 6 }

# Free play: a cadence before every Nth chunk, "full" or "tonic"
cadence_every = 5
cadence_style = "full"
shapes = ["random", "scale", "arpeggio", "chord", "chord-melody"]
repeat_runs = false
show_names = false
scale_walk = true

# Progression: "recognition" names each tone after playing it, "audiation" before
pedagogy = "recognition"
harmony_only = false
voice = true

# Session length; chunk_limit ends the session early
session_minutes = 40
# chunk_limit = 20

# Timing in seconds
note_seconds = 1.0
repeat_rest_seconds = 6.0
segment_rest_seconds = 3.0
chord_melody_gap_seconds = 1.0
poll_interval_ms = 50

# Folder of <note><octave>.<extension> samples, e.g. notes/C#4.wav
sample_dir = "notes"
sample_extension = "wav"

# Fixed seed for reproducible sessions
# seed = 42
"#;

/// TOML settings file, by default `<config dir>/etude/settings.toml`.
pub struct FsStorage {
    path: PathBuf,
}

impl FsStorage {
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            path: base_dir.join("settings.toml"),
        }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_base_dir() -> Result<PathBuf, StorageError> {
        let base = dirs_next::config_dir()
            .ok_or_else(|| StorageError::Io("config dir not found".to_string()))?;
        Ok(base.join("etude"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn write_default(&self) -> Result<(), StorageError> {
        Self::write_text(&self.path, DEFAULT_SETTINGS_TOML)?;
        log::info!("wrote default settings to {}", self.path.display());
        Ok(())
    }

    fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
        let data = fs::read_to_string(path).map_err(|e| StorageError::Io(e.to_string()))?;
        toml::from_str(&data).map_err(|e| StorageError::Serde(e.to_string()))
    }

    fn write_toml<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
        let data =
            toml::to_string_pretty(value).map_err(|e| StorageError::Serde(e.to_string()))?;
        Self::write_text(path, &data)
    }

    fn write_text(path: &Path, data: &str) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        fs::write(path, data).map_err(|e| StorageError::Io(e.to_string()))
    }
}

impl Default for FsStorage {
    fn default() -> Self {
        let base_dir = Self::default_base_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(base_dir)
    }
}

impl StoragePort for FsStorage {
    fn load_settings(&self) -> Result<PracticeSettings, StorageError> {
        if !self.exists() {
            log::debug!("no settings at {}, using defaults", self.path.display());
            return Ok(PracticeSettings::default());
        }
        log::debug!("loading settings from {}", self.path.display());
        Self::read_toml(&self.path)
    }

    fn save_settings(&self, s: &PracticeSettings) -> Result<(), StorageError> {
        Self::write_toml(&self.path, s)?;
        log::info!("saved settings to {}", self.path.display());
        Ok(())
    }
}
