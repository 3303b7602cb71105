use crate::types::*;
use serde::{Deserialize, Serialize};

fn default_key() -> String {
    "random".to_string()
}

fn default_progression() -> String {
    "minor_swing".to_string()
}

fn default_tempo_bpm() -> u32 {
    120
}

fn default_melody_volume() -> Volume01 {
    Volume01::new(1.0)
}

fn default_chord_volume() -> Volume01 {
    Volume01::new(0.35)
}

fn default_harmony_volume() -> Volume01 {
    Volume01::new(0.5)
}

fn default_speech_volume() -> Volume01 {
    Volume01::new(0.7)
}

fn default_scale_octaves() -> OctaveRange {
    OctaveRange::new(3, 5)
}

fn default_chord_octaves() -> OctaveRange {
    OctaveRange::new(2, 3)
}

fn default_melody_octaves() -> OctaveRange {
    OctaveRange::new(5, 6)
}

fn default_cadence_every() -> u32 {
    5
}

fn default_cadence_style() -> String {
    "full".to_string()
}

fn default_pedagogy() -> String {
    "recognition".to_string()
}

fn default_true() -> bool {
    true
}

fn default_shapes() -> Vec<String> {
    ["random", "scale", "arpeggio", "chord", "chord-melody"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_session_minutes() -> u32 {
    40
}

fn default_note_seconds() -> f32 {
    1.0
}

fn default_repeat_rest_seconds() -> f32 {
    6.0
}

fn default_segment_rest_seconds() -> f32 {
    3.0
}

fn default_chord_melody_gap_seconds() -> f32 {
    1.0
}

fn default_poll_interval_ms() -> u64 {
    50
}

fn default_sample_dir() -> String {
    "notes".to_string()
}

fn default_sample_extension() -> String {
    "wav".to_string()
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serde(String),
}

/// Persisted practice options. Names are resolved and validated by the core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PracticeSettings {
    #[serde(default = "default_key")]
    pub key: String,
    pub tonality: Option<String>,
    #[serde(default = "default_progression")]
    pub progression: String,
    #[serde(default = "default_tempo_bpm")]
    pub tempo_bpm: u32,
    #[serde(default = "default_melody_volume")]
    pub melody_volume: Volume01,
    #[serde(default = "default_chord_volume")]
    pub chord_volume: Volume01,
    #[serde(default = "default_harmony_volume")]
    pub harmony_volume: Volume01,
    #[serde(default = "default_speech_volume")]
    pub speech_volume: Volume01,
    #[serde(default = "default_scale_octaves")]
    pub scale_octaves: OctaveRange,
    #[serde(default = "default_chord_octaves")]
    pub chord_octaves: OctaveRange,
    #[serde(default = "default_melody_octaves")]
    pub melody_octaves: OctaveRange,
    #[serde(default = "default_cadence_every")]
    pub cadence_every: u32,
    #[serde(default = "default_cadence_style")]
    pub cadence_style: String,
    #[serde(default = "default_pedagogy")]
    pub pedagogy: String,
    pub harmony_only: bool,
    #[serde(default = "default_true")]
    pub voice: bool,
    #[serde(default = "default_shapes")]
    pub shapes: Vec<String>,
    #[serde(default = "default_session_minutes")]
    pub session_minutes: u32,
    pub chunk_limit: Option<u32>,
    #[serde(default = "default_note_seconds")]
    pub note_seconds: f32,
    #[serde(default = "default_repeat_rest_seconds")]
    pub repeat_rest_seconds: f32,
    #[serde(default = "default_segment_rest_seconds")]
    pub segment_rest_seconds: f32,
    #[serde(default = "default_chord_melody_gap_seconds")]
    pub chord_melody_gap_seconds: f32,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    pub repeat_runs: bool,
    pub show_names: bool,
    #[serde(default = "default_true")]
    pub scale_walk: bool,
    #[serde(default = "default_sample_dir")]
    pub sample_dir: String,
    #[serde(default = "default_sample_extension")]
    pub sample_extension: String,
    pub seed: Option<u64>,
}

impl Default for PracticeSettings {
    fn default() -> Self {
        Self {
            key: default_key(),
            tonality: None,
            progression: default_progression(),
            tempo_bpm: default_tempo_bpm(),
            melody_volume: default_melody_volume(),
            chord_volume: default_chord_volume(),
            harmony_volume: default_harmony_volume(),
            speech_volume: default_speech_volume(),
            scale_octaves: default_scale_octaves(),
            chord_octaves: default_chord_octaves(),
            melody_octaves: default_melody_octaves(),
            cadence_every: default_cadence_every(),
            cadence_style: default_cadence_style(),
            pedagogy: default_pedagogy(),
            harmony_only: false,
            voice: true,
            shapes: default_shapes(),
            session_minutes: default_session_minutes(),
            chunk_limit: None,
            note_seconds: default_note_seconds(),
            repeat_rest_seconds: default_repeat_rest_seconds(),
            segment_rest_seconds: default_segment_rest_seconds(),
            chord_melody_gap_seconds: default_chord_melody_gap_seconds(),
            poll_interval_ms: default_poll_interval_ms(),
            repeat_runs: false,
            show_names: false,
            scale_walk: true,
            sample_dir: default_sample_dir(),
            sample_extension: default_sample_extension(),
            seed: None,
        }
    }
}

pub trait StoragePort: Send + Sync {
    fn load_settings(&self) -> Result<PracticeSettings, StorageError>;
    fn save_settings(&self, s: &PracticeSettings) -> Result<(), StorageError>;
}
