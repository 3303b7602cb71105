use serde::{Deserialize, Serialize};
use std::fmt;

/// Sample identifier: spelling plus octave, e.g. `C#4` or `Bb2`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteId(pub String);

impl NoteId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(from = "f32")]
pub struct Volume01(pub f32);

impl From<f32> for Volume01 {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl Volume01 {
    pub fn new(value: f32) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    pub fn get(self) -> f32 {
        self.0
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.0 * factor)
    }

    /// Integer percentage, as used by system volume controls.
    pub fn percent(self) -> u8 {
        (self.0 * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

/// Inclusive octave bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OctaveRange {
    pub min: i32,
    pub max: i32,
}

impl OctaveRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn is_valid(self) -> bool {
        self.min <= self.max
    }

    pub fn contains(self, octave: i32) -> bool {
        (self.min..=self.max).contains(&octave)
    }
}

impl fmt::Display for OctaveRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.min, self.max)
    }
}
