use crate::solfege::Syllable;
use etude_domain_scale::Tonality;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const PROGRESSION_NAMES: [&str; 4] =
    ["minor_swing", "dark_eyes", "major_cadence", "minor_cadence"];

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgressionError {
    #[error("unknown progression: {0}")]
    UnknownProgression(String),
    #[error("unknown chord: {0}")]
    UnknownChord(String),
    #[error("unknown chord quality: {0}")]
    UnknownQuality(String),
    #[error("progression {0} has no chords")]
    Empty(String),
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ChordQuality {
    Major,
    Minor,
    Dominant,
    Seventh,
}

impl ChordQuality {
    pub fn name(self) -> &'static str {
        match self {
            ChordQuality::Major => "major",
            ChordQuality::Minor => "minor",
            ChordQuality::Dominant => "dominant",
            ChordQuality::Seventh => "seventh",
        }
    }
}

impl fmt::Display for ChordQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChordQuality {
    type Err = ProgressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "major" => Ok(ChordQuality::Major),
            "minor" => Ok(ChordQuality::Minor),
            "dominant" => Ok(ChordQuality::Dominant),
            "seventh" => Ok(ChordQuality::Seventh),
            other => Err(ProgressionError::UnknownQuality(other.to_string())),
        }
    }
}

/// Role of a tone within its chord, printed as 1, 3, 5 or 7.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ChordPosition {
    Root,
    Third,
    Fifth,
    Seventh,
}

impl ChordPosition {
    /// Tones past the seventh count as roots.
    pub fn from_tone_index(index: usize) -> Self {
        match index {
            1 => ChordPosition::Third,
            2 => ChordPosition::Fifth,
            3 => ChordPosition::Seventh,
            _ => ChordPosition::Root,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChordPosition::Root => "1",
            ChordPosition::Third => "3",
            ChordPosition::Fifth => "5",
            ChordPosition::Seventh => "7",
        }
    }
}

impl fmt::Display for ChordPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Chord built from solfege tones, root first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChordDef {
    pub name: String,
    pub tones: Vec<Syllable>,
    pub quality: ChordQuality,
}

impl ChordDef {
    pub fn new(name: impl Into<String>, tones: &[Syllable], quality: ChordQuality) -> Self {
        Self {
            name: name.into(),
            tones: tones.to_vec(),
            quality,
        }
    }

    /// Tones voiced in the accompaniment; sevenths are only sung.
    pub fn triad(&self) -> &[Syllable] {
        &self.tones[..self.tones.len().min(3)]
    }

    /// Catalog lookup by name, e.g. `la_minor` or `mi_dominant`.
    pub fn named(name: &str) -> Result<ChordDef, ProgressionError> {
        use ChordQuality::*;
        use Syllable::*;

        let def = match name {
            "la_minor" => ChordDef::new(name, &[La, Do, Mi], Minor),
            "re_minor" => ChordDef::new(name, &[Re, Fa, La], Minor),
            "mi_minor" => ChordDef::new(name, &[Mi, Sol, Ti], Minor),
            "do_major" => ChordDef::new(name, &[Do, Mi, Sol], Major),
            "fa_major" => ChordDef::new(name, &[Fa, La, Do], Major),
            "sol_major" => ChordDef::new(name, &[Sol, Ti, Re], Major),
            "mi_dominant" => ChordDef::new(name, &[Mi, Si, Ti, Re], Dominant),
            "re_dominant" => ChordDef::new(name, &[Re, Fi, La, Do], Dominant),
            "sol_dominant" => ChordDef::new(name, &[Sol, Ti, Re, Fa], Dominant),
            "do_dominant" => ChordDef::new(name, &[Do, Mi, Sol, Te], Dominant),
            _ => return Err(ProgressionError::UnknownChord(name.to_string())),
        };
        Ok(def)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Progression {
    pub name: String,
    pub tonality: Tonality,
    pub chords: Vec<ChordDef>,
}

impl Progression {
    pub fn new(
        name: impl Into<String>,
        tonality: Tonality,
        chords: Vec<ChordDef>,
    ) -> Result<Self, ProgressionError> {
        let name = name.into();
        if chords.is_empty() {
            return Err(ProgressionError::Empty(name));
        }
        Ok(Self {
            name,
            tonality,
            chords,
        })
    }

    pub fn from_chord_names(
        name: &str,
        tonality: Tonality,
        chord_names: &[&str],
    ) -> Result<Self, ProgressionError> {
        let chords = chord_names
            .iter()
            .map(|chord| ChordDef::named(chord))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(name, tonality, chords)
    }

    pub fn named(name: &str) -> Result<Self, ProgressionError> {
        let wanted = name.trim().to_ascii_lowercase().replace('-', "_");
        match wanted.as_str() {
            "minor_swing" => Self::from_chord_names(
                "minor_swing",
                Tonality::Minor,
                &[
                    "la_minor",
                    "la_minor",
                    "re_minor",
                    "re_minor",
                    "la_minor",
                    "la_minor",
                    "mi_dominant",
                    "mi_dominant",
                    "re_minor",
                    "re_minor",
                    "la_minor",
                    "la_minor",
                    "mi_dominant",
                    "mi_dominant",
                    "la_minor",
                    "mi_dominant",
                ],
            ),
            "dark_eyes" => Self::from_chord_names(
                "dark_eyes",
                Tonality::Minor,
                &[
                    "mi_dominant",
                    "la_minor",
                    "mi_dominant",
                    "fa_major",
                    "re_minor",
                    "la_minor",
                    "mi_dominant",
                    "la_minor",
                ],
            ),
            "major_cadence" => Self::from_chord_names(
                "major_cadence",
                Tonality::Major,
                &["do_major", "fa_major", "sol_major", "do_major"],
            ),
            "minor_cadence" => Self::from_chord_names(
                "minor_cadence",
                Tonality::Minor,
                &["la_minor", "re_minor", "mi_minor", "la_minor"],
            ),
            _ => Err(ProgressionError::UnknownProgression(name.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.chords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }
}
