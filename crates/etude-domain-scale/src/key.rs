use crate::pitch::{Spelling, SpellingError};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MAJOR_STEPS: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

pub const MAJOR_KEY_NAMES: [&str; 13] = [
    "C", "G", "D", "A", "E", "B", "F#", "F", "Bb", "Eb", "Ab", "Db", "Gb",
];

pub const MINOR_KEY_NAMES: [&str; 12] = [
    "Am", "Em", "Bm", "F#m", "C#m", "G#m", "Dm", "Gm", "Cm", "Fm", "Bbm", "Ebm",
];

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("key signature needs 7 notes, got {0}")]
    WrongLength(usize),
    #[error("duplicate note in key signature: {0}")]
    Duplicate(Spelling),
    #[error("invalid note: {0}")]
    Spelling(#[from] SpellingError),
    #[error("unknown key: {0}")]
    UnknownName(String),
    #[error("unknown tonality: {0}")]
    UnknownTonality(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tonality {
    Major,
    Minor,
}

impl Tonality {
    /// Signature index of the tonic: do for major, la for minor.
    pub fn tonic_index(self) -> usize {
        match self {
            Tonality::Major => 0,
            Tonality::Minor => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tonality::Major => "major",
            Tonality::Minor => "minor",
        }
    }
}

impl fmt::Display for Tonality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tonality {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "major" => Ok(Tonality::Major),
            "minor" => Ok(Tonality::Minor),
            other => Err(KeyError::UnknownTonality(other.to_string())),
        }
    }
}

/// Seven distinct spellings in degree order; index 0 is do.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeySignature {
    notes: [Spelling; 7],
}

/// Catalog entry: a conventional key name bound to its signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedKey {
    pub name: String,
    pub signature: KeySignature,
    pub tonality: Tonality,
}

impl KeySignature {
    pub fn new(notes: &[Spelling]) -> Result<Self, KeyError> {
        let notes: [Spelling; 7] = notes
            .try_into()
            .map_err(|_| KeyError::WrongLength(notes.len()))?;
        for (idx, note) in notes.iter().enumerate() {
            if notes[..idx].contains(note) {
                return Err(KeyError::Duplicate(*note));
            }
        }
        Ok(Self { notes })
    }

    /// Parses a comma or whitespace separated list such as `C,D,E,F,G,A,B`.
    pub fn parse_list(text: &str) -> Result<Self, KeyError> {
        let notes = text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(|part| part.parse::<Spelling>())
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(&notes)
    }

    /// Major scale on `tonic`, one letter per degree.
    pub fn major(tonic: Spelling) -> Result<Self, KeyError> {
        let mut notes = Vec::with_capacity(7);
        for (idx, step) in MAJOR_STEPS.iter().enumerate() {
            let letter = tonic.letter.shifted(idx);
            let pitch_class = tonic.pitch_class().transpose(*step);
            let spelling = Spelling::on_letter(letter, pitch_class)
                .ok_or_else(|| KeyError::UnknownName(tonic.to_string()))?;
            notes.push(spelling);
        }
        Self::new(&notes)
    }

    /// Signature shared by the natural minor scale on `tonic`.
    pub fn relative_of_minor(tonic: Spelling) -> Result<Self, KeyError> {
        let relative_pc = tonic.pitch_class().transpose(3);
        let relative = Spelling::on_letter(tonic.letter.shifted(2), relative_pc)
            .ok_or_else(|| KeyError::UnknownName(format!("{tonic}m")))?;
        Self::major(relative)
    }

    /// Case-insensitive lookup in the named-key catalog (`Bb`, `F#m`, `EBM`).
    pub fn named(name: &str) -> Result<NamedKey, KeyError> {
        let wanted = name.trim();
        named_keys()
            .into_iter()
            .find(|key| key.name.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| KeyError::UnknownName(wanted.to_string()))
    }

    /// Uniform choice among the major signatures of the catalog.
    pub fn random(rng: &mut impl Rng) -> Result<NamedKey, KeyError> {
        let majors: Vec<NamedKey> = named_keys()
            .into_iter()
            .filter(|key| key.tonality == Tonality::Major)
            .collect();
        majors
            .choose(rng)
            .cloned()
            .ok_or_else(|| KeyError::UnknownName("random".to_string()))
    }

    pub fn notes(&self) -> &[Spelling; 7] {
        &self.notes
    }

    pub fn degree_of(&self, spelling: Spelling) -> Option<usize> {
        self.notes.iter().position(|note| *note == spelling)
    }

    pub fn tonic(&self, tonality: Tonality) -> Spelling {
        self.notes[tonality.tonic_index()]
    }
}

impl fmt::Display for KeySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, note) in self.notes.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{note}")?;
        }
        Ok(())
    }
}

pub fn named_keys() -> Vec<NamedKey> {
    let mut keys = Vec::with_capacity(MAJOR_KEY_NAMES.len() + MINOR_KEY_NAMES.len());
    for name in MAJOR_KEY_NAMES {
        if let Ok(signature) = name
            .parse::<Spelling>()
            .map_err(KeyError::from)
            .and_then(KeySignature::major)
        {
            keys.push(NamedKey {
                name: name.to_string(),
                signature,
                tonality: Tonality::Major,
            });
        }
    }
    for name in MINOR_KEY_NAMES {
        let tonic = name.trim_end_matches('m');
        if let Ok(signature) = tonic
            .parse::<Spelling>()
            .map_err(KeyError::from)
            .and_then(KeySignature::relative_of_minor)
        {
            keys.push(NamedKey {
                name: name.to_string(),
                signature,
                tonality: Tonality::Minor,
            });
        }
    }
    keys
}
