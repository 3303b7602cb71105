use crate::pitch::{Spelling, SpellingError};
use etude_ports::types::NoteId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NoteParseError {
    #[error("invalid spelling in {0}: {1}")]
    Spelling(String, SpellingError),
    #[error("missing octave in {0}")]
    MissingOctave(String),
    #[error("invalid octave in {0}")]
    InvalidOctave(String),
}

/// Octave-qualified note. Octave numbering follows sample file names, so
/// `Cb4` sits at `4 * 12 + 11` rather than below `C4`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Note {
    pub spelling: Spelling,
    pub octave: i32,
}

impl Note {
    pub const fn new(spelling: Spelling, octave: i32) -> Self {
        Self { spelling, octave }
    }

    pub fn absolute_pitch(&self) -> i32 {
        self.octave * 12 + self.spelling.pitch_class().get() as i32
    }

    pub fn id(&self) -> NoteId {
        NoteId(self.to_string())
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.spelling, self.octave)
    }
}

impl FromStr for Note {
    type Err = NoteParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let split = trimmed
            .char_indices()
            .skip(1)
            .find(|(_, c)| c.is_ascii_digit() || *c == '-')
            .map(|(idx, _)| idx)
            .ok_or_else(|| NoteParseError::MissingOctave(trimmed.to_string()))?;
        let (name, octave) = trimmed.split_at(split);
        let spelling = name
            .parse::<Spelling>()
            .map_err(|e| NoteParseError::Spelling(trimmed.to_string(), e))?;
        let octave = octave
            .parse::<i32>()
            .map_err(|_| NoteParseError::InvalidOctave(trimmed.to_string()))?;
        Ok(Note::new(spelling, octave))
    }
}

impl TryFrom<&NoteId> for Note {
    type Error = NoteParseError;

    fn try_from(id: &NoteId) -> Result<Self, Self::Error> {
        id.as_str().parse()
    }
}
