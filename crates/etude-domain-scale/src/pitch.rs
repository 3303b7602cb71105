use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SpellingError {
    #[error("empty note spelling")]
    Empty,
    #[error("unknown note letter: {0}")]
    UnknownLetter(char),
    #[error("unknown accidental: {0}")]
    UnknownAccidental(String),
    #[error("alteration out of range: {0}")]
    OutOfRange(String),
}

/// Semitone above C, always in 0..=11.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PitchClass(u8);

impl PitchClass {
    pub fn new(semitones: i32) -> Self {
        Self(semitones.rem_euclid(12) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn transpose(self, semitones: i32) -> Self {
        Self::new(self.0 as i32 + semitones)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    pub const ALL: [Letter; 7] = [
        Letter::C,
        Letter::D,
        Letter::E,
        Letter::F,
        Letter::G,
        Letter::A,
        Letter::B,
    ];

    pub fn natural_semitone(self) -> i32 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Letter `steps` positions above this one, wrapping after B.
    pub fn shifted(self, steps: usize) -> Letter {
        Self::ALL[(self.index() + steps) % Self::ALL.len()]
    }

    pub fn from_char(c: char) -> Result<Letter, SpellingError> {
        match c.to_ascii_uppercase() {
            'C' => Ok(Letter::C),
            'D' => Ok(Letter::D),
            'E' => Ok(Letter::E),
            'F' => Ok(Letter::F),
            'G' => Ok(Letter::G),
            'A' => Ok(Letter::A),
            'B' => Ok(Letter::B),
            _ => Err(SpellingError::UnknownLetter(c)),
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
            Letter::A => 'A',
            Letter::B => 'B',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Accidental {
    DoubleFlat,
    Flat,
    Natural,
    Sharp,
    DoubleSharp,
}

impl Accidental {
    pub fn offset(self) -> i32 {
        match self {
            Accidental::DoubleFlat => -2,
            Accidental::Flat => -1,
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::DoubleSharp => 2,
        }
    }

    pub fn from_offset(offset: i32) -> Option<Accidental> {
        match offset {
            -2 => Some(Accidental::DoubleFlat),
            -1 => Some(Accidental::Flat),
            0 => Some(Accidental::Natural),
            1 => Some(Accidental::Sharp),
            2 => Some(Accidental::DoubleSharp),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Accidental::DoubleFlat => "bb",
            Accidental::Flat => "b",
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::DoubleSharp => "##",
        }
    }

    fn parse(text: &str) -> Result<Accidental, SpellingError> {
        match text {
            "" => Ok(Accidental::Natural),
            "b" | "♭" => Ok(Accidental::Flat),
            "bb" | "♭♭" | "𝄫" => Ok(Accidental::DoubleFlat),
            "#" | "♯" => Ok(Accidental::Sharp),
            "##" | "♯♯" | "x" | "𝄪" => Ok(Accidental::DoubleSharp),
            other => Err(SpellingError::UnknownAccidental(other.to_string())),
        }
    }
}

/// A written note name without octave, e.g. `F#` or `Bb`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Spelling {
    pub letter: Letter,
    pub accidental: Accidental,
}

impl Spelling {
    pub const fn new(letter: Letter, accidental: Accidental) -> Self {
        Self { letter, accidental }
    }

    pub const fn natural(letter: Letter) -> Self {
        Self::new(letter, Accidental::Natural)
    }

    pub fn pitch_class(self) -> PitchClass {
        PitchClass::new(self.letter.natural_semitone() + self.accidental.offset())
    }

    /// Same letter, moved by `semitones`. Fails past a double accidental.
    pub fn altered(self, semitones: i32) -> Result<Spelling, SpellingError> {
        let offset = self.accidental.offset() + semitones;
        Accidental::from_offset(offset)
            .map(|accidental| Spelling::new(self.letter, accidental))
            .ok_or_else(|| SpellingError::OutOfRange(format!("{self}{semitones:+}")))
    }

    /// Spelling on `letter` that sounds `pitch_class`, if one exists within a double accidental.
    pub fn on_letter(letter: Letter, pitch_class: PitchClass) -> Option<Spelling> {
        let mut diff = pitch_class.get() as i32 - letter.natural_semitone();
        if diff > 6 {
            diff -= 12;
        } else if diff < -6 {
            diff += 12;
        }
        Accidental::from_offset(diff).map(|accidental| Spelling::new(letter, accidental))
    }

    /// Other spellings of the same pitch class, simplest accidentals first.
    pub fn enharmonics(self) -> Vec<Spelling> {
        let mut found: Vec<Spelling> = Letter::ALL
            .iter()
            .filter_map(|&letter| Spelling::on_letter(letter, self.pitch_class()))
            .filter(|candidate| *candidate != self)
            .collect();
        found.sort_by_key(|s| (s.accidental.offset().abs(), s.accidental.offset()));
        found
    }
}

impl fmt::Display for Spelling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter.as_char(), self.accidental.symbol())
    }
}

impl FromStr for Spelling {
    type Err = SpellingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let first = chars.next().ok_or(SpellingError::Empty)?;
        let letter = Letter::from_char(first)?;
        let accidental = Accidental::parse(chars.as_str())?;
        Ok(Spelling::new(letter, accidental))
    }
}
