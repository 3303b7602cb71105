use etude_domain_scale::{KeySignature, Spelling, SpellingError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown solfege syllable: {0}")]
pub struct UnknownSyllable(pub String);

/// Movable-do syllables, do on the first note of the signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Syllable {
    Do,
    Di,
    Ra,
    Re,
    Ri,
    Me,
    Mi,
    Fa,
    Fi,
    Se,
    Sol,
    Si,
    Le,
    La,
    Li,
    Te,
    Ti,
}

impl Syllable {
    pub const ALL: [Syllable; 17] = [
        Syllable::Do,
        Syllable::Di,
        Syllable::Ra,
        Syllable::Re,
        Syllable::Ri,
        Syllable::Me,
        Syllable::Mi,
        Syllable::Fa,
        Syllable::Fi,
        Syllable::Se,
        Syllable::Sol,
        Syllable::Si,
        Syllable::Le,
        Syllable::La,
        Syllable::Li,
        Syllable::Te,
        Syllable::Ti,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Syllable::Do => "do",
            Syllable::Di => "di",
            Syllable::Ra => "ra",
            Syllable::Re => "re",
            Syllable::Ri => "ri",
            Syllable::Me => "me",
            Syllable::Mi => "mi",
            Syllable::Fa => "fa",
            Syllable::Fi => "fi",
            Syllable::Se => "se",
            Syllable::Sol => "sol",
            Syllable::Si => "si",
            Syllable::Le => "le",
            Syllable::La => "la",
            Syllable::Li => "li",
            Syllable::Te => "te",
            Syllable::Ti => "ti",
        }
    }

    /// How a speech engine should say the syllable.
    pub fn pronunciation(self) -> &'static str {
        match self {
            Syllable::Do => "doe",
            Syllable::Di => "dee",
            Syllable::Ra => "rah",
            Syllable::Re => "ray",
            Syllable::Ri => "ree",
            Syllable::Me => "may",
            Syllable::Mi => "me",
            Syllable::Fa => "far",
            Syllable::Fi => "fee",
            Syllable::Se => "say",
            Syllable::Sol => "so",
            Syllable::Si => "see",
            Syllable::Le => "lay",
            Syllable::La => "la",
            Syllable::Li => "lee",
            Syllable::Te => "tay",
            Syllable::Ti => "tea",
        }
    }

    /// Signature degree (0-based) and chromatic alteration in semitones.
    pub fn diatonic(self) -> (usize, i32) {
        match self {
            Syllable::Do => (0, 0),
            Syllable::Di => (0, 1),
            Syllable::Ra => (1, -1),
            Syllable::Re => (1, 0),
            Syllable::Ri => (1, 1),
            Syllable::Me => (2, -1),
            Syllable::Mi => (2, 0),
            Syllable::Fa => (3, 0),
            Syllable::Fi => (3, 1),
            Syllable::Se => (4, -1),
            Syllable::Sol => (4, 0),
            Syllable::Si => (4, 1),
            Syllable::Le => (5, -1),
            Syllable::La => (5, 0),
            Syllable::Li => (5, 1),
            Syllable::Te => (6, -1),
            Syllable::Ti => (6, 0),
        }
    }

    /// Semitones above do.
    pub fn semitones(self) -> i32 {
        const MAJOR: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];
        let (degree, alteration) = self.diatonic();
        MAJOR[degree] + alteration
    }

    pub fn spell_in(self, signature: &KeySignature) -> Result<Spelling, SpellingError> {
        let (degree, alteration) = self.diatonic();
        signature.notes()[degree].altered(alteration)
    }
}

impl fmt::Display for Syllable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Syllable {
    type Err = UnknownSyllable;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        let wanted = if wanted == "so" { "sol".to_string() } else { wanted };
        Syllable::ALL
            .into_iter()
            .find(|syllable| syllable.name() == wanted)
            .ok_or_else(|| UnknownSyllable(s.to_string()))
    }
}
