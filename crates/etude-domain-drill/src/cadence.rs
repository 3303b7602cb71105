use etude_domain_scale::{wrap, ExpandedScale, Note, Tonality};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown cadence style: {0}")]
pub struct UnknownCadenceStyle(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CadenceStyle {
    /// Every chord of the tonality's cadence.
    Full,
    /// The closing tonic chord struck twice.
    TonicTwice,
}

impl CadenceStyle {
    pub fn name(self) -> &'static str {
        match self {
            CadenceStyle::Full => "full",
            CadenceStyle::TonicTwice => "tonic",
        }
    }
}

impl fmt::Display for CadenceStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CadenceStyle {
    type Err = UnknownCadenceStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(CadenceStyle::Full),
            "tonic" | "tonic-twice" | "tonic_twice" => Ok(CadenceStyle::TonicTwice),
            _ => Err(UnknownCadenceStyle(s.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CadenceChord {
    /// 1-based major-scale degree of the chord root.
    pub root_degree: usize,
    pub indices: [usize; 3],
    pub notes: [Note; 3],
    /// 0-based signature degrees of root, third and fifth.
    pub degrees: [usize; 3],
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cadence {
    pub tonality: Tonality,
    pub chords: Vec<CadenceChord>,
}

impl Cadence {
    pub fn len(&self) -> usize {
        self.chords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }
}

pub struct CadenceModel;

impl CadenceModel {
    pub const MAJOR_DEGREES: [usize; 4] = [1, 4, 5, 1];
    /// vi-ii-iii-vi: i-iv-v-i of the relative minor.
    pub const MINOR_DEGREES: [usize; 4] = [6, 2, 3, 6];

    pub fn degrees(tonality: Tonality) -> [usize; 4] {
        match tonality {
            Tonality::Major => Self::MAJOR_DEGREES,
            Tonality::Minor => Self::MINOR_DEGREES,
        }
    }

    pub fn cadence(scale: &ExpandedScale, tonality: Tonality) -> Cadence {
        let chords = Self::degrees(tonality)
            .iter()
            .map(|&degree| Self::chord_on(scale, degree))
            .collect();
        Cadence { tonality, chords }
    }

    pub fn cadence_with_style(
        scale: &ExpandedScale,
        tonality: Tonality,
        style: CadenceStyle,
    ) -> Cadence {
        let full = Self::cadence(scale, tonality);
        match style {
            CadenceStyle::Full => full,
            CadenceStyle::TonicTwice => {
                let chords = match full.chords.last() {
                    Some(tonic) => vec![tonic.clone(), tonic.clone()],
                    None => Vec::new(),
                };
                Cadence { tonality, chords }
            }
        }
    }

    /// Closed root-position triad on a 1-based degree, in the lowest octave of the scale.
    pub fn chord_on(scale: &ExpandedScale, degree: usize) -> CadenceChord {
        let root = degree.saturating_sub(1);
        let len = scale.len();
        let indices = [root, root + 2, root + 4].map(|i| wrap(i as isize, len));
        CadenceChord {
            root_degree: degree,
            indices,
            notes: indices.map(|i| scale.at(i as isize)),
            degrees: indices.map(|i| scale.degree_at(i)),
        }
    }
}
