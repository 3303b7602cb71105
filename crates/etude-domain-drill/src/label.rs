use crate::progression::{ChordDef, ChordPosition, ChordQuality, Progression};
use crate::solfege::Syllable;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Name of a melody tone against its chord, e.g. `sol, 5, dominant`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HarmonicLabel {
    pub syllable: Syllable,
    pub position: ChordPosition,
    /// Present only when the syllable and position occur under several qualities.
    pub quality: Option<ChordQuality>,
}

impl HarmonicLabel {
    /// Text for a speech engine, with phonetic syllables.
    pub fn spoken(&self) -> String {
        self.render(self.syllable.pronunciation())
    }

    fn render(&self, syllable: &str) -> String {
        match self.quality {
            Some(quality) => format!("{syllable}, {}, {quality}", self.position),
            None => format!("{syllable}, {}", self.position),
        }
    }
}

impl fmt::Display for HarmonicLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(self.syllable.name()))
    }
}

/// Qualities under which each (syllable, position) pair appears in one progression.
#[derive(Clone, Debug, Default)]
pub struct LabelResolver {
    qualities: HashMap<(Syllable, ChordPosition), BTreeSet<ChordQuality>>,
}

impl LabelResolver {
    pub fn for_progression(progression: &Progression) -> Self {
        let mut qualities: HashMap<(Syllable, ChordPosition), BTreeSet<ChordQuality>> =
            HashMap::new();
        for chord in &progression.chords {
            for (index, syllable) in chord.tones.iter().enumerate() {
                qualities
                    .entry((*syllable, ChordPosition::from_tone_index(index)))
                    .or_default()
                    .insert(chord.quality);
            }
        }
        Self { qualities }
    }

    pub fn qualities(
        &self,
        syllable: Syllable,
        position: ChordPosition,
    ) -> Option<&BTreeSet<ChordQuality>> {
        self.qualities.get(&(syllable, position))
    }

    pub fn needs_qualifier(&self, syllable: Syllable, position: ChordPosition) -> bool {
        self.qualities(syllable, position)
            .is_some_and(|set| set.len() > 1)
    }

    pub fn label_for(&self, chord: &ChordDef, tone_index: usize) -> Option<HarmonicLabel> {
        let syllable = *chord.tones.get(tone_index)?;
        Some(self.label(
            syllable,
            ChordPosition::from_tone_index(tone_index),
            chord.quality,
        ))
    }

    /// Label for a tone already known to sit at `position` in a chord of `quality`.
    pub fn label(
        &self,
        syllable: Syllable,
        position: ChordPosition,
        quality: ChordQuality,
    ) -> HarmonicLabel {
        HarmonicLabel {
            syllable,
            position,
            quality: self.needs_qualifier(syllable, position).then_some(quality),
        }
    }
}
