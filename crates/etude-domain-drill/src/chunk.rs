use etude_domain_scale::{wrap, ExpandedScale, Note};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

pub const RANDOM_CHUNK_SIZE: RangeInclusive<usize> = 1..=7;
pub const SCALE_CHUNK_SIZE: RangeInclusive<usize> = 3..=12;
pub const ARPEGGIO_CHUNK_SIZE: RangeInclusive<usize> = 3..=17;
/// 1-3-5 cycle in scale steps; one full cycle spans an octave.
pub const ARPEGGIO_STEPS: [usize; 3] = [2, 2, 3];
/// Scale steps a second-inversion triad needs above its root.
pub const TRIAD_SPAN: usize = 9;
pub const MIN_PLAYABLE_CHUNK: usize = 3;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown chunk shape: {0}")]
pub struct UnknownShape(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChunkShape {
    Random,
    Scale,
    Arpeggio,
    Chord,
    ChordMelody,
}

impl ChunkShape {
    pub const ALL: [ChunkShape; 5] = [
        ChunkShape::Random,
        ChunkShape::Scale,
        ChunkShape::Arpeggio,
        ChunkShape::Chord,
        ChunkShape::ChordMelody,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ChunkShape::Random => "random",
            ChunkShape::Scale => "scale",
            ChunkShape::Arpeggio => "arpeggio",
            ChunkShape::Chord => "chord",
            ChunkShape::ChordMelody => "chord-melody",
        }
    }

    /// Melodic shapes, which may be played backwards.
    pub fn is_run(self) -> bool {
        matches!(
            self,
            ChunkShape::Random | ChunkShape::Scale | ChunkShape::Arpeggio
        )
    }
}

impl fmt::Display for ChunkShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChunkShape {
    type Err = UnknownShape;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        ChunkShape::ALL
            .into_iter()
            .find(|shape| shape.name() == wanted)
            .ok_or_else(|| UnknownShape(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn step(self) -> isize {
        match self {
            Direction::Ascending => 1,
            Direction::Descending => -1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Inversion {
    Root,
    First,
    Second,
}

impl Inversion {
    pub const ALL: [Inversion; 3] = [Inversion::Root, Inversion::First, Inversion::Second];

    /// Scale-step offsets from the root for a closed ascending voicing.
    pub fn offsets(self) -> [usize; 3] {
        match self {
            Inversion::Root => [0, 2, 4],
            Inversion::First => [2, 4, 7],
            Inversion::Second => [4, 7, 9],
        }
    }
}

/// Notes drawn from one expanded scale, with the scale positions they came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    pub shape: ChunkShape,
    pub indices: Vec<usize>,
    pub notes: Vec<Note>,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn is_playable(&self) -> bool {
        self.notes.len() >= MIN_PLAYABLE_CHUNK
    }

    pub fn reverse(&mut self) {
        self.indices.reverse();
        self.notes.reverse();
    }

    /// Highest-pitched note and its scale position.
    pub fn top(&self) -> Option<(usize, Note)> {
        self.indices
            .iter()
            .copied()
            .zip(self.notes.iter().copied())
            .max_by_key(|(_, note)| note.absolute_pitch())
    }
}

pub struct ChunkGenerator<'a> {
    scale: &'a ExpandedScale,
}

impl<'a> ChunkGenerator<'a> {
    pub fn new(scale: &'a ExpandedScale) -> Self {
        Self { scale }
    }

    pub fn scale(&self) -> &ExpandedScale {
        self.scale
    }

    pub fn generate(&self, shape: ChunkShape, rng: &mut impl Rng) -> Chunk {
        match shape {
            ChunkShape::Random => self.random_chunk(rng),
            ChunkShape::Scale => self.scale_chunk(rng),
            ChunkShape::Arpeggio => self.arpeggio_chunk(rng),
            ChunkShape::Chord => self.chord_chunk(rng),
            ChunkShape::ChordMelody => {
                let mut chunk = self.chord_chunk(rng);
                chunk.shape = ChunkShape::ChordMelody;
                chunk
            }
        }
    }

    /// 1..=7 notes sampled with replacement.
    pub fn random_chunk(&self, rng: &mut impl Rng) -> Chunk {
        let len = self.scale.len();
        if len == 0 {
            return self.from_indices(ChunkShape::Random, Vec::new());
        }
        let size = rng.random_range(RANDOM_CHUNK_SIZE);
        let indices = (0..size).map(|_| rng.random_range(0..len)).collect();
        self.from_indices(ChunkShape::Random, indices)
    }

    pub fn scale_chunk(&self, rng: &mut impl Rng) -> Chunk {
        let len = self.scale.len();
        if len == 0 {
            return self.from_indices(ChunkShape::Scale, Vec::new());
        }
        let size = rng.random_range(SCALE_CHUNK_SIZE);
        let start = rng.random_range(0..len);
        let direction = if rng.random_bool(0.5) {
            Direction::Ascending
        } else {
            Direction::Descending
        };
        self.scale_run(start, size, direction)
    }

    pub fn arpeggio_chunk(&self, rng: &mut impl Rng) -> Chunk {
        let len = self.scale.len();
        if len == 0 {
            return self.from_indices(ChunkShape::Arpeggio, Vec::new());
        }
        let size = rng.random_range(ARPEGGIO_CHUNK_SIZE);
        let root = rng.random_range(0..len);
        self.arpeggio(root, size)
    }

    /// Closed triad in a random inversion; the root leaves room for the widest voicing.
    pub fn chord_chunk(&self, rng: &mut impl Rng) -> Chunk {
        let len = self.scale.len();
        if len == 0 {
            return self.from_indices(ChunkShape::Chord, Vec::new());
        }
        let root = rng.random_range(0..len.saturating_sub(TRIAD_SPAN).max(1));
        let inversion = Inversion::ALL[rng.random_range(0..Inversion::ALL.len())];
        self.triad(root, inversion)
    }

    pub fn scale_run(&self, start: usize, size: usize, direction: Direction) -> Chunk {
        let len = self.scale.len();
        let indices = (0..size)
            .map(|i| wrap(start as isize + i as isize * direction.step(), len))
            .collect();
        self.from_indices(ChunkShape::Scale, indices)
    }

    pub fn arpeggio(&self, root: usize, size: usize) -> Chunk {
        let indices = arpeggio_indices(root, size, self.scale.len());
        self.from_indices(ChunkShape::Arpeggio, indices)
    }

    pub fn triad(&self, root: usize, inversion: Inversion) -> Chunk {
        let len = self.scale.len();
        let indices = inversion
            .offsets()
            .iter()
            .map(|offset| wrap((root + offset) as isize, len))
            .collect();
        self.from_indices(ChunkShape::Chord, indices)
    }

    fn from_indices(&self, shape: ChunkShape, indices: Vec<usize>) -> Chunk {
        let notes = indices.iter().map(|&i| self.scale.at(i as isize)).collect();
        Chunk {
            shape,
            indices,
            notes,
        }
    }
}

/// Scale positions visited by an arpeggio from `root`, stepping `2, 2, 3` and wrapping.
pub fn arpeggio_indices(root: usize, size: usize, len: usize) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(size);
    let mut current = wrap(root as isize, len);
    for i in 0..size {
        out.push(current);
        current = wrap((current + ARPEGGIO_STEPS[i % ARPEGGIO_STEPS.len()]) as isize, len);
    }
    out
}
