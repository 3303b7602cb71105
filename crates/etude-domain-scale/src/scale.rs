use crate::key::KeySignature;
use crate::note::Note;
use crate::pitch::Spelling;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0} is not in the key")]
pub struct NotInKey(pub Spelling);

/// Index modulo `len`, valid for negative indices. Returns 0 for an empty range.
pub fn wrap(index: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as isize;
    (((index % len) + len) % len) as usize
}

/// Octave-qualified run of a key signature, lowest note first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpandedScale {
    signature: KeySignature,
    notes: Vec<Note>,
}

pub struct ScaleModel;

impl ScaleModel {
    /// Walks the signature repeatedly from `min_octave`. The octave advances only when
    /// the pitch class drops; the step that would pass `max_octave` is discarded.
    pub fn build(signature: &KeySignature, min_octave: i32, max_octave: i32) -> ExpandedScale {
        let mut notes = Vec::with_capacity(7 * (max_octave - min_octave + 1).max(0) as usize);
        let mut octave = min_octave;
        let mut prev: Option<Spelling> = None;

        'expand: while octave <= max_octave {
            for spelling in signature.notes() {
                if let Some(prev) = prev {
                    if prev.pitch_class() > spelling.pitch_class() {
                        octave += 1;
                        if octave > max_octave {
                            break 'expand;
                        }
                    }
                }
                notes.push(Note::new(*spelling, octave));
                prev = Some(*spelling);
            }
        }

        ExpandedScale {
            signature: signature.clone(),
            notes,
        }
    }
}

impl ExpandedScale {
    pub fn signature(&self) -> &KeySignature {
        &self.signature
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Note> {
        self.notes.get(index)
    }

    /// Note at `index` wrapped into the scale.
    ///
    /// # Panics
    /// On an empty scale.
    pub fn at(&self, index: isize) -> Note {
        self.notes[wrap(index, self.notes.len())]
    }

    /// Degree of the note stored at `index`; expansion never skips a signature entry.
    pub fn degree_at(&self, index: usize) -> usize {
        index % 7
    }

    pub fn degree_of(&self, note: &Note) -> Result<usize, NotInKey> {
        self.signature
            .degree_of(note.spelling)
            .ok_or(NotInKey(note.spelling))
    }

    pub fn position_of(&self, note: &Note) -> Option<usize> {
        self.notes.iter().position(|candidate| candidate == note)
    }
}
