use crate::app::{PracticeMode, SessionSummary};
use etude_domain_drill::ChunkShape;
use etude_domain_scale::{Note, Tonality};
use etude_ports::types::NoteId;
use std::sync::Arc;

/// What the learner should see. Degrees are 0-based.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    Started {
        mode: PracticeMode,
        key: String,
        signature: String,
        tonality: Tonality,
        progression: Option<String>,
    },
    ScaleWalk,
    FreePlay,
    Cadence {
        chunk_index: u64,
    },
    Chunk {
        index: u64,
        shape: ChunkShape,
        len: usize,
    },
    Note {
        note: Note,
        degree: usize,
        show_name: bool,
    },
    Chord {
        notes: Vec<Note>,
        degrees: Vec<usize>,
        show_names: bool,
    },
    ProgressionChord {
        name: String,
        notes: Vec<Note>,
    },
    ChordAndMelody {
        chord: Vec<Note>,
        melody: Note,
    },
    MelodyAlone {
        note: Note,
    },
    Label {
        text: String,
    },
    MissingSample {
        note: NoteId,
    },
    Paused,
    Resumed,
    Finished(SessionSummary),
}

pub type EventCallback = Arc<dyn Fn(&SessionEvent) + Send + Sync + 'static>;

pub fn discard_events() -> EventCallback {
    Arc::new(|_| {})
}
