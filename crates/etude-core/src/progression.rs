use crate::config::{ConfigError, SessionConfig};
use crate::drill::limit_reached;
use crate::events::SessionEvent;
use crate::pacer::Interrupted;
use crate::player::{Player, Sounding};
use crate::session_state::StopReason;
use etude_domain_drill::{
    ChordDef, ChordPosition, HarmonicLabel, LabelResolver, Progression,
};
use etude_domain_scale::{Note, Spelling};
use etude_ports::types::OctaveRange;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// Share of the chord duration the chord-plus-melody segment lasts.
pub const CHORD_WITH_MELODY_SHARE: f64 = 0.35;
pub const MELODY_ALONE_SHARE: f64 = 0.25;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown pedagogy mode: {0}")]
pub struct UnknownPedagogy(pub String);

/// Order of the sounding and the naming of each melody tone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Pedagogy {
    /// Hear it, then name it.
    #[default]
    Recognition,
    /// Name it, then imagine and confirm it.
    Audiation,
}

impl Pedagogy {
    pub fn name(self) -> &'static str {
        match self {
            Pedagogy::Recognition => "recognition",
            Pedagogy::Audiation => "audiation",
        }
    }

    pub fn segments(self) -> [Segment; 3] {
        match self {
            Pedagogy::Recognition => [
                Segment::ChordWithMelody,
                Segment::Announce,
                Segment::MelodyAlone,
            ],
            Pedagogy::Audiation => [
                Segment::Announce,
                Segment::MelodyAlone,
                Segment::ChordWithMelody,
            ],
        }
    }
}

impl fmt::Display for Pedagogy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Pedagogy {
    type Err = UnknownPedagogy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recognition" => Ok(Pedagogy::Recognition),
            "audiation" => Ok(Pedagogy::Audiation),
            _ => Err(UnknownPedagogy(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment {
    ChordWithMelody,
    Announce,
    MelodyAlone,
}

/// A chord of the progression voiced for playback, with the melody tone drawn from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressionStep {
    pub chord: ChordDef,
    pub chord_notes: Vec<Note>,
    pub melody: Note,
    pub tone_index: usize,
    pub label: HarmonicLabel,
}

/// Ear-training mode: walks the progression chord by chord, naming one tone of each.
pub struct ProgressionSession {
    config: SessionConfig,
    resolver: LabelResolver,
    spelled: Vec<Vec<Spelling>>,
}

impl ProgressionSession {
    pub fn new(config: &SessionConfig) -> Result<Self, ConfigError> {
        let progression = &config.progression;
        let spelled = progression
            .chords
            .iter()
            .map(|chord| {
                chord
                    .tones
                    .iter()
                    .map(|tone| tone.spell_in(&config.signature))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| ConfigError::Unspellable {
                        chord: chord.name.clone(),
                        key: config.key_name.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            config: config.clone(),
            resolver: LabelResolver::for_progression(progression),
            spelled,
        })
    }

    pub fn progression(&self) -> &Progression {
        &self.config.progression
    }

    pub fn resolver(&self) -> &LabelResolver {
        &self.resolver
    }

    /// Voices chord `position` (wrapping) and picks its melody tone.
    pub fn plan_step(&self, position: usize, rng: &mut impl Rng) -> ProgressionStep {
        let index = position % self.spelled.len();
        let chord = self.config.progression.chords[index].clone();
        let tones = &self.spelled[index];

        let chord_notes = voice_ascending(
            &tones[..chord.triad().len()],
            random_octave(self.config.chord_octaves, rng),
        );

        let tone_index = rng.random_range(0..tones.len());
        let melody = Note::new(
            tones[tone_index],
            random_octave(self.config.melody_octaves, rng),
        );
        let label = self.resolver.label(
            chord.tones[tone_index],
            ChordPosition::from_tone_index(tone_index),
            chord.quality,
        );

        ProgressionStep {
            chord,
            chord_notes,
            melody,
            tone_index,
            label,
        }
    }

    /// Cycles through the progression until the budget or chunk limit is reached.
    pub fn run(&self, player: &mut Player, rng: &mut impl Rng) -> Result<StopReason, Interrupted> {
        let state = player.pacer().state().clone();
        let mut position = 0usize;
        loop {
            if let Some(reason) = limit_reached(&self.config, &state) {
                return Ok(reason);
            }
            player.pacer().checkpoint()?;

            let step = self.plan_step(position, rng);
            log::debug!("{}: melody {} ({})", step.chord.name, step.melody, step.label);
            player.emit(SessionEvent::ProgressionChord {
                name: step.chord.name.clone(),
                notes: step.chord_notes.clone(),
            });

            if self.config.harmony_only {
                player.play(
                    &step.chord_notes,
                    self.config.harmony_volume,
                    self.config.chord_duration(),
                )?;
            } else {
                self.play_step(player, &step)?;
            }

            state.record_chunk();
            position = (position + 1) % self.spelled.len();
        }
    }

    /// The chord keeps ringing from its first strike until the step is over.
    fn play_step(&self, player: &mut Player, step: &ProgressionStep) -> Result<(), Interrupted> {
        let chord_duration = self.config.chord_duration();
        let mut ringing: Option<Sounding> = None;

        for segment in self.config.pedagogy.segments() {
            match segment {
                Segment::ChordWithMelody => {
                    player.pacer().checkpoint()?;
                    player.emit(SessionEvent::ChordAndMelody {
                        chord: step.chord_notes.clone(),
                        melody: step.melody,
                    });
                    if ringing.is_none() {
                        ringing = Some(player.strike(&step.chord_notes, self.config.chord_volume));
                    }
                    player.play(
                        &[step.melody],
                        self.config.melody_volume,
                        chord_duration.mul_f64(CHORD_WITH_MELODY_SHARE),
                    )?;
                }
                Segment::Announce => {
                    player.say(&step.label.to_string(), &step.label.spoken())?;
                }
                Segment::MelodyAlone => {
                    player.emit(SessionEvent::MelodyAlone { note: step.melody });
                    player.play(
                        &[step.melody],
                        self.config.melody_volume,
                        chord_duration.mul_f64(MELODY_ALONE_SHARE),
                    )?;
                }
            }
            player.rest(self.config.timing.segment_rest)?;
        }

        if let Some(chord) = ringing {
            chord.stop();
        }
        Ok(())
    }
}

fn random_octave(range: OctaveRange, rng: &mut impl Rng) -> i32 {
    if range.is_valid() {
        rng.random_range(range.min..=range.max)
    } else {
        range.min
    }
}

/// Closed ascending voicing: each tone sits above the one before it.
pub fn voice_ascending(tones: &[Spelling], octave: i32) -> Vec<Note> {
    let mut notes: Vec<Note> = Vec::with_capacity(tones.len());
    for &spelling in tones {
        let mut note = Note::new(spelling, octave);
        if let Some(previous) = notes.last() {
            while note.absolute_pitch() <= previous.absolute_pitch() {
                note.octave += 1;
            }
        }
        notes.push(note);
    }
    notes
}
