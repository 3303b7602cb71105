use crate::config::{ConfigError, SessionConfig, MIN_SCALE_NOTES};
use crate::events::SessionEvent;
use crate::pacer::Interrupted;
use crate::player::Player;
use crate::session_state::{SessionState, StopReason};
use etude_domain_drill::{Cadence, CadenceModel, Chunk, ChunkGenerator, ChunkShape};
use etude_domain_scale::{ExpandedScale, Note};
use rand::Rng;

/// One free-play turn: the chunk and whether a cadence precedes it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrillStep {
    pub index: u64,
    pub cadence: bool,
    pub chunk: Chunk,
}

/// Free-play mode: random chunks over the expanded scale with a periodic cadence.
pub struct DrillScheduler {
    config: SessionConfig,
    scale: ExpandedScale,
    cadence: Cadence,
}

impl DrillScheduler {
    pub fn new(config: &SessionConfig) -> Result<Self, ConfigError> {
        if config.shapes.is_empty() {
            return Err(ConfigError::NoShapes);
        }
        let scale = config.expanded_scale();
        if scale.len() < MIN_SCALE_NOTES {
            return Err(ConfigError::ScaleTooShort {
                key: config.key_name.clone(),
                range: config.scale_octaves,
                len: scale.len(),
                needed: MIN_SCALE_NOTES,
            });
        }
        let cadence =
            CadenceModel::cadence_with_style(&scale, config.tonality, config.cadence_style);
        Ok(Self {
            config: config.clone(),
            scale,
            cadence,
        })
    }

    pub fn scale(&self) -> &ExpandedScale {
        &self.scale
    }

    pub fn cadence(&self) -> &Cadence {
        &self.cadence
    }

    /// Picks a shape uniformly and regenerates until at least three notes come out.
    /// Runs are reversed half of the time.
    pub fn next_chunk(&self, rng: &mut impl Rng) -> Chunk {
        let generator = ChunkGenerator::new(&self.scale);
        loop {
            let shape = self.config.shapes[rng.random_range(0..self.config.shapes.len())];
            let mut chunk = generator.generate(shape, rng);
            if !chunk.is_playable() {
                log::debug!("discarding {shape} chunk of {} notes", chunk.len());
                continue;
            }
            if shape.is_run() && rng.random_bool(0.5) {
                chunk.reverse();
            }
            return chunk;
        }
    }

    pub fn step(&self, index: u64, rng: &mut impl Rng) -> DrillStep {
        DrillStep {
            index,
            cadence: self.config.cadence_due(index),
            chunk: self.next_chunk(rng),
        }
    }

    /// Plays until the budget or chunk limit is reached. A stop request surfaces as `Interrupted`.
    pub fn run(&self, player: &mut Player, rng: &mut impl Rng) -> Result<StopReason, Interrupted> {
        let state = player.pacer().state().clone();

        if self.config.scale_walk {
            self.walk(player)?;
        }
        player.emit(SessionEvent::FreePlay);

        loop {
            if let Some(reason) = limit_reached(&self.config, &state) {
                return Ok(reason);
            }
            player.pacer().checkpoint()?;

            let step = self.step(state.chunks_played(), rng);
            if step.cadence {
                self.play_cadence(player, step.index)?;
            }
            log::debug!(
                "chunk {}: {} with {} notes",
                step.index,
                step.chunk.shape,
                step.chunk.len()
            );
            player.emit(SessionEvent::Chunk {
                index: step.index,
                shape: step.chunk.shape,
                len: step.chunk.len(),
            });
            self.play_chunk(player, &step.chunk)?;
            state.record_chunk();
        }
    }

    /// One octave up from the tonic, names shown. The octave is numbered 8.
    fn walk(&self, player: &mut Player) -> Result<(), Interrupted> {
        player.emit(SessionEvent::ScaleWalk);
        let start = self.config.tonality.tonic_index();
        for offset in 0..8 {
            let Some(note) = self.scale.get(start + offset).copied() else {
                break;
            };
            player.emit(SessionEvent::Note {
                note,
                degree: offset,
                show_name: true,
            });
            player.play(&[note], self.config.melody_volume, self.config.timing.note)?;
        }
        Ok(())
    }

    fn play_cadence(&self, player: &mut Player, chunk_index: u64) -> Result<(), Interrupted> {
        log::debug!("cadence before chunk {chunk_index}");
        player.emit(SessionEvent::Cadence { chunk_index });
        for chord in &self.cadence.chords {
            player.emit(SessionEvent::Chord {
                notes: chord.notes.to_vec(),
                degrees: chord.degrees.to_vec(),
                show_names: self.config.show_names,
            });
            player.play(&chord.notes, self.config.melody_volume, self.config.timing.note)?;
        }
        Ok(())
    }

    fn play_chunk(&self, player: &mut Player, chunk: &Chunk) -> Result<(), Interrupted> {
        let timing = self.config.timing;
        match chunk.shape {
            ChunkShape::Chord => {
                self.play_triad(player, chunk)?;
                player.rest(timing.repeat_rest)?;
                self.play_triad(player, chunk)
            }
            ChunkShape::ChordMelody => {
                let Some((_, top)) = chunk.top() else {
                    return Ok(());
                };
                for round in 0..2 {
                    if round > 0 {
                        player.rest(timing.repeat_rest.saturating_sub(timing.chord_melody_gap))?;
                    }
                    self.play_triad(player, chunk)?;
                    player.rest(timing.chord_melody_gap)?;
                    self.play_line(player, &[top])?;
                }
                Ok(())
            }
            ChunkShape::Arpeggio => {
                self.play_line(player, &chunk.notes)?;
                player.rest(timing.repeat_rest)?;
                self.play_line(player, &chunk.notes)
            }
            ChunkShape::Random | ChunkShape::Scale => {
                self.play_line(player, &chunk.notes)?;
                if self.config.repeat_runs {
                    player.rest(timing.repeat_rest)?;
                    self.play_line(player, &chunk.notes)?;
                }
                Ok(())
            }
        }
    }

    fn play_triad(&self, player: &mut Player, chunk: &Chunk) -> Result<(), Interrupted> {
        player.emit(SessionEvent::Chord {
            notes: chunk.notes.clone(),
            degrees: chunk.notes.iter().map(|note| self.degree(note)).collect(),
            show_names: self.config.show_names,
        });
        player.play(&chunk.notes, self.config.melody_volume, self.config.timing.note)
    }

    fn play_line(&self, player: &mut Player, notes: &[Note]) -> Result<(), Interrupted> {
        for &note in notes {
            player.emit(SessionEvent::Note {
                note,
                degree: self.degree(&note),
                show_name: self.config.show_names,
            });
            player.play(&[note], self.config.melody_volume, self.config.timing.note)?;
        }
        Ok(())
    }

    fn degree(&self, note: &Note) -> usize {
        match self.scale.degree_of(note) {
            Ok(degree) => degree,
            Err(err) => panic!("chunk note outside its scale: {err}"),
        }
    }
}

/// Budget first, then the optional chunk limit.
pub(crate) fn limit_reached(config: &SessionConfig, state: &SessionState) -> Option<StopReason> {
    if state.elapsed() >= config.session_budget {
        return Some(StopReason::BudgetReached);
    }
    match config.chunk_limit {
        Some(limit) if state.chunks_played() >= limit => Some(StopReason::ChunkLimit),
        _ => None,
    }
}
