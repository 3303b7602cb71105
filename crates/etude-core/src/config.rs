use crate::progression::Pedagogy;
use etude_domain_drill::{CadenceStyle, ChunkShape, Progression};
use etude_domain_scale::{ExpandedScale, KeySignature, NamedKey, ScaleModel, Tonality};
use etude_ports::storage::PracticeSettings;
use etude_ports::types::{OctaveRange, Volume01};
use rand::Rng;
use std::time::Duration;

/// Smallest expanded scale that fits the cadence, the widest triad and the minor scale walk.
pub const MIN_SCALE_NOTES: usize = 13;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unknown key: {0}")]
    UnknownKey(String),
    #[error("unknown tonality: {0}")]
    UnknownTonality(String),
    #[error("unknown progression: {0}")]
    UnknownProgression(String),
    #[error("unknown chunk shape: {0}")]
    UnknownShape(String),
    #[error("no chunk shapes enabled")]
    NoShapes,
    #[error("unknown pedagogy mode: {0}")]
    UnknownPedagogy(String),
    #[error("unknown cadence style: {0}")]
    UnknownCadenceStyle(String),
    #[error("tempo must be at least 1 bpm")]
    InvalidTempo,
    #[error("cadence frequency must be at least 1")]
    InvalidCadenceFrequency,
    #[error("invalid {name} octave range {range}")]
    InvalidOctaveRange {
        name: &'static str,
        range: OctaveRange,
    },
    #[error("{key} over octaves {range} gives {len} notes, need at least {needed}")]
    ScaleTooShort {
        key: String,
        range: OctaveRange,
        len: usize,
        needed: usize,
    },
    #[error("invalid duration: {0}")]
    InvalidDuration(&'static str),
    #[error("cannot spell {chord} in {key}")]
    Unspellable { chord: String, key: String },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timing {
    /// How long a free-play note or chord sounds.
    pub note: Duration,
    pub repeat_rest: Duration,
    pub segment_rest: Duration,
    pub chord_melody_gap: Duration,
    pub poll_interval: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            note: Duration::from_secs(1),
            repeat_rest: Duration::from_secs(6),
            segment_rest: Duration::from_secs(3),
            chord_melody_gap: Duration::from_secs(1),
            poll_interval: Duration::from_millis(50),
        }
    }
}

/// Validated, immutable session options. Built once before any device is opened.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub key_name: String,
    pub signature: KeySignature,
    pub tonality: Tonality,
    pub progression: Progression,
    pub tempo_bpm: u32,
    pub melody_volume: Volume01,
    pub chord_volume: Volume01,
    pub harmony_volume: Volume01,
    pub speech_volume: Volume01,
    pub scale_octaves: OctaveRange,
    pub chord_octaves: OctaveRange,
    pub melody_octaves: OctaveRange,
    pub cadence_every: u32,
    pub cadence_style: CadenceStyle,
    pub pedagogy: Pedagogy,
    pub harmony_only: bool,
    pub voice: bool,
    pub shapes: Vec<ChunkShape>,
    pub session_budget: Duration,
    pub chunk_limit: Option<u64>,
    pub repeat_runs: bool,
    pub show_names: bool,
    pub scale_walk: bool,
    pub timing: Timing,
}

impl SessionConfig {
    /// Resolves names and checks ranges. `rng` is only used when the key is `random`.
    pub fn from_settings(
        settings: &PracticeSettings,
        rng: &mut impl Rng,
    ) -> Result<Self, ConfigError> {
        let (key_name, signature, implied) = resolve_key(&settings.key, rng)?;

        let tonality = match settings.tonality.as_deref() {
            Some(name) => name
                .parse::<Tonality>()
                .map_err(|_| ConfigError::UnknownTonality(name.to_string()))?,
            None => implied.unwrap_or(Tonality::Minor),
        };

        let progression = Progression::named(&settings.progression)
            .map_err(|_| ConfigError::UnknownProgression(settings.progression.clone()))?;
        for chord in &progression.chords {
            for tone in &chord.tones {
                tone.spell_in(&signature)
                    .map_err(|_| ConfigError::Unspellable {
                        chord: chord.name.clone(),
                        key: key_name.clone(),
                    })?;
            }
        }

        if settings.tempo_bpm == 0 {
            return Err(ConfigError::InvalidTempo);
        }
        if settings.cadence_every == 0 {
            return Err(ConfigError::InvalidCadenceFrequency);
        }

        for (name, range) in [
            ("scale", settings.scale_octaves),
            ("chord", settings.chord_octaves),
            ("melody", settings.melody_octaves),
        ] {
            if !range.is_valid() {
                return Err(ConfigError::InvalidOctaveRange { name, range });
            }
        }

        let scale = ScaleModel::build(
            &signature,
            settings.scale_octaves.min,
            settings.scale_octaves.max,
        );
        if scale.len() < MIN_SCALE_NOTES {
            return Err(ConfigError::ScaleTooShort {
                key: key_name,
                range: settings.scale_octaves,
                len: scale.len(),
                needed: MIN_SCALE_NOTES,
            });
        }

        let mut shapes: Vec<ChunkShape> = Vec::new();
        for name in &settings.shapes {
            let shape = name
                .parse::<ChunkShape>()
                .map_err(|_| ConfigError::UnknownShape(name.clone()))?;
            if !shapes.contains(&shape) {
                shapes.push(shape);
            }
        }
        if shapes.is_empty() {
            return Err(ConfigError::NoShapes);
        }

        let pedagogy = settings
            .pedagogy
            .parse::<Pedagogy>()
            .map_err(|_| ConfigError::UnknownPedagogy(settings.pedagogy.clone()))?;
        let cadence_style = settings
            .cadence_style
            .parse::<CadenceStyle>()
            .map_err(|_| ConfigError::UnknownCadenceStyle(settings.cadence_style.clone()))?;

        if settings.session_minutes == 0 {
            return Err(ConfigError::InvalidDuration("session_minutes"));
        }
        if settings.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidDuration("poll_interval_ms"));
        }
        let timing = Timing {
            note: seconds(settings.note_seconds, "note_seconds")?,
            repeat_rest: seconds(settings.repeat_rest_seconds, "repeat_rest_seconds")?,
            segment_rest: seconds(settings.segment_rest_seconds, "segment_rest_seconds")?,
            chord_melody_gap: seconds(
                settings.chord_melody_gap_seconds,
                "chord_melody_gap_seconds",
            )?,
            poll_interval: Duration::from_millis(settings.poll_interval_ms),
        };

        Ok(Self {
            key_name,
            signature,
            tonality,
            progression,
            tempo_bpm: settings.tempo_bpm,
            melody_volume: settings.melody_volume,
            chord_volume: settings.chord_volume,
            harmony_volume: settings.harmony_volume,
            speech_volume: settings.speech_volume,
            scale_octaves: settings.scale_octaves,
            chord_octaves: settings.chord_octaves,
            melody_octaves: settings.melody_octaves,
            cadence_every: settings.cadence_every,
            cadence_style,
            pedagogy,
            harmony_only: settings.harmony_only,
            voice: settings.voice,
            shapes,
            session_budget: Duration::from_secs(settings.session_minutes as u64 * 60),
            chunk_limit: settings.chunk_limit.map(u64::from),
            repeat_runs: settings.repeat_runs,
            show_names: settings.show_names,
            scale_walk: settings.scale_walk,
            timing,
        })
    }

    pub fn beat(&self) -> Duration {
        Duration::from_secs_f64(60.0 / self.tempo_bpm as f64)
    }

    /// Four beats.
    pub fn chord_duration(&self) -> Duration {
        self.beat() * 4
    }

    pub fn expanded_scale(&self) -> ExpandedScale {
        ScaleModel::build(
            &self.signature,
            self.scale_octaves.min,
            self.scale_octaves.max,
        )
    }

    /// True at chunk indices 0, K, 2K, ...
    pub fn cadence_due(&self, chunk_index: u64) -> bool {
        chunk_index % self.cadence_every as u64 == 0
    }
}

fn seconds(value: f32, name: &'static str) -> Result<Duration, ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidDuration(name));
    }
    Duration::try_from_secs_f32(value).map_err(|_| ConfigError::InvalidDuration(name))
}

fn resolve_key(
    text: &str,
    rng: &mut impl Rng,
) -> Result<(String, KeySignature, Option<Tonality>), ConfigError> {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("random") {
        let key = KeySignature::random(rng).map_err(|_| ConfigError::UnknownKey(text.to_string()))?;
        return Ok((key.name, key.signature, None));
    }

    if trimmed.contains(',') || trimmed.split_whitespace().count() > 1 {
        let signature = KeySignature::parse_list(trimmed)
            .map_err(|_| ConfigError::UnknownKey(text.to_string()))?;
        return Ok((signature.to_string(), signature, None));
    }

    let NamedKey {
        name,
        signature,
        tonality,
    } = KeySignature::named(trimmed).map_err(|_| ConfigError::UnknownKey(text.to_string()))?;
    let implied = (tonality == Tonality::Minor).then_some(Tonality::Minor);
    Ok((name, signature, implied))
}
