use etude_core::{ConfigError, Pedagogy, SessionConfig};
use etude_domain_drill::{CadenceStyle, ChunkShape};
use etude_domain_scale::{Tonality, MAJOR_KEY_NAMES};
use etude_ports::storage::PracticeSettings;
use etude_ports::types::OctaveRange;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

fn build(settings: PracticeSettings) -> Result<SessionConfig, ConfigError> {
    SessionConfig::from_settings(&settings, &mut StdRng::seed_from_u64(42))
}

fn with_key(key: &str) -> PracticeSettings {
    PracticeSettings {
        key: key.to_string(),
        ..PracticeSettings::default()
    }
}

#[test]
fn defaults_are_valid() {
    let config = build(PracticeSettings::default()).unwrap();
    assert!(MAJOR_KEY_NAMES.contains(&config.key_name.as_str()));
    assert_eq!(config.tonality, Tonality::Minor);
    assert_eq!(config.progression.name, "minor_swing");
    assert_eq!(config.shapes, ChunkShape::ALL.to_vec());
    assert_eq!(config.pedagogy, Pedagogy::Recognition);
    assert_eq!(config.cadence_style, CadenceStyle::Full);
    assert_eq!(config.session_budget, Duration::from_secs(40 * 60));
}

#[test]
fn tempo_drives_derived_durations() {
    let config = build(PracticeSettings::default()).unwrap();
    assert_eq!(config.beat(), Duration::from_millis(500));
    assert_eq!(config.chord_duration(), Duration::from_secs(2));
}

#[test]
fn cadence_is_due_every_kth_chunk() {
    let config = build(PracticeSettings::default()).unwrap();
    let due: Vec<u64> = (0..12).filter(|&i| config.cadence_due(i)).collect();
    assert_eq!(due, vec![0, 5, 10]);
}

#[test]
fn minor_key_name_implies_minor_unless_overridden() {
    let config = build(with_key("Em")).unwrap();
    assert_eq!(config.tonality, Tonality::Minor);
    assert_eq!(config.signature.to_string(), "G A B C D E F#");

    let settings = PracticeSettings {
        tonality: Some("major".to_string()),
        ..with_key("Em")
    };
    assert_eq!(build(settings).unwrap().tonality, Tonality::Major);
}

#[test]
fn explicit_note_list_is_accepted() {
    let config = build(with_key("C, D, E, F, G, A, B")).unwrap();
    assert_eq!(config.key_name, "C D E F G A B");
}

#[test]
fn unknown_names_are_rejected() {
    assert_eq!(
        build(with_key("H")).unwrap_err(),
        ConfigError::UnknownKey("H".to_string())
    );
    assert_eq!(
        build(PracticeSettings {
            progression: "bossa".to_string(),
            ..PracticeSettings::default()
        })
        .unwrap_err(),
        ConfigError::UnknownProgression("bossa".to_string())
    );
    assert_eq!(
        build(PracticeSettings {
            shapes: vec!["zigzag".to_string()],
            ..PracticeSettings::default()
        })
        .unwrap_err(),
        ConfigError::UnknownShape("zigzag".to_string())
    );
    assert_eq!(
        build(PracticeSettings {
            pedagogy: "sing".to_string(),
            ..PracticeSettings::default()
        })
        .unwrap_err(),
        ConfigError::UnknownPedagogy("sing".to_string())
    );
    assert_eq!(
        build(PracticeSettings {
            tonality: Some("lydian".to_string()),
            ..PracticeSettings::default()
        })
        .unwrap_err(),
        ConfigError::UnknownTonality("lydian".to_string())
    );
}

#[test]
fn shapes_are_deduplicated_and_required() {
    let config = build(PracticeSettings {
        shapes: vec!["scale".into(), "chord_melody".into(), "scale".into()],
        ..PracticeSettings::default()
    })
    .unwrap();
    assert_eq!(config.shapes, vec![ChunkShape::Scale, ChunkShape::ChordMelody]);

    assert_eq!(
        build(PracticeSettings {
            shapes: Vec::new(),
            ..PracticeSettings::default()
        })
        .unwrap_err(),
        ConfigError::NoShapes
    );
}

#[test]
fn numeric_bounds_are_checked() {
    assert_eq!(
        build(PracticeSettings {
            tempo_bpm: 0,
            ..PracticeSettings::default()
        })
        .unwrap_err(),
        ConfigError::InvalidTempo
    );
    assert_eq!(
        build(PracticeSettings {
            cadence_every: 0,
            ..PracticeSettings::default()
        })
        .unwrap_err(),
        ConfigError::InvalidCadenceFrequency
    );
    assert_eq!(
        build(PracticeSettings {
            note_seconds: -1.0,
            ..PracticeSettings::default()
        })
        .unwrap_err(),
        ConfigError::InvalidDuration("note_seconds")
    );
    assert_eq!(
        build(PracticeSettings {
            repeat_rest_seconds: 1e30,
            ..PracticeSettings::default()
        })
        .unwrap_err(),
        ConfigError::InvalidDuration("repeat_rest_seconds")
    );
    assert_eq!(
        build(PracticeSettings {
            session_minutes: 0,
            ..PracticeSettings::default()
        })
        .unwrap_err(),
        ConfigError::InvalidDuration("session_minutes")
    );
}

#[test]
fn octave_ranges_must_be_ordered_and_wide_enough() {
    assert_eq!(
        build(PracticeSettings {
            melody_octaves: OctaveRange::new(6, 5),
            ..PracticeSettings::default()
        })
        .unwrap_err(),
        ConfigError::InvalidOctaveRange {
            name: "melody",
            range: OctaveRange::new(6, 5),
        }
    );
    assert_eq!(
        build(PracticeSettings {
            scale_octaves: OctaveRange::new(4, 4),
            ..with_key("C")
        })
        .unwrap_err(),
        ConfigError::ScaleTooShort {
            key: "C".to_string(),
            range: OctaveRange::new(4, 4),
            len: 7,
            needed: 13,
        }
    );
}
