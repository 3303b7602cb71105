use etude_infra_storage_fs::{decode_wav, FsSampleStore, FsStorage, DEFAULT_SETTINGS_TOML};
use etude_ports::samples::{SampleError, SampleStore};
use etude_ports::storage::{PracticeSettings, StoragePort};
use etude_ports::types::{NoteId, OctaveRange, Volume01};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("etude-{}-{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_wav(path: &Path, channels: u16, samples: &[i16]) {
    let spec = hound::WavSpec {
        channels,
        sample_rate: 22_050,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &sample in samples {
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn default_template_matches_default_settings() {
    let parsed: PracticeSettings = toml::from_str(DEFAULT_SETTINGS_TOML).unwrap();
    assert_eq!(parsed, PracticeSettings::default());
}

#[test]
fn out_of_range_volumes_are_clamped_on_load() {
    let dir = scratch_dir("loud-settings");
    let storage = FsStorage::new(dir);
    fs::write(storage.path(), "melody_volume = 5.0\nspeech_volume = -1.0\n").unwrap();
    let settings = storage.load_settings().unwrap();
    assert_eq!(settings.melody_volume, Volume01::new(1.0));
    assert_eq!(settings.speech_volume, Volume01::new(0.0));
    assert_eq!(settings.chord_volume, PracticeSettings::default().chord_volume);
}

#[test]
fn missing_file_loads_defaults() {
    let dir = scratch_dir("missing-settings");
    let storage = FsStorage::new(dir);
    assert!(!storage.exists());
    assert_eq!(storage.load_settings().unwrap(), PracticeSettings::default());
}

#[test]
fn settings_survive_a_save() {
    let dir = scratch_dir("save-settings");
    let storage = FsStorage::at(dir.join("nested").join("settings.toml"));
    let settings = PracticeSettings {
        key: "Ebm".to_string(),
        tonality: Some("minor".to_string()),
        melody_octaves: OctaveRange::new(4, 5),
        chunk_limit: Some(8),
        seed: Some(7),
        ..PracticeSettings::default()
    };
    storage.save_settings(&settings).unwrap();
    assert_eq!(storage.load_settings().unwrap(), settings);
}

#[test]
fn partial_file_fills_in_defaults() {
    let dir = scratch_dir("partial-settings");
    fs::write(dir.join("settings.toml"), "key = \"F#\"\ntempo_bpm = 90\n").unwrap();
    let loaded = FsStorage::new(dir).load_settings().unwrap();
    assert_eq!(loaded.key, "F#");
    assert_eq!(loaded.tempo_bpm, 90);
    assert_eq!(loaded.progression, "minor_swing");
}

#[test]
fn malformed_file_is_a_serde_error() {
    let dir = scratch_dir("bad-settings");
    fs::write(dir.join("settings.toml"), "tempo_bpm = \"fast\"").unwrap();
    assert!(FsStorage::new(dir).load_settings().is_err());
}

#[test]
fn write_default_creates_the_template() {
    let dir = scratch_dir("init-settings");
    let storage = FsStorage::new(dir);
    storage.write_default().unwrap();
    assert_eq!(fs::read_to_string(storage.path()).unwrap(), DEFAULT_SETTINGS_TOML);
}

#[test]
fn enharmonic_sample_fallback_keeps_the_octave() {
    let dir = scratch_dir("enharmonic");
    write_wav(&dir.join("Db4.wav"), 1, &[0, 16_384]);
    write_wav(&dir.join("C4.wav"), 1, &[0]);
    let store = FsSampleStore::new(&dir, "wav");

    assert_eq!(store.resolve(&NoteId::new("C#4")), Some(dir.join("Db4.wav")));
    assert_eq!(store.resolve(&NoteId::new("B#3")), Some(dir.join("C4.wav")));
    assert!(store.exists(&NoteId::new("Db4")));
    assert!(!store.exists(&NoteId::new("C#5")));
    assert!(matches!(
        store.load(&NoteId::new("D4")),
        Err(SampleError::Missing(_))
    ));
}

#[test]
fn mono_samples_are_duplicated_to_both_sides() {
    let dir = scratch_dir("mono");
    let path = dir.join("A4.wav");
    write_wav(&path, 1, &[0, 16_384, -16_384]);

    let sample = decode_wav(&path).unwrap();
    assert_eq!(sample.sample_rate_hz, 22_050);
    assert_eq!(sample.left.to_vec(), vec![0.0, 0.5, -0.5]);
    assert_eq!(sample.left, sample.right);
}

#[test]
fn stereo_samples_are_split() {
    let dir = scratch_dir("stereo");
    let path = dir.join("E2.wav");
    write_wav(&path, 2, &[16_384, -16_384, 8_192, 0]);

    let sample = decode_wav(&path).unwrap();
    assert_eq!(sample.frames(), 2);
    assert_eq!(sample.left.to_vec(), vec![0.5, 0.25]);
    assert_eq!(sample.right.to_vec(), vec![-0.5, 0.0]);
}

#[test]
fn open_rejects_a_missing_folder() {
    let dir = scratch_dir("no-samples").join("absent");
    assert!(FsSampleStore::open(dir, "wav").is_err());
}
