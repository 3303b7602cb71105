mod common;

use common::{
    config, fast_settings, AudioCall, EventLog, ManualInput, RecordingAudio, RecordingSpeaker,
    SampleSet,
};
use etude_core::{
    DrillScheduler, PracticeApp, PracticeMode, PracticePorts, SessionConfig, SessionEvent,
    SessionOutcome, StopReason,
};
use etude_domain_drill::ChunkShape;
use etude_domain_scale::Note;
use etude_ports::input::{ControlSignal, InputListener};
use etude_ports::storage::PracticeSettings;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

struct Rig {
    audio: Arc<RecordingAudio>,
    speaker: Arc<RecordingSpeaker>,
    log: EventLog,
    app: PracticeApp,
}

fn rig(settings: &PracticeSettings, samples: SampleSet, input: Option<Arc<ManualInput>>) -> Rig {
    rig_with(config(settings), samples, input)
}

fn rig_with(config: SessionConfig, samples: SampleSet, input: Option<Arc<ManualInput>>) -> Rig {
    let audio = Arc::new(RecordingAudio::default());
    let speaker = Arc::new(RecordingSpeaker::default());
    let log = EventLog::default();
    let ports = PracticePorts {
        audio: audio.clone(),
        samples: Arc::new(samples),
        speaker: speaker.clone(),
        input: input.map(|input| input as Arc<dyn InputListener>),
    };
    let app = PracticeApp::new(config, ports, log.callback());
    Rig {
        audio,
        speaker,
        log,
        app,
    }
}

#[test]
fn cadence_precedes_every_fifth_chunk() {
    let rig = rig(&fast_settings(), SampleSet::default(), None);
    let summary = rig
        .app
        .run(PracticeMode::Drill, &mut StdRng::seed_from_u64(42))
        .unwrap();

    assert_eq!(summary.outcome, SessionOutcome::Completed(StopReason::ChunkLimit));
    assert_eq!(summary.chunks, 12);

    let events = rig.log.events();
    let cadences: Vec<u64> = events
        .iter()
        .filter_map(|event| match event {
            SessionEvent::Cadence { chunk_index } => Some(*chunk_index),
            _ => None,
        })
        .collect();
    assert_eq!(cadences, vec![0, 5, 10]);

    let chunk_lengths: Vec<usize> = events
        .iter()
        .filter_map(|event| match event {
            SessionEvent::Chunk { len, .. } => Some(*len),
            _ => None,
        })
        .collect();
    assert_eq!(chunk_lengths.len(), 12);
    assert!(chunk_lengths.iter().all(|&len| len >= 3));
    assert!(matches!(events.last(), Some(SessionEvent::Finished(_))));
}

#[test]
fn generated_chunks_are_never_shorter_than_three() {
    let config = config(&fast_settings());
    let scheduler = DrillScheduler::new(&config).unwrap();
    let mut rng = StdRng::seed_from_u64(9);
    for _ in 0..500 {
        assert!(scheduler.next_chunk(&mut rng).len() >= 3);
    }
}

#[test]
fn triads_are_never_reversed() {
    let settings = PracticeSettings {
        shapes: vec!["chord".to_string()],
        ..fast_settings()
    };
    let scheduler = DrillScheduler::new(&config(&settings)).unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..200 {
        let chunk = scheduler.next_chunk(&mut rng);
        assert_eq!(chunk.shape, ChunkShape::Chord);
        let pitches: Vec<i32> = chunk.notes.iter().map(Note::absolute_pitch).collect();
        assert!(pitches.windows(2).all(|pair| pair[0] < pair[1]), "{pitches:?}");
    }
}

#[test]
fn minor_scale_walk_starts_on_the_relative_tonic() {
    let settings = PracticeSettings {
        key: "Am".to_string(),
        tonality: None,
        scale_walk: true,
        chunk_limit: Some(0),
        ..fast_settings()
    };
    let rig = rig(&settings, SampleSet::default(), None);
    rig.app
        .run(PracticeMode::Drill, &mut StdRng::seed_from_u64(1))
        .unwrap();

    assert_eq!(
        rig.audio.played(),
        vec!["A3", "B3", "C4", "D4", "E4", "F4", "G4", "A4"]
    );

    let walk: Vec<(String, usize, bool)> = rig
        .log
        .events()
        .iter()
        .filter_map(|event| match event {
            SessionEvent::Note {
                note,
                degree,
                show_name,
            } => Some((note.to_string(), *degree, *show_name)),
            _ => None,
        })
        .collect();
    assert_eq!(walk.len(), 8);
    assert_eq!(
        walk.iter().map(|(_, degree, _)| *degree).collect::<Vec<_>>(),
        vec![0, 1, 2, 3, 4, 5, 6, 7]
    );
    assert!(walk.iter().all(|(_, _, shown)| *shown));
}

#[test]
fn missing_samples_are_skipped_and_reported_once() {
    let settings = PracticeSettings {
        scale_walk: true,
        chunk_limit: Some(0),
        ..fast_settings()
    };
    let rig = rig(&settings, SampleSet::without(&["E3"]), None);
    rig.app
        .run(PracticeMode::Drill, &mut StdRng::seed_from_u64(1))
        .unwrap();

    assert_eq!(
        rig.audio.played(),
        vec!["C3", "D3", "F3", "G3", "A3", "B3", "C4"]
    );
    let missing: Vec<String> = rig
        .log
        .events()
        .iter()
        .filter_map(|event| match event {
            SessionEvent::MissingSample { note } => Some(note.to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(missing, vec!["E3"]);
}

#[test]
fn chord_chunks_are_struck_twice() {
    let settings = PracticeSettings {
        shapes: vec!["chord".to_string()],
        chunk_limit: Some(1),
        ..fast_settings()
    };
    let rig = rig(&settings, SampleSet::default(), None);
    rig.app
        .run(PracticeMode::Drill, &mut StdRng::seed_from_u64(5))
        .unwrap();

    let played = rig.audio.played();
    // Four cadence triads, then the chunk twice.
    assert_eq!(played.len(), 4 * 3 + 2 * 3);
    assert_eq!(played[..3].to_vec(), vec!["C3", "E3", "G3"]);
    assert_eq!(played[12..15], played[15..18]);
}

#[test]
fn chord_melody_repeats_triad_and_top_note() {
    let settings = PracticeSettings {
        shapes: vec!["chord-melody".to_string()],
        chunk_limit: Some(1),
        cadence_style: "tonic".to_string(),
        ..fast_settings()
    };
    let rig = rig(&settings, SampleSet::default(), None);
    rig.app
        .run(PracticeMode::Drill, &mut StdRng::seed_from_u64(11))
        .unwrap();

    let played = rig.audio.played();
    // Tonic twice, then (triad, top note) twice.
    assert_eq!(played.len(), 2 * 3 + 2 * 4);
    let chunk = &played[6..];
    assert_eq!(chunk[..4], chunk[4..]);

    let triad: Vec<Note> = chunk[..3].iter().map(|id| id.parse().unwrap()).collect();
    let top = triad
        .iter()
        .max_by_key(|note| note.absolute_pitch())
        .unwrap();
    assert_eq!(chunk[3], top.to_string());
}

#[test]
fn quit_signal_ends_the_session() {
    let settings = PracticeSettings {
        chunk_limit: None,
        note_seconds: 0.005,
        ..fast_settings()
    };
    let input = Arc::new(ManualInput::default());
    let rig = rig(&settings, SampleSet::default(), Some(input.clone()));

    let state = rig.app.state();
    let quitter = {
        let input = input.clone();
        thread::spawn(move || {
            while !state.is_stopped() {
                thread::sleep(Duration::from_millis(10));
                input.send(ControlSignal::Quit);
            }
        })
    };

    let summary = rig
        .app
        .run(PracticeMode::Drill, &mut StdRng::seed_from_u64(2))
        .unwrap();
    quitter.join().unwrap();

    assert_eq!(summary.outcome, SessionOutcome::Quit);
    assert!(input.is_closed());
    assert_eq!(rig.audio.calls().last(), Some(&AudioCall::StopAll));
    assert_eq!(rig.audio.sounding(), 0);
    assert!(rig.speaker.said().is_empty());
}

fn budgeted(budget: Duration) -> SessionConfig {
    let mut config = config(&PracticeSettings {
        chunk_limit: None,
        note_seconds: 0.002,
        ..fast_settings()
    });
    config.session_budget = budget;
    config
}

#[test]
fn session_ends_when_the_budget_runs_out() {
    let rig = rig_with(budgeted(Duration::from_millis(80)), SampleSet::default(), None);
    let summary = rig
        .app
        .run(PracticeMode::Drill, &mut StdRng::seed_from_u64(4))
        .unwrap();

    assert_eq!(summary.outcome, SessionOutcome::Completed(StopReason::BudgetReached));
    assert!(summary.elapsed >= Duration::from_millis(80));
    assert!(summary.chunks > 0);
    assert_eq!(rig.audio.calls().last(), Some(&AudioCall::StopAll));
}

#[test]
fn paused_time_does_not_count_toward_the_budget() {
    let rig = rig_with(budgeted(Duration::from_millis(80)), SampleSet::default(), None);
    let state = rig.app.state();
    let started = Instant::now();
    state.toggle_pause();
    let resumer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(300));
        state.toggle_pause();
    });

    let summary = rig
        .app
        .run(PracticeMode::Drill, &mut StdRng::seed_from_u64(4))
        .unwrap();
    resumer.join().unwrap();
    let wall = started.elapsed();

    assert_eq!(summary.outcome, SessionOutcome::Completed(StopReason::BudgetReached));
    assert!(summary.elapsed >= Duration::from_millis(80));
    assert!(
        wall >= summary.elapsed + Duration::from_millis(250),
        "{wall:?} vs {:?}",
        summary.elapsed
    );
    assert!(rig.audio.calls().contains(&AudioCall::ResumeAll));
}
