//! etude - ear-training practice sessions over a folder of piano samples.

mod display;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use etude_core::{PracticeApp, PracticeMode, PracticePorts, SessionConfig, SessionOutcome};
use etude_domain_drill::{Progression, PROGRESSION_NAMES};
use etude_domain_scale::named_keys;
use etude_infra_audio_cpal::CpalAudioDevice;
use etude_infra_input_crossterm::TerminalInput;
use etude_infra_speech_say::SaySpeaker;
use etude_infra_storage_fs::{FsSampleStore, FsStorage};
use etude_ports::storage::{PracticeSettings, StoragePort};
use etude_ports::types::Volume01;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "etude")]
#[command(author, version, about = "Ear training over piano samples", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Settings file (default: <config dir>/etude/settings.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,
}

#[derive(Subcommand)]
enum Commands {
    /// Free play: random chunks with a cadence every few chunks (default)
    Drill,
    /// Ear training over a chord progression
    Progression,
    /// Write a commented default settings file
    InitConfig {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
    /// Show the settings file path
    ConfigPath,
    /// List the named keys
    Keys,
    /// List the progressions
    Progressions,
}

/// Command-line values win over the settings file.
#[derive(Args, Debug, Default)]
struct Overrides {
    /// Key name (C, Bb, F#m, ...), "random", or seven notes "C,D,E,F,G,A,B"
    #[arg(short, long, global = true)]
    key: Option<String>,

    /// major or minor
    #[arg(short, long, global = true)]
    tonality: Option<String>,

    /// Progression name
    #[arg(short, long, global = true)]
    progression: Option<String>,

    #[arg(long, global = true)]
    tempo: Option<u32>,

    #[arg(long, global = true)]
    melody_volume: Option<f32>,

    #[arg(long, global = true)]
    chord_volume: Option<f32>,

    #[arg(long, global = true)]
    speech_volume: Option<f32>,

    /// Play a cadence before every Nth chunk
    #[arg(long, global = true)]
    cadence_every: Option<u32>,

    /// full or tonic
    #[arg(long, global = true)]
    cadence_style: Option<String>,

    /// Comma-separated chunk shapes: random, scale, arpeggio, chord, chord-melody
    #[arg(long, global = true, value_delimiter = ',')]
    shapes: Option<Vec<String>>,

    /// recognition or audiation
    #[arg(long, global = true)]
    pedagogy: Option<String>,

    /// Play only the chords of the progression
    #[arg(long, global = true)]
    harmony_only: bool,

    /// Print labels without speaking them
    #[arg(long, global = true)]
    no_voice: bool,

    /// Show note names next to degrees
    #[arg(long, global = true)]
    names: bool,

    /// Play scale and random runs twice
    #[arg(long, global = true)]
    repeat: bool,

    /// Skip the opening scale walk
    #[arg(long, global = true)]
    no_walk: bool,

    /// Session length in minutes
    #[arg(short, long, global = true)]
    minutes: Option<u32>,

    /// Stop after this many chunks
    #[arg(long, global = true)]
    chunks: Option<u32>,

    /// Seed for reproducible sessions
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Sample folder
    #[arg(long, global = true)]
    samples: Option<String>,
}

impl Overrides {
    fn apply(self, settings: &mut PracticeSettings) {
        if let Some(key) = self.key {
            settings.key = key;
        }
        if let Some(tonality) = self.tonality {
            settings.tonality = Some(tonality);
        }
        if let Some(progression) = self.progression {
            settings.progression = progression;
        }
        if let Some(tempo) = self.tempo {
            settings.tempo_bpm = tempo;
        }
        if let Some(volume) = self.melody_volume {
            settings.melody_volume = Volume01::new(volume);
        }
        if let Some(volume) = self.chord_volume {
            settings.chord_volume = Volume01::new(volume);
        }
        if let Some(volume) = self.speech_volume {
            settings.speech_volume = Volume01::new(volume);
        }
        if let Some(every) = self.cadence_every {
            settings.cadence_every = every;
        }
        if let Some(style) = self.cadence_style {
            settings.cadence_style = style;
        }
        if let Some(shapes) = self.shapes {
            settings.shapes = shapes;
        }
        if let Some(pedagogy) = self.pedagogy {
            settings.pedagogy = pedagogy;
        }
        settings.harmony_only |= self.harmony_only;
        settings.voice &= !self.no_voice;
        settings.show_names |= self.names;
        settings.repeat_runs |= self.repeat;
        settings.scale_walk &= !self.no_walk;
        if let Some(minutes) = self.minutes {
            settings.session_minutes = minutes;
        }
        if let Some(chunks) = self.chunks {
            settings.chunk_limit = Some(chunks);
        }
        if let Some(seed) = self.seed {
            settings.seed = Some(seed);
        }
        if let Some(samples) = self.samples {
            settings.sample_dir = samples;
        }
    }
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let storage = match &cli.config {
        Some(path) => FsStorage::at(path),
        None => FsStorage::default(),
    };

    let mode = match cli.command {
        Some(Commands::InitConfig { force }) => {
            if storage.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to replace it)",
                    storage.path().display()
                );
            }
            storage.write_default()?;
            println!("Created default settings at: {}", storage.path().display());
            return Ok(());
        }
        Some(Commands::ConfigPath) => {
            println!("{}", storage.path().display());
            return Ok(());
        }
        Some(Commands::Keys) => {
            for key in named_keys() {
                println!("{:<4} {:<5} {}", key.name, key.tonality, key.signature);
            }
            return Ok(());
        }
        Some(Commands::Progressions) => {
            for name in PROGRESSION_NAMES {
                let progression = Progression::named(name)?;
                let chords: Vec<&str> = progression
                    .chords
                    .iter()
                    .map(|chord| chord.name.as_str())
                    .collect();
                println!("{name} ({}): {}", progression.tonality, chords.join(" "));
            }
            return Ok(());
        }
        Some(Commands::Progression) => PracticeMode::Progression,
        Some(Commands::Drill) | None => PracticeMode::Drill,
    };

    let mut settings = storage
        .load_settings()
        .with_context(|| format!("reading {}", storage.path().display()))?;
    cli.overrides.apply(&mut settings);

    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let config = SessionConfig::from_settings(&settings, &mut rng)?;
    run(mode, config, &settings, &mut rng)
}

fn run(
    mode: PracticeMode,
    config: SessionConfig,
    settings: &PracticeSettings,
    rng: &mut StdRng,
) -> Result<()> {
    let samples = Arc::new(FsSampleStore::open(
        &settings.sample_dir,
        settings.sample_extension.as_str(),
    )?);
    let audio = Arc::new(CpalAudioDevice::open(samples.clone()).context("opening audio output")?);

    let speaker = SaySpeaker::new();
    if config.voice && !speaker.is_supported() {
        log::info!("speech is not available here, labels are printed only");
    }

    let ports = PracticePorts {
        audio: audio.clone(),
        samples,
        speaker: Arc::new(speaker),
        input: Some(Arc::new(TerminalInput::new())),
    };

    display::print_line("space/p: pause or resume, q: quit");
    let app = PracticeApp::new(config, ports, display::printer());
    let summary = app.run(mode, rng)?;
    audio.close();

    let verb = match summary.outcome {
        SessionOutcome::Completed(_) => "Finished",
        SessionOutcome::Quit => "Stopped",
    };
    println!(
        "{verb}: {} chunks in {}",
        summary.chunks,
        display::format_elapsed(summary.elapsed)
    );
    Ok(())
}

/// Log lines end in `\r\n` so they stay aligned while the terminal is in raw mode.
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| write!(buf, "[{}] {}\r\n", record.level(), record.args()))
        .init();
}
