use etude_domain_scale::Note;
use etude_ports::samples::{SampleData, SampleError, SampleStore};
use etude_ports::types::NoteId;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A folder of `<note id>.<extension>` files. A note without its own file falls back
/// to an enharmonic spelling in the same octave number, so `C#4` plays `Db4.wav`.
pub struct FsSampleStore {
    dir: PathBuf,
    extension: String,
}

impl FsSampleStore {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into().trim_start_matches('.').to_string(),
        }
    }

    /// Like `new`, but fails when the folder does not exist.
    pub fn open(
        dir: impl Into<PathBuf>,
        extension: impl Into<String>,
    ) -> Result<Self, SampleError> {
        let store = Self::new(dir, extension);
        if !store.dir.is_dir() {
            return Err(SampleError::Io(format!(
                "sample folder not found: {}",
                store.dir.display()
            )));
        }
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that backs `note`, if any.
    pub fn resolve(&self, note: &NoteId) -> Option<PathBuf> {
        let direct = self.file_for(note.as_str());
        if direct.is_file() {
            return Some(direct);
        }

        let parsed = Note::try_from(note).ok()?;
        parsed
            .spelling
            .enharmonics()
            .into_iter()
            .map(|spelling| self.file_for(&Note::new(spelling, parsed.octave).to_string()))
            .find(|path| path.is_file())
    }

    fn file_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{}", self.extension))
    }
}

impl SampleStore for FsSampleStore {
    fn exists(&self, note: &NoteId) -> bool {
        self.resolve(note).is_some()
    }

    fn load(&self, note: &NoteId) -> Result<SampleData, SampleError> {
        let path = self
            .resolve(note)
            .ok_or_else(|| SampleError::Missing(note.clone()))?;
        log::debug!("loading {note} from {}", path.display());
        decode_wav(&path)
    }
}

/// Decodes a WAV file to stereo f32. Mono is copied to both sides; channels past two are ignored.
pub fn decode_wav(path: &Path) -> Result<SampleData, SampleError> {
    let reader = hound::WavReader::open(path).map_err(|e| match e {
        hound::Error::IoError(io) => SampleError::Io(io.to_string()),
        other => SampleError::Decode(other.to_string()),
    })?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|s| s as f32 / max_val))
                .collect::<Result<_, _>>()
        }
        hound::SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<_, _>>(),
    }
    .map_err(|e| SampleError::Decode(e.to_string()))?;

    let frames = interleaved.len() / channels;
    let mut left = Vec::with_capacity(frames);
    let mut right = Vec::with_capacity(frames);
    for frame in interleaved.chunks_exact(channels) {
        left.push(frame[0]);
        right.push(frame.get(1).copied().unwrap_or(frame[0]));
    }

    Ok(SampleData {
        sample_rate_hz: spec.sample_rate,
        left: Arc::from(left),
        right: Arc::from(right),
    })
}
