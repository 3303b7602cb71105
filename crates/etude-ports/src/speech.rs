use crate::types::Volume01;

#[derive(thiserror::Error, Debug)]
pub enum SpeechError {
    #[error("speech unavailable: {0}")]
    Unavailable(String),
    #[error("backend error: {0}")]
    Backend(String),
}

/// Text-to-speech. `say` blocks until the utterance has finished.
pub trait Speaker: Send + Sync {
    fn say(&self, text: &str, volume: Volume01) -> Result<(), SpeechError>;
}
