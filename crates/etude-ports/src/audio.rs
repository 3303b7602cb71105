use crate::types::*;

#[derive(thiserror::Error, Debug)]
pub enum AudioError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),
    #[error("unsupported config: {0}")]
    UnsupportedConfig(String),
    #[error("sample unavailable: {0}")]
    SampleUnavailable(String),
    #[error("backend error: {0}")]
    Backend(String),
}

/// One sounding sample. Dropping the handle does not stop it; call `stop`.
pub trait PlaybackHandle: Send {
    fn stop(&self);

    /// False once stopped, finished, or while the device is paused.
    fn is_playing(&self) -> bool;
}

/// Polyphonic sample output: any number of handles may sound at once.
pub trait AudioDevice: Send + Sync {
    fn play(&self, note: &NoteId, volume: Volume01) -> Result<Box<dyn PlaybackHandle>, AudioError>;

    fn pause_all(&self);

    fn resume_all(&self);

    fn stop_all(&self);
}
