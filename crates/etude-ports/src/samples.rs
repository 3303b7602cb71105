use crate::types::NoteId;
use std::sync::Arc;

#[derive(thiserror::Error, Debug)]
pub enum SampleError {
    #[error("missing sample: {0}")]
    Missing(NoteId),
    #[error("io error: {0}")]
    Io(String),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Decoded stereo sample, shared between the loader and the audio thread.
#[derive(Clone, Debug)]
pub struct SampleData {
    pub sample_rate_hz: u32,
    pub left: Arc<[f32]>,
    pub right: Arc<[f32]>,
}

impl SampleData {
    pub fn frames(&self) -> usize {
        self.left.len().min(self.right.len())
    }
}

pub trait SampleStore: Send + Sync {
    fn exists(&self, note: &NoteId) -> bool;

    fn load(&self, note: &NoteId) -> Result<SampleData, SampleError>;
}
