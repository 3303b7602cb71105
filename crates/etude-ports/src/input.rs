use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlSignal {
    /// Pause when running, resume when paused.
    Toggle,
    Quit,
}

#[derive(thiserror::Error, Debug)]
pub enum InputError {
    #[error("input unavailable: {0}")]
    Unavailable(String),
    #[error("backend error: {0}")]
    Backend(String),
}

/// Control input stream handle: close stops the listener.
pub trait InputStream: Send {
    fn close(self: Box<Self>);
}

pub type ControlCallback = Arc<dyn Fn(ControlSignal) + Send + Sync + 'static>;

pub trait InputListener: Send + Sync {
    /// Start listening: implementation should invoke cb from a background thread.
    fn listen(&self, cb: ControlCallback) -> Result<Box<dyn InputStream>, InputError>;
}
