pub mod audio;
pub mod input;
pub mod samples;
pub mod speech;
pub mod storage;
pub mod types;

pub use audio::*;
pub use input::*;
pub use samples::*;
pub use speech::*;
pub use storage::*;
pub use types::*;
