pub mod samples;
pub mod settings;

pub use samples::*;
pub use settings::*;
