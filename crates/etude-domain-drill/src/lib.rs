pub mod cadence;
pub mod chunk;
pub mod label;
pub mod progression;
pub mod solfege;

pub use cadence::*;
pub use chunk::*;
pub use label::*;
pub use progression::*;
pub use solfege::*;
