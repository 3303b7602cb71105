pub mod key;
pub mod note;
pub mod pitch;
pub mod scale;

pub use key::*;
pub use note::*;
pub use pitch::*;
pub use scale::*;
