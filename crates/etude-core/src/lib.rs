pub mod app;
pub mod config;
pub mod drill;
pub mod events;
pub mod pacer;
pub mod player;
pub mod progression;
pub mod session_state;

pub use app::*;
pub use config::*;
pub use drill::*;
pub use events::*;
pub use pacer::*;
pub use player::*;
pub use progression::*;
pub use session_state::*;
