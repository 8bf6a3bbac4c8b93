//! Preview playback: the single-slot controller and the `rodio` thread that
//! owns the one live playback handle.

mod controller;
mod player;
mod sink;
mod thread;
mod types;

pub use controller::*;
pub use player::*;
pub use types::*;
