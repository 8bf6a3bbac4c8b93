//! Session controller: the one owner of the playlist, job tracker, preview
//! slot, burn progress and disc information.
//!
//! The controller performs no I/O. Commands and inbound events are methods
//! that update state and return the [`Effect`]s the runtime must carry out;
//! the runtime feeds results back as [`SessionEvent`]s.

mod controller;
mod effect;
mod event;
mod model;
mod replay;

pub use controller::*;
pub use effect::*;
pub use event::*;
pub use model::*;
