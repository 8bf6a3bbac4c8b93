//! Playlist module: the track record and the ordered, cursor-carrying store
//! that the session controller edits.

mod model;
mod store;

pub use model::*;
pub use store::*;
