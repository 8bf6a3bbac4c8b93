//! Background download jobs: the per-job record and the tracker that follows
//! a batch of jobs through the progress stream.

mod model;
mod tracker;

pub use model::*;
pub use tracker::*;

#[cfg(test)]
mod tests;
