//! HTTP boundary: wire types, the server-sent events parser and a blocking
//! client for the burner server's endpoints.

mod client;
mod error;
mod sse;
mod stream;
mod types;

pub use client::*;
pub use error::*;
pub use sse::*;
pub use stream::*;
pub use types::*;

#[cfg(test)]
mod tests;
