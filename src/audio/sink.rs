//! Turning fetched audio bytes into a paused `rodio` sink.

use std::io::Cursor;

use rodio::{Decoder, OutputStream, Sink};

/// Decode `bytes` and return a paused `Sink` holding the whole track.
pub(super) fn create_sink(stream: &OutputStream, bytes: Vec<u8>) -> Result<Sink, String> {
    let source = Decoder::new(Cursor::new(bytes)).map_err(|e| format!("cannot decode audio: {e}"))?;

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok(sink)
}
