use std::path::PathBuf;
use std::time::Duration;

use crate::audio::PreviewCmd;

/// Identifies one opened push stream. Events tagged with an id that is no
/// longer current for its category are dropped.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct StreamId(pub u64);

/// Tags a full-list request with the number of local edits made before it,
/// so the answer can be brought up to date with edits made since.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ListToken(pub u64);

/// Work the runtime performs on behalf of the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchTracks(ListToken),
    FetchDiscInfo,
    /// Files or folders as typed; expanded into audio files off the UI thread.
    Upload(Vec<PathBuf>),
    Delete(String),
    Reorder(Vec<String>),
    Randomize(ListToken),
    Clear,
    StartDownload(String),
    OpenDownloadStream { stream: StreamId, ids: Vec<String> },
    OpenBurnStream { stream: StreamId, dummy: bool, gaps: bool },
    CloseStream(StreamId),
    Preview(PreviewCmd),
    /// Save a track's audio locally under a name derived from `name`.
    Export { id: String, name: String },
    /// Deliver `SessionEvent::BatchGraceElapsed { batch }` after `after`.
    ScheduleBatchClear { batch: u64, after: Duration },
}
