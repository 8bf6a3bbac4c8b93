use std::path::PathBuf;

use crate::api::{ApiError, BurnStreamEvent, CdInfo, DownloadStreamEvent};
use crate::audio::PreviewEvent;
use crate::jobs::AcceptedJob;
use crate::playlist::Track;

use super::effect::{ListToken, StreamId};

/// Fire-and-forget edits whose acknowledgment carries no data.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mutation {
    Delete,
    Reorder,
    Clear,
}

impl Mutation {
    pub fn label(self) -> &'static str {
        match self {
            Self::Delete => "Delete",
            Self::Reorder => "Reorder",
            Self::Clear => "Clear",
        }
    }
}

/// Everything that reaches the session from outside: request results,
/// stream frames, timers and audio-thread reports.
#[derive(Debug)]
pub enum SessionEvent {
    TracksLoaded {
        token: ListToken,
        result: Result<Vec<Track>, ApiError>,
    },
    Uploaded(Result<Vec<Track>, ApiError>),
    Acknowledged {
        mutation: Mutation,
        result: Result<(), ApiError>,
    },
    Randomized {
        token: ListToken,
        result: Result<Vec<Track>, ApiError>,
    },
    DiscInfo(Result<CdInfo, ApiError>),
    DownloadAccepted(Result<Vec<AcceptedJob>, ApiError>),
    Download {
        stream: StreamId,
        event: DownloadStreamEvent,
    },
    Burn {
        stream: StreamId,
        event: BurnStreamEvent,
    },
    BatchGraceElapsed {
        batch: u64,
    },
    Preview(PreviewEvent),
    Exported(Result<PathBuf, ApiError>),
}
