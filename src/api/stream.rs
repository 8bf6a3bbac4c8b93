//! Typed events for the two push streams.

use crate::jobs::JobUpdate;

use super::error::ApiError;
use super::sse::SseEvent;
use super::types::{BurnComplete, BurnProgress};

#[derive(Debug, Clone, PartialEq)]
pub enum DownloadStreamEvent {
    Update(JobUpdate),
    /// The server finished reporting on the batch.
    Complete,
    /// Transport failure or the stream ended without `complete`.
    Lost(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BurnStreamEvent {
    Progress(BurnProgress),
    Complete(BurnComplete),
    Lost(String),
}

/// Decode one frame of the download progress stream. Unknown event names
/// yield `Ok(None)`.
pub fn decode_download_event(sse: &SseEvent) -> Result<Option<DownloadStreamEvent>, ApiError> {
    match sse.event.as_str() {
        "update" => Ok(Some(DownloadStreamEvent::Update(serde_json::from_str(
            &sse.data,
        )?))),
        "complete" => Ok(Some(DownloadStreamEvent::Complete)),
        _ => Ok(None),
    }
}

/// Decode one frame of the burn stream. Unknown event names yield `Ok(None)`.
pub fn decode_burn_event(sse: &SseEvent) -> Result<Option<BurnStreamEvent>, ApiError> {
    match sse.event.as_str() {
        "progress" => Ok(Some(BurnStreamEvent::Progress(serde_json::from_str(
            &sse.data,
        )?))),
        "complete" => Ok(Some(BurnStreamEvent::Complete(serde_json::from_str(
            &sse.data,
        )?))),
        _ => Ok(None),
    }
}
