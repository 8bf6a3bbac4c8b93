//! Request and response bodies, shaped exactly as the server sends them.

use serde::{Deserialize, Serialize};

use crate::jobs::AcceptedJob;
use crate::playlist::Track;

#[derive(Debug, Deserialize)]
pub(crate) struct TracksBody {
    #[serde(default)]
    pub tracks: Vec<Track>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReorderBody<'a> {
    pub order: &'a [String],
}

#[derive(Debug, Serialize)]
pub(crate) struct DownloadBody<'a> {
    pub text: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DownloadAccepted {
    #[serde(default)]
    pub jobs: Option<Vec<AcceptedJob>>,
}

/// `GET /cd-info`. `capacity` is `None` when no disc is in the drive.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CdInfo {
    pub capacity: Option<f64>,
    pub default_capacity: f64,
}

/// `progress` event on the burn stream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BurnProgress {
    #[serde(default)]
    pub percent: f64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub track: Option<u32>,
    /// `converting` or `burning`.
    #[serde(default)]
    pub status: Option<String>,
}

/// `complete` event on the burn stream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BurnComplete {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}
