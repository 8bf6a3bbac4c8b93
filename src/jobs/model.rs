//! Download job types shared by the tracker, the session and the wire layer.

use serde::Deserialize;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Downloading,
    Processing,
    Complete,
    Failed,
}

impl JobStatus {
    /// Parse a status string from a progress event.
    ///
    /// `not_found` (the server forgot the job) maps to `Failed`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "downloading" => Some(Self::Downloading),
            "processing" => Some(Self::Processing),
            "complete" => Some(Self::Complete),
            "failed" | "not_found" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }

    /// Position in the forward-only lifecycle. Downloading and processing share
    /// a rank because a job may alternate between them.
    pub(crate) fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Downloading | Self::Processing => 1,
            Self::Complete | Self::Failed => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Downloading => "downloading",
            Self::Processing => "processing",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }
}

/// What a finished job produced. The server sends a title and duration, not a
/// full track; the playlist is refreshed from the server instead.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobResult {
    pub title: String,
    #[serde(default)]
    pub duration: f64,
}

/// A job the server accepted for a new batch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AcceptedJob {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadJob {
    pub id: String,
    pub url: String,
    pub status: JobStatus,
    /// Percent in `[0, 100]`.
    pub progress: f64,
    pub message: String,
    pub result: Option<JobResult>,
    pub error: Option<String>,
}

impl DownloadJob {
    pub fn pending(accepted: AcceptedJob) -> Self {
        Self {
            id: accepted.id,
            url: accepted.url,
            status: JobStatus::Pending,
            progress: 0.0,
            message: String::new(),
            result: None,
            error: None,
        }
    }
}

/// Payload of an `update` event on the download progress stream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobUpdate {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub result: Option<JobResult>,
}
