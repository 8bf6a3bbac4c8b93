use std::time::Duration;

/// Which long-running operation, if any, currently owns the session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    Burning,
    DownloadingBatch,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Burning => "Burning",
            Self::DownloadingBatch => "Downloading",
        }
    }
}

/// Progress of the burn in flight. Exists only while the burn stream is open.
#[derive(Debug, Clone, PartialEq)]
pub struct BurnSession {
    pub dummy: bool,
    pub percent: f64,
    pub message: String,
    /// 1-based track number the server is working on.
    pub track: Option<u32>,
    /// `converting` or `burning`.
    pub stage: Option<String>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Transient status line. `seq` increases with every new notice so the UI
/// can time how long to keep it on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub text: String,
    pub seq: u64,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Initial state of the inter-track gap flag.
    pub gaps: bool,
    /// How long a finished batch summary stays before the tracker is cleared.
    pub batch_clear_delay: Duration,
    /// Reload the playlist when the server refuses a fire-and-forget edit.
    pub resync_on_rejection: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            gaps: true,
            batch_clear_delay: Duration::from_secs(3),
            resync_on_rejection: false,
        }
    }
}
