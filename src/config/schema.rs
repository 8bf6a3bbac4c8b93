use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/discburn/config.toml` or `~/.config/discburn/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `DISCBURN__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub session: SessionSettings,
    pub upload: UploadSettings,
    pub export: ExportSettings,
    pub ui: UiSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Where the burner server listens, e.g. `http://localhost:3379`.
    pub base_url: String,
    /// Timeout for ordinary requests (seconds). Push streams have none.
    pub request_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3379".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// How often the disc is polled while not burning (seconds).
    pub poll_interval_secs: u64,
    /// How long a finished download batch stays on screen (milliseconds).
    pub batch_clear_delay_ms: u64,
    /// Whether 2-second gaps between tracks start enabled.
    pub gaps: bool,
    /// Reload the playlist from the server after a failed delete, reorder or clear.
    pub resync_on_rejection: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            batch_clear_delay_ms: 3000,
            gaps: true,
            resync_on_rejection: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks when walking directories.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            extensions: vec![
                "mp3".into(),
                "flac".into(),
                "wav".into(),
                "ogg".into(),
                "m4a".into(),
                "aac".into(),
                "opus".into(),
            ],
            follow_links: true,
            include_hidden: false,
            recursive: true,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Directory exported tracks are written to. Defaults to the working directory.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// How long a status notice stays visible (seconds).
    pub notice_secs: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ discburn ~ ".to_string(),
            notice_secs: 4,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Log file. Defaults to `$XDG_STATE_HOME/discburn/discburn.log`.
    pub file: Option<PathBuf>,
    /// Filter used when `RUST_LOG` is not set, e.g. `info` or `discburn=debug`.
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".to_string(),
        }
    }
}
