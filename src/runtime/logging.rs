use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use crate::config::{self, LogSettings};

/// Route `tracing` output to a file, since the terminal belongs to the UI.
///
/// `RUST_LOG` wins over `log.level`. Returns the log path, or `None` when no
/// file could be opened, in which case logging stays disabled.
pub fn init(settings: &LogSettings) -> Option<PathBuf> {
    use tracing_subscriber::prelude::*;

    let path = settings.file.clone().or_else(config::default_log_path)?;
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("discburn: cannot create log directory {}: {e}", parent.display());
            return None;
        }
    }
    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("discburn: cannot open log file {}: {e}", path.display());
            return None;
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
    Some(path)
}
