//! Where discburn's settings come from.
//!
//! Three layers, the later ones winning: struct defaults, the optional TOML
//! file, then `DISCBURN__SECTION__KEY` environment variables. The file is
//! `DISCBURN_CONFIG_PATH` when set, else the XDG config location.

use std::{env, path::PathBuf};

use super::schema::Settings;

impl Settings {
    /// Build settings from the file and environment layers over the defaults.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let mut layers = ::config::Config::builder();
        if let Some(path) = resolve_config_path() {
            layers = layers.add_source(::config::File::from(path).required(false));
        }
        let environment = ::config::Environment::with_prefix("DISCBURN")
            .separator("__")
            .try_parsing(true);

        layers.add_source(environment).build()?.try_deserialize()
    }

    /// Reject settings the client cannot work with.
    pub fn validate(&self) -> Result<(), String> {
        if self.session.poll_interval_secs == 0 {
            return Err("session.poll_interval_secs must be >= 1".to_string());
        }
        let url = self.server.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(format!(
                "server.base_url must start with http:// or https:// (got {url:?})"
            ));
        }
        if self
            .upload
            .extensions
            .iter()
            .all(|e| e.trim().trim_start_matches('.').is_empty())
        {
            return Err("upload.extensions must name at least one extension".to_string());
        }
        Ok(())
    }
}

/// `DISCBURN_CONFIG_PATH` when set, otherwise [`default_config_path`].
pub fn resolve_config_path() -> Option<PathBuf> {
    env::var_os("DISCBURN_CONFIG_PATH")
        .map(PathBuf::from)
        .or_else(default_config_path)
}

/// Compute the default config path under `$XDG_CONFIG_HOME/discburn/config.toml`
/// or `~/.config/discburn/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".config"))
    } else {
        None
    };

    config_home.map(|d| d.join("discburn").join("config.toml"))
}

/// Default log file under `$XDG_STATE_HOME/discburn/` or `~/.local/state/discburn/`.
pub fn default_log_path() -> Option<PathBuf> {
    let state_home = if let Some(xdg) = env::var_os("XDG_STATE_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".local").join("state"))
    } else {
        None
    };

    state_home.map(|d| d.join("discburn").join("discburn.log"))
}
