use std::time::Duration;

use crate::config;
use crate::session::SessionOptions;

pub fn load_settings() -> config::Settings {
    match config::Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                eprintln!("discburn: invalid config, using defaults: {msg}");
                config::Settings::default()
            } else {
                s
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the app from starting.
            eprintln!("discburn: failed to load config, using defaults: {e}");
            config::Settings::default()
        }
    }
}

/// The first CLI argument, when given, replaces `server.base_url`. An
/// argument that does not pass validation is an error rather than a silent
/// fallback, since the user asked for that server explicitly.
pub fn with_cli_override(
    mut settings: config::Settings,
    arg: Option<String>,
) -> Result<config::Settings, String> {
    let Some(url) = arg.map(|a| a.trim().to_string()).filter(|a| !a.is_empty()) else {
        return Ok(settings);
    };
    settings.server.base_url = url;
    settings.validate()?;
    Ok(settings)
}

pub fn session_options(settings: &config::Settings) -> SessionOptions {
    SessionOptions {
        gaps: settings.session.gaps,
        batch_clear_delay: Duration::from_millis(settings.session.batch_clear_delay_ms),
        resync_on_rejection: settings.session.resync_on_rejection,
    }
}
