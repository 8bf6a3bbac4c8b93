use std::env;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use crate::api::ApiClient;
use crate::audio::AudioPlayer;
use crate::session::{Session, SessionEvent};

mod event_loop;
mod executor;
mod export;
mod logging;
mod settings;
mod streams;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::with_cli_override(settings::load_settings(), env::args().nth(1))?;

    let log_path = logging::init(&settings.log);
    info!(
        server = %settings.server.base_url,
        log = ?log_path,
        "starting discburn"
    );

    let client = ApiClient::new(
        &settings.server.base_url,
        Duration::from_secs(settings.server.request_timeout_secs),
    )?;

    let (event_tx, event_rx) = mpsc::channel::<SessionEvent>();

    let audio_client = client.clone();
    let audio_tx = event_tx.clone();
    let audio_player = AudioPlayer::new(
        move |id| audio_client.fetch_audio(id, false).map_err(|e| e.to_string()),
        move |event| {
            let _ = audio_tx.send(SessionEvent::Preview(event));
        },
    );

    let files = executor::Files {
        export_dir: settings
            .export
            .dir
            .clone()
            .or_else(|| env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from(".")),
        upload: settings.upload.clone(),
    };
    let mut executor = executor::Executor::new(client, audio_player, files, event_tx);
    let mut session = Session::new(settings::session_options(&settings));

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::new();
        event_loop::run(
            &mut terminal,
            &settings,
            &mut session,
            &mut executor,
            &event_rx,
            &mut state,
        )
    })();

    executor.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("discburn stopped");
    run_result
}
