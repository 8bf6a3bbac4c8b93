use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::config;
use crate::session::{Effect, Session, SessionEvent};
use crate::ui;
use crate::upload;

use super::executor::Executor;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PromptKind {
    Upload,
    Urls,
}

impl PromptKind {
    fn title(self) -> &'static str {
        match self {
            Self::Upload => " upload files or folders (enter submits, esc cancels) ",
            Self::Urls => " paste URLs (enter submits, esc cancels) ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Text prompt currently capturing keys, if any.
    pub prompt: Option<Prompt>,
    /// `C` was pressed and the next key decides whether to clear.
    pub confirm_clear: bool,
    /// Internal two-key prefix state used for `gg` handling.
    pending_gg: bool,
    /// Same for `dd`.
    pending_dd: bool,
    /// Sequence number of the notice on screen and when it first appeared.
    notice_shown: Option<(u64, Instant)>,
}

impl EventLoopState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the session's notice once it has been visible for `ttl`.
    fn expire_notice(&mut self, session: &mut Session, now: Instant, ttl: Duration) {
        let Some(seq) = session.notice().map(|n| n.seq) else {
            self.notice_shown = None;
            return;
        };
        match self.notice_shown {
            Some((shown, since)) if shown == seq => {
                if now.duration_since(since) >= ttl {
                    session.clear_notice();
                    self.notice_shown = None;
                }
            }
            _ => self.notice_shown = Some((seq, now)),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum KeyOutcome {
    Effects(Vec<Effect>),
    Quit,
}

/// Main terminal event loop: feeds inbound events and key presses through the
/// session, runs the resulting effects and redraws. Returns `Ok(())` when the
/// user quits.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    session: &mut Session,
    executor: &mut Executor,
    events: &Receiver<SessionEvent>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    let poll_every = Duration::from_secs(settings.session.poll_interval_secs);
    let notice_ttl = Duration::from_secs(settings.ui.notice_secs);

    executor.run(session.start());
    let mut last_poll = Instant::now();

    loop {
        while let Ok(event) = events.try_recv() {
            executor.run(session.handle(event));
        }

        let now = Instant::now();
        for event in executor.due_timers(now) {
            executor.run(session.handle(event));
        }
        if now.duration_since(last_poll) >= poll_every {
            last_poll = now;
            executor.run(session.poll_tick());
        }
        state.expire_notice(session, now, notice_ttl);

        let view = ui::View {
            header_text: &settings.ui.header_text,
            server: &settings.server.base_url,
            prompt: state.prompt.as_ref().map(|p| ui::PromptView {
                title: p.kind.title(),
                input: &p.input,
            }),
            confirm_clear: state.confirm_clear,
        };
        terminal.draw(|f| ui::draw(f, session, &view))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match handle_key_event(key, session, state) {
                    KeyOutcome::Quit => break,
                    KeyOutcome::Effects(effects) => executor.run(effects),
                }
            }
        }
    }

    Ok(())
}

pub fn handle_key_event(
    key: KeyEvent,
    session: &mut Session,
    state: &mut EventLoopState,
) -> KeyOutcome {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyOutcome::Quit;
    }

    if let Some(prompt) = state.prompt.as_mut() {
        match key.code {
            KeyCode::Esc => state.prompt = None,
            KeyCode::Backspace => {
                prompt.input.pop();
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                prompt.input.clear();
            }
            KeyCode::Char(c) if !c.is_control() => prompt.input.push(c),
            KeyCode::Enter => {
                if let Some(prompt) = state.prompt.take() {
                    return KeyOutcome::Effects(submit_prompt(prompt, session));
                }
            }
            _ => {}
        }
        return KeyOutcome::Effects(Vec::new());
    }

    if state.confirm_clear {
        state.confirm_clear = false;
        if key.code == KeyCode::Char('y') {
            return KeyOutcome::Effects(session.clear());
        }
        return KeyOutcome::Effects(Vec::new());
    }

    let pending_gg = std::mem::take(&mut state.pending_gg);
    let pending_dd = std::mem::take(&mut state.pending_dd);

    let effects = match key.code {
        KeyCode::Char('q') => return KeyOutcome::Quit,
        KeyCode::Char('j') | KeyCode::Down => {
            session.select_next();
            Vec::new()
        }
        KeyCode::Char('k') | KeyCode::Up => {
            session.select_prev();
            Vec::new()
        }
        KeyCode::Char('g') => {
            if pending_gg {
                session.select_first();
            } else {
                state.pending_gg = true;
            }
            Vec::new()
        }
        KeyCode::Char('G') => {
            session.select_last();
            Vec::new()
        }
        KeyCode::Char('J') => session.move_selected_down(),
        KeyCode::Char('K') => session.move_selected_up(),
        KeyCode::Char('d') => {
            if pending_dd {
                session.delete_selected()
            } else {
                state.pending_dd = true;
                Vec::new()
            }
        }
        KeyCode::Char('x') => session.randomize(),
        KeyCode::Char('C') => {
            if session.can_edit() {
                state.confirm_clear = true;
                Vec::new()
            } else {
                // Let the session explain why not.
                session.clear()
            }
        }
        KeyCode::Char('u') => {
            if session.can_edit() {
                state.prompt = Some(Prompt {
                    kind: PromptKind::Upload,
                    input: String::new(),
                });
                Vec::new()
            } else {
                session.upload(Vec::new())
            }
        }
        KeyCode::Char('a') => {
            if session.can_edit() {
                state.prompt = Some(Prompt {
                    kind: PromptKind::Urls,
                    input: String::new(),
                });
                Vec::new()
            } else {
                session.start_download("")
            }
        }
        KeyCode::Char(' ') | KeyCode::Char('p') => session.toggle_preview_selected(),
        KeyCode::Esc => session.stop_preview(),
        KeyCode::Char('e') => session.export_selected(),
        KeyCode::Char('t') => {
            session.toggle_gaps();
            Vec::new()
        }
        KeyCode::Char('b') => session.start_burn(false),
        KeyCode::Char('B') => session.start_burn(true),
        _ => Vec::new(),
    };
    KeyOutcome::Effects(effects)
}

/// Folders are not walked here; the request worker expands them so a large
/// tree never stalls drawing.
fn submit_prompt(prompt: Prompt, session: &mut Session) -> Vec<Effect> {
    match prompt.kind {
        PromptKind::Upload => {
            let paths = upload::parse_paths(&prompt.input);
            if paths.is_empty() {
                return Vec::new();
            }
            session.upload(paths)
        }
        PromptKind::Urls => session.start_download(&prompt.input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::Track;
    use crate::session::{ListToken, Mode, SessionOptions};

    fn press(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn session_with(ids: &[&str]) -> Session {
        let mut session = Session::new(SessionOptions::default());
        let tracks = ids
            .iter()
            .map(|id| Track {
                id: id.to_string(),
                name: format!("{id}.mp3"),
                duration: 60.0,
            })
            .collect();
        session.handle(SessionEvent::TracksLoaded {
            token: ListToken(0),
            result: Ok(tracks),
        });
        session
    }

    fn keys(session: &mut Session, state: &mut EventLoopState, input: &str) -> Vec<Effect> {
        let mut effects = Vec::new();
        for c in input.chars() {
            if let KeyOutcome::Effects(e) = handle_key_event(press(c), session, state) {
                effects.extend(e);
            }
        }
        effects
    }

    #[test]
    fn dd_deletes_and_single_d_does_not() {
        let mut session = session_with(&["a", "b"]);
        let mut state = EventLoopState::new();
        session.select_first();

        assert!(keys(&mut session, &mut state, "d").is_empty());
        assert!(keys(&mut session, &mut state, "j").is_empty());
        assert_eq!(session.tracks().len(), 2);

        assert_eq!(
            keys(&mut session, &mut state, "dd"),
            vec![Effect::Delete("b".into())]
        );
    }

    #[test]
    fn gg_and_g_jump_to_ends() {
        let mut session = session_with(&["a", "b", "c"]);
        let mut state = EventLoopState::new();
        keys(&mut session, &mut state, "G");
        assert_eq!(session.selected(), Some(2));
        keys(&mut session, &mut state, "g");
        assert_eq!(session.selected(), Some(2));
        keys(&mut session, &mut state, "g");
        assert_eq!(session.selected(), Some(0));
    }

    #[test]
    fn clear_needs_confirmation() {
        let mut session = session_with(&["a"]);
        let mut state = EventLoopState::new();

        assert!(keys(&mut session, &mut state, "Cn").is_empty());
        assert_eq!(session.tracks().len(), 1);

        assert_eq!(keys(&mut session, &mut state, "Cy"), vec![Effect::Clear]);
        assert!(session.tracks().is_empty());
    }

    #[test]
    fn url_prompt_captures_text_until_enter() {
        let mut session = session_with(&[]);
        let mut state = EventLoopState::new();

        keys(&mut session, &mut state, "a");
        assert!(state.prompt.is_some());
        // Command keys are plain text inside the prompt.
        assert!(keys(&mut session, &mut state, "https://x.y/q").is_empty());
        assert_eq!(session.mode(), Mode::Idle);

        let outcome = handle_key_event(
            KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE),
            &mut session,
            &mut state,
        );
        assert_eq!(
            outcome,
            KeyOutcome::Effects(vec![Effect::StartDownload("https://x.y/q".into())])
        );
        assert!(state.prompt.is_none());
        assert_eq!(session.mode(), Mode::DownloadingBatch);
    }

    #[test]
    fn upload_prompt_hands_raw_paths_to_the_session() {
        let mut session = session_with(&[]);
        let mut state = EventLoopState::new();
        keys(&mut session, &mut state, "u");
        // Backslash keeps the space inside one path.
        state.prompt.as_mut().unwrap().input = r"/music/big\ folder".to_string();

        let outcome = handle_key_event(
            KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE),
            &mut session,
            &mut state,
        );
        assert_eq!(
            outcome,
            KeyOutcome::Effects(vec![Effect::Upload(vec![std::path::PathBuf::from(
                "/music/big folder"
            )])])
        );
    }

    #[test]
    fn escape_closes_prompt_without_effects() {
        let mut session = session_with(&[]);
        let mut state = EventLoopState::new();
        keys(&mut session, &mut state, "uabc");
        let outcome = handle_key_event(
            KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE),
            &mut session,
            &mut state,
        );
        assert_eq!(outcome, KeyOutcome::Effects(Vec::new()));
        assert!(state.prompt.is_none());
    }

    #[test]
    fn prompts_do_not_open_while_burning() {
        let mut session = session_with(&["a"]);
        let mut state = EventLoopState::new();
        keys(&mut session, &mut state, "b");
        assert_eq!(session.mode(), Mode::Burning);

        assert!(keys(&mut session, &mut state, "u").is_empty());
        assert!(state.prompt.is_none());
        assert!(keys(&mut session, &mut state, "C").is_empty());
        assert!(!state.confirm_clear);
    }

    #[test]
    fn q_and_ctrl_c_quit() {
        let mut session = session_with(&[]);
        let mut state = EventLoopState::new();
        assert_eq!(
            handle_key_event(press('q'), &mut session, &mut state),
            KeyOutcome::Quit
        );
        state.prompt = Some(Prompt {
            kind: PromptKind::Urls,
            input: String::new(),
        });
        assert_eq!(
            handle_key_event(
                KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
                &mut session,
                &mut state,
            ),
            KeyOutcome::Quit
        );
    }

    #[test]
    fn notice_expires_after_ttl() {
        let mut session = session_with(&[]);
        let mut state = EventLoopState::new();
        session.toggle_gaps();

        let start = Instant::now();
        let ttl = Duration::from_secs(4);
        state.expire_notice(&mut session, start, ttl);
        state.expire_notice(&mut session, start + Duration::from_secs(1), ttl);
        assert!(session.notice().is_some());
        state.expire_notice(&mut session, start + Duration::from_secs(5), ttl);
        assert!(session.notice().is_none());
    }
}
