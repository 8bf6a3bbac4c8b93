//! Single-slot preview state machine.
//!
//! At most one track occupies the slot. The controller decides which command
//! the audio thread gets and folds the thread's events back into state;
//! events about a track that no longer owns the slot are dropped.

use tracing::debug;

use super::types::{PreviewCmd, PreviewEvent, PreviewState};

/// How an audio-thread event changed the slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewOutcome {
    Ignored,
    Started(String),
    Ended(String),
    Failed { id: String, error: String },
}

#[derive(Debug, Default)]
pub struct PlaybackController {
    state: PreviewState,
}

impl PlaybackController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    pub fn active_id(&self) -> Option<&str> {
        self.state.active_id()
    }

    /// Stop `id` if it holds the slot, otherwise replace the slot with `id`.
    pub fn toggle(&mut self, id: &str) -> PreviewCmd {
        if self.active_id() == Some(id) {
            self.state = PreviewState::Idle;
            PreviewCmd::Stop
        } else {
            self.state = PreviewState::Loading(id.to_string());
            PreviewCmd::Play(id.to_string())
        }
    }

    /// Explicit stop. `None` when nothing was playing.
    pub fn stop(&mut self) -> Option<PreviewCmd> {
        if self.state == PreviewState::Idle {
            return None;
        }
        self.state = PreviewState::Idle;
        Some(PreviewCmd::Stop)
    }

    /// Stop only if `id` holds the slot.
    pub fn stop_if(&mut self, id: &str) -> Option<PreviewCmd> {
        if self.active_id() == Some(id) {
            self.stop()
        } else {
            None
        }
    }

    pub fn on_event(&mut self, event: PreviewEvent) -> PreviewOutcome {
        match event {
            PreviewEvent::Started(id) => {
                if self.state == PreviewState::Loading(id.clone()) {
                    self.state = PreviewState::Playing(id.clone());
                    PreviewOutcome::Started(id)
                } else {
                    debug!(track = %id, "ignoring start of superseded preview");
                    PreviewOutcome::Ignored
                }
            }
            PreviewEvent::Finished(id) => {
                if self.active_id() == Some(id.as_str()) {
                    self.state = PreviewState::Idle;
                    PreviewOutcome::Ended(id)
                } else {
                    PreviewOutcome::Ignored
                }
            }
            PreviewEvent::Failed { id, error } => {
                if self.active_id() == Some(id.as_str()) {
                    self.state = PreviewState::Idle;
                    PreviewOutcome::Failed { id, error }
                } else {
                    debug!(track = %id, %error, "ignoring failure of superseded preview");
                    PreviewOutcome::Ignored
                }
            }
        }
    }
}
