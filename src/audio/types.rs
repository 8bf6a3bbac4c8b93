//! Preview audio types: commands to the audio thread, events back from it
//! and the single-slot playback state.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewCmd {
    /// Release whatever is playing, then fetch and start this track.
    Play(String),
    /// Release the current playback handle, if any.
    Stop,
    /// Release everything and end the audio thread.
    Quit,
}

/// Reported by the audio thread once an asynchronous step has resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewEvent {
    Started(String),
    /// Playback reached the end of the track.
    Finished(String),
    Failed { id: String, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PreviewState {
    #[default]
    Idle,
    /// Requested; the audio is being fetched and decoded.
    Loading(String),
    Playing(String),
}

impl PreviewState {
    /// Track id occupying the playback slot, whether loading or playing.
    pub fn active_id(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Loading(id) | Self::Playing(id) => Some(id),
        }
    }
}
