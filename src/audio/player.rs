use std::sync::Mutex;
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;

use super::thread::spawn_audio_thread;
use super::types::{PreviewCmd, PreviewEvent};

/// Handle to the preview audio thread.
pub struct AudioPlayer {
    tx: Sender<PreviewCmd>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    pub fn new<F, N>(fetch: F, notify: N) -> Self
    where
        F: Fn(&str) -> Result<Vec<u8>, String> + Send + 'static,
        N: Fn(PreviewEvent) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<PreviewCmd>();
        let handle = spawn_audio_thread(rx, fetch, notify);

        Self {
            tx,
            join: Mutex::new(Some(handle)),
        }
    }

    pub fn send(&self, cmd: PreviewCmd) -> Result<(), mpsc::SendError<PreviewCmd>> {
        self.tx.send(cmd)
    }

    /// Stop playback and wait for the audio thread to exit.
    pub fn shutdown(&self) {
        let _ = self.send(PreviewCmd::Quit);

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}
