//! Carries out the session's effects.
//!
//! Requests run one at a time on a worker thread so the server sees edits in
//! the order they were made. Each push stream gets its own thread and a
//! cancel flag. Batch grace timers are kept here and polled by the event loop.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Instant;

use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError};
use crate::audio::AudioPlayer;
use crate::config::UploadSettings;
use crate::playlist::Track;
use crate::session::{Effect, Mutation, SessionEvent, StreamId};
use crate::upload;

use super::export;
use super::streams::{spawn_burn_stream, spawn_download_stream};

pub struct Executor {
    client: ApiClient,
    events: Sender<SessionEvent>,
    requests: Sender<Effect>,
    audio: AudioPlayer,
    streams: HashMap<StreamId, Arc<AtomicBool>>,
    timers: Vec<(Instant, u64)>,
}

impl Executor {
    pub fn new(
        client: ApiClient,
        audio: AudioPlayer,
        files: Files,
        events: Sender<SessionEvent>,
    ) -> Self {
        let (requests, rx) = mpsc::channel::<Effect>();
        spawn_request_worker(client.clone(), files, rx, events.clone());
        Self {
            client,
            events,
            requests,
            audio,
            streams: HashMap::new(),
            timers: Vec::new(),
        }
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.execute(effect);
        }
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::OpenDownloadStream { stream, ids } => {
                let cancel = self.open(stream);
                spawn_download_stream(self.client.clone(), stream, ids, cancel, self.events.clone());
            }
            Effect::OpenBurnStream { stream, dummy, gaps } => {
                let cancel = self.open(stream);
                spawn_burn_stream(
                    self.client.clone(),
                    stream,
                    dummy,
                    gaps,
                    cancel,
                    self.events.clone(),
                );
            }
            Effect::CloseStream(stream) => {
                if let Some(flag) = self.streams.remove(&stream) {
                    flag.store(true, Ordering::Relaxed);
                    debug!(stream = stream.0, "stream cancelled");
                }
            }
            Effect::Preview(cmd) => {
                if self.audio.send(cmd).is_err() {
                    warn!("audio thread is gone");
                }
            }
            Effect::ScheduleBatchClear { batch, after } => {
                self.timers.push((Instant::now() + after, batch));
            }
            request => {
                if self.requests.send(request).is_err() {
                    warn!("request worker is gone");
                }
            }
        }
    }

    fn open(&mut self, stream: StreamId) -> Arc<AtomicBool> {
        let cancel = Arc::new(AtomicBool::new(false));
        self.streams.insert(stream, cancel.clone());
        cancel
    }

    /// Timer events whose deadline has passed.
    pub fn due_timers(&mut self, now: Instant) -> Vec<SessionEvent> {
        let mut due = Vec::new();
        self.timers.retain(|&(at, batch)| {
            if at <= now {
                due.push(SessionEvent::BatchGraceElapsed { batch });
                false
            } else {
                true
            }
        });
        due
    }

    /// Cancel every stream and stop the audio thread.
    pub fn shutdown(&mut self) {
        for (_, flag) in self.streams.drain() {
            flag.store(true, Ordering::Relaxed);
        }
        self.audio.shutdown();
    }
}

/// Local filesystem settings the request worker needs.
pub struct Files {
    pub export_dir: PathBuf,
    pub upload: UploadSettings,
}

fn spawn_request_worker(
    client: ApiClient,
    files: Files,
    rx: Receiver<Effect>,
    events: Sender<SessionEvent>,
) {
    thread::spawn(move || {
        for effect in rx {
            let Some(event) = perform(&client, &files, effect) else {
                continue;
            };
            if events.send(event).is_err() {
                break;
            }
        }
    });
}

/// Run one request and turn its result into the event the session expects.
fn perform(client: &ApiClient, files: &Files, effect: Effect) -> Option<SessionEvent> {
    debug!(?effect, "request");
    let event = match effect {
        Effect::FetchTracks(token) => SessionEvent::TracksLoaded {
            token,
            result: client.list_tracks(),
        },
        Effect::FetchDiscInfo => SessionEvent::DiscInfo(client.cd_info()),
        Effect::Upload(paths) => SessionEvent::Uploaded(upload_paths(client, &files.upload, &paths)),
        Effect::Delete(id) => SessionEvent::Acknowledged {
            mutation: Mutation::Delete,
            result: client.delete_track(&id),
        },
        Effect::Reorder(order) => SessionEvent::Acknowledged {
            mutation: Mutation::Reorder,
            result: client.reorder(&order),
        },
        Effect::Clear => SessionEvent::Acknowledged {
            mutation: Mutation::Clear,
            result: client.clear(),
        },
        Effect::Randomize(token) => SessionEvent::Randomized {
            token,
            result: client.randomize(),
        },
        Effect::StartDownload(text) => SessionEvent::DownloadAccepted(client.start_download(&text)),
        Effect::Export { id, name } => SessionEvent::Exported(
            client
                .fetch_audio(&id, true)
                .and_then(|bytes| {
                    export::save(&files.export_dir, &name, &id, &bytes).map_err(ApiError::from)
                }),
        ),
        other => {
            warn!(?other, "effect is not a request");
            return None;
        }
    };
    Some(event)
}

/// Expand typed paths into audio files and upload them. Nothing found means
/// nothing is sent, which the session reports like an empty server answer.
fn upload_paths(
    client: &ApiClient,
    settings: &UploadSettings,
    paths: &[PathBuf],
) -> Result<Vec<Track>, ApiError> {
    let files = upload::expand(paths, settings);
    if files.is_empty() {
        debug!(paths = paths.len(), "no audio files to upload");
        return Ok(Vec::new());
    }
    client.upload(&files)
}
