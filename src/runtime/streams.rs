use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread;

use tracing::{debug, info, warn};

use crate::api::{
    ApiClient, ApiError, BurnStreamEvent, DownloadStreamEvent, EventStream, SseEvent,
    decode_burn_event, decode_download_event,
};
use crate::session::{SessionEvent, StreamId};

/// Read frames until the stream completes, fails or is cancelled.
///
/// Frames that do not decode are skipped. A stream that ends without its
/// `complete` event is reported as lost. Once `cancel` is set nothing more
/// is emitted.
fn pump<E>(
    frames: EventStream,
    cancel: &AtomicBool,
    decode: fn(&SseEvent) -> Result<Option<E>, ApiError>,
    is_complete: fn(&E) -> bool,
    lost: fn(String) -> E,
    emit: impl Fn(E),
) {
    for frame in frames {
        if cancel.load(Ordering::Relaxed) {
            return;
        }
        match frame {
            Ok(sse) => match decode(&sse) {
                Ok(Some(event)) => {
                    let done = is_complete(&event);
                    emit(event);
                    if done {
                        return;
                    }
                }
                Ok(None) => debug!(event = %sse.event, "ignoring unknown stream event"),
                Err(e) => warn!(error = %e, event = %sse.event, "skipping undecodable frame"),
            },
            Err(e) => {
                emit(lost(e.to_string()));
                return;
            }
        }
    }
    if !cancel.load(Ordering::Relaxed) {
        emit(lost("stream ended unexpectedly".to_string()));
    }
}

pub fn spawn_download_stream(
    client: ApiClient,
    stream: StreamId,
    ids: Vec<String>,
    cancel: Arc<AtomicBool>,
    events: Sender<SessionEvent>,
) {
    thread::spawn(move || {
        info!(stream = stream.0, jobs = ids.len(), "opening download progress stream");
        let emit = |event| {
            if !cancel.load(Ordering::Relaxed) {
                let _ = events.send(SessionEvent::Download { stream, event });
            }
        };
        match client.download_progress(&ids) {
            Ok(frames) => pump(
                frames,
                &cancel,
                decode_download_event,
                |e| matches!(e, DownloadStreamEvent::Complete),
                DownloadStreamEvent::Lost,
                emit,
            ),
            Err(e) => emit(DownloadStreamEvent::Lost(e.to_string())),
        }
        debug!(stream = stream.0, "download progress stream closed");
    });
}

pub fn spawn_burn_stream(
    client: ApiClient,
    stream: StreamId,
    dummy: bool,
    gaps: bool,
    cancel: Arc<AtomicBool>,
    events: Sender<SessionEvent>,
) {
    thread::spawn(move || {
        info!(stream = stream.0, dummy, gaps, "opening burn stream");
        let emit = |event| {
            if !cancel.load(Ordering::Relaxed) {
                let _ = events.send(SessionEvent::Burn { stream, event });
            }
        };
        match client.burn(dummy, gaps) {
            Ok(frames) => pump(
                frames,
                &cancel,
                decode_burn_event,
                |e| matches!(e, BurnStreamEvent::Complete(_)),
                BurnStreamEvent::Lost,
                emit,
            ),
            Err(e) => emit(BurnStreamEvent::Lost(e.to_string())),
        }
        debug!(stream = stream.0, "burn stream closed");
    });
}
