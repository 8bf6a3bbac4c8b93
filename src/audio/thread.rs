use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStreamBuilder, Sink};
use tracing::{debug, info, warn};

use super::sink::create_sink;
use super::types::{PreviewCmd, PreviewEvent};

/// Spawn the thread that owns the output stream and the one playback handle.
///
/// `fetch` downloads a track's audio; `notify` receives every asynchronous
/// result. The previous sink is always stopped and dropped before the next
/// one is created.
pub(super) fn spawn_audio_thread<F, N>(rx: Receiver<PreviewCmd>, fetch: F, notify: N) -> JoinHandle<()>
where
    F: Fn(&str) -> Result<Vec<u8>, String> + Send + 'static,
    N: Fn(PreviewEvent) + Send + 'static,
{
    thread::spawn(move || {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream) => {
                // rodio logs to stderr when the stream is dropped, which would
                // scribble over the TUI.
                stream.log_on_drop(false);
                Some(stream)
            }
            Err(e) => {
                warn!(error = %e, "no audio output device, previews disabled");
                None
            }
        };

        let mut current: Option<(String, Sink)> = None;

        fn release(current: &mut Option<(String, Sink)>) {
            if let Some((id, sink)) = current.take() {
                sink.stop();
                debug!(track = %id, "released playback handle");
            }
        }

        loop {
            match rx.recv_timeout(Duration::from_millis(200)) {
                Ok(PreviewCmd::Play(id)) => {
                    release(&mut current);

                    let Some(stream) = stream.as_ref() else {
                        notify(PreviewEvent::Failed {
                            id,
                            error: "no audio output device".to_string(),
                        });
                        continue;
                    };

                    match fetch(&id).and_then(|bytes| create_sink(stream, bytes)) {
                        Ok(sink) => {
                            sink.play();
                            info!(track = %id, "preview started");
                            current = Some((id.clone(), sink));
                            notify(PreviewEvent::Started(id));
                        }
                        Err(error) => {
                            warn!(track = %id, %error, "preview failed");
                            notify(PreviewEvent::Failed { id, error });
                        }
                    }
                }
                Ok(PreviewCmd::Stop) => release(&mut current),
                Ok(PreviewCmd::Quit) | Err(RecvTimeoutError::Disconnected) => {
                    release(&mut current);
                    break;
                }
                Err(RecvTimeoutError::Timeout) => {}
            }

            if let Some((id, _sink)) = current.take_if(|(_, sink)| sink.empty()) {
                debug!(track = %id, "preview reached end of track");
                notify(PreviewEvent::Finished(id));
            }
        }
    })
}
