use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::api::{ApiError, BurnStreamEvent, CdInfo, DownloadStreamEvent};
use crate::audio::{PlaybackController, PreviewOutcome, PreviewState};
use crate::capacity::{self, CapacityState, DEFAULT_CAPACITY_SECONDS};
use crate::jobs::{AcceptedJob, BatchOutcome, JobChange, JobTracker};
use crate::playlist::{PlaylistStore, Track};

use super::effect::{Effect, ListToken, StreamId};
use super::event::{Mutation, SessionEvent};
use super::model::{BurnSession, Mode, Notice, SessionOptions, Severity};
use super::replay::{EditLog, LocalEdit};

pub struct Session {
    options: SessionOptions,
    playlist: PlaylistStore,
    edits: EditLog,
    jobs: JobTracker,
    preview: PlaybackController,
    mode: Mode,
    burn: Option<BurnSession>,
    gaps: bool,
    disc: Option<CdInfo>,
    notice: Option<Notice>,
    notice_seq: u64,
    next_stream: u64,
    burn_stream: Option<StreamId>,
    download_stream: Option<StreamId>,
}

impl Session {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            gaps: options.gaps,
            options,
            playlist: PlaylistStore::new(),
            edits: EditLog::default(),
            jobs: JobTracker::new(),
            preview: PlaybackController::new(),
            mode: Mode::Idle,
            burn: None,
            disc: None,
            notice: None,
            notice_seq: 0,
            next_stream: 0,
            burn_stream: None,
            download_stream: None,
        }
    }

    pub fn tracks(&self) -> &[Track] {
        self.playlist.tracks()
    }

    pub fn selected(&self) -> Option<usize> {
        self.playlist.selected()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn burn(&self) -> Option<&BurnSession> {
        self.burn.as_ref()
    }

    pub fn jobs(&self) -> &JobTracker {
        &self.jobs
    }

    pub fn preview(&self) -> &PreviewState {
        self.preview.state()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn gaps(&self) -> bool {
        self.gaps
    }

    /// `None` until the first disc poll answers, then whether a disc was found.
    pub fn disc_present(&self) -> Option<bool> {
        self.disc.map(|d| d.capacity.is_some())
    }

    pub fn capacity_seconds(&self) -> f64 {
        match self.disc {
            Some(info) => info.capacity.unwrap_or(info.default_capacity),
            None => DEFAULT_CAPACITY_SECONDS,
        }
    }

    pub fn capacity(&self) -> CapacityState {
        capacity::capacity(self.playlist.tracks(), self.gaps, self.capacity_seconds())
    }

    /// Playlist edits, uploads and downloads all need an idle session.
    pub fn can_edit(&self) -> bool {
        self.mode == Mode::Idle
    }

    pub fn can_burn(&self) -> bool {
        self.mode == Mode::Idle && !self.playlist.is_empty() && !self.capacity().overflow
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    pub fn start(&mut self) -> Vec<Effect> {
        vec![self.fetch_tracks(), Effect::FetchDiscInfo]
    }

    /// Periodic disc poll; skipped while burning.
    pub fn poll_tick(&mut self) -> Vec<Effect> {
        if self.mode == Mode::Burning {
            return Vec::new();
        }
        vec![Effect::FetchDiscInfo]
    }

    pub fn select_next(&mut self) {
        self.playlist.select_next();
    }

    pub fn select_prev(&mut self) {
        self.playlist.select_prev();
    }

    pub fn select_first(&mut self) {
        self.playlist.select_first();
    }

    pub fn select_last(&mut self) {
        self.playlist.select_last();
    }

    pub fn toggle_gaps(&mut self) {
        if self.mode == Mode::Burning {
            self.warn_busy("change gaps");
            return;
        }
        self.gaps = !self.gaps;
        let text = if self.gaps {
            "Gaps between tracks enabled"
        } else {
            "Gaps between tracks disabled"
        };
        self.post(Severity::Info, text);
    }

    /// `paths` may name files or folders; the runtime expands them.
    pub fn upload(&mut self, paths: Vec<PathBuf>) -> Vec<Effect> {
        if !self.ensure_idle("upload") {
            return Vec::new();
        }
        if paths.is_empty() {
            self.post(Severity::Warning, "Enter at least one file or folder");
            return Vec::new();
        }
        self.post(Severity::Info, "Uploading...");
        vec![Effect::Upload(paths)]
    }

    pub fn delete_selected(&mut self) -> Vec<Effect> {
        match self.playlist.selected() {
            Some(index) => self.delete_at(index),
            None => Vec::new(),
        }
    }

    /// Out-of-range indexes are a no-op.
    pub fn delete_at(&mut self, index: usize) -> Vec<Effect> {
        if !self.ensure_idle("delete tracks") {
            return Vec::new();
        }
        let Some(track) = self.playlist.remove_at(index) else {
            return Vec::new();
        };
        let mut effects = Vec::new();
        if let Some(cmd) = self.preview.stop_if(&track.id) {
            effects.push(Effect::Preview(cmd));
        }
        self.edits.record(LocalEdit::Delete(track.id.clone()));
        effects.push(Effect::Delete(track.id));
        effects
    }

    /// `to` is a slot in the list with the moved track removed.
    pub fn move_track(&mut self, from: usize, to: usize) -> Vec<Effect> {
        if !self.ensure_idle("reorder tracks") {
            return Vec::new();
        }
        if !self.playlist.move_track(from, to) {
            return Vec::new();
        }
        let order = self.playlist.ids();
        self.edits.record(LocalEdit::Reorder(order.clone()));
        vec![Effect::Reorder(order)]
    }

    pub fn move_selected_up(&mut self) -> Vec<Effect> {
        match self.playlist.selected() {
            Some(i) if i > 0 => self.move_track(i, i - 1),
            _ => Vec::new(),
        }
    }

    pub fn move_selected_down(&mut self) -> Vec<Effect> {
        match self.playlist.selected() {
            Some(i) => self.move_track(i, i + 1),
            None => Vec::new(),
        }
    }

    pub fn randomize(&mut self) -> Vec<Effect> {
        if !self.ensure_idle("shuffle") {
            return Vec::new();
        }
        vec![Effect::Randomize(ListToken(self.edits.list_requested()))]
    }

    pub fn clear(&mut self) -> Vec<Effect> {
        if !self.ensure_idle("clear the playlist") {
            return Vec::new();
        }
        let mut effects = Vec::new();
        if let Some(cmd) = self.preview.stop() {
            effects.push(Effect::Preview(cmd));
        }
        self.playlist.clear();
        self.edits.record(LocalEdit::Clear);
        effects.push(Effect::Clear);
        effects
    }

    pub fn start_download(&mut self, text: &str) -> Vec<Effect> {
        match self.mode {
            Mode::Burning => {
                self.warn_busy("add URLs");
                return Vec::new();
            }
            Mode::DownloadingBatch => {
                warn!("download requested while a batch is in flight");
                self.post(Severity::Warning, "A download batch is already in progress");
                return Vec::new();
            }
            Mode::Idle => {}
        }
        let text = text.trim();
        if text.is_empty() {
            self.post(Severity::Warning, "Paste at least one URL");
            return Vec::new();
        }
        self.enter(Mode::DownloadingBatch);
        self.post(Severity::Info, "Submitting URLs...");
        vec![Effect::StartDownload(text.to_string())]
    }

    pub fn start_burn(&mut self, dummy: bool) -> Vec<Effect> {
        match self.mode {
            Mode::Burning => {
                warn!("burn requested while burning");
                self.post(Severity::Warning, "A burn is already in progress");
                return Vec::new();
            }
            Mode::DownloadingBatch => {
                self.warn_busy("burn");
                return Vec::new();
            }
            Mode::Idle => {}
        }
        if self.playlist.is_empty() {
            self.post(Severity::Warning, "Add tracks before burning");
            return Vec::new();
        }
        if self.capacity().overflow {
            self.post(Severity::Warning, "Playlist exceeds disc capacity");
            return Vec::new();
        }

        let stream = self.issue_stream();
        self.burn_stream = Some(stream);
        self.burn = Some(BurnSession {
            dummy,
            percent: 0.0,
            message: "Starting burn...".to_string(),
            track: None,
            stage: None,
        });
        self.enter(Mode::Burning);
        vec![Effect::OpenBurnStream {
            stream,
            dummy,
            gaps: self.gaps,
        }]
    }

    pub fn toggle_preview(&mut self, id: &str) -> Vec<Effect> {
        vec![Effect::Preview(self.preview.toggle(id))]
    }

    pub fn toggle_preview_selected(&mut self) -> Vec<Effect> {
        match self.playlist.selected_track() {
            Some(track) => {
                let id = track.id.clone();
                self.toggle_preview(&id)
            }
            None => Vec::new(),
        }
    }

    pub fn stop_preview(&mut self) -> Vec<Effect> {
        self.preview
            .stop()
            .map(Effect::Preview)
            .into_iter()
            .collect()
    }

    pub fn export_selected(&mut self) -> Vec<Effect> {
        let Some(track) = self.playlist.selected_track() else {
            return Vec::new();
        };
        let effect = Effect::Export {
            id: track.id.clone(),
            name: track.name.clone(),
        };
        let text = format!("Saving {}...", track.name);
        self.post(Severity::Info, text);
        vec![effect]
    }

    pub fn handle(&mut self, event: SessionEvent) -> Vec<Effect> {
        match event {
            SessionEvent::TracksLoaded { token, result } => {
                match result {
                    Ok(tracks) => self.replace_from_server(token, tracks),
                    Err(err) => {
                        self.edits.abandon(token.0);
                        self.report("Could not load tracks", &err);
                    }
                }
                Vec::new()
            }
            SessionEvent::Uploaded(result) => {
                self.on_uploaded(result);
                Vec::new()
            }
            SessionEvent::Acknowledged { mutation, result } => self.on_ack(mutation, result),
            SessionEvent::Randomized { token, result } => {
                match result {
                    Ok(tracks) => {
                        self.replace_from_server(token, tracks);
                        self.post(Severity::Info, "Playlist shuffled");
                    }
                    Err(err) => {
                        self.edits.abandon(token.0);
                        self.report("Shuffle failed", &err);
                    }
                }
                Vec::new()
            }
            SessionEvent::DiscInfo(result) => {
                match result {
                    Ok(info) => self.disc = Some(info),
                    Err(err) => debug!(%err, "disc poll failed"),
                }
                Vec::new()
            }
            SessionEvent::DownloadAccepted(result) => self.on_download_accepted(result),
            SessionEvent::Download { stream, event } => {
                if self.download_stream != Some(stream) {
                    debug!(stream = stream.0, "ignoring event from stale download stream");
                    return Vec::new();
                }
                self.on_download_event(event)
            }
            SessionEvent::Burn { stream, event } => {
                if self.burn_stream != Some(stream) {
                    debug!(stream = stream.0, "ignoring event from stale burn stream");
                    return Vec::new();
                }
                self.on_burn_event(event)
            }
            SessionEvent::BatchGraceElapsed { batch } => {
                if batch == self.jobs.batch() && self.mode != Mode::DownloadingBatch {
                    self.jobs.clear();
                } else {
                    debug!(batch, "ignoring grace timer of superseded batch");
                }
                Vec::new()
            }
            SessionEvent::Preview(event) => {
                if let PreviewOutcome::Failed { id, error } = self.preview.on_event(event) {
                    let name = self
                        .playlist
                        .position_of(&id)
                        .and_then(|i| self.playlist.get(i))
                        .map_or(id.clone(), |t| t.name.clone());
                    warn!(track = %id, %error, "preview failed");
                    self.post(Severity::Warning, format!("Could not play {name}: {error}"));
                }
                Vec::new()
            }
            SessionEvent::Exported(result) => {
                match result {
                    Ok(path) => self.post(
                        Severity::Success,
                        format!("Saved to {}", path.display()),
                    ),
                    Err(err) => self.report("Export failed", &err),
                }
                Vec::new()
            }
        }
    }

    fn on_uploaded(&mut self, result: Result<Vec<Track>, ApiError>) {
        match result {
            Ok(tracks) if tracks.is_empty() => {
                self.post(Severity::Warning, "No valid audio files found");
            }
            Ok(tracks) => {
                let added = self.playlist.append(tracks);
                self.post(Severity::Success, format!("Added {added} track(s)"));
            }
            Err(err) => self.report("Upload failed", &err),
        }
    }

    /// Full server lists replace the playlist once the edits made after the
    /// request went out have been applied to them again.
    fn replace_from_server(&mut self, token: ListToken, tracks: Vec<Track>) {
        let tracks = self.edits.settle(token.0, tracks);
        self.playlist.replace_all(tracks);
    }

    fn fetch_tracks(&mut self) -> Effect {
        Effect::FetchTracks(ListToken(self.edits.list_requested()))
    }

    fn on_ack(&mut self, mutation: Mutation, result: Result<(), ApiError>) -> Vec<Effect> {
        self.edits.acknowledged(mutation, result.is_ok());
        let Err(err) = result else {
            debug!(mutation = mutation.label(), "acknowledged");
            return Vec::new();
        };
        self.report(&format!("{} failed", mutation.label()), &err);
        if self.options.resync_on_rejection {
            vec![self.fetch_tracks()]
        } else {
            Vec::new()
        }
    }

    fn on_download_accepted(&mut self, result: Result<Vec<AcceptedJob>, ApiError>) -> Vec<Effect> {
        if self.mode != Mode::DownloadingBatch {
            debug!("ignoring download acceptance outside a batch");
            return Vec::new();
        }
        match result {
            Ok(jobs) if jobs.is_empty() => {
                self.enter(Mode::Idle);
                self.post(Severity::Warning, "No URLs recognized");
                Vec::new()
            }
            Ok(jobs) => {
                let count = jobs.len();
                let batch = self.jobs.begin_batch(jobs);
                let stream = self.issue_stream();
                self.download_stream = Some(stream);
                info!(batch, jobs = count, "download batch accepted");
                self.post(Severity::Info, format!("Downloading {count} URL(s)..."));
                vec![Effect::OpenDownloadStream {
                    stream,
                    ids: self.jobs.ids(),
                }]
            }
            Err(err) => {
                self.enter(Mode::Idle);
                self.report("Download request failed", &err);
                Vec::new()
            }
        }
    }

    fn on_download_event(&mut self, event: DownloadStreamEvent) -> Vec<Effect> {
        match event {
            DownloadStreamEvent::Update(update) => {
                let mut effects = Vec::new();
                match self.jobs.apply(&update) {
                    JobChange::Completed { refresh: true } => effects.push(self.fetch_tracks()),
                    JobChange::Failed => {
                        if let Some(job) = self.jobs.get(&update.id) {
                            warn!(url = %job.url, error = ?job.error, "download job failed");
                        }
                    }
                    _ => {}
                }
                if self.jobs.is_finished() {
                    effects.extend(self.finish_batch());
                }
                effects
            }
            DownloadStreamEvent::Complete => self.finish_batch(),
            DownloadStreamEvent::Lost(reason) => {
                warn!(%reason, "download stream lost");
                let mut effects = self.close_download_stream();
                self.enter(Mode::Idle);
                self.post(
                    Severity::Warning,
                    format!("Connection lost during download: {reason}"),
                );
                effects.push(self.schedule_batch_clear());
                effects
            }
        }
    }

    fn finish_batch(&mut self) -> Vec<Effect> {
        let mut effects = self.close_download_stream();
        self.enter(Mode::Idle);
        let summary = self.jobs.summary();
        let severity = match summary.outcome() {
            BatchOutcome::Success => Severity::Success,
            BatchOutcome::Partial => Severity::Warning,
            BatchOutcome::Failure => Severity::Error,
        };
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "download batch finished"
        );
        self.post(severity, summary.describe());
        effects.push(self.schedule_batch_clear());
        effects
    }

    fn on_burn_event(&mut self, event: BurnStreamEvent) -> Vec<Effect> {
        match event {
            BurnStreamEvent::Progress(progress) => {
                if let Some(burn) = self.burn.as_mut() {
                    burn.percent = progress.percent.clamp(0.0, 100.0);
                    burn.message = progress.message;
                    if progress.track.is_some() {
                        burn.track = progress.track;
                    }
                    if progress.status.is_some() {
                        burn.stage = progress.status;
                    }
                }
                Vec::new()
            }
            BurnStreamEvent::Complete(done) => {
                let dummy = self.burn.as_ref().is_some_and(|b| b.dummy);
                let effects = self.end_burn();
                info!(success = done.success, dummy, "burn finished");
                let (severity, fallback) = if done.success {
                    (Severity::Success, "Burn complete")
                } else {
                    (Severity::Error, "Burn failed")
                };
                let text = if done.message.is_empty() {
                    fallback.to_string()
                } else {
                    done.message
                };
                self.post(severity, text);
                effects
            }
            BurnStreamEvent::Lost(reason) => {
                warn!(%reason, "burn stream lost");
                let effects = self.end_burn();
                self.post(
                    Severity::Warning,
                    format!("Connection lost during burn: {reason}"),
                );
                effects
            }
        }
    }

    /// Leaves Burning whatever the cause, then polls the disc right away
    /// since polling was suspended.
    fn end_burn(&mut self) -> Vec<Effect> {
        self.burn = None;
        self.enter(Mode::Idle);
        let mut effects = Vec::new();
        if let Some(stream) = self.burn_stream.take() {
            effects.push(Effect::CloseStream(stream));
        }
        effects.push(Effect::FetchDiscInfo);
        effects
    }

    fn close_download_stream(&mut self) -> Vec<Effect> {
        self.download_stream
            .take()
            .map(Effect::CloseStream)
            .into_iter()
            .collect()
    }

    fn schedule_batch_clear(&self) -> Effect {
        Effect::ScheduleBatchClear {
            batch: self.jobs.batch(),
            after: self.options.batch_clear_delay,
        }
    }

    fn issue_stream(&mut self) -> StreamId {
        self.next_stream += 1;
        StreamId(self.next_stream)
    }

    fn enter(&mut self, mode: Mode) {
        if self.mode != mode {
            info!(from = self.mode.label(), to = mode.label(), "session mode");
            self.mode = mode;
        }
    }

    fn ensure_idle(&mut self, action: &str) -> bool {
        if self.mode == Mode::Idle {
            return true;
        }
        self.warn_busy(action);
        false
    }

    fn warn_busy(&mut self, action: &str) {
        let text = match self.mode {
            Mode::Burning => format!("Cannot {action} while burning"),
            Mode::DownloadingBatch => format!("Cannot {action} while downloads are in progress"),
            Mode::Idle => return,
        };
        warn!(action, mode = self.mode.label(), "command refused");
        self.post(Severity::Warning, text);
    }

    /// Rejections are shown verbatim; transport failures get a prefix.
    fn report(&mut self, context: &str, err: &ApiError) {
        if err.is_rejection() {
            warn!(%err, context, "server rejected request");
            self.post(Severity::Warning, err.to_string());
        } else {
            warn!(%err, context, "request failed");
            self.post(Severity::Error, format!("{context}: {err}"));
        }
    }

    fn post(&mut self, severity: Severity, text: impl Into<String>) {
        self.notice_seq += 1;
        self.notice = Some(Notice {
            severity,
            text: text.into(),
            seq: self.notice_seq,
        });
    }
}
