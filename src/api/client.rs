//! Blocking HTTP client for the burner server.
//!
//! Calls are made from worker threads owned by the runtime, never from the
//! UI thread. Push streams use a second client without a request timeout,
//! since a burn may go quiet for minutes between progress events.

use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::{Client, Response, multipart};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::jobs::AcceptedJob;
use crate::playlist::Track;

use super::error::ApiError;
use super::sse::SseReader;
use super::types::{CdInfo, DownloadAccepted, DownloadBody, ErrorBody, ReorderBody, TracksBody};

pub type EventStream = SseReader<BufReader<Response>>;

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
    streaming: Client,
}

impl ApiClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(request_timeout).build()?;
        let streaming = Client::builder().timeout(None).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            streaming,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /tracks`
    pub fn list_tracks(&self) -> Result<Vec<Track>, ApiError> {
        let resp = self.http.get(self.url("/tracks")).send()?;
        Ok(read_json::<TracksBody>(resp)?.tracks)
    }

    /// `POST /upload` with every file as a `files` part.
    pub fn upload(&self, files: &[PathBuf]) -> Result<Vec<Track>, ApiError> {
        let mut form = multipart::Form::new();
        for path in files {
            form = form.file("files", path)?;
        }
        debug!(count = files.len(), "uploading files");
        let resp = self.http.post(self.url("/upload")).multipart(form).send()?;
        Ok(read_json::<TracksBody>(resp)?.tracks)
    }

    /// `DELETE /track/{id}`
    pub fn delete_track(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("/track/{}", urlencoding::encode(id));
        let resp = self.http.delete(self.url(&path)).send()?;
        read_ack(resp)
    }

    /// `POST /reorder {order}`
    pub fn reorder(&self, order: &[String]) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.url("/reorder"))
            .json(&ReorderBody { order })
            .send()?;
        read_ack(resp)
    }

    /// `POST /randomize`, answered with the shuffled list.
    pub fn randomize(&self) -> Result<Vec<Track>, ApiError> {
        let resp = self.http.post(self.url("/randomize")).send()?;
        Ok(read_json::<TracksBody>(resp)?.tracks)
    }

    /// `POST /clear`
    pub fn clear(&self) -> Result<(), ApiError> {
        let resp = self.http.post(self.url("/clear")).send()?;
        read_ack(resp)
    }

    /// `GET /cd-info`
    pub fn cd_info(&self) -> Result<CdInfo, ApiError> {
        let resp = self.http.get(self.url("/cd-info")).send()?;
        read_json(resp)
    }

    /// `POST /download {text}`. An empty result means no URL was recognised.
    pub fn start_download(&self, text: &str) -> Result<Vec<AcceptedJob>, ApiError> {
        let resp = self
            .http
            .post(self.url("/download"))
            .json(&DownloadBody { text })
            .send()?;
        Ok(read_json::<DownloadAccepted>(resp)?.jobs.unwrap_or_default())
    }

    /// `GET /download-progress?ids=a,b,c`
    pub fn download_progress(&self, ids: &[String]) -> Result<EventStream, ApiError> {
        let resp = self
            .streaming
            .get(self.url("/download-progress"))
            .query(&[("ids", ids.join(","))])
            .send()?;
        open_stream(resp)
    }

    /// `GET /burn?dummy=..&gaps=..`
    pub fn burn(&self, dummy: bool, gaps: bool) -> Result<EventStream, ApiError> {
        let resp = self
            .streaming
            .get(self.url("/burn"))
            .query(&[("dummy", dummy.to_string()), ("gaps", gaps.to_string())])
            .send()?;
        open_stream(resp)
    }

    /// `GET /audio/{id}`, optionally marked as a save-as download.
    pub fn fetch_audio(&self, id: &str, download: bool) -> Result<Vec<u8>, ApiError> {
        let path = format!("/audio/{}", urlencoding::encode(id));
        let mut req = self.http.get(self.url(&path));
        if download {
            req = req.query(&[("download", "true")]);
        }
        let resp = req.send()?;
        if !resp.status().is_success() {
            return Err(error_from(resp));
        }
        Ok(resp.bytes()?.to_vec())
    }
}

/// Read a JSON body. An `{"error": ...}` body is a rejection whatever the
/// status code; any other non-2xx answer is a transport failure.
fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let status = resp.status().as_u16();
    let body = resp.bytes()?;
    decode_body(status, &body)
}

pub(crate) fn decode_body<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T, ApiError> {
    check_body(status, body)?;
    Ok(serde_json::from_slice(body)?)
}

/// Classify a response before its payload matters: an `{"error": ...}` body
/// is a rejection, otherwise a non-2xx status is a transport failure.
pub(crate) fn check_body(status: u16, body: &[u8]) -> Result<(), ApiError> {
    if let Ok(err) = serde_json::from_slice::<ErrorBody>(body) {
        return Err(ApiError::Rejected(err.error));
    }
    if !(200..300).contains(&status) {
        return Err(ApiError::Status(status));
    }
    Ok(())
}

/// Like `read_json`, but the success body is ignored.
fn read_ack(resp: Response) -> Result<(), ApiError> {
    let status = resp.status().as_u16();
    let body = resp.bytes()?;
    check_body(status, &body)
}

fn error_from(resp: Response) -> ApiError {
    let status = resp.status().as_u16();
    match resp.json::<ErrorBody>() {
        Ok(err) => ApiError::Rejected(err.error),
        Err(_) => ApiError::Status(status),
    }
}

fn open_stream(resp: Response) -> Result<EventStream, ApiError> {
    if !resp.status().is_success() {
        return Err(error_from(resp));
    }
    Ok(SseReader::new(BufReader::new(resp)))
}
