//! Job tracker for one download batch.
//!
//! Job state only moves when a progress event says so; the tracker never
//! predicts transitions. Events for ids outside the current batch and events
//! that would move a job backwards are ignored.

use tracing::debug;

use super::model::{AcceptedJob, DownloadJob, JobStatus, JobUpdate};

/// Effect of applying one progress update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobChange {
    Ignored,
    Progressed,
    /// The job finished; `refresh` is set when it produced a track, meaning the
    /// playlist should be reloaded from the server.
    Completed { refresh: bool },
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    Success,
    Partial,
    Failure,
}

/// Counts produced once every job of a batch is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn outcome(&self) -> BatchOutcome {
        match (self.succeeded, self.failed) {
            (_, 0) => BatchOutcome::Success,
            (0, _) => BatchOutcome::Failure,
            _ => BatchOutcome::Partial,
        }
    }

    pub fn describe(&self) -> String {
        match self.outcome() {
            BatchOutcome::Success => format!("Downloaded {} track(s)", self.succeeded),
            BatchOutcome::Failure => format!("All {} download(s) failed", self.failed),
            BatchOutcome::Partial => format!(
                "Downloaded {} track(s), {} failed",
                self.succeeded, self.failed
            ),
        }
    }
}

#[derive(Debug, Default)]
pub struct JobTracker {
    jobs: Vec<DownloadJob>,
    batch: u64,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a new batch, replacing whatever was shown before.
    /// Returns the batch number.
    pub fn begin_batch(&mut self, accepted: Vec<AcceptedJob>) -> u64 {
        self.batch += 1;
        self.jobs = accepted.into_iter().map(DownloadJob::pending).collect();
        self.batch
    }

    pub fn batch(&self) -> u64 {
        self.batch
    }

    pub fn jobs(&self) -> &[DownloadJob] {
        &self.jobs
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn ids(&self) -> Vec<String> {
        self.jobs.iter().map(|j| j.id.clone()).collect()
    }

    pub fn get(&self, id: &str) -> Option<&DownloadJob> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn apply(&mut self, update: &JobUpdate) -> JobChange {
        let Some(job) = self.jobs.iter_mut().find(|j| j.id == update.id) else {
            debug!(job = %update.id, "ignoring update for unknown job");
            return JobChange::Ignored;
        };

        let Some(status) = JobStatus::parse(&update.status) else {
            debug!(job = %update.id, status = %update.status, "ignoring unrecognised job status");
            return JobChange::Ignored;
        };

        if job.status.is_terminal() || status.rank() < job.status.rank() {
            debug!(
                job = %job.id,
                from = job.status.label(),
                to = status.label(),
                "ignoring backwards job transition"
            );
            return JobChange::Ignored;
        }

        job.status = status;
        if let Some(p) = update.progress {
            job.progress = p.clamp(0.0, 100.0);
        }
        if let Some(m) = &update.message {
            job.message = m.clone();
        }
        if let Some(r) = &update.result {
            job.result = Some(r.clone());
        }
        if let Some(e) = &update.error {
            job.error = Some(e.clone());
        }
        if update.status == "not_found" && job.error.is_none() {
            job.error = Some("job not found".to_string());
        }

        match status {
            JobStatus::Complete => JobChange::Completed {
                refresh: job.result.is_some(),
            },
            JobStatus::Failed => JobChange::Failed,
            _ => JobChange::Progressed,
        }
    }

    /// True once the batch has jobs and all of them are terminal.
    pub fn is_finished(&self) -> bool {
        !self.jobs.is_empty() && self.jobs.iter().all(|j| j.status.is_terminal())
    }

    /// Complete vs everything else; a job still running when the summary is
    /// taken counts as failed.
    pub fn summary(&self) -> BatchSummary {
        let succeeded = self
            .jobs
            .iter()
            .filter(|j| j.status == JobStatus::Complete)
            .count();
        BatchSummary {
            succeeded,
            failed: self.jobs.len() - succeeded,
        }
    }

    pub fn clear(&mut self) {
        self.jobs.clear();
    }
}
