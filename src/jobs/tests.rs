use super::*;

fn accepted(ids: &[&str]) -> Vec<AcceptedJob> {
    ids.iter()
        .map(|id| AcceptedJob {
            id: id.to_string(),
            url: format!("https://example.com/{id}"),
        })
        .collect()
}

fn update(id: &str, status: &str) -> JobUpdate {
    JobUpdate {
        id: id.into(),
        status: status.into(),
        progress: None,
        message: None,
        error: None,
        result: None,
    }
}

fn finished_with_result(id: &str) -> JobUpdate {
    JobUpdate {
        progress: Some(100.0),
        result: Some(JobResult {
            title: "Song".into(),
            duration: 200.0,
        }),
        ..update(id, "complete")
    }
}

#[test]
fn begin_batch_starts_every_job_pending() {
    let mut tracker = JobTracker::new();
    let batch = tracker.begin_batch(accepted(&["a", "b"]));
    assert_eq!(batch, 1);
    assert_eq!(tracker.jobs().len(), 2);
    assert!(tracker.jobs().iter().all(|j| j.status == JobStatus::Pending));
    assert!(!tracker.is_finished());
}

#[test]
fn updates_move_forward_and_copy_fields() {
    let mut tracker = JobTracker::new();
    tracker.begin_batch(accepted(&["a"]));

    let change = tracker.apply(&JobUpdate {
        progress: Some(42.5),
        message: Some("Downloading...".into()),
        ..update("a", "downloading")
    });
    assert_eq!(change, JobChange::Progressed);
    let job = tracker.get("a").unwrap();
    assert_eq!(job.status, JobStatus::Downloading);
    assert_eq!(job.progress, 42.5);
    assert_eq!(job.message, "Downloading...");

    assert_eq!(tracker.apply(&update("a", "processing")), JobChange::Progressed);
    assert_eq!(tracker.apply(&update("a", "downloading")), JobChange::Progressed);
}

#[test]
fn progress_is_clamped() {
    let mut tracker = JobTracker::new();
    tracker.begin_batch(accepted(&["a"]));
    tracker.apply(&JobUpdate {
        progress: Some(180.0),
        ..update("a", "downloading")
    });
    assert_eq!(tracker.get("a").unwrap().progress, 100.0);
}

#[test]
fn completed_job_never_regresses() {
    let mut tracker = JobTracker::new();
    tracker.begin_batch(accepted(&["a"]));

    assert_eq!(
        tracker.apply(&finished_with_result("a")),
        JobChange::Completed { refresh: true }
    );
    assert_eq!(tracker.apply(&update("a", "downloading")), JobChange::Ignored);
    assert_eq!(tracker.apply(&update("a", "failed")), JobChange::Ignored);
    assert_eq!(tracker.get("a").unwrap().status, JobStatus::Complete);
}

#[test]
fn running_job_cannot_return_to_pending() {
    let mut tracker = JobTracker::new();
    tracker.begin_batch(accepted(&["a"]));
    tracker.apply(&update("a", "processing"));
    assert_eq!(tracker.apply(&update("a", "pending")), JobChange::Ignored);
    assert_eq!(tracker.get("a").unwrap().status, JobStatus::Processing);
}

#[test]
fn unknown_ids_and_statuses_are_ignored() {
    let mut tracker = JobTracker::new();
    tracker.begin_batch(accepted(&["a"]));
    assert_eq!(tracker.apply(&update("zzz", "complete")), JobChange::Ignored);
    assert_eq!(tracker.apply(&update("a", "exploded")), JobChange::Ignored);
    assert_eq!(tracker.get("a").unwrap().status, JobStatus::Pending);
}

#[test]
fn complete_without_result_does_not_request_refresh() {
    let mut tracker = JobTracker::new();
    tracker.begin_batch(accepted(&["a"]));
    assert_eq!(
        tracker.apply(&update("a", "complete")),
        JobChange::Completed { refresh: false }
    );
}

#[test]
fn not_found_is_a_terminal_failure() {
    let mut tracker = JobTracker::new();
    tracker.begin_batch(accepted(&["a"]));
    assert_eq!(tracker.apply(&update("a", "not_found")), JobChange::Failed);
    let job = tracker.get("a").unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error.as_deref(), Some("job not found"));
    assert!(tracker.is_finished());
}

#[test]
fn mixed_batch_summary_is_partial() {
    let mut tracker = JobTracker::new();
    tracker.begin_batch(accepted(&["a", "b"]));

    tracker.apply(&finished_with_result("a"));
    assert!(!tracker.is_finished());
    tracker.apply(&JobUpdate {
        error: Some("HTTP 404".into()),
        ..update("b", "failed")
    });
    assert!(tracker.is_finished());

    let summary = tracker.summary();
    assert_eq!(summary, BatchSummary { succeeded: 1, failed: 1 });
    assert_eq!(summary.outcome(), BatchOutcome::Partial);
    assert_eq!(summary.describe(), "Downloaded 1 track(s), 1 failed");
}

#[test]
fn summary_outcomes() {
    assert_eq!(
        BatchSummary { succeeded: 2, failed: 0 }.outcome(),
        BatchOutcome::Success
    );
    assert_eq!(
        BatchSummary { succeeded: 0, failed: 3 }.outcome(),
        BatchOutcome::Failure
    );
}

#[test]
fn new_batch_replaces_previous_jobs() {
    let mut tracker = JobTracker::new();
    tracker.begin_batch(accepted(&["a"]));
    let second = tracker.begin_batch(accepted(&["b", "c"]));
    assert_eq!(second, 2);
    assert!(tracker.get("a").is_none());
    assert_eq!(tracker.ids(), vec!["b".to_string(), "c".to_string()]);

    tracker.clear();
    assert!(tracker.is_empty());
    assert!(!tracker.is_finished());
}
