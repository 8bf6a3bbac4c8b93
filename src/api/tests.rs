use std::io::Cursor;

use super::client::{check_body, decode_body};
use super::*;
use crate::jobs::AcceptedJob;

fn events(raw: &str) -> Vec<SseEvent> {
    SseReader::new(Cursor::new(raw.as_bytes().to_vec()))
        .map(|e| e.unwrap())
        .collect()
}

#[test]
fn sse_reader_splits_named_events() {
    let raw = "event: update\ndata: {\"id\":\"a\"}\n\nevent: complete\ndata: {\"done\": true}\n\n";
    let evs = events(raw);
    assert_eq!(evs.len(), 2);
    assert_eq!(evs[0].event, "update");
    assert_eq!(evs[0].data, "{\"id\":\"a\"}");
    assert_eq!(evs[1].event, "complete");
}

#[test]
fn sse_reader_handles_crlf_comments_and_multiline_data() {
    let raw = ": keepalive\r\n\r\nevent: progress\r\ndata: line one\r\ndata:line two\r\n\r\n";
    let evs = events(raw);
    assert_eq!(
        evs,
        vec![SseEvent {
            event: "progress".into(),
            data: "line one\nline two".into(),
        }]
    );
}

#[test]
fn sse_reader_defaults_event_name_to_message() {
    let evs = events("data: hello\n\n");
    assert_eq!(evs[0].event, "message");
}

#[test]
fn sse_reader_drops_unterminated_trailing_frame() {
    let evs = events("event: progress\ndata: {\"percent\": 10}\n\nevent: progress\ndata: {\"perc");
    assert_eq!(evs.len(), 1);
}

#[test]
fn decode_download_update_with_server_payload() {
    let sse = SseEvent {
        event: "update".into(),
        data: r#"{"id":"j1","url":"https://x","status":"complete","progress":100,
                 "message":"Done","error":null,"result":{"title":"Song","duration":201.5}}"#
            .into(),
    };
    let Some(DownloadStreamEvent::Update(update)) = decode_download_event(&sse).unwrap() else {
        panic!("expected update");
    };
    assert_eq!(update.id, "j1");
    assert_eq!(update.status, "complete");
    assert_eq!(update.progress, Some(100.0));
    assert_eq!(update.result.unwrap().title, "Song");
}

#[test]
fn decode_download_not_found_update_without_optional_fields() {
    let sse = SseEvent {
        event: "update".into(),
        data: r#"{"id":"j9","status":"not_found"}"#.into(),
    };
    let Some(DownloadStreamEvent::Update(update)) = decode_download_event(&sse).unwrap() else {
        panic!("expected update");
    };
    assert_eq!(update.status, "not_found");
    assert!(update.progress.is_none());
}

#[test]
fn decode_download_complete_and_unknown_events() {
    let complete = SseEvent {
        event: "complete".into(),
        data: r#"{"done": true}"#.into(),
    };
    assert_eq!(
        decode_download_event(&complete).unwrap(),
        Some(DownloadStreamEvent::Complete)
    );

    let other = SseEvent {
        event: "ping".into(),
        data: String::new(),
    };
    assert_eq!(decode_download_event(&other).unwrap(), None);
}

#[test]
fn decode_burn_progress_and_complete() {
    let progress = SseEvent {
        event: "progress".into(),
        data: r#"{"track":2,"percent":25,"status":"burning","message":"Writing track 2"}"#.into(),
    };
    match decode_burn_event(&progress).unwrap() {
        Some(BurnStreamEvent::Progress(p)) => {
            assert_eq!(p.percent, 25.0);
            assert_eq!(p.track, Some(2));
            assert_eq!(p.status.as_deref(), Some("burning"));
        }
        other => panic!("unexpected {other:?}"),
    }

    let complete = SseEvent {
        event: "complete".into(),
        data: r#"{"success":false,"message":"No tracks to burn"}"#.into(),
    };
    assert_eq!(
        decode_burn_event(&complete).unwrap(),
        Some(BurnStreamEvent::Complete(BurnComplete {
            success: false,
            message: "No tracks to burn".into(),
        }))
    );
}

#[test]
fn decode_burn_rejects_malformed_payload() {
    let bad = SseEvent {
        event: "complete".into(),
        data: "not json".into(),
    };
    assert!(matches!(decode_burn_event(&bad), Err(ApiError::Decode(_))));
}

#[test]
fn error_body_is_a_rejection_even_with_error_status() {
    let res: Result<CdInfo, ApiError> = decode_body(400, br#"{"error": "No URLs found"}"#);
    match res {
        Err(ApiError::Rejected(msg)) => assert_eq!(msg, "No URLs found"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn non_json_error_status_is_a_transport_failure() {
    let res: Result<CdInfo, ApiError> = decode_body(502, b"<html>Bad Gateway</html>");
    let err = res.unwrap_err();
    assert!(matches!(err, ApiError::Status(502)));
    assert!(!err.is_rejection());
}

#[test]
fn cd_info_with_and_without_disc() {
    let present: CdInfo =
        decode_body(200, br#"{"capacity": 4440, "default_capacity": 4800}"#).unwrap();
    assert_eq!(present.capacity, Some(4440.0));

    let absent: CdInfo =
        decode_body(200, br#"{"capacity": null, "default_capacity": 4800}"#).unwrap();
    assert_eq!(absent.capacity, None);
    assert_eq!(absent.default_capacity, 4800.0);
}

#[test]
fn download_response_with_missing_jobs_means_nothing_recognised() {
    let body: DownloadAccepted = decode_body(200, b"{}").unwrap();
    assert!(body.jobs.unwrap_or_default().is_empty());

    let body: DownloadAccepted =
        decode_body(200, br#"{"jobs": [{"id": "j1", "url": "https://a"}]}"#).unwrap();
    assert_eq!(
        body.jobs.unwrap(),
        vec![AcceptedJob {
            id: "j1".into(),
            url: "https://a".into(),
        }]
    );
}

#[test]
fn reorder_body_serialises_order_field() {
    let order = vec!["b".to_string(), "a".to_string()];
    let json = serde_json::to_string(&ReorderBody { order: &order }).unwrap();
    assert_eq!(json, r#"{"order":["b","a"]}"#);
}

#[test]
fn acknowledgment_bodies_are_classified_like_json_bodies() {
    assert!(check_body(200, br#"{"success": true}"#).is_ok());
    assert!(check_body(204, b"").is_ok());

    let refused = check_body(200, br#"{"error": "Track not found"}"#).unwrap_err();
    assert!(refused.is_rejection());
    assert_eq!(refused.to_string(), "Track not found");

    assert!(matches!(check_body(500, b"oops"), Err(ApiError::Status(500))));
}
