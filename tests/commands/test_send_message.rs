//! Tests for the send_message command against a mock Mastodon instance

use std::path::PathBuf;
use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;
use tempfile::tempdir;

use tootnotify::commands::{send_message_run, SendOptions};
use tootnotify::media::AttachmentRequest;
use tootnotify::{DispatchResult, MastodonClient};

fn write_media(dir: &std::path::Path, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let path = dir.join(name);
            std::fs::write(&path, b"png-bytes").expect("write media");
            path
        })
        .collect()
}

#[tokio::test]
async fn test_five_files_are_limited_uploaded_and_sent() {
    let server = MockServer::start_async().await;

    let upload_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v2/media")
            .header("Authorization", "Bearer token");
        then.status(202).json_body(json!({ "id": "m1", "type": "image", "url": null }));
    });
    let poll_mock = server.mock(|when, then| {
        when.method(GET).path("/api/v1/media/m1");
        then.status(200).json_body(json!({
            "id": "m1",
            "type": "image",
            "url": "https://files.example/m1.png"
        }));
    });
    let post_mock = server.mock(|when, then| {
        when.method(POST).path("/api/v1/statuses").is_true(|req| {
            let body: serde_json::Value =
                serde_json::from_slice(req.body().as_ref()).unwrap_or_default();
            body["status"] == "@alice@example.social\n Hello"
                && body["visibility"] == "direct"
                && body["media_ids"].as_array().map(|ids| ids.len()) == Some(4)
                && body.get("spoiler_text").is_none()
        });
        then.status(200).json_body(json!({
            "id": "9001",
            "url": "https://mastodon.example/@me/9001",
            "visibility": "direct"
        }));
    });

    let dir = tempdir().expect("tempdir");
    let files = write_media(dir.path(), &["a.png", "b.png", "c.png", "d.png", "e.png"]);

    let client = MastodonClient::new(server.base_url(), "token").unwrap();
    let mut options = SendOptions::new("@alice@example.social", "Hello");
    options.media = AttachmentRequest::new(files, vec![], false);
    options.timeout_secs = 5;
    options.poll_interval = Duration::from_millis(10);

    let result = send_message_run(&client, options).await;

    assert_eq!(
        result,
        DispatchResult::Sent {
            status_id: "9001".to_string(),
            url: Some("https://mastodon.example/@me/9001".to_string()),
            attached: 4,
        }
    );
    upload_mock.assert_calls(4);
    poll_mock.assert_calls(4);
    post_mock.assert_calls(1);
}

#[tokio::test]
async fn test_post_failure_is_reported_not_raised() {
    let server = MockServer::start_async().await;

    let post_mock = server.mock(|when, then| {
        when.method(POST).path("/api/v1/statuses");
        then.status(503).body("Service Unavailable");
    });

    let client = MastodonClient::new(server.base_url(), "token").unwrap();
    let result = send_message_run(&client, SendOptions::new("@alice@example.social", "Hi")).await;

    assert!(!result.is_success());
    assert!(result.error().unwrap_or_default().contains("503"));
    post_mock.assert_calls(1);
}

#[test]
fn test_rejected_media_still_sends_text() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/api/v2/media");
        then.status(422)
            .json_body(json!({ "error": "Validation failed: File content type is invalid" }));
    });
    let post_mock = server.mock(|when, then| {
        when.method(POST).path("/api/v1/statuses").is_true(|req| {
            let body: serde_json::Value =
                serde_json::from_slice(req.body().as_ref()).unwrap_or_default();
            body["media_ids"] == json!([])
        });
        then.status(200).json_body(json!({ "id": "1" }));
    });

    let dir = tempdir().expect("tempdir");
    let files = write_media(dir.path(), &["doc.zip", "other.zip"]);

    let client = MastodonClient::new(server.base_url(), "token").unwrap();
    let mut options = SendOptions::new("@alice@example.social", "Hello");
    options.media = AttachmentRequest::new(files, vec![], false);

    let result = tokio_test::block_on(send_message_run(&client, options));

    assert!(result.is_success());
    post_mock.assert_calls(1);
}
