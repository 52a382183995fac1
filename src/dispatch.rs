//! Compose and post the direct message.

use tracing::{debug, error, info};

use crate::mastodon::{MastodonApi, StatusRequest, Visibility};
use crate::media::UploadOutcome;

/// Everything needed for one post. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    recipient: String,
    body: String,
    spoiler: Option<String>,
    media_ids: Option<Vec<String>>,
    sensitive: bool,
}

impl MessageDraft {
    /// Keep only confirmed uploads. `None` stays `None`: "no media" is not
    /// the same as an empty media list.
    pub fn new(
        recipient: &str,
        body: &str,
        spoiler: Option<&str>,
        media: Option<&[UploadOutcome]>,
        sensitive: bool,
    ) -> Self {
        let media_ids = media.map(|outcomes| {
            outcomes
                .iter()
                .filter_map(|o| o.ready_id().map(str::to_string))
                .collect()
        });

        Self {
            recipient: recipient.to_string(),
            body: body.to_string(),
            spoiler: spoiler.map(str::to_string),
            media_ids,
            sensitive,
        }
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn media_ids(&self) -> Option<&[String]> {
        self.media_ids.as_deref()
    }

    /// The mention on its own line is what makes this a direct message.
    pub fn status_text(&self) -> String {
        format!("{}\n {}", self.recipient, self.body)
    }

    pub fn to_request(&self) -> StatusRequest {
        StatusRequest {
            status: self.status_text(),
            visibility: Visibility::Direct,
            media_ids: self.media_ids.clone(),
            spoiler_text: self.spoiler.clone(),
            sensitive: self.sensitive,
        }
    }
}

/// Outcome of the single post attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    Sent {
        status_id: String,
        url: Option<String>,
        attached: usize,
    },
    Failed {
        error: String,
    },
}

impl DispatchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, DispatchResult::Sent { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            DispatchResult::Sent { .. } => None,
            DispatchResult::Failed { error } => Some(error.as_str()),
        }
    }
}

pub struct MessageDispatcher<'a, C: MastodonApi + ?Sized> {
    client: &'a C,
}

impl<'a, C: MastodonApi + ?Sized> MessageDispatcher<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Build a draft from the upload outcomes and post it.
    pub async fn send(
        &self,
        message: &str,
        recipient: &str,
        spoiler: Option<&str>,
        media: Option<&[UploadOutcome]>,
        sensitive: bool,
    ) -> DispatchResult {
        let draft = MessageDraft::new(recipient, message, spoiler, media, sensitive);
        self.dispatch(&draft).await
    }

    /// Post a prepared draft. Remote errors become `DispatchResult::Failed`.
    pub async fn dispatch(&self, draft: &MessageDraft) -> DispatchResult {
        let request = draft.to_request();
        let attached = draft.media_ids().map_or(0, |ids| ids.len());
        debug!(
            "posting direct message to {} with {} attachment(s)",
            draft.recipient(),
            attached
        );

        match self.client.submit_post(&request).await {
            Ok(status) => {
                info!("Toot {} sent to {}", status.id, draft.recipient());
                DispatchResult::Sent {
                    status_id: status.id,
                    url: status.url,
                    attached,
                }
            }
            Err(e) => {
                error!("{}", e);
                DispatchResult::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mastodon::MastodonClient;
    use crate::media::UploadFailure;
    use crate::media::poller::tests::media;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> MastodonClient {
        MastodonClient::new(server.base_url(), "test_token").expect("client")
    }

    fn rejected() -> UploadOutcome {
        UploadOutcome::Failed(UploadFailure::Rejected("bad type".to_string()))
    }

    #[test]
    fn status_text_mentions_recipient_first() {
        let draft = MessageDraft::new("@alice@example.social", "Hello", None, None, false);
        assert_eq!(draft.status_text(), "@alice@example.social\n Hello");
    }

    #[test]
    fn draft_keeps_only_ready_media() {
        let outcomes = vec![
            UploadOutcome::Ready(media("1", true)),
            rejected(),
            UploadOutcome::Failed(UploadFailure::Timeout {
                media_id: "3".to_string(),
                waited_secs: 30,
            }),
            UploadOutcome::Ready(media("4", true)),
        ];
        let draft = MessageDraft::new("@a@b", "hi", None, Some(outcomes.as_slice()), false);

        assert_eq!(
            draft.media_ids(),
            Some(&["1".to_string(), "4".to_string()][..])
        );
    }

    #[test]
    fn draft_request_is_always_direct() {
        let request =
            MessageDraft::new("@a@b", "hi", Some("cw"), None, true).to_request();

        assert_eq!(request.visibility, Visibility::Direct);
        assert_eq!(request.spoiler_text.as_deref(), Some("cw"));
        assert!(request.sensitive);
        assert_eq!(request.media_ids, None);
    }

    #[tokio::test]
    async fn send_without_media_omits_media_ids() {
        let server = MockServer::start_async().await;

        let post_mock = server.mock(|when, then| {
            when.method(POST).path("/api/v1/statuses").is_true(|req| {
                let body: serde_json::Value =
                    serde_json::from_slice(req.body().as_ref()).unwrap_or_default();
                body.get("media_ids").is_none()
                    && body["visibility"] == "direct"
                    && body["status"] == "@alice@example.social\n Hello"
            });
            then.status(200).json_body(json!({ "id": "1" }));
        });

        let result = MessageDispatcher::new(&client(&server))
            .send("Hello", "@alice@example.social", None, None, false)
            .await;

        assert!(result.is_success());
        post_mock.assert_calls(1);
    }

    #[tokio::test]
    async fn send_degrades_when_all_media_failed() {
        let server = MockServer::start_async().await;

        let post_mock = server.mock(|when, then| {
            when.method(POST).path("/api/v1/statuses").is_true(|req| {
                let body: serde_json::Value =
                    serde_json::from_slice(req.body().as_ref()).unwrap_or_default();
                body["media_ids"] == json!([])
            });
            then.status(200).json_body(json!({ "id": "2" }));
        });

        let outcomes = vec![rejected(), rejected()];
        let result = MessageDispatcher::new(&client(&server))
            .send("Hello", "@alice@example.social", None, Some(outcomes.as_slice()), false)
            .await;

        assert_eq!(
            result,
            DispatchResult::Sent {
                status_id: "2".to_string(),
                url: None,
                attached: 0,
            }
        );
        post_mock.assert_calls(1);
    }

    #[tokio::test]
    async fn send_attaches_ready_media_and_spoiler() {
        let server = MockServer::start_async().await;

        let post_mock = server.mock(|when, then| {
            when.method(POST).path("/api/v1/statuses").is_true(|req| {
                let body: serde_json::Value =
                    serde_json::from_slice(req.body().as_ref()).unwrap_or_default();
                body["media_ids"] == json!(["10"])
                    && body["spoiler_text"] == "build results"
                    && body["sensitive"] == true
            });
            then.status(200).json_body(json!({ "id": "3" }));
        });

        let outcomes = vec![UploadOutcome::Ready(media("10", true)), rejected()];
        let result = MessageDispatcher::new(&client(&server))
            .send(
                "CI passed",
                "@me@mastodon.example",
                Some("build results"),
                Some(outcomes.as_slice()),
                true,
            )
            .await;

        assert!(result.is_success());
        post_mock.assert_calls(1);
    }

    #[tokio::test]
    async fn remote_error_becomes_failed_result() {
        let server = MockServer::start_async().await;

        server.mock(|when, then| {
            when.method(POST).path("/api/v1/statuses");
            then.status(401)
                .json_body(json!({ "error": "The access token is invalid" }));
        });

        let result = MessageDispatcher::new(&client(&server))
            .send("Hello", "@alice@example.social", None, None, false)
            .await;

        assert!(!result.is_success());
        let error = result.error().expect("error message");
        assert!(error.contains("401"));
        assert!(error.contains("access token is invalid"));
    }
}
