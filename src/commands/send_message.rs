//! Send a direct message, with optional media, to a Mastodon account

use std::time::Duration;

use tracing::{debug, warn};

use crate::dispatch::{DispatchResult, MessageDispatcher};
use crate::mastodon::MastodonApi;
use crate::media::{
    AttachmentRequest, MediaBatchUploader, UploadOutcome, DEFAULT_TIMEOUT_SECS, POLL_INTERVAL,
};

/// Message used when none is given.
pub const DEFAULT_MESSAGE: &str = "Testing!";

/// One invocation's worth of input.
#[derive(Debug, Clone)]
pub struct SendOptions {
    pub recipient: String,
    pub message: String,
    pub spoiler: Option<String>,
    pub media: AttachmentRequest,
    /// Per-file wait for processing, in seconds.
    pub timeout_secs: i64,
    pub poll_interval: Duration,
    /// Upload through the synchronous media endpoint.
    pub synchronous: bool,
}

impl SendOptions {
    pub fn new<S1: Into<String>, S2: Into<String>>(recipient: S1, message: S2) -> Self {
        Self {
            recipient: recipient.into(),
            message: message.into(),
            spoiler: None,
            media: AttachmentRequest::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            poll_interval: POLL_INTERVAL,
            synchronous: false,
        }
    }
}

/// Limit the attachments, upload them, then post whatever made it.
pub async fn run<C: MastodonApi + ?Sized>(client: &C, options: SendOptions) -> DispatchResult {
    let media = options.media.limited();

    debug!(
        "RECIPIENT: {} MESSAGE: {} SPOILER: {:?} MEDIA: {:?} SENSITIVE: {} TIMEOUT: {}s",
        options.recipient,
        options.message,
        options.spoiler,
        media
            .attachments
            .iter()
            .map(|a| a.path.display().to_string())
            .collect::<Vec<_>>(),
        media.sensitive,
        options.timeout_secs
    );

    let outcomes = MediaBatchUploader::new(client)
        .with_poll_interval(options.poll_interval)
        .synchronous(options.synchronous)
        .upload_all(&media.attachments, options.timeout_secs)
        .await;

    if let Some(outcomes) = outcomes.as_deref() {
        report_failures(&media, outcomes);
    }

    MessageDispatcher::new(client)
        .send(
            &options.message,
            &options.recipient,
            options.spoiler.as_deref(),
            outcomes.as_deref(),
            media.sensitive,
        )
        .await
}

fn report_failures(media: &AttachmentRequest, outcomes: &[UploadOutcome]) {
    for (attachment, outcome) in media.attachments.iter().zip(outcomes) {
        if let UploadOutcome::Failed(failure) = outcome {
            warn!("{} will not be attached ({})", attachment.path.display(), failure);
        }
    }
}
