//! Upload a list of attachments one after another.

use std::time::Duration;

use tracing::{debug, info};

use super::limiter::Attachment;
use super::poller::{MediaUploadPoller, UploadOutcome, POLL_INTERVAL};
use crate::mastodon::MastodonApi;

/// Drives [`MediaUploadPoller`] over attachments strictly in order.
pub struct MediaBatchUploader<'a, C: MastodonApi + ?Sized> {
    client: &'a C,
    poll_interval: Duration,
    synchronous: bool,
}

impl<'a, C: MastodonApi + ?Sized> MediaBatchUploader<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            poll_interval: POLL_INTERVAL,
            synchronous: false,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Have the instance finish processing each file before answering.
    pub fn synchronous(mut self, synchronous: bool) -> Self {
        self.synchronous = synchronous;
        self
    }

    /// One outcome per attachment, in input order. `None` when there is
    /// nothing to upload, so the post carries no media field at all.
    pub async fn upload_all(
        &self,
        attachments: &[Attachment],
        timeout_secs: i64,
    ) -> Option<Vec<UploadOutcome>> {
        if attachments.is_empty() {
            return None;
        }

        let poller = MediaUploadPoller::new(self.client)
            .with_poll_interval(self.poll_interval)
            .synchronous(self.synchronous);
        let mut outcomes = Vec::with_capacity(attachments.len());

        for (index, attachment) in attachments.iter().enumerate() {
            debug!(
                "[{}/{}] uploading {}",
                index + 1,
                attachments.len(),
                attachment.path.display()
            );
            let outcome = poller
                .upload_and_wait(
                    &attachment.path,
                    timeout_secs,
                    attachment.description.as_deref(),
                )
                .await;
            outcomes.push(outcome);
        }

        let ready = outcomes.iter().filter(|o| o.is_ready()).count();
        info!("{} of {} media files ready", ready, outcomes.len());

        Some(outcomes)
    }
}
