//! Upload one media file and wait until the instance has processed it.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::mastodon::{MastodonApi, MediaAttachment};

/// Cadence of readiness checks.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Default wait per file, in seconds.
pub const DEFAULT_TIMEOUT_SECS: i64 = 30;

/// Why a file did not end up attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadFailure {
    /// The instance refused the upload (unsupported type, unreadable file, ...).
    Rejected(String),
    /// Uploaded, but processing was not confirmed in time.
    Timeout { media_id: String, waited_secs: u64 },
}

impl fmt::Display for UploadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadFailure::Rejected(reason) => write!(f, "rejected: {}", reason),
            UploadFailure::Timeout {
                media_id,
                waited_secs,
            } => write!(
                f,
                "media {} not confirmed after {}s",
                media_id, waited_secs
            ),
        }
    }
}

/// Result of uploading one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Ready(MediaAttachment),
    Failed(UploadFailure),
}

impl UploadOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, UploadOutcome::Ready(_))
    }

    /// Remote media id, only for confirmed uploads.
    pub fn ready_id(&self) -> Option<&str> {
        match self {
            UploadOutcome::Ready(media) => Some(media.id.as_str()),
            UploadOutcome::Failed(_) => None,
        }
    }
}

/// One transition of the upload state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStep {
    Ready(MediaAttachment),
    /// Not processed yet, or the status check itself failed.
    Pending { media_id: String },
    /// Submission refused; never produced by a status check.
    Rejected(String),
}

/// Submits a file and polls its processing state.
pub struct MediaUploadPoller<'a, C: MastodonApi + ?Sized> {
    client: &'a C,
    poll_interval: Duration,
    synchronous: bool,
}

impl<'a, C: MastodonApi + ?Sized> MediaUploadPoller<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            poll_interval: POLL_INTERVAL,
            synchronous: false,
        }
    }

    /// Override the delay between checks. The timeout still counts checks,
    /// one per interval.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Ask the instance to process uploads before answering.
    pub fn synchronous(mut self, synchronous: bool) -> Self {
        self.synchronous = synchronous;
        self
    }

    /// Submit the file for processing.
    async fn submit(&self, file: &Path, description: Option<&str>) -> UploadStep {
        match self
            .client
            .submit_media(file, description, self.synchronous)
            .await
        {
            Ok(media) if media.is_ready() => UploadStep::Ready(media),
            Ok(media) => UploadStep::Pending { media_id: media.id },
            Err(e) => UploadStep::Rejected(e.to_string()),
        }
    }

    /// Check once whether `media_id` has finished processing.
    pub async fn check(&self, media_id: &str) -> UploadStep {
        debug!("Retrieving status update for media id: {}", media_id);
        match self.client.poll_media(media_id).await {
            Ok(media) if media.is_ready() => UploadStep::Ready(media),
            Ok(_) => UploadStep::Pending {
                media_id: media_id.to_string(),
            },
            Err(e) => {
                warn!("could not verify media {} status: {}", media_id, e);
                UploadStep::Pending {
                    media_id: media_id.to_string(),
                }
            }
        }
    }

    /// Upload `file` and wait up to `timeout_secs` checks for it to be ready.
    ///
    /// A non-positive timeout performs a single check and then gives up.
    pub async fn upload_and_wait(
        &self,
        file: &Path,
        timeout_secs: i64,
        description: Option<&str>,
    ) -> UploadOutcome {
        let media_id = match self.submit(file, description).await {
            UploadStep::Ready(media) => {
                info!("Uploaded {} as media {}", file.display(), media.id);
                return UploadOutcome::Ready(media);
            }
            UploadStep::Rejected(reason) => {
                warn!(
                    "could not add media {}: {}. Proceeding with the toot, but this file won't be there!",
                    file.display(),
                    reason
                );
                return UploadOutcome::Failed(UploadFailure::Rejected(reason));
            }
            UploadStep::Pending { media_id } => media_id,
        };

        debug!("Uploading file: {} with ID: {}", file.display(), media_id);

        let max_wait = timeout_secs.max(0) as u64;
        let mut elapsed: u64 = 0;

        loop {
            debug!("{:2}s elapsed.", elapsed);
            if let UploadStep::Ready(media) = self.check(&media_id).await {
                info!("Upload of {} successful!", file.display());
                return UploadOutcome::Ready(media);
            }

            if elapsed >= max_wait {
                break;
            }
            tokio::time::sleep(self.poll_interval).await;
            elapsed += 1;
            if elapsed >= max_wait {
                break;
            }
        }

        warn!(
            "upload of {} timed out after {}s! Proceeding with the toot, but this file won't be there.",
            file.display(),
            elapsed
        );
        UploadOutcome::Failed(UploadFailure::Timeout {
            media_id,
            waited_secs: elapsed,
        })
    }
}
