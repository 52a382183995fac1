//! Bounds the attachment list to what a single status may carry.

use std::path::PathBuf;

use tracing::warn;

/// Maximum number of media attachments on one status.
pub const ATTACHMENT_LIMIT: usize = 4;

/// One file to attach, with optional alt text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub path: PathBuf,
    pub description: Option<String>,
}

impl Attachment {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            description: None,
        }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl From<PathBuf> for Attachment {
    fn from(path: PathBuf) -> Self {
        Attachment::new(path)
    }
}

impl From<&str> for Attachment {
    fn from(path: &str) -> Self {
        Attachment::new(path)
    }
}

/// Files requested for one message. `sensitive` applies to the whole post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentRequest {
    pub attachments: Vec<Attachment>,
    pub sensitive: bool,
}

impl AttachmentRequest {
    /// Pair files with descriptions by position; extra descriptions are dropped.
    pub fn new(files: Vec<PathBuf>, descriptions: Vec<String>, sensitive: bool) -> Self {
        let mut descriptions = descriptions.into_iter();
        let attachments = files
            .into_iter()
            .map(|path| Attachment {
                path,
                description: descriptions.next().filter(|d| !d.trim().is_empty()),
            })
            .collect();

        Self {
            attachments,
            sensitive,
        }
    }

    /// Apply [`limit`] to the attachments.
    pub fn limited(self) -> Self {
        Self {
            attachments: limit(self.attachments),
            sensitive: self.sensitive,
        }
    }
}

/// Keep at most [`ATTACHMENT_LIMIT`] items, in input order.
///
/// Accepts anything iterable, so a single path (`Some(path)`), a list, or
/// nothing at all normalise the same way. Logs a warning when items are
/// dropped.
pub fn limit<I, T>(items: I) -> Vec<T>
where
    I: IntoIterator<Item = T>,
{
    let mut items: Vec<T> = items.into_iter().collect();
    if items.len() > ATTACHMENT_LIMIT {
        warn!(
            "the number of attached media ({}) exceeds the maximum allowed per post ({}). \
             Only adding the first {} files!",
            items.len(),
            ATTACHMENT_LIMIT,
            ATTACHMENT_LIMIT
        );
        items.truncate(ATTACHMENT_LIMIT);
    }
    items
}
