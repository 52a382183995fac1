//! Media attachment pipeline: bound the list, upload each file, wait for
//! processing.

pub mod batch;
pub mod limiter;
pub mod poller;

pub use batch::MediaBatchUploader;
pub use limiter::{limit, Attachment, AttachmentRequest, ATTACHMENT_LIMIT};
pub use poller::{
    MediaUploadPoller, UploadFailure, UploadOutcome, UploadStep, DEFAULT_TIMEOUT_SECS,
    POLL_INTERVAL,
};
