//! TootNotify library
//!
//! Send direct messages to a Mastodon account:
//! - Bound the media attachment list to what one status can carry
//! - Upload media and wait for the instance to finish processing it
//! - Post the message as a direct toot, dropping media that failed

pub mod config;
pub mod dispatch;
pub mod error;
pub mod mastodon;
pub mod media;

// Re-export common types
pub use config::Config;
pub use dispatch::{DispatchResult, MessageDispatcher, MessageDraft};
pub use error::{Error, Result};
pub use mastodon::{MastodonApi, MastodonClient};

pub mod commands;
