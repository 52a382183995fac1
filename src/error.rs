//! Error types for tootnotify

use std::path::PathBuf;

use thiserror::Error;

/// Exit status for a failed send.
pub const EXIT_SEND_FAILED: u8 = 1;
/// Exit status for a missing or unusable configuration.
pub const EXIT_CONFIG: u8 = 2;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No config file {} found", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Mastodon API error {status}: {message}")]
    MastodonApi { status: u16, message: String },

    #[error("Mastodon request failed: {0}")]
    MastodonError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Process exit status this error maps to.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::ConfigNotFound(_) | Error::InvalidConfig(_) => EXIT_CONFIG,
            _ => EXIT_SEND_FAILED,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::InvalidConfig(err.to_string())
    }
}

impl From<ini::ParseError> for Error {
    fn from(err: ini::ParseError) -> Self {
        Error::InvalidConfig(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::MastodonError(err.to_string())
    }
}
