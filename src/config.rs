//! Configuration for the Mastodon API credentials
//!
//! Loads configuration from `~/.tootnotifyrc`, an INI file with a
//! `[tootnotify]` section. A YAML file with a `tootnotify:` key is read too.

use ini::Ini;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Config file name inside the user's home directory
pub const CONFIG_FILE_NAME: &str = ".tootnotifyrc";
/// Environment variable that points to an alternative config file
pub const CONFIG_PATH_ENV: &str = "TOOTNOTIFY_CONFIG";
/// Section holding the credentials
pub const CONFIG_SECTION: &str = "tootnotify";

/// YAML config structures
#[derive(Debug, Deserialize)]
struct YamlConfig {
    tootnotify: Option<TootNotifySection>,
}

#[derive(Debug, Deserialize)]
struct TootNotifySection {
    api_base_url: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    access_token: Option<String>,
    #[serde(alias = "DEFAULT_RECIPIENT")]
    default_recipient: Option<String>,
}

/// API application credentials
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub access_token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct Config {
    /// Instance URL, e.g. `https://mastodon.social`
    pub api_base_url: String,
    pub credentials: Credentials,
    /// Recipient used when none is given on the command line
    pub default_recipient: Option<String>,
}

impl Config {
    /// Default config location: `$HOME/.tootnotifyrc`, or `$TOOTNOTIFY_CONFIG`
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }
        dirs::home_dir()
            .unwrap_or_default()
            .join(CONFIG_FILE_NAME)
    }

    /// Load configuration from an explicit path or the default location
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load_from_file(Self::default_path()),
        }
    }

    /// Resolve a value: prefer env var if config value looks like ${VAR}
    fn resolve_env_string(value: Option<String>, env_key: &str) -> Option<String> {
        if let Some(ref v) = value {
            if v.starts_with("${") && v.ends_with('}') {
                let var_name = &v[2..v.len() - 1];
                return std::env::var(var_name).ok();
            }
        }
        value
            .or_else(|| std::env::var(env_key).ok())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Load .env file into environment variables using dotenvy
    fn load_dotenv() {
        let _ = dotenvy::dotenv();
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_dotenv();

        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::ConfigNotFound(path.to_path_buf()),
            _ => Error::InvalidConfig(format!("Failed to read {}: {}", path.display(), e)),
        })?;

        Self::parse(&content)
    }

    /// Parse configuration text, INI or YAML.
    ///
    /// A file whose first meaningful line is a `[section]` header is INI.
    pub fn parse(content: &str) -> Result<Self> {
        let first_line = content
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with(';'));

        match first_line {
            Some(line) if line.starts_with('[') => Self::from_ini(content),
            _ => Self::from_yaml(content),
        }
    }

    /// Parse configuration from INI text. Keys match case-insensitively.
    pub fn from_ini(content: &str) -> Result<Self> {
        let ini = Ini::load_from_str(content)?;
        let props = ini
            .section(Some(CONFIG_SECTION))
            .ok_or_else(missing_section)?;
        let get = |key: &str| {
            props
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v.to_string())
        };

        Self::from_section(TootNotifySection {
            api_base_url: get("api_base_url"),
            client_id: get("client_id"),
            client_secret: get("client_secret"),
            access_token: get("access_token"),
            default_recipient: get("default_recipient"),
        })
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let yaml: YamlConfig = serde_yaml::from_str(content)?;
        Self::from_section(yaml.tootnotify.ok_or_else(missing_section)?)
    }

    fn from_section(section: TootNotifySection) -> Result<Self> {
        let api_base_url =
            Self::resolve_env_string(section.api_base_url, "TOOTNOTIFY_API_BASE_URL")
                .ok_or_else(|| Error::InvalidConfig("api_base_url is not set".to_string()))?;
        let access_token =
            Self::resolve_env_string(section.access_token, "TOOTNOTIFY_ACCESS_TOKEN")
                .ok_or_else(|| Error::InvalidConfig("access_token is not set".to_string()))?;

        Ok(Self {
            api_base_url: normalize_base_url(&api_base_url),
            credentials: Credentials {
                client_id: Self::resolve_env_string(section.client_id, "TOOTNOTIFY_CLIENT_ID")
                    .unwrap_or_default(),
                client_secret: Self::resolve_env_string(
                    section.client_secret,
                    "TOOTNOTIFY_CLIENT_SECRET",
                )
                .unwrap_or_default(),
                access_token,
            },
            default_recipient: Self::resolve_env_string(
                section.default_recipient,
                "TOOTNOTIFY_DEFAULT_RECIPIENT",
            ),
        })
    }

    /// Pick the recipient: explicit value first, then the configured default
    pub fn recipient(&self, explicit: Option<&str>) -> Result<String> {
        explicit
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .or_else(|| self.default_recipient.clone())
            .ok_or_else(|| {
                Error::InvalidConfig(
                    "no recipient given and default_recipient is not set".to_string(),
                )
            })
    }
}

fn missing_section() -> Error {
    Error::InvalidConfig(format!("missing [{}] section", CONFIG_SECTION))
}

/// Trim whitespace and trailing slashes, and default the scheme to https
fn normalize_base_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}
