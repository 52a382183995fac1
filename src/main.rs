//! TootNotify CLI - main entry point
//!
//! Send a Direct Message to someone on Mastodon.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tootnotify::commands::{self, SendOptions, DEFAULT_MESSAGE};
use tootnotify::error::EXIT_SEND_FAILED;
use tootnotify::media::{AttachmentRequest, DEFAULT_TIMEOUT_SECS};
use tootnotify::{Config, MastodonClient};

#[derive(Parser, Debug)]
#[command(name = "tootnotify")]
#[command(about = "Send a Direct Message to someone on Mastodon!", long_about = None)]
#[command(version)]
struct Cli {
    /// User who will receive a direct message (defaults to the configured recipient)
    #[arg(short, long, value_name = "@user@instan.ce")]
    recipient: Option<String>,

    /// Body of the message to be sent
    #[arg(short, long, value_name = "message_body", default_value = DEFAULT_MESSAGE)]
    message: String,

    /// Description for the spoiler warning which hides the message
    #[arg(short, long, value_name = "spoiler_description")]
    spoiler: Option<String>,

    /// List of up to 4 media files to attach to the message
    #[arg(short, long, value_name = "path_to_media_file", num_args = 1..)]
    files: Vec<PathBuf>,

    /// Alt text for the attached files, matched to --files by position
    #[arg(short, long, value_name = "alt_text")]
    description: Vec<String>,

    /// Flag post/media as sensitive content (blur media)
    #[arg(short = 'x', long, default_value_t = false)]
    sensitive: bool,

    /// Number of seconds to wait for a single media file to upload
    #[arg(
        short,
        long,
        value_name = "timeout_in_seconds",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        allow_negative_numbers = true
    )]
    timeout: i64,

    /// Have the instance finish processing each file before answering
    #[arg(long, default_value_t = false)]
    synchronous: bool,

    /// Print out verbose messages
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Config file (defaults to ~/.tootnotifyrc)
    #[arg(long, env = "TOOTNOTIFY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let directive = if cli.verbose {
        "tootnotify=debug"
    } else {
        "tootnotify=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with_writer(std::io::stderr)
        .init();

    if cli.verbose {
        info!("ARGV: {:?}", cli);
    }

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return Ok(ExitCode::from(e.exit_code()));
        }
    };

    let recipient = match config.recipient(cli.recipient.as_deref()) {
        Ok(recipient) => recipient,
        Err(e) => {
            error!("{}", e);
            return Ok(ExitCode::from(e.exit_code()));
        }
    };

    let client = match MastodonClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            error!("{}", e);
            return Ok(ExitCode::from(e.exit_code()));
        }
    };

    let mut options = SendOptions::new(recipient, cli.message);
    options.spoiler = cli.spoiler;
    options.media = AttachmentRequest::new(cli.files, cli.description, cli.sensitive);
    options.timeout_secs = cli.timeout;
    options.synchronous = cli.synchronous;

    let result = commands::send_message_run(&client, options).await;

    if result.is_success() {
        if cli.verbose {
            println!("✓ Toot sent successfully!");
        }
        Ok(ExitCode::SUCCESS)
    } else {
        if cli.verbose {
            println!("✗ Failed to send Toot!");
        }
        Ok(ExitCode::from(EXIT_SEND_FAILED))
    }
}
