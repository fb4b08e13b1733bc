pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "friends")]
#[command(about = "Share your location with friends, end-to-end encrypted")]
pub struct Args {
    /// Relay url (defaults to the one stored in config, then http://localhost:3000)
    #[arg(long, global = true)]
    pub remote: Option<Url>,

    /// Path to the friends config directory (defaults to ~/.friends)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
