// CLI modules
mod cli;

use clap::{Parser, Subcommand};
use cli::{args::Args, op::Op, Friend, Handshake, Init, Locations, Login, Logout};
use cli::{Register, Share, ShowIdentity};
use tracing_subscriber::EnvFilter;

command_enum! {
    (Init, Init),
    (Identity, ShowIdentity),
    (Register, Register),
    (Login, Login),
    (Logout, Logout),
    (Handshake, Handshake),
    (Friend, Friend),
    (Share, Share),
    (Locations, Locations),
}

fn init_logging() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .init();
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging();

    // Resolve remote URL: explicit flag > config relay_url > localhost default
    let remote = cli::op::resolve_remote(args.remote, args.config_path.clone());

    let ctx = match cli::op::OpContext::new(remote, args.config_path) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: Failed to create API client: {}", e);
            std::process::exit(1);
        }
    };

    match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
