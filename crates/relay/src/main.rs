use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use friends_relay::{spawn_service, ServiceConfig};

#[derive(Parser, Debug)]
#[command(name = "friends-relay")]
#[command(about = "Relay server for Friends location sharing")]
struct Args {
    /// Address for the http server to listen on
    #[arg(long, default_value = "0.0.0.0:3000")]
    listen_addr: SocketAddr,

    /// Seconds a session stays valid after login
    #[arg(long, default_value_t = 3600)]
    session_ttl_secs: u64,

    /// Default log level, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = ServiceConfig {
        listen_addr: args.listen_addr,
        session_ttl: Duration::from_secs(args.session_ttl_secs),
        log_level: args.log_level,
        log_dir: args.log_dir,
    };

    spawn_service(&config).await;
}
