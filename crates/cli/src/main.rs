mod receiver;

use std::io;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use raop::Server;
use tracing_subscriber::EnvFilter;

use receiver::Receiver;

#[derive(Parser)]
#[command(name = "raop-receiver", about = "AirPlay (RAOP) audio receiver")]
struct Args {
    /// Bind address (host:port) for the control connection
    #[arg(long, short, default_value = "0.0.0.0:5000")]
    bind: String,

    /// Log every request and response in full
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mut server = Server::new();
    Arc::new(Receiver::default())
        .install(&mut server)
        .context("register handlers")?;

    let addr = server
        .start(args.bind.as_str(), args.verbose)
        .with_context(|| format!("failed to start server on {}", args.bind))?;

    println!("RAOP receiver on {addr} — press Enter to stop");
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    server.stop();
    Ok(())
}
