//! CLI for jack
//!
//! Subcommands:
//! - `server`: run the TCP server
//! - `cli`: interactive shell against a running server
//! - `bench`: concurrent SET/GET/DEL load test
//! - `ticker`: stream timestamps to a key with `PUB <key>` (smoke test)

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use jack::client::ticker::{self, TickerOptions};
use jack::config::{Settings, load_config};
use jack::utils::Result;
use jack::{cli, transport};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "jack", version, about = "In-memory key/value store with publish/subscribe")]
struct Args {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the TCP server
    Server {
        #[arg(long)]
        host: Option<String>,
        /// port number
        #[arg(long)]
        port: Option<u16>,
        /// number of buckets
        #[arg(long)]
        buckets: Option<usize>,
    },
    /// Interactive shell
    Cli {
        /// server address
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// max connections
        #[arg(long)]
        cmax: Option<usize>,
    },
    /// Concurrent SET/GET/DEL benchmark
    Bench {
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// number of concurrent clients
        #[arg(long)]
        clients: Option<usize>,
    },
    /// Publish the current time to a key once per interval
    Ticker {
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        #[arg(long)]
        key: Option<String>,
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}

fn apply_client_overrides(settings: &mut Settings, address: Option<String>, port: Option<u16>) {
    if let Some(address) = address {
        settings.client.address = address;
    }
    if let Some(port) = port {
        settings.client.port = port;
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let mut settings = match load_config() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(level) = args.log_level {
        settings.log.level = level;
    }
    jack::utils::logging::init(&settings.log.level);

    if let Err(e) = run(args.command, settings).await {
        error!("{e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(command: Command, mut settings: Settings) -> Result<()> {
    match command {
        Command::Server {
            host,
            port,
            buckets,
        } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            if let Some(buckets) = buckets {
                settings.store.buckets = buckets;
            }
            tokio::select! {
                res = transport::start_server(settings) => res?,
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received. Exiting gracefully.");
                }
            }
        }
        Command::Cli {
            address,
            port,
            cmax,
        } => {
            apply_client_overrides(&mut settings, address, port);
            if let Some(cmax) = cmax {
                settings.client.max_connections = cmax;
            }
            cli::repl::run(
                &settings.client.address,
                settings.client.port,
                settings.client.max_connections,
            )
            .await?;
        }
        Command::Bench {
            address,
            port,
            clients,
        } => {
            apply_client_overrides(&mut settings, address, port);
            if let Some(clients) = clients {
                settings.bench.clients = clients;
            }
            let report = cli::bench::run(
                &settings.client.address,
                settings.client.port,
                settings.bench.clients,
            )
            .await?;
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{json}"),
                Err(e) => error!("Failed to serialize report: {e}"),
            }
        }
        Command::Ticker {
            address,
            port,
            key,
            interval_ms,
        } => {
            apply_client_overrides(&mut settings, address, port);
            if let Some(key) = key {
                settings.ticker.key = key;
            }
            if let Some(interval_ms) = interval_ms {
                settings.ticker.interval_ms = interval_ms;
            }
            let opts = TickerOptions::from_settings(&settings);
            tokio::select! {
                res = ticker::run(&opts) => { res?; }
                _ = tokio::signal::ctrl_c() => {}
            }
        }
    }
    Ok(())
}
