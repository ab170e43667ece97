//! fileserv CLI Client
//!
//! Command-line interface for fetching and storing files on a server.

use std::io::Write;
use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use fileserv::network::{Client, ClientResponse};
use tracing_subscriber::{fmt, EnvFilter};

/// fileserv CLI
#[derive(Parser, Debug)]
#[command(name = "fileserv-cli")]
#[command(about = "CLI for a fileserv server")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Correlation id sent as the Request-Id header
    #[arg(short = 'i', long)]
    request_id: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch a file and write it to stdout
    Get {
        /// The resource name
        target: String,
    },

    /// Store a file
    Put {
        /// The resource name
        target: String,

        #[command(flatten)]
        body: BodySource,
    },
}

#[derive(ClapArgs, Debug)]
#[group(required = true, multiple = false)]
struct BodySource {
    /// Use this string as the body
    #[arg(short, long)]
    data: Option<String>,

    /// Read the body from this file
    #[arg(short, long)]
    file: Option<PathBuf>,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let client = Client::new(&args.server);

    let result = match &args.command {
        Commands::Get { target } => client.get_with_id(target, args.request_id),
        Commands::Put { target, body } => match read_body(body) {
            Ok(bytes) => client.put_with_id(target, &bytes, args.request_id),
            Err(e) => {
                tracing::error!("Failed to read body: {}", e);
                std::process::exit(1);
            }
        },
    };

    match result {
        Ok(response) => report(&args.command, &response),
        Err(e) => {
            tracing::error!("Request failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn read_body(source: &BodySource) -> std::io::Result<Vec<u8>> {
    match (&source.data, &source.file) {
        (Some(data), _) => Ok(data.clone().into_bytes()),
        (None, Some(path)) => std::fs::read(path),
        (None, None) => Ok(Vec::new()),
    }
}

fn report(command: &Commands, response: &ClientResponse) {
    eprintln!("{} {}", response.status, response.reason);

    if matches!(command, Commands::Get { .. }) && response.status == 200 {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = stdout.write_all(&response.body).and_then(|_| stdout.flush()) {
            tracing::error!("Failed to write body: {}", e);
            std::process::exit(1);
        }
    }

    if !(200..300).contains(&response.status) {
        std::process::exit(1);
    }
}
