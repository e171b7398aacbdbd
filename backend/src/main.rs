//! cardkit CLI
//!
//! # Hosting
//!
//! ```bash
//! cardkit serve                     # Local HTTP server (port 3000)
//! cardkit lambda                    # AWS Lambda runtime
//! cardkit invoke event.json         # Run the handler on a proxy event file
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! cardkit parse cards.xlsx          # Rows as JSON
//! cardkit group cards.csv           # Rows grouped by Designation
//! cardkit card -p title=Launch      # Render an invitation card
//! ```

use cardkit::{
    group_table, handle, parse_file, run_lambda, start_server, AppConfig, InvitationCard,
    InvocationRequest,
};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tracing::Instrument;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cardkit")]
#[command(about = "Invitation cards and bulk business card uploads", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the local HTTP server
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind (overrides CARDKIT_HOST)
        #[arg(long)]
        host: Option<IpAddr>,
    },

    /// Run as an AWS Lambda function
    Lambda,

    /// Run the handler once on an API Gateway proxy event file
    Invoke {
        /// Event JSON file
        event: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse a CSV or Excel file and output its rows as JSON
    Parse {
        /// Input file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse a CSV or Excel file and group its rows by Designation
    Group {
        /// Input file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render an invitation card as HTML
    Card {
        /// Card field as key=value (e.g. -p title=Launch -p rsvpLink=https://...)
        #[arg(short = 'p', long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    init_tracing(&config.log_filter, matches!(cli.command, Commands::Lambda));

    let result = match cli.command {
        Commands::Serve { port, host } => cmd_serve(config, port, host).await,
        Commands::Lambda => run_lambda().await.map_err(Into::into),
        Commands::Invoke { event, output } => cmd_invoke(&event, output.as_deref()).await,
        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),
        Commands::Group { input, output } => cmd_group(&input, output.as_deref()),
        Commands::Card { params, output } => cmd_card(params, output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr so command output on stdout stays clean JSON/HTML.
fn init_tracing(filter: &str, lambda: bool) {
    let env_filter = EnvFilter::try_new(filter)
        .unwrap_or_else(|_| EnvFilter::new(cardkit::config::DEFAULT_LOG_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    // CloudWatch adds its own timestamps and does not render colors.
    if lambda {
        builder.with_ansi(false).without_time().init();
    } else {
        builder.init();
    }
}

async fn cmd_serve(
    mut config: AppConfig,
    port: Option<u16>,
    host: Option<IpAddr>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(host) = host {
        config.host = host;
    }

    start_server(&config).await?;
    Ok(())
}

async fn cmd_invoke(event: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let request = InvocationRequest::from_event_file(event)?;

    let span = tracing::info_span!("invocation", event = %event.display());
    let response = handle(request).instrument(span).await;
    eprintln!("Status: {}", response.status_code);

    let json = serde_json::to_string_pretty(&response)?;
    write_output(&json, output)
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let table = parse_file(input)?;

    eprintln!("Format: {}", table.format);
    if let Some(delimiter) = table.delimiter {
        eprintln!("Delimiter: '{}'", delimiter.escape_default());
    }
    eprintln!("Columns: {}", table.headers.join(", "));
    eprintln!("Parsed {} rows", table.records.len());

    let json = serde_json::to_string_pretty(&table.records)?;
    write_output(&json, output)
}

fn cmd_group(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let table = parse_file(input)?;
    let file_name = input.file_name().map(|n| n.to_string_lossy().to_string());
    let outcome = group_table(table, file_name);

    for (group, rows) in &outcome.grouped {
        eprintln!("  {}: {} rows", group, rows.len());
    }

    let json = serde_json::to_string_pretty(&outcome.grouped)?;
    write_output(&json, output)
}

fn cmd_card(params: Vec<(String, String)>, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let query: HashMap<String, String> = params.into_iter().collect();
    let card = InvitationCard::from_query(&query)?;
    write_output(&card.render(), output)
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    Ok((key.to_string(), value.to_string()))
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
