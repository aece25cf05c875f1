/// chtsv command-line tool: decode, inspect and validate captured
/// TabSeparated response bodies.
///
/// # Command overview
///
/// ```text
/// chtsv <COMMAND> [OPTIONS]
///
/// Commands:
///   decode     Print a response body as JSON (or NDJSON rows)
///   inspect    Print columns, row count and aggregate sections
///   validate   Decode a response body fully and report the outcome
///   help       Print help information
///
/// Global options:
///   -v, --verbose    Log decoder progress to stderr
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                   |
/// |------|-------------------------------------------|
/// | 0    | Success                                   |
/// | 1    | Error (I/O failure, undecodable body, …)  |
///
/// Logs and error details are written to stderr so stdout can be piped
/// cleanly. `RUST_LOG` overrides the default `warn` filter.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd_decode;
mod cmd_inspect;
mod cmd_validate;
mod input;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// Decoder for TabSeparated query responses.
#[derive(Parser)]
#[command(name = "chtsv", version, about = "TabSeparated response decoder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log decoder progress (debug level) to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Print a response body as JSON.
    Decode(DecodeArgs),
    /// Print a summary of a response body.
    Inspect(InspectArgs),
    /// Check that a response body decodes without error.
    Validate(ValidateArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Where the body comes from and how the server described it.
///
/// The flags stand in for the response headers a transport would have
/// reported.
///
/// ```text
/// ┌──────────────┬──────────────────────────────────────────────────────┐
/// │ Flag         │ Header / default                                     │
/// ├──────────────┼──────────────────────────────────────────────────────┤
/// │ --format     │ X-ClickHouse-Format, default TabSeparated            │
/// │ --encoding   │ Content-Encoding, default identity (zstd supported)  │
/// │ --chunk-size │ read size in bytes, default 65536                    │
/// └──────────────┴──────────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct InputArgs {
    /// Path to the captured response body.
    pub file: PathBuf,

    /// Format name, e.g. `TSVWithNamesAndTypes` or `JSON`.
    #[arg(short, long, default_value = "TabSeparated")]
    pub format: String,

    /// Content encoding of the file, e.g. `zstd`.
    #[arg(short, long)]
    pub encoding: Option<String>,

    /// Bytes read from the file per decoder step.
    #[arg(long, default_value_t = 64 * 1024)]
    pub chunk_size: usize,
}

/// Arguments for `chtsv decode`.
///
/// ```text
/// ┌───────────────┬─────────────────────────────────────────────────────┐
/// │ Flag          │ Effect                                              │
/// ├───────────────┼─────────────────────────────────────────────────────┤
/// │ --stream      │ one JSON line per row, then one for totals/extremes │
/// │ --pretty      │ indent the materialized JSON document               │
/// │ -o / --output │ write to file instead of stdout                     │
/// └───────────────┴─────────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Emit NDJSON rows as they are decoded instead of one document.
    #[arg(long)]
    pub stream: bool,

    /// Pretty-print the JSON document.
    #[arg(long, conflicts_with = "stream")]
    pub pretty: bool,

    /// Write output to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for `chtsv inspect`.
#[derive(clap::Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

/// Arguments for `chtsv validate`.
///
/// Exits with code 0 when every row decodes, 1 otherwise.
#[derive(clap::Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Decode(args) => cmd_decode::run(&args).await,
        Commands::Inspect(args) => cmd_inspect::run(&args).await,
        Commands::Validate(args) => cmd_validate::run(&args).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
