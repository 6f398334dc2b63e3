//! Command-line host for the extended range temperature mapping.
//!
//! Feeds decoded messages (one JSON object per line) through the mapping
//! feature and writes the resulting deltas to stdout. Logs go to stderr.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use n2k_temp_core::config::env_vars;
use n2k_temp_core::{
    resolve, DeltaWriter, FeatureConfig, LogStatus, MappingTable, N2kMessage, TemperatureFeature,
};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

/// n2k-temp - Map extended range temperature messages to data tree paths.
#[derive(Parser, Debug)]
#[command(name = "n2k-temp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// Plugin configuration file (JSON). Defaults to the built-in table.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Map decoded messages to deltas.
    Run {
        /// Input file with one decoded message per line. Reads stdin if omitted.
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Delta context.
        #[arg(long, default_value = n2k_temp_core::delta::SELF_CONTEXT)]
        context: String,
    },
    /// Resolve a single source and instance to its base path.
    Resolve {
        /// Source code or symbolic source name.
        #[arg(short, long)]
        source: String,
        /// Instance number.
        #[arg(short, long, default_value_t = 0)]
        instance: u32,
    },
    /// Print the built-in mapping table as a configuration file.
    Defaults,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config_path = args
        .config
        .or_else(|| std::env::var_os(env_vars::CONFIG_PATH).map(PathBuf::from));

    match args.command {
        Command::Run { input, context } => run(config_path.as_deref(), input, context).await,
        Command::Resolve { source, instance } => {
            run_resolve(config_path.as_deref(), &source, instance)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Defaults => {
            print_defaults()?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_logging(verbose: bool) {
    let json_logging = std::env::var(env_vars::LOG_JSON)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "n2k_temp={0},n2k_temp_core={0},warn",
            default_level
        ))
    });

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}

fn load_config(path: Option<&Path>) -> Result<FeatureConfig> {
    FeatureConfig::load_or_empty(path).with_context(|| match path {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load configuration".to_string(),
    })
}

/// Stream decoded messages through the feature.
///
/// A rejected mapping configuration has already been reported through the
/// status log when `start` returns, so it only turns into a failing exit code.
async fn run(
    config_path: Option<&Path>,
    input: Option<PathBuf>,
    context: String,
) -> Result<ExitCode> {
    let config = load_config(config_path)?;

    let mut feature = TemperatureFeature::new();
    let mut status = LogStatus;
    if feature.start(&config, &mut status).is_err() {
        return Ok(ExitCode::FAILURE);
    }

    let reader: Box<dyn AsyncBufRead + Unpin> = match &input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open input {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let mut writer = DeltaWriter::new(std::io::stdout()).with_context(context);
    let mut lines = reader.lines();
    let mut line_no = 0usize;
    let mut skipped = 0usize;
    let mut published = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<N2kMessage>(line) {
            Ok(msg) => {
                if !feature.handles_pgn(msg.pgn) {
                    let src = msg
                        .src
                        .map_or_else(|| "unknown".to_string(), |s| s.to_string());
                    debug!(
                        "Line {}: PGN {} from source address {} not handled",
                        line_no, msg.pgn, src
                    );
                }
                published += feature.handle(msg.pgn, &msg.fields, &mut writer);
            }
            Err(e) => {
                warn!("Line {}: skipping malformed message: {}", line_no, e);
                skipped += 1;
            }
        }
    }

    info!(
        "Processed {} lines: {} values published, {} deltas written, {} paths announced, {} skipped",
        line_no,
        published,
        writer.written(),
        feature.seen_paths().map_or(0, |seen| seen.len()),
        skipped
    );

    feature.stop(&mut status);
    Ok(ExitCode::SUCCESS)
}

/// Resolve one source/instance pair and print the base path.
fn run_resolve(config_path: Option<&Path>, source: &str, instance: u32) -> Result<()> {
    let table = load_config(config_path)?
        .mapping_table()
        .context("Invalid temperature mapping configuration")?;

    match resolve(&table, &Value::from(source), instance) {
        Some(resolved) => println!("{}", resolved.resolved_path),
        None => println!("no match"),
    }

    Ok(())
}

/// Print the built-in table in configuration file form.
fn print_defaults() -> Result<()> {
    let config = json!({ "temperatureMapping": MappingTable::defaults() });
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
