//! Print the messages that share a cluster with a target message
//!
//! Splits the first argument on `§`, clusters the messages into two groups with
//! TF-IDF and k-means, and prints the index of every non-empty message in the
//! target's cluster, one per line.
//!
//! Usage: `msgcluster [-v] [--seed <SEED>] <MESSAGES> <TARGET>`
//!
//! Arguments starting with `-` are taken as text unless they spell one of the
//! options. Put `--` before the positionals to pass text such as `--help`.

use clap::Parser;
use msgcluster_rs::{MessageClusterer, MessageList};
use std::io::{self, Write};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "msgcluster")]
#[command(version)]
#[command(about = "List the messages that share a TF-IDF/k-means cluster with a target message")]
struct Cli {
    /// Messages separated by '§'
    #[arg(allow_hyphen_values = true)]
    messages: String,

    /// Message whose cluster mates are printed (exact match)
    #[arg(allow_hyphen_values = true)]
    target: String,

    /// Seed for k-means initialization; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(io::stderr)
        .init();

    let messages = MessageList::parse(&cli.messages);
    debug!(n_messages = messages.len(), target = %cli.target, "Parsed messages");

    let mut clusterer = MessageClusterer::new();
    if let Some(seed) = cli.seed {
        clusterer = clusterer.with_seed(seed);
    }

    let clusters = clusterer.cluster(messages)?;

    let mut out = io::stdout().lock();
    for index in clusters.cluster_mates(&cli.target) {
        writeln!(out, "{}", index)?;
    }
    out.flush()?;

    Ok(())
}
