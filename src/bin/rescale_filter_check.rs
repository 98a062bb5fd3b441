//! rescale-filter-check: show what the rescaling filter would do with a
//! set of keys.
//!
//! Usage:
//!   rescale-filter-check --config rescale.json 0010 0030
//!   printf '0010\n0030\n' | rescale-filter-check --config rescale.json
//!
//! Keys are hex encoded. Output is one `<key>\t<keep|drop>` line per key.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rescaling_filter::{FilterConfig, RescalingCompactionFilterFactory, TracingSink};

#[derive(Parser, Debug)]
#[command(name = "rescale-filter-check", version, about = "Evaluate rescaling filter decisions for hex keys")]
struct Args {
    /// JSON filter config: {"rescale_round":"One","smallest_key":[..],"largest_key":[..]}
    #[arg(long)]
    config: PathBuf,

    /// Log every decision (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,

    /// Hex-encoded keys; read from stdin when omitted
    keys: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    let config = FilterConfig::load(&args.config)
        .with_context(|| format!("loading filter config from {}", args.config.display()))?;

    let factory = RescalingCompactionFilterFactory::with_sink(Arc::new(TracingSink));
    factory.configure(config).context("configuring filter")?;
    let filter = factory.new_filter_instance();

    let keys: Vec<String> = if args.keys.is_empty() {
        io::stdin()
            .lock()
            .lines()
            .collect::<io::Result<_>>()
            .context("reading keys from stdin")?
    } else {
        args.keys
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for key in keys.iter().map(|k| k.trim()).filter(|k| !k.is_empty()) {
        let bytes = hex::decode(key).with_context(|| format!("invalid hex key '{}'", key))?;
        writeln!(out, "{}\t{}", key, filter.decide(&bytes))?;
    }
    out.flush()?;
    drop(filter);

    let stats = factory.stats();
    tracing::info!(
        kept = stats.kept,
        dropped = stats.dropped,
        passthrough = stats.passthrough,
        "check finished"
    );
    factory.close();
    Ok(())
}
