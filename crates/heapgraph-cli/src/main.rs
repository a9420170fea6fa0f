// crates/heapgraph-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use anyhow::Result;
use clap::Parser;
use heapgraph_core::pipeline::convert;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "heapgraph",
    about = "Convert Ruby ObjectSpace heap dumps into GEXF graph files",
    long_about = "Convert Ruby ObjectSpace heap dumps into GEXF graph files.\n\nReads an ObjectSpace.dump_all JSONL trace, assembles the object reference graph, and writes a GEXF 1.2draft document for tools like Gephi.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    /// Source ObjectSpace dump (JSON Lines)
    #[arg(long)]
    src: PathBuf,

    /// Destination GEXF file
    #[arg(long)]
    dst: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    info!(src=%cli.src.display(), dst=%cli.dst.display(), "converting heap dump");

    let stats = convert(&cli.src, &cli.dst)?;

    println!(
        "Converted {} → {} ({} records, {} nodes, {} edges, {} decode errors)",
        cli.src.display(),
        cli.dst.display(),
        stats.records,
        stats.nodes,
        stats.edges,
        stats.decode_errors
    );
    Ok(())
}

/// Initialize tracing with an env-driven filter (default INFO).
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(false).with_level(true).compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
