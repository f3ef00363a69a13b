//! check-graphml — list GraphML exports under a GraphRAG root.
//!
//! Run with: cargo run -p ragview-cli -- --root ./ragtest

use clap::Parser;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ragview_cli::{render_json, Report};
use ragview_kg::find_graphml_files;

#[derive(Parser, Debug)]
#[command(name = "check-graphml", version, about = "Check for GraphML files in the output directory.")]
struct Cli {
    #[arg(long, default_value = "./ragtest", help = "Root directory for the GraphRAG data")]
    root: PathBuf,
    #[arg(long, help = "Output machine-readable JSON")]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    // stderr only, stdout carries the report
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    debug!(root = %cli.root.display(), json = cli.json, "Scanning for GraphML exports");
    let scan = find_graphml_files(&cli.root);

    if cli.json {
        println!("{}", render_json(&scan)?);
    } else {
        print!("{}", Report::new(&cli.root, &scan));
    }
    Ok(())
}
