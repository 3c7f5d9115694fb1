//! trustroot - assemble a TUF trust-root bundle into a TrustRoot resource.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use trustroot::{AssembleConfig, assemble};

#[derive(Parser)]
#[command(name = "trustroot")]
#[command(version, about = "Assemble a TUF trust-root bundle into a TrustRoot resource")]
struct Cli {
    /// TUF repository mirror to assemble the trust root from
    #[arg(long, default_value = "https://tuf-repo-cdn.sigstore.dev")]
    mirror: String,

    /// Trust store directory (a per-run temporary directory if unset)
    #[arg(long)]
    trust_store: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostics go to stderr; stdout carries only the manifest.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let manifest = assemble(&AssembleConfig {
        mirror: cli.mirror,
        trust_store: cli.trust_store,
    })
    .await?;
    println!("{manifest}");
    Ok(())
}
