use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dex_compiler::{DEX_COMPILER_VERSION, compile, fetcher_for, load_config, write_outputs};
use log::info;

#[derive(Parser)]
#[command(author, version, about = "Compile game data text files into a dex snapshot.")]
struct Cli {
    /// Fetch from the development revision instead of production.
    #[arg(long)]
    dev: bool,
    /// Compiler configuration file.
    #[arg(long, value_name = "FILE", default_value = "dexc.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    info!("dex_compiler {DEX_COMPILER_VERSION} starting");

    let config = load_config(&cli.config).context("while loading compiler config")?;
    let location = config.source.location(cli.dev);
    info!(
        "using {} source {location:?}",
        if cli.dev { "development" } else { "production" }
    );

    let snapshot = compile(fetcher_for(&location), &config.files, &config.source.settings_keys())
        .await
        .context("while compiling dex snapshot")?;
    write_outputs(&snapshot, &config.output).context("while writing compiled output")?;
    info!("done: {} species, {} trainers", snapshot.pokemon.len(), snapshot.trainers.len());
    Ok(())
}
