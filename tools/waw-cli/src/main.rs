//! WaW CLI - scenario file tool for the D-Day / Stalingrad / Crusader family
//!
//! # Commands
//!
//! - `waw info` - Variant, header counts, section table, turn count, warnings
//! - `waw terrain` - Print the terrain grid
//! - `waw text` - List mission text runs
//! - `waw edit-text` - Replace one text run in place
//! - `waw set-turns` - Change the scenario length
//! - `waw verify` - Check that files survive a load/save round trip
//!
//! # Usage
//!
//! ```bash
//! # Show what the codec makes of a file
//! waw info OMAHA.SCN
//!
//! # Rewrite the briefing and save to a copy
//! waw edit-text OMAHA.SCN --section text --offset 0x12 --text "Take the bluffs" -o OMAHA2.SCN
//!
//! # Round-trip every scenario in a directory
//! waw verify scenarios/*.SCN
//! ```
//!
//! # Config (--config waw.toml)
//!
//! ```toml
//! min_text_run = 6
//! chunk_size_ceiling = 20000
//!
//! [parameter_hints.GAZALA]
//! chunk = 3
//! offset = 412
//! ```
//!
//! Logging goes to stderr and follows `RUST_LOG` (default `warn`).

mod config;
mod edit_text;
mod info;
mod set_turns;
mod terrain;
mod text;
mod verify;

#[cfg(test)]
mod fixtures;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// WaW CLI - scenario file tool
#[derive(Parser)]
#[command(name = "waw")]
#[command(about = "Inspect and patch D-Day, Stalingrad and Crusader scenario files")]
#[command(version)]
struct Cli {
    /// Codec configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show variant, header counts, sections and warnings
    Info(info::InfoArgs),

    /// Print the terrain grid
    Terrain(terrain::TerrainArgs),

    /// List mission text runs
    Text(text::TextArgs),

    /// Replace one text run without changing the file length
    EditText(edit_text::EditTextArgs),

    /// Change the scenario length in turns
    SetTurns(set_turns::SetTurnsArgs),

    /// Check that files survive a load/save round trip unchanged
    Verify(verify::VerifyArgs),
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Info(args) => info::execute(args, &config),
        Commands::Terrain(args) => terrain::execute(args, &config),
        Commands::Text(args) => text::execute(args, &config),
        Commands::EditText(args) => edit_text::execute(args, &config),
        Commands::SetTurns(args) => set_turns::execute(args, &config),
        Commands::Verify(args) => verify::execute(args, &config),
    }
}
