//! Set-turns command - change the scenario length

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use waw_scenario::{CodecConfig, load_with};

use crate::config::{options_for, read_scenario, write_scenario};

/// Arguments for the set-turns command
#[derive(Args)]
pub struct SetTurnsArgs {
    /// Scenario file
    pub file: PathBuf,

    /// New turn count (1-255)
    #[arg(value_parser = clap::value_parser!(u16).range(1..=255))]
    pub turns: u16,

    /// Output file (defaults to overwriting the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute the set-turns command
pub fn execute(args: SetTurnsArgs, config: &CodecConfig) -> Result<()> {
    let bytes = read_scenario(&args.file)?;
    let mut model = load_with(&bytes, &options_for(&args.file, config))
        .with_context(|| format!("Failed to load scenario: {}", args.file.display()))?;

    let previous = model.turn_count();
    model.set_turn_count(args.turns).with_context(|| {
        format!(
            "Cannot set turns for {}; add a parameter hint for it to the config",
            args.file.display()
        )
    })?;

    let target = write_scenario(&args.file, args.output.as_ref(), &model.serialize())?;
    match previous {
        Some(previous) => println!("Turns: {} -> {} ({})", previous, args.turns, target.display()),
        None => println!("Turns: {} ({})", args.turns, target.display()),
    }
    Ok(())
}
