//! Terrain command - print the decoded map

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use waw_scenario::{CodecConfig, TerrainCell, TerrainGrid, load_with};

use crate::config::{options_for, read_scenario};

/// Arguments for the terrain command
#[derive(Args)]
pub struct TerrainArgs {
    /// Scenario file
    pub file: PathBuf,

    /// Also print the variant nibble of each cell (`terrain.variant`)
    #[arg(long)]
    pub variants: bool,

    /// Print rows of `[terrain, variant]` pairs as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct TerrainDump {
    width: usize,
    height: usize,
    rows: Vec<Vec<TerrainCell>>,
}

/// Execute the terrain command
pub fn execute(args: TerrainArgs, config: &CodecConfig) -> Result<()> {
    let bytes = read_scenario(&args.file)?;
    let model = load_with(&bytes, &options_for(&args.file, config))
        .with_context(|| format!("Failed to load scenario: {}", args.file.display()))?;

    let Some(grid) = model.terrain() else {
        anyhow::bail!("{} has no decodable terrain layer", model.variant());
    };

    if args.json {
        let dump = TerrainDump {
            width: grid.width(),
            height: grid.height(),
            rows: (0..grid.height()).map(|y| grid.row(y).collect()).collect(),
        };
        println!("{}", serde_json::to_string(&dump)?);
    } else {
        print!("{}", render(grid, args.variants));
    }
    Ok(())
}

/// One line per row, top to bottom, one hex digit per cell
pub fn render(grid: &TerrainGrid, variants: bool) -> String {
    let mut out = String::with_capacity(grid.width() * grid.height() * if variants { 4 } else { 1 });
    for y in 0..grid.height() {
        for (x, cell) in grid.row(y).enumerate() {
            if variants {
                if x > 0 {
                    out.push(' ');
                }
                out.push_str(&format!("{:X}.{:X}", cell.terrain, cell.variant));
            } else {
                out.push_str(&format!("{:X}", cell.terrain));
            }
        }
        out.push('\n');
    }
    out
}
