//! Info command - what the codec makes of a scenario file

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use waw_scenario::{CodecConfig, ScenarioSummary, load_with};

use crate::config::{options_for, read_scenario};

/// Arguments for the info command
#[derive(Args)]
pub struct InfoArgs {
    /// Scenario file
    pub file: PathBuf,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

const COUNT_LABELS: [&str; 4] = ["terrain types", "sides", "map width", "map height"];

/// Execute the info command
pub fn execute(args: InfoArgs, config: &CodecConfig) -> Result<()> {
    let bytes = read_scenario(&args.file)?;
    let model = load_with(&bytes, &options_for(&args.file, config))
        .with_context(|| format!("Failed to load scenario: {}", args.file.display()))?;
    let summary = model.summary();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", render(&args.file.display().to_string(), &summary));
    }
    Ok(())
}

/// Human-readable report
pub fn render(name: &str, summary: &ScenarioSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", name);
    let _ = writeln!(out, "Variant: {}", summary.variant);
    let _ = writeln!(out, "Size: {} bytes", summary.file_len);

    let _ = writeln!(out);
    let _ = writeln!(out, "Counts:");
    for (i, value) in summary.counts.iter().enumerate() {
        let label = COUNT_LABELS.get(i).copied().unwrap_or("");
        let _ = writeln!(out, "  [{:2}] {:>8} {}", i, value, label);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Sections:");
    for section in &summary.sections {
        let _ = writeln!(
            out,
            "  {:<22} 0x{:06X} {:>7} bytes{}",
            section.name.to_string(),
            section.start,
            section.len,
            if section.modified { " (modified)" } else { "" }
        );
    }

    let _ = writeln!(out);
    match &summary.terrain {
        Some(terrain) => {
            let _ = writeln!(
                out,
                "Terrain: {}x{} {:?} (values 0-{})",
                terrain.width, terrain.height, terrain.encoding, terrain.cap
            );
        }
        None => {
            let _ = writeln!(out, "Terrain: not decoded");
        }
    }
    match summary.turn_count {
        Some(turns) => {
            let _ = writeln!(out, "Turns: {}", turns);
        }
        None => {
            let _ = writeln!(out, "Turns: unknown (parameter array not found)");
        }
    }
    let _ = writeln!(out, "Text runs: {}", summary.text_runs);

    if !summary.warnings.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Warnings ({}):", summary.warnings.len());
        for warning in &summary.warnings {
            let _ = writeln!(out, "  {}", warning);
        }
    }
    out
}
