//! Text command - list mission text runs

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use waw_scenario::{CodecConfig, ScenarioModel, SectionName, TextRun, load_with};

use crate::config::{options_for, read_scenario};

/// Arguments for the text command
#[derive(Args)]
pub struct TextArgs {
    /// Scenario file
    pub file: PathBuf,

    /// Only list runs of this section (e.g. `text`, `numeric`, `chunk3`)
    #[arg(long)]
    pub section: Option<SectionName>,

    /// Print the runs as JSON
    #[arg(long)]
    pub json: bool,
}

/// A run tagged with its section
#[derive(Debug, Serialize)]
pub struct ListedRun {
    pub section: SectionName,
    #[serde(flatten)]
    pub run: TextRun,
}

/// Execute the text command
pub fn execute(args: TextArgs, config: &CodecConfig) -> Result<()> {
    let bytes = read_scenario(&args.file)?;
    let model = load_with(&bytes, &options_for(&args.file, config))
        .with_context(|| format!("Failed to load scenario: {}", args.file.display()))?;

    let runs = collect_runs(&model, args.section);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&runs)?);
        return Ok(());
    }

    if runs.is_empty() {
        println!("No text runs found.");
    }
    for listed in &runs {
        println!(
            "{}:0x{:04X} [{:3}] \"{}\"",
            listed.section,
            listed.run.offset,
            listed.run.len,
            listed.run.text.escape_debug()
        );
    }
    Ok(())
}

/// Runs of `section`, or of every section in file order
pub fn collect_runs(model: &ScenarioModel<'_>, section: Option<SectionName>) -> Vec<ListedRun> {
    let mut sections: Vec<SectionName> = Vec::new();
    for id in model.text_run_ids() {
        if section.is_none_or(|wanted| wanted == id.section) && !sections.contains(&id.section) {
            sections.push(id.section);
        }
    }

    sections
        .into_iter()
        .flat_map(|name| {
            model
                .list_text_runs(name)
                .into_iter()
                .map(move |run| ListedRun { section: name, run })
        })
        .collect()
}
