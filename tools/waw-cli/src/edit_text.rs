//! Edit-text command - replace one text run in place

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use waw_scenario::{CodecConfig, SectionName, TextRunId, load_with};

use crate::config::{options_for, read_scenario, write_scenario};

/// Arguments for the edit-text command
#[derive(Args)]
pub struct EditTextArgs {
    /// Scenario file
    pub file: PathBuf,

    /// Section holding the run (e.g. `text`, `chunk3`)
    #[arg(long)]
    pub section: SectionName,

    /// Run offset inside the section, as listed by `waw text` (decimal or 0x-hex)
    #[arg(long, value_parser = parse_offset)]
    pub offset: usize,

    /// Replacement text (no longer than the run)
    #[arg(long)]
    pub text: String,

    /// Output file (defaults to overwriting the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Parse a decimal or `0x`-prefixed hex offset
pub fn parse_offset(s: &str) -> Result<usize, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid offset '{}': {}", s, e))
}

/// Execute the edit-text command
pub fn execute(args: EditTextArgs, config: &CodecConfig) -> Result<()> {
    let bytes = read_scenario(&args.file)?;
    let mut model = load_with(&bytes, &options_for(&args.file, config))
        .with_context(|| format!("Failed to load scenario: {}", args.file.display()))?;

    let id = TextRunId {
        section: args.section,
        offset: args.offset,
    };
    model
        .edit_text_run(id, &args.text)
        .with_context(|| format!("Failed to edit text run {}:0x{:04X}", id.section, id.offset))?;

    let target = write_scenario(&args.file, args.output.as_ref(), &model.serialize())?;
    println!("Wrote {}", target.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{BRIEFING, BRIEFING_OFFSET, pointer_scenario, write};
    use waw_scenario::{FormatVariant, load};

    fn args(file: PathBuf, text: &str, output: Option<PathBuf>) -> EditTextArgs {
        EditTextArgs {
            file,
            section: SectionName::UnitPositionsAndText,
            offset: BRIEFING_OFFSET,
            text: text.to_string(),
            output,
        }
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("18"), Ok(18));
        assert_eq!(parse_offset("0x12"), Ok(18));
        assert_eq!(parse_offset("0X1f"), Ok(31));
        assert!(parse_offset("twelve").is_err());
    }

    #[test]
    fn test_edit_to_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let original = pointer_scenario(FormatVariant::Stalingrad);
        let input = write(dir.path(), "STALIN.SCN", &original);
        let output = dir.path().join("STALIN2.SCN");

        execute(args(input.clone(), "Hold the Volga", Some(output.clone())), &CodecConfig::default()).unwrap();

        assert_eq!(std::fs::read(&input).unwrap(), original);
        let edited = std::fs::read(&output).unwrap();
        assert_eq!(edited.len(), original.len());
        let model = load(&edited).unwrap();
        let runs = model.list_text_runs(SectionName::UnitPositionsAndText);
        // Stalingrad pads with spaces, so the run keeps its full length
        assert_eq!(runs[0].text.len(), BRIEFING.len());
        assert_eq!(runs[0].text.trim_end(), "Hold the Volga");
    }

    #[test]
    fn test_too_long_text_leaves_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let original = pointer_scenario(FormatVariant::DDay);
        let input = write(dir.path(), "OMAHA.SCN", &original);
        let long = format!("{} and then some", BRIEFING);

        let err = execute(args(input.clone(), &long, None), &CodecConfig::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("text run too long"));
        assert_eq!(std::fs::read(&input).unwrap(), original);
    }
}
