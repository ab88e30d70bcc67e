//! Verify command - parallel load/save round-trip check

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use waw_scenario::{CodecConfig, FormatVariant, load_with, save};

use crate::config::{options_for, read_scenario};

/// Arguments for the verify command
#[derive(Args)]
pub struct VerifyArgs {
    /// Scenario files to check
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Print one JSON object per file
    #[arg(long)]
    pub json: bool,
}

/// Result of checking one file
#[derive(Debug, Serialize)]
pub struct Outcome {
    pub path: PathBuf,
    pub variant: Option<FormatVariant>,
    pub warnings: usize,
    /// `None` when the file round-tripped unchanged
    pub error: Option<String>,
}

impl Outcome {
    pub fn passed(&self) -> bool {
        self.error.is_none()
    }
}

/// Load and re-encode one file, comparing the bytes
pub fn check(path: PathBuf, config: &CodecConfig) -> Outcome {
    let mut outcome = Outcome {
        path,
        variant: None,
        warnings: 0,
        error: None,
    };

    let bytes = match read_scenario(&outcome.path) {
        Ok(bytes) => bytes,
        Err(e) => {
            outcome.error = Some(format!("{:#}", e));
            return outcome;
        }
    };

    let model = match load_with(&bytes, &options_for(&outcome.path, config)) {
        Ok(model) => model,
        Err(e) => {
            outcome.error = Some(e.to_string());
            return outcome;
        }
    };
    outcome.variant = Some(model.variant());
    outcome.warnings = model.warnings().len();

    let encoded = save(&model);
    if encoded != bytes {
        let first = encoded
            .iter()
            .zip(&bytes)
            .position(|(a, b)| a != b)
            .unwrap_or_else(|| encoded.len().min(bytes.len()));
        outcome.error = Some(format!(
            "round trip differs at 0x{:X} ({} -> {} bytes)",
            first,
            bytes.len(),
            encoded.len()
        ));
    }
    outcome
}

/// Execute the verify command
pub fn execute(args: VerifyArgs, config: &CodecConfig) -> Result<()> {
    use rayon::prelude::*;

    let outcomes: Vec<Outcome> = args
        .files
        .into_par_iter()
        .map(|path| check(path, config))
        .collect();

    for outcome in &outcomes {
        if args.json {
            println!("{}", serde_json::to_string(outcome)?);
            continue;
        }
        match (&outcome.error, outcome.variant) {
            (None, Some(variant)) => println!(
                "OK    {} ({}, {} warning(s))",
                outcome.path.display(),
                variant.name(),
                outcome.warnings
            ),
            (Some(error), _) => println!("FAIL  {}: {}", outcome.path.display(), error),
            (None, None) => println!("OK    {}", outcome.path.display()),
        }
    }

    let failed = outcomes.iter().filter(|o| !o.passed()).count();
    if failed > 0 {
        anyhow::bail!("{} of {} file(s) failed verification", failed, outcomes.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{chunked_scenario, pointer_scenario, write};

    #[test]
    fn test_all_variants_pass() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            write(dir.path(), "A.SCN", &pointer_scenario(FormatVariant::DDay)),
            write(dir.path(), "B.SCN", &pointer_scenario(FormatVariant::Stalingrad)),
            write(dir.path(), "C.SCN", &chunked_scenario()),
        ];

        let args = VerifyArgs { files, json: false };
        execute(args, &CodecConfig::default()).unwrap();
    }

    #[test]
    fn test_bad_file_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(dir.path(), "GOOD.SCN", &chunked_scenario());
        let bad = write(dir.path(), "BAD.SCN", b"not a scenario");

        let outcome = check(bad.clone(), &CodecConfig::default());
        assert!(!outcome.passed());
        assert!(outcome.error.unwrap().contains("unknown format"));

        let args = VerifyArgs {
            files: vec![good, bad],
            json: true,
        };
        let err = execute(args, &CodecConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "1 of 2 file(s) failed verification");
    }

    #[test]
    fn test_missing_file() {
        let outcome = check(PathBuf::from("/nonexistent/X.SCN"), &CodecConfig::default());
        assert!(outcome.error.unwrap().contains("Failed to read scenario"));
        assert_eq!(outcome.variant, None);
    }
}
