//! Config file loading and scenario file I/O shared by all commands

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use waw_scenario::{CodecConfig, LoadOptions};

/// Load the codec config, or the defaults when no file was given
pub fn load_config(path: Option<&Path>) -> Result<CodecConfig> {
    let Some(path) = path else {
        return Ok(CodecConfig::default());
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config = parse_config(&content)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;

    tracing::debug!(
        path = %path.display(),
        hints = config.parameter_hints.len(),
        "loaded codec config"
    );
    Ok(config)
}

/// Parse a TOML codec config
pub fn parse_config(content: &str) -> Result<CodecConfig> {
    Ok(toml::from_str(content)?)
}

/// Load options for `path`: the file stem is the scenario name for hint lookups
pub fn options_for(path: &Path, config: &CodecConfig) -> LoadOptions {
    let options = LoadOptions::new(config.clone());
    match path.file_stem().and_then(|stem| stem.to_str()) {
        Some(stem) => options.with_scenario_name(stem),
        None => options,
    }
}

/// Read a scenario file into memory
pub fn read_scenario(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read scenario: {}", path.display()))
}

/// Write encoded bytes to `output`, or back over `input` when no output was given
pub fn write_scenario(input: &Path, output: Option<&PathBuf>, bytes: &[u8]) -> Result<PathBuf> {
    let target = output.cloned().unwrap_or_else(|| input.to_path_buf());
    std::fs::write(&target, bytes)
        .with_context(|| format!("Failed to write scenario: {}", target.display()))?;
    tracing::info!(path = %target.display(), len = bytes.len(), "scenario written");
    Ok(target)
}
