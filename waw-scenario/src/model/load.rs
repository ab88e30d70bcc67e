//! Decode pipeline: bytes to model

use super::{ParameterSlot, ScenarioModel, ScenarioState, TerrainState};
use crate::chunk::ChunkWalker;
use crate::config::{CodecConfig, LoadOptions};
use crate::error::{LoadWarning, ParseError};
use crate::header::{Header, decode_header};
use crate::params::locate_parameter_array;
use crate::section::{Section, SectionName, extract_chunked_sections, extract_sections};
use crate::terrain::decode_terrain_clamped;
use crate::text::{TextRunId, extract_runs};
use crate::variant::{BodyLayout, detect_variant};

/// Load a scenario with the default configuration
pub fn load(bytes: &[u8]) -> Result<ScenarioModel<'_>, ParseError> {
    load_with(bytes, &LoadOptions::default())
}

/// Load a scenario
///
/// Runs variant detection, header validation, section extraction, terrain
/// decoding, parameter recovery and text scanning in that order. Any
/// structural failure aborts the load; recoverable findings end up in
/// [`ScenarioModel::warnings`].
pub fn load_with<'a>(bytes: &'a [u8], options: &LoadOptions) -> Result<ScenarioModel<'a>, ParseError> {
    let config = &options.config;
    let variant = detect_variant(bytes)?;
    let header = decode_header(bytes, variant)?;

    let (sections, mut warnings) = match header.profile().body {
        BodyLayout::Pointers => (extract_sections(bytes, &header)?, Vec::new()),
        BodyLayout::Chunks { start } => {
            let events: Vec<_> = ChunkWalker::new(bytes, start)
                .with_ceiling(config.chunk_size_ceiling)
                .collect();
            extract_chunked_sections(bytes, &header, start, &events)?
        }
    };

    let terrain = decode_terrain_layer(&header, &sections, &mut warnings)?;
    let parameters = locate_parameters(&header, &sections, options, &mut warnings);
    let text_slots = scan_text(&sections, config);

    tracing::debug!(
        variant = variant.name(),
        len = bytes.len(),
        sections = sections.len(),
        text_runs = text_slots.len(),
        turns = ?parameters.map(|slot| slot.array.turn_count()),
        warnings = warnings.len(),
        "scenario loaded"
    );

    Ok(ScenarioModel {
        variant,
        header,
        sections,
        terrain,
        text_slots,
        parameters,
        warnings,
        state: ScenarioState::Loaded,
        config: config.clone(),
    })
}

fn decode_terrain_layer(
    header: &Header,
    sections: &[Section<'_>],
    warnings: &mut Vec<LoadWarning>,
) -> Result<Option<TerrainState>, ParseError> {
    let profile = header.profile();
    let Some(encoding) = profile.terrain else {
        return Ok(None);
    };
    let Some(index) = sections.iter().position(|s| s.name == SectionName::Terrain) else {
        return Ok(None);
    };

    let cap = profile.terrain_value_cap();
    let (grid, clamped) = decode_terrain_clamped(
        sections[index].data(),
        header.map_width(),
        header.map_height(),
        encoding,
        cap,
    )
    .map_err(|source| ParseError::Terrain {
        variant: header.variant,
        source,
    })?;
    warnings.extend(clamped);

    Ok(Some(TerrainState {
        section: index,
        encoding,
        grid,
        cap,
    }))
}

/// Blocks searched for the parameter array: NumericData as block 0 for
/// pointer variants, chunk payloads after the tag chunk by walk index for
/// chunked variants
fn parameter_blocks<'s>(header: &Header, sections: &'s [Section<'_>]) -> Vec<(usize, usize, &'s [u8])> {
    sections
        .iter()
        .enumerate()
        .filter_map(|(index, section)| {
            let block = match header.profile().body {
                BodyLayout::Pointers => (section.name == SectionName::NumericData).then_some(0),
                BodyLayout::Chunks { .. } => match section.name {
                    SectionName::Chunk(index) => Some(index),
                    _ => None,
                },
            }?;
            Some((index, block, section.payload()))
        })
        .collect()
}

fn locate_parameters(
    header: &Header,
    sections: &[Section<'_>],
    options: &LoadOptions,
    warnings: &mut Vec<LoadWarning>,
) -> Option<ParameterSlot> {
    let candidates = parameter_blocks(header, sections);
    let blocks: Vec<_> = candidates.iter().map(|(_, block, data)| (*block, *data)).collect();

    let (found, located) = locate_parameter_array(
        &blocks,
        options.scenario_name.as_deref(),
        &options.config.parameter_hints,
    );
    warnings.extend(located);

    let found = found?;
    let (section, _, _) = candidates
        .iter()
        .find(|(_, block, _)| *block == found.chunk_index)?;
    Some(ParameterSlot {
        section: *section,
        offset: sections[*section].payload_offset() + found.offset,
        array: found.array,
    })
}

fn scan_text(sections: &[Section<'_>], config: &CodecConfig) -> Vec<(TextRunId, usize)> {
    sections
        .iter()
        .filter(|section| section.name.holds_text())
        .flat_map(|section| section_text_slots(section, config.min_text_run))
        .collect()
}

/// Text runs of one section as `(id, capacity)` slots
pub(super) fn section_text_slots(section: &Section<'_>, min_len: usize) -> Vec<(TextRunId, usize)> {
    extract_runs(section.payload(), min_len)
        .into_iter()
        .map(|run| {
            (
                TextRunId {
                    section: section.name,
                    offset: run.offset,
                },
                run.len,
            )
        })
        .collect()
}
