//! In-memory scenario model
//!
//! A [`ScenarioModel`] owns the tiled sections of one loaded file plus the
//! views decoded from them (terrain grid, text run slots, parameter array).
//! Sections borrow the loaded buffer until they are written to, so an
//! untouched model serializes back to the exact input bytes.
//!
//! - `load` - the decode pipeline
//! - `edit` - mutations and serialization

mod edit;
mod load;


pub use edit::save;
pub use load::{load, load_with};

use serde::Serialize;

use crate::config::CodecConfig;
use crate::error::{CodecError, LoadWarning};
use crate::header::Header;
use crate::params::ParameterArray;
use crate::section::{Section, SectionName};
use crate::terrain::{TerrainCell, TerrainEncoding, TerrainGrid};
use crate::text::{TextRun, TextRunId, read_run};
use crate::variant::FormatVariant;

/// Lifecycle of a loaded model
///
/// A failed load never produces a model; the error is the terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScenarioState {
    /// Decoded, nothing changed
    Loaded,
    /// At least one mutation applied since load or the last serialization
    Modified,
    /// Serialized after the last mutation
    Serialized,
}

/// Decoded terrain layer and where its bytes live
#[derive(Debug, Clone)]
pub(crate) struct TerrainState {
    pub section: usize,
    pub encoding: TerrainEncoding,
    pub grid: TerrainGrid,
    pub cap: u8,
}

/// Located parameter array
#[derive(Debug, Clone, Copy)]
pub(crate) struct ParameterSlot {
    pub section: usize,
    /// Offset of word 0 inside the section data (including any chunk prefix)
    pub offset: usize,
    pub array: ParameterArray,
}

/// A loaded scenario file
#[derive(Debug, Clone)]
pub struct ScenarioModel<'a> {
    pub(crate) variant: FormatVariant,
    pub(crate) header: Header,
    pub(crate) sections: Vec<Section<'a>>,
    pub(crate) terrain: Option<TerrainState>,
    /// Text runs found at load time with their fixed capacities
    pub(crate) text_slots: Vec<(TextRunId, usize)>,
    pub(crate) parameters: Option<ParameterSlot>,
    pub(crate) warnings: Vec<LoadWarning>,
    pub(crate) state: ScenarioState,
    pub(crate) config: CodecConfig,
}

/// One row of the section table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionInfo {
    pub name: SectionName,
    pub start: usize,
    pub len: usize,
    pub modified: bool,
}

/// Terrain layer shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TerrainInfo {
    pub width: usize,
    pub height: usize,
    pub encoding: TerrainEncoding,
    /// Largest terrain value accepted by `set_cell`
    pub cap: u8,
}

/// Serializable overview of a model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSummary {
    pub variant: FormatVariant,
    pub magic: u16,
    pub file_len: usize,
    /// Count fields as numbers (floats are shown as decoded)
    pub counts: Vec<f64>,
    pub sections: Vec<SectionInfo>,
    pub terrain: Option<TerrainInfo>,
    pub parameters: Option<ParameterArray>,
    pub turn_count: Option<u16>,
    pub text_runs: usize,
    pub warnings: Vec<LoadWarning>,
    pub state: ScenarioState,
}

impl<'a> ScenarioModel<'a> {
    /// Detected format variant
    pub fn variant(&self) -> FormatVariant {
        self.variant
    }

    /// Decoded header
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// All sections in file order, tiling the whole file
    pub fn sections(&self) -> &[Section<'a>] {
        &self.sections
    }

    /// First section called `name`
    pub fn section(&self, name: SectionName) -> Option<&Section<'a>> {
        self.sections.iter().find(|section| section.name == name)
    }

    pub(crate) fn section_index(&self, name: SectionName) -> Result<usize, CodecError> {
        self.sections
            .iter()
            .position(|section| section.name == name)
            .ok_or(CodecError::MissingSection(name))
    }

    /// Non-fatal findings collected during load
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// Current lifecycle state
    pub fn state(&self) -> ScenarioState {
        self.state
    }

    /// Configuration the model was loaded with
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Total length of the serialized file
    pub fn file_len(&self) -> usize {
        self.sections.iter().map(Section::len).sum()
    }

    /// Decoded terrain grid (values above the cap shown clamped)
    pub fn terrain(&self) -> Option<&TerrainGrid> {
        self.terrain.as_ref().map(|terrain| &terrain.grid)
    }

    fn terrain_state(&self) -> Result<&TerrainState, CodecError> {
        self.terrain
            .as_ref()
            .ok_or(CodecError::NoTerrainLayer(self.variant))
    }

    /// Cell at `(x, y)`
    pub fn get_cell(&self, x: usize, y: usize) -> Result<TerrainCell, CodecError> {
        self.terrain_state()?.grid.get(x, y)
    }

    /// Scenario parameter array, if one was located
    pub fn parameters(&self) -> Option<ParameterArray> {
        self.parameters.map(|slot| slot.array)
    }

    /// Scenario length in turns, if the parameter array was located
    pub fn turn_count(&self) -> Option<u16> {
        self.parameters().map(|array| array.turn_count())
    }

    /// Section and offset (relative to its payload) of the parameter array
    pub fn parameter_location(&self) -> Option<(SectionName, usize)> {
        self.parameters.map(|slot| {
            let section = &self.sections[slot.section];
            (section.name, slot.offset - section.payload_offset())
        })
    }

    /// Ids of every text run found at load time
    pub fn text_run_ids(&self) -> impl Iterator<Item = TextRunId> + '_ {
        self.text_slots.iter().map(|(id, _)| *id)
    }

    /// Text runs of one section with their current contents
    ///
    /// Runs keep the offsets and capacities found at load time, so ids stay
    /// valid across text edits. Replacing a section rescans its runs.
    pub fn list_text_runs(&self, name: SectionName) -> Vec<TextRun> {
        let Some(section) = self.section(name) else {
            return Vec::new();
        };

        self.text_slots
            .iter()
            .filter(|(id, _)| id.section == name)
            .filter_map(|(id, len)| {
                read_run(section.payload(), id.offset, *len)
                    .ok()
                    .map(|text| TextRun {
                        offset: id.offset,
                        len: *len,
                        text,
                    })
            })
            .collect()
    }

    /// Serializable overview
    pub fn summary(&self) -> ScenarioSummary {
        let encoding = self.header.profile().encoding;
        ScenarioSummary {
            variant: self.variant,
            magic: self.header.magic,
            file_len: self.file_len(),
            counts: self
                .header
                .counts
                .iter()
                .map(|raw| crate::header::numeric_value(encoding, *raw))
                .collect(),
            sections: self
                .sections
                .iter()
                .map(|section| SectionInfo {
                    name: section.name,
                    start: section.start,
                    len: section.len(),
                    modified: section.is_modified(),
                })
                .collect(),
            terrain: self.terrain.as_ref().map(|terrain| TerrainInfo {
                width: terrain.grid.width(),
                height: terrain.grid.height(),
                encoding: terrain.encoding,
                cap: terrain.cap,
            }),
            parameters: self.parameters(),
            turn_count: self.turn_count(),
            text_runs: self.text_slots.len(),
            warnings: self.warnings.clone(),
            state: self.state,
        }
    }

    /// Detach the model from the loaded buffer
    pub fn into_owned(self) -> ScenarioModel<'static> {
        ScenarioModel {
            variant: self.variant,
            header: self.header,
            sections: self.sections.into_iter().map(Section::into_owned).collect(),
            terrain: self.terrain,
            text_slots: self.text_slots,
            parameters: self.parameters,
            warnings: self.warnings,
            state: self.state,
            config: self.config,
        }
    }
}
