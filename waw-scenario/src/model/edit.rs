//! Mutations and serialization

use super::load::section_text_slots;
use super::{ParameterSlot, ScenarioModel, ScenarioState};
use crate::error::{CodecError, LoadWarning};
use crate::header::encode_header;
use crate::params::ParameterArray;
use crate::section::SectionName;
use crate::terrain::{TerrainCell, check_cell, decode_terrain_clamped, write_cell};
use crate::text::{TextRun, TextRunId, check_replacement, replace_run};
use crate::{PARAMETER_WORDS, TURN_COUNT_WORD};

impl ScenarioModel<'_> {
    fn touch(&mut self) {
        self.state = ScenarioState::Modified;
    }

    /// Overwrite the cell at `(x, y)`
    ///
    /// The terrain value must not exceed the variant's cap and the variant
    /// value must fit the packing. Only the byte holding the cell changes.
    pub fn set_cell(&mut self, x: usize, y: usize, terrain: u8, variant: u8) -> Result<(), CodecError> {
        let model_variant = self.variant;
        let state = self
            .terrain
            .as_mut()
            .ok_or(CodecError::NoTerrainLayer(model_variant))?;

        let cell = TerrainCell::new(terrain, variant);
        state.grid.get(x, y)?;
        if terrain > state.cap {
            return Err(CodecError::TerrainValueOutOfRange {
                field: "terrain",
                value: terrain,
                max: state.cap,
            });
        }
        check_cell(state.encoding, cell)?;

        let (width, height) = (state.grid.width(), state.grid.height());
        let bytes = self.sections[state.section].bytes_mut();
        write_cell(bytes, width, height, state.encoding, x, y, cell)?;
        state.grid.set(x, y, cell)?;

        tracing::debug!(x, y, terrain, variant, "terrain cell set");
        self.touch();
        Ok(())
    }

    /// Replace the text of one run found at load time
    ///
    /// Shorter text is padded with the variant's pad byte. On error the
    /// section is untouched.
    pub fn edit_text_run(&mut self, id: TextRunId, new_text: &str) -> Result<(), CodecError> {
        let len = self
            .text_slots
            .iter()
            .find(|(slot, _)| *slot == id)
            .map(|(_, len)| *len)
            .ok_or(CodecError::UnknownTextRun {
                section: id.section,
                offset: id.offset,
            })?;
        check_replacement(len, new_text)?;

        let index = self.section_index(id.section)?;
        let pad = self.header.profile().text_pad;
        let section = &mut self.sections[index];
        let payload_offset = section.payload_offset();
        let run = TextRun {
            offset: id.offset,
            len,
            text: String::new(),
        };
        replace_run(&mut section.bytes_mut()[payload_offset..], &run, new_text, pad)?;

        tracing::debug!(section = %id.section, offset = id.offset, len = new_text.len(), "text run replaced");
        self.touch();
        Ok(())
    }

    /// Replace the payload of a section wholesale
    ///
    /// The replacement must have the same length as the current payload (for
    /// chunk sections the size prefix is kept). The header cannot be replaced.
    /// Decoded views over the section are refreshed: the terrain grid is
    /// re-decoded, the parameter array is re-read (and dropped if the new
    /// bytes no longer hold one), and the section's text runs are rescanned.
    pub fn replace_section(&mut self, name: SectionName, bytes: &[u8]) -> Result<(), CodecError> {
        let index = self.section_index(name)?;
        if name == SectionName::Header {
            return Err(CodecError::ReadOnlySection(name));
        }

        let section = &mut self.sections[index];
        let payload_offset = section.payload_offset();
        let expected = section.len() - payload_offset;
        if bytes.len() != expected {
            return Err(CodecError::SectionLengthMismatch {
                section: name,
                expected,
                actual: bytes.len(),
            });
        }
        section.bytes_mut()[payload_offset..].copy_from_slice(bytes);

        self.refresh_views(index)?;
        tracing::debug!(section = %name, len = bytes.len(), "section replaced");
        self.touch();
        Ok(())
    }

    fn refresh_views(&mut self, index: usize) -> Result<(), CodecError> {
        if let Some(terrain) = self.terrain.as_mut().filter(|t| t.section == index) {
            let (grid, clamped) = decode_terrain_clamped(
                self.sections[index].data(),
                terrain.grid.width(),
                terrain.grid.height(),
                terrain.encoding,
                terrain.cap,
            )?;
            terrain.grid = grid;
            self.warnings.extend(clamped);
        }

        if let Some(slot) = self.parameters.filter(|p| p.section == index) {
            let array = self.sections[index]
                .data()
                .get(slot.offset..)
                .and_then(ParameterArray::from_bytes)
                .filter(ParameterArray::is_plausible);
            match array {
                Some(array) => self.parameters = Some(ParameterSlot { array, ..slot }),
                None => {
                    tracing::warn!(section = %self.sections[index].name, "parameter array replaced away");
                    self.parameters = None;
                    self.warnings.push(LoadWarning::ParameterArrayNotFound);
                }
            }
        }

        self.rescan_text(index);
        Ok(())
    }

    /// Replace the text slots of one section with the runs it now holds
    fn rescan_text(&mut self, index: usize) {
        let section = &self.sections[index];
        if !section.name.holds_text() {
            return;
        }
        let name = section.name;
        let slots = section_text_slots(section, self.config.min_text_run);

        self.text_slots.retain(|(id, _)| id.section != name);
        let sections = &self.sections;
        let at = self
            .text_slots
            .iter()
            .position(|(id, _)| sections.iter().position(|s| s.name == id.section) > Some(index))
            .unwrap_or(self.text_slots.len());
        let tail = self.text_slots.split_off(at);
        self.text_slots.extend(slots);
        self.text_slots.extend(tail);
    }

    /// Overwrite one word of the parameter array
    ///
    /// The array must still pass the locator's value ranges afterwards, so
    /// the edited file loads with the same parameters.
    pub fn set_parameter_word(&mut self, index: usize, value: u16) -> Result<(), CodecError> {
        if index >= PARAMETER_WORDS {
            return Err(CodecError::ParameterIndexOutOfRange(index));
        }
        let slot = self
            .parameters
            .as_mut()
            .ok_or(CodecError::ParameterArrayUnavailable)?;

        let mut edited = slot.array;
        edited.words[index] = value;
        if !edited.is_plausible() {
            return Err(CodecError::ParameterOutOfRange { index, value });
        }

        let offset = slot.offset + index * 2;
        let bytes = self.sections[slot.section].bytes_mut();
        let word = bytes
            .get_mut(offset..offset + 2)
            .ok_or(CodecError::ParameterArrayUnavailable)?;
        word.copy_from_slice(&value.to_le_bytes());
        slot.array = edited;

        tracing::debug!(index, value, "parameter word set");
        self.touch();
        Ok(())
    }

    /// Set the scenario length in turns
    pub fn set_turn_count(&mut self, turns: u16) -> Result<(), CodecError> {
        self.set_parameter_word(TURN_COUNT_WORD, turns)
    }

    /// Encode the model to file bytes
    ///
    /// The header is re-encoded and every other section is copied as stored,
    /// so bytes no edit touched come out exactly as they were read.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.file_len());
        for section in &self.sections {
            if section.name == SectionName::Header {
                bytes.extend_from_slice(&encode_header(&self.header));
            } else {
                bytes.extend_from_slice(section.data());
            }
        }
        bytes
    }

    /// Encode the model, moving a modified model to `Serialized`
    ///
    /// An untouched model stays `Loaded`.
    pub fn serialize(&mut self) -> Vec<u8> {
        let bytes = self.to_bytes();
        if self.state == ScenarioState::Modified {
            self.state = ScenarioState::Serialized;
        }
        bytes
    }
}

/// Encode a model to file bytes
pub fn save(model: &ScenarioModel<'_>) -> Vec<u8> {
    model.to_bytes()
}
