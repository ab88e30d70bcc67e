//! Mission text runs
//!
//! Sections carry human-readable briefing text as plain ASCII embedded among
//! binary data. A run is a maximal stretch of printable bytes (0x20-0x7E) or
//! line endings. Runs have a fixed length: the surrounding section cannot grow,
//! so a replacement may be shorter (padded) but never longer.

use serde::Serialize;

use crate::error::CodecError;
use crate::section::SectionName;

/// A printable run inside a section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextRun {
    /// Offset of the first byte, relative to the section payload
    pub offset: usize,
    /// Run length in bytes (the capacity available to an edit)
    pub len: usize,
    /// Current text
    pub text: String,
}

/// Stable address of a text run inside a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TextRunId {
    pub section: SectionName,
    pub offset: usize,
}

fn is_text_byte(byte: u8) -> bool {
    matches!(byte, 0x20..=0x7E | b'\r' | b'\n')
}

/// Maximal text runs of at least `min_len` bytes, in offset order
pub fn extract_runs(section: &[u8], min_len: usize) -> Vec<TextRun> {
    let min_len = min_len.max(1);
    let mut runs = Vec::new();
    let mut start = None;

    for (i, &byte) in section.iter().enumerate() {
        match (is_text_byte(byte), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                if i - s >= min_len {
                    runs.push(run_at(section, s, i - s));
                }
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        if section.len() - s >= min_len {
            runs.push(run_at(section, s, section.len() - s));
        }
    }

    runs
}

fn run_at(section: &[u8], offset: usize, len: usize) -> TextRun {
    TextRun {
        offset,
        len,
        text: String::from_utf8_lossy(&section[offset..offset + len]).into_owned(),
    }
}

/// Text currently stored in a `len`-byte run at `offset`
///
/// Reading stops at the first non-text byte, so padding left by a shorter
/// edit is not part of the result.
pub fn read_run(section: &[u8], offset: usize, len: usize) -> Result<String, CodecError> {
    let bytes = offset
        .checked_add(len)
        .and_then(|end| section.get(offset..end))
        .ok_or(CodecError::RunOutOfBounds {
            offset,
            len,
            section_len: section.len(),
        })?;

    let text_len = bytes.iter().take_while(|b| is_text_byte(**b)).count();
    Ok(String::from_utf8_lossy(&bytes[..text_len]).into_owned())
}

/// Check that `new_text` may replace a `capacity`-byte run
pub fn check_replacement(capacity: usize, new_text: &str) -> Result<(), CodecError> {
    if let Some((position, byte)) = new_text.bytes().enumerate().find(|(_, b)| !is_text_byte(*b)) {
        return Err(CodecError::NonPrintableText { byte, position });
    }
    if new_text.len() > capacity {
        return Err(CodecError::TextRunTooLong {
            capacity,
            requested: new_text.len(),
        });
    }
    Ok(())
}

/// Overwrite `run` in place, padding the tail with `pad`
///
/// On error the section is left untouched.
pub fn replace_run(section: &mut [u8], run: &TextRun, new_text: &str, pad: u8) -> Result<(), CodecError> {
    check_replacement(run.len, new_text)?;

    let section_len = section.len();
    let target = run
        .offset
        .checked_add(run.len)
        .and_then(|end| section.get_mut(run.offset..end))
        .ok_or(CodecError::RunOutOfBounds {
            offset: run.offset,
            len: run.len,
            section_len,
        })?;

    let (text, rest) = target.split_at_mut(new_text.len());
    text.copy_from_slice(new_text.as_bytes());
    rest.fill(pad);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_maximal_runs() {
        let section = b"\x00\x01Hello world\x00ab\x00\x90Line one\r\nLine two\xFF";
        let runs = extract_runs(section, 4);

        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].offset, 2);
        assert_eq!(runs[0].text, "Hello world");
        assert_eq!(runs[1].text, "Line one\r\nLine two");
        assert_eq!(runs[1].len, 18);
    }

    #[test]
    fn test_run_at_section_end() {
        let runs = extract_runs(b"\x00\x00ENDS", 4);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].offset, 2);
    }

    #[test]
    fn test_min_len_filters_short_runs() {
        assert!(extract_runs(b"\x00abc\x00", 4).is_empty());
        assert_eq!(extract_runs(b"\x00abc\x00", 3).len(), 1);
        assert_eq!(extract_runs(b"\x00a\x00", 0).len(), 1);
    }

    #[test]
    fn test_shorter_replacement_is_padded() {
        let mut section = b"\x00Hold the bridge\x00".to_vec();
        let run = extract_runs(&section, 4).remove(0);

        replace_run(&mut section, &run, "Retreat", 0x00).unwrap();
        assert_eq!(&section, b"\x00Retreat\x00\x00\x00\x00\x00\x00\x00\x00\x00");
        assert_eq!(read_run(&section, run.offset, run.len).unwrap(), "Retreat");
    }

    #[test]
    fn test_space_padding() {
        let mut section = b"\x00Hold\x00".to_vec();
        let run = extract_runs(&section, 4).remove(0);
        replace_run(&mut section, &run, "Go", b' ').unwrap();
        assert_eq!(&section, b"\x00Go  \x00");
    }

    #[test]
    fn test_too_long_leaves_section_unchanged() {
        let mut section = vec![0u8; 2];
        section.extend_from_slice(b"Twenty byte run text");
        section.push(0);
        let original = section.clone();
        let run = extract_runs(&section, 4).remove(0);
        assert_eq!(run.len, 20);

        let err = replace_run(&mut section, &run, "Twenty-five byte run text", 0x00).unwrap_err();
        assert_eq!(
            err,
            CodecError::TextRunTooLong {
                capacity: 20,
                requested: 25
            }
        );
        assert_eq!(section, original);
    }

    #[test]
    fn test_non_printable_replacement_rejected() {
        let mut section = b"\x00Hold\x00".to_vec();
        let original = section.clone();
        let run = extract_runs(&section, 4).remove(0);

        let err = replace_run(&mut section, &run, "a\tb", 0x00).unwrap_err();
        assert_eq!(err, CodecError::NonPrintableText { byte: b'\t', position: 1 });
        assert_eq!(section, original);
    }

    #[test]
    fn test_run_out_of_bounds() {
        let mut section = vec![0u8; 4];
        let run = TextRun {
            offset: 2,
            len: 8,
            text: String::new(),
        };
        assert!(matches!(
            replace_run(&mut section, &run, "ab", 0),
            Err(CodecError::RunOutOfBounds { section_len: 4, .. })
        ));
        assert!(read_run(&section, usize::MAX, 2).is_err());
    }
}
