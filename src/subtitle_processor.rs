use std::fmt;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use log::{debug, warn};

use crate::errors::SubtitleError;
use crate::file_utils::FileManager;

// @module: SRT parsing and serialization

// @const: UTF-8 byte order mark
const BYTE_ORDER_MARK: char = '\u{feff}';

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Sequence number as written in the source
    pub id: usize,

    // @field: Timing line, carried through verbatim
    pub timecode: String,

    // @field: Subtitle text, lines joined by '\n'
    pub text: String,
}

impl SubtitleEntry {
    pub fn new(id: usize, timecode: impl Into<String>, text: impl Into<String>) -> Self {
        SubtitleEntry {
            id,
            timecode: timecode.into(),
            text: text.into(),
        }
    }

    /// Copy of this entry carrying different text; id and timecode are kept
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        SubtitleEntry {
            id: self.id,
            timecode: self.timecode.clone(),
            text: text.into(),
        }
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.id)?;
        writeln!(f, "{}", self.timecode)?;
        writeln!(f, "{}", self.text)
    }
}

/// Parse an SRT document into its entries.
///
/// The scan is lenient: a line where an id is expected but which is not an
/// integer is skipped, and entries without text are dropped. An empty result
/// is not an error here; callers decide how to report it.
pub fn parse_srt(content: &str) -> Vec<SubtitleEntry> {
    let content = content.strip_prefix(BYTE_ORDER_MARK).unwrap_or(content);
    let lines: Vec<&str> = content.trim().lines().collect();
    let mut entries = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        if lines[i].trim().is_empty() {
            i += 1;
            continue;
        }

        let id = match lines[i].trim().parse::<usize>() {
            Ok(id) => id,
            Err(_) => {
                debug!("Skipping line {} while looking for an entry id: {:?}", i + 1, lines[i]);
                i += 1;
                continue;
            }
        };
        i += 1;

        if i >= lines.len() {
            break;
        }
        let timecode = lines[i];
        i += 1;

        if i >= lines.len() {
            break;
        }
        let mut text_lines = Vec::new();
        while i < lines.len() && !lines[i].trim().is_empty() {
            text_lines.push(lines[i]);
            i += 1;
        }

        let text = text_lines.join("\n");
        let text = text.trim();
        if text.is_empty() {
            debug!("Dropping entry {} without text", id);
            continue;
        }

        entries.push(SubtitleEntry::new(id, timecode, text));
    }

    entries
}

/// Decode raw upload bytes and parse them.
///
/// Fails only when the bytes are not UTF-8; an empty entry list is reported
/// as `SubtitleError::Empty`.
pub fn parse_srt_bytes(bytes: &[u8]) -> Result<Vec<SubtitleEntry>, SubtitleError> {
    let content = std::str::from_utf8(bytes)
        .map_err(|e| SubtitleError::Malformed(format!("file is not valid UTF-8 ({})", e)))?;
    let entries = parse_srt(content);
    if entries.is_empty() {
        return Err(SubtitleError::Empty);
    }
    Ok(entries)
}

/// Entry text as it survives a write and re-read: blank lines dropped, ends trimmed
pub fn normalize_entry_text(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Serialize entries back into an SRT document
pub fn format_srt(entries: &[SubtitleEntry]) -> String {
    entries
        .iter()
        .map(|entry| entry.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collection of subtitle entries with metadata
#[derive(Debug)]
pub struct SubtitleCollection {
    /// Source filename
    pub source_file: PathBuf,

    /// List of subtitle entries
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleCollection {
    /// Create a new subtitle collection
    pub fn new(source_file: PathBuf, entries: Vec<SubtitleEntry>) -> Self {
        SubtitleCollection {
            source_file,
            entries,
        }
    }

    /// Read and parse an SRT file
    pub fn from_srt_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read subtitle file: {}", path.display()))?;
        let entries = parse_srt_bytes(&bytes)
            .with_context(|| format!("Failed to parse subtitle file: {}", path.display()))?;

        Ok(Self::new(path.to_path_buf(), entries))
    }

    /// Write subtitles to an SRT file
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        FileManager::write_to_file(path, &format_srt(&self.entries))
            .with_context(|| format!("Failed to write subtitle file: {}", path.display()))?;

        if self.entries.is_empty() {
            warn!("Wrote empty subtitle file: {}", path.display());
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
