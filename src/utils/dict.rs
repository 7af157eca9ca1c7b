//! The fixed character dictionary used to decode character logits.
//!
//! PGNet's character head emits one channel per dictionary glyph plus a
//! trailing CTC blank channel. The dictionary is the IC15 lexicon (digits
//! then lowercase letters), loaded once at startup and shared read-only for
//! the process lifetime. If the dictionary file is absent at the configured
//! path the embedded lexicon is written there first, then read back.

use crate::core::{OcrError, OcrResult};
use std::fmt::Write as _;
use std::path::Path;
use tracing::debug;

/// The embedded IC15 lexicon, one glyph per index.
pub const DEFAULT_CHARACTERS: &str = "0123456789abcdefghijklmnopqrstuvwxyz";

/// Ordered index-to-glyph mapping for the character head.
#[derive(Debug, Clone)]
pub struct CharacterDict {
    characters: Vec<char>,
}

impl CharacterDict {
    /// Builds a dictionary directly from a glyph string.
    pub fn from_characters(characters: &str) -> Self {
        Self {
            characters: characters.chars().collect(),
        }
    }

    /// Loads the dictionary from `path`, writing the embedded lexicon there
    /// first if the file does not exist.
    ///
    /// The file format is one glyph per line; only the first character of
    /// each line is used.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be written or read, or a
    /// configuration error if it contains no glyphs.
    pub fn load(path: impl AsRef<Path>) -> OcrResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            let mut content = String::with_capacity(DEFAULT_CHARACTERS.len() * 2);
            for ch in DEFAULT_CHARACTERS.chars() {
                let _ = writeln!(content, "{ch}");
            }
            std::fs::write(path, content)?;
            debug!(path = %path.display(), "wrote embedded character dictionary");
        }

        let content = std::fs::read_to_string(path)?;
        let characters: Vec<char> = content.lines().filter_map(|l| l.chars().next()).collect();
        if characters.is_empty() {
            return Err(OcrError::config_error(format!(
                "character dictionary at '{}' contains no glyphs",
                path.display()
            )));
        }
        Ok(Self { characters })
    }

    /// Number of glyphs in the dictionary.
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    /// Whether the dictionary is empty.
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Index of the CTC blank class (one past the last glyph).
    pub fn blank_index(&self) -> usize {
        self.characters.len()
    }

    /// Glyph for a class index, if it is not the blank.
    pub fn glyph(&self, index: usize) -> Option<char> {
        self.characters.get(index).copied()
    }
}
