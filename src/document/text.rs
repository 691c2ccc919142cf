//! Line/column addressable text buffers.
//!
//! Provides byte offset <-> LSP position conversion with proper UTF-16 handling.
//! Unlike a strict index, every conversion clamps out-of-range input so that
//! projected coordinates from a stale mapping still land inside the document.

use std::sync::Arc;

use tower_lsp::lsp_types::{Position, Range, Url};

/// Immutable shared document content. Two snapshots are the same snapshot
/// only when they point at the same allocation.
pub type Snapshot = Arc<str>;

/// A text document as seen by plugins: identity, language and content.
///
/// LSP positions use line/column where column is in UTF-16 code units.
/// Line start offsets are pre-computed for O(log n) lookup.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    uri: Url,
    language_id: String,
    version: i32,
    snapshot: Snapshot,
    /// Byte offset where each line starts.
    line_starts: Vec<usize>,
}

impl TextBuffer {
    pub fn new(uri: Url, language_id: impl Into<String>, version: i32, snapshot: Snapshot) -> Self {
        let mut line_starts = vec![0];
        for (i, c) in snapshot.char_indices() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }

        Self {
            uri,
            language_id: language_id.into(),
            version,
            snapshot,
            line_starts,
        }
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn language_id(&self) -> &str {
        &self.language_id
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn text(&self) -> &str {
        &self.snapshot
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Convert a byte offset to an LSP position.
    ///
    /// Offsets past the end map to the end of the text.
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.snapshot.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };

        let line_start = self.line_starts[line];
        let mut col = 0u32;
        for (i, c) in self.snapshot[line_start..].char_indices() {
            if line_start + i >= offset || c == '\n' {
                break;
            }
            col += c.len_utf16() as u32;
        }

        Position::new(line as u32, col)
    }

    /// Convert an LSP position to a byte offset.
    ///
    /// A line past the last line maps to the end of the text and a column
    /// past the end of its line maps to the end of that line.
    pub fn offset_at(&self, position: Position) -> usize {
        let line = position.line as usize;
        let Some(&line_start) = self.line_starts.get(line) else {
            return self.snapshot.len();
        };
        let line_end = self
            .line_starts
            .get(line + 1)
            .map(|&next| next - 1)
            .unwrap_or(self.snapshot.len());

        let mut utf16_col = 0u32;
        for (i, c) in self.snapshot[line_start..line_end].char_indices() {
            if utf16_col >= position.character {
                return line_start + i;
            }
            utf16_col += c.len_utf16() as u32;
        }

        line_end
    }

    pub fn range_at(&self, start: usize, end: usize) -> Range {
        Range::new(self.position_at(start), self.position_at(end))
    }

    pub fn offsets_of(&self, range: Range) -> (usize, usize) {
        (self.offset_at(range.start), self.offset_at(range.end))
    }
}
