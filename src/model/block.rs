//! Block-level types produced by the document reader.

use serde::{Deserialize, Serialize};

/// Structural role of a block in the source document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleHint {
    /// Heading paragraph; acts as a category anchor
    Heading,
    /// Ordinary paragraph
    #[default]
    Body,
    /// One row of a table, cells joined into a single text
    TableCell,
}

/// One paragraph, heading or table row from the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Normalized text (never empty when produced by the reader)
    pub text: String,

    /// Structural role
    pub style_hint: StyleHint,

    /// Monotonic position among the blocks of one document (0-based)
    pub order: usize,

    /// Heading level (1-9) for heading blocks
    pub heading_level: Option<u8>,
}

impl Block {
    /// Create a body block.
    pub fn body(text: impl Into<String>, order: usize) -> Self {
        Self {
            text: text.into(),
            style_hint: StyleHint::Body,
            order,
            heading_level: None,
        }
    }

    /// Create a heading block.
    pub fn heading(text: impl Into<String>, level: u8, order: usize) -> Self {
        Self {
            text: text.into(),
            style_hint: StyleHint::Heading,
            order,
            heading_level: Some(level.clamp(1, 9)),
        }
    }

    /// Create a table-row block.
    pub fn table_row(text: impl Into<String>, order: usize) -> Self {
        Self {
            text: text.into(),
            style_hint: StyleHint::TableCell,
            order,
            heading_level: None,
        }
    }

    /// Check if this block is a heading.
    pub fn is_heading(&self) -> bool {
        self.style_hint == StyleHint::Heading
    }

    /// Check if the block has no visible text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_block() {
        let block = Block::heading("Kitchen", 2, 0);
        assert!(block.is_heading());
        assert_eq!(block.heading_level, Some(2));
    }

    #[test]
    fn test_heading_level_clamped() {
        assert_eq!(Block::heading("x", 0, 0).heading_level, Some(1));
        assert_eq!(Block::heading("x", 42, 0).heading_level, Some(9));
    }

    #[test]
    fn test_body_and_table_row() {
        assert_eq!(Block::body("a", 1).style_hint, StyleHint::Body);
        assert_eq!(Block::table_row("a; b", 2).style_hint, StyleHint::TableCell);
        assert!(Block::body("  ", 3).is_empty());
    }
}
