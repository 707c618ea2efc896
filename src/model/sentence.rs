//! Sentence spans within a block.

use super::Block;
use std::ops::Range;

/// A contiguous span of text within a [`Block`].
///
/// Sentences borrow both their text and their source block; they live only
/// as long as the block they were cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentence<'a> {
    /// Sentence text, a slice of the block text
    pub text: &'a str,

    /// The block this sentence was cut from
    pub block: &'a Block,

    /// Byte offsets of `text` within `block.text`
    pub start: usize,

    /// Index of this sentence within its block
    pub order: usize,

    /// Whether this sentence is a category anchor (heading text)
    pub is_anchor: bool,
}

impl<'a> Sentence<'a> {
    /// Create a sentence from a byte range of the block text.
    ///
    /// # Panics
    /// Panics if `span` is out of bounds or not on char boundaries.
    pub fn new(block: &'a Block, span: Range<usize>, order: usize) -> Self {
        Self {
            text: &block.text[span.clone()],
            block,
            start: span.start,
            order,
            is_anchor: false,
        }
    }

    /// Create the anchor sentence of a heading block: its full text.
    pub fn anchor(block: &'a Block) -> Self {
        Self {
            text: &block.text,
            block,
            start: 0,
            order: 0,
            is_anchor: true,
        }
    }

    /// Byte range of this sentence within the block text.
    pub fn span(&self) -> Range<usize> {
        self.start..self.start + self.text.len()
    }

    /// Word count (whitespace-separated tokens).
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}
