//! Reading options and configuration.

/// Options for reading Word documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    /// Emit one block per top-level table row
    pub include_tables: bool,

    /// Treat short, fully bold paragraphs as headings
    pub bold_headings: bool,

    /// Maximum words for a bold paragraph to count as a heading
    pub max_bold_heading_words: usize,

    /// Separator placed between the cells of a table row
    pub cell_separator: String,
}

impl ReadOptions {
    /// Create new read options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable table rows.
    pub fn with_tables(mut self, include: bool) -> Self {
        self.include_tables = include;
        self
    }

    /// Skip tables entirely.
    pub fn without_tables(mut self) -> Self {
        self.include_tables = false;
        self
    }

    /// Enable or disable bold-heading detection.
    pub fn with_bold_headings(mut self, enabled: bool) -> Self {
        self.bold_headings = enabled;
        self
    }

    /// Set the word limit for bold headings.
    pub fn with_max_bold_heading_words(mut self, words: usize) -> Self {
        self.max_bold_heading_words = words.max(1);
        self
    }

    /// Set the table cell separator.
    pub fn with_cell_separator(mut self, separator: impl Into<String>) -> Self {
        self.cell_separator = separator.into();
        self
    }
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            include_tables: true,
            bold_headings: false,
            max_bold_heading_words: 8,
            cell_separator: "; ".to_string(),
        }
    }
}
