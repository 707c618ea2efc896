//! Workbook rendering options.

/// Number of columns in the scope-of-work sheet.
pub const COLUMN_COUNT: usize = 7;

/// Default column widths, in character units.
pub const DEFAULT_COLUMN_WIDTHS: [f64; COLUMN_COUNT] = [18.0, 40.0, 15.0, 45.0, 55.0, 25.0, 18.0];

/// Options for rendering the workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookOptions {
    /// Worksheet name
    pub sheet_name: String,

    /// Insert a bold subtotal row after each category
    pub subtotal_rows: bool,

    /// Keep the header row visible while scrolling
    pub freeze_header: bool,

    /// Column widths (Category through Lead)
    pub column_widths: [f64; COLUMN_COUNT],

    /// Workbook title; defaults to the source document title
    pub title: Option<String>,
}

impl WorkbookOptions {
    /// Create new workbook options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worksheet name.
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    /// Enable or disable per-category subtotal rows.
    pub fn with_subtotal_rows(mut self, enabled: bool) -> Self {
        self.subtotal_rows = enabled;
        self
    }

    /// Enable or disable the frozen header pane.
    pub fn with_freeze_header(mut self, enabled: bool) -> Self {
        self.freeze_header = enabled;
        self
    }

    /// Set the column widths.
    pub fn with_column_widths(mut self, widths: [f64; COLUMN_COUNT]) -> Self {
        self.column_widths = widths;
        self
    }

    /// Set the workbook title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl Default for WorkbookOptions {
    fn default() -> Self {
        Self {
            sheet_name: "Scope of Work".to_string(),
            subtotal_rows: false,
            freeze_header: true,
            column_widths: DEFAULT_COLUMN_WIDTHS,
            title: None,
        }
    }
}
