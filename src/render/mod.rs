//! Rendering of extraction results to workbook and JSON output.

mod json;
mod options;
mod xlsx;

pub use json::{to_json, JsonFormat};
pub use options::{WorkbookOptions, COLUMN_COUNT, DEFAULT_COLUMN_WIDTHS};
pub use xlsx::{to_xlsx, WorkbookBuilder, HEADERS, MAX_CELL_CHARS, MAX_ROWS, TOTAL_LABEL};
