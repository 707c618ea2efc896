//! Word document reading module.

mod docx_reader;
mod options;
mod package;
mod styles;

pub use docx_reader::{Blocks, DocxReader};
pub use options::ReadOptions;
pub use styles::StyleMap;
