//! # scopesheet
//!
//! Turn free-form Word scope-of-work documents into task spreadsheets.
//!
//! A document is read into blocks, split into sentences, and each sentence is
//! classified as a task (or not). Tasks are grouped by category under the
//! nearest heading, deduplicated, totalled, and written as an `.xlsx`
//! workbook.
//!
//! ## Quick Start
//!
//! ```no_run
//! use scopesheet::process_file;
//!
//! fn main() -> scopesheet::Result<()> {
//!     let output = process_file("kitchen-remodel.docx")?;
//!     output.save(&output.file_name)?;
//!     println!("{} tasks, total {}", output.result.record_count(), output.result.grand_total);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Deterministic**: the same input and options give byte-identical workbooks
//! - **Configurable vocabulary**: task verbs, currency forms and roles load from TOML
//! - **Pluggable classification**: swap in any [`Classifier`] implementation
//! - **Batch processing**: uses Rayon to process many documents at once
//! - **Async wrapper**: enable the `async` feature for a Tokio entry point

pub mod aggregate;
pub mod classify;
pub mod detect;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod reader;
pub mod render;
pub mod segment;

// Re-export commonly used types
pub use aggregate::{aggregate, Aggregator};
pub use classify::{Classifier, RuleClassifier, Vocabulary};
pub use detect::{
    detect_format_from_bytes, detect_format_from_path, is_docx, is_docx_bytes, DocxFormat, DocxKind,
};
pub use error::{Error, ErrorKind, Result};
pub use model::{
    Amount, Block, CategoryGroup, ExtractionResult, ExtractionStats, Metadata, Sentence,
    StyleHint, TaskRecord, UNCATEGORIZED,
};
pub use pipeline::{suggested_file_name, BatchItem, Pipeline, PipelineOptions, ProcessOutput};
pub use reader::{DocxReader, ReadOptions};
pub use render::{JsonFormat, WorkbookOptions};
pub use segment::{Segmenter, SegmenterOptions};

use std::path::Path;

/// Extract grouped tasks from a Word file without rendering a workbook.
///
/// # Example
///
/// ```no_run
/// use scopesheet::extract_file;
///
/// let result = extract_file("scope.docx").unwrap();
/// for group in &result.groups {
///     println!("{}: {}", group.category, group.subtotal);
/// }
/// ```
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<ExtractionResult> {
    let data = std::fs::read(path)?;
    extract_bytes(&data)
}

/// Extract grouped tasks from Word document bytes.
pub fn extract_bytes(data: &[u8]) -> Result<ExtractionResult> {
    Pipeline::new(PipelineOptions::default())?.extract(data)
}

/// Turn a Word file into workbook bytes with default options.
///
/// # Example
///
/// ```no_run
/// use scopesheet::process_file;
///
/// let output = process_file("scope.docx").unwrap();
/// std::fs::write(&output.file_name, &output.bytes).unwrap();
/// ```
pub fn process_file<P: AsRef<Path>>(path: P) -> Result<ProcessOutput> {
    Pipeline::new(PipelineOptions::default())?.process_file(path)
}

/// Turn Word document bytes into workbook bytes with default options.
///
/// `source_name` is the uploaded file name, if known.
pub fn process_bytes(data: &[u8], source_name: Option<&str>) -> Result<ProcessOutput> {
    Pipeline::new(PipelineOptions::default())?.process(data, source_name)
}

/// Extract a Word file and serialize the grouped result as JSON.
///
/// # Example
///
/// ```no_run
/// use scopesheet::{to_json, JsonFormat};
///
/// let json = to_json("scope.docx", JsonFormat::Pretty).unwrap();
/// println!("{}", json);
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let result = extract_file(path)?;
    render::to_json(&result, format)
}

/// Turn a Word file into workbook bytes on a Tokio runtime.
///
/// The file is read asynchronously; parsing and rendering run on the
/// blocking pool.
///
/// # Example
///
/// ```no_run
/// # async fn run() -> scopesheet::Result<()> {
/// use scopesheet::{process_file_async, PipelineOptions};
///
/// let output = process_file_async("scope.docx", PipelineOptions::default()).await?;
/// tokio::fs::write(&output.file_name, &output.bytes).await?;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "async")]
pub async fn process_file_async<P: AsRef<Path>>(
    path: P,
    options: PipelineOptions,
) -> Result<ProcessOutput> {
    let path = path.as_ref().to_path_buf();
    let data = tokio::fs::read(&path).await?;
    let source_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string);

    tokio::task::spawn_blocking(move || {
        Pipeline::new(options)?.process(&data, source_name.as_deref())
    })
    .await
    .map_err(|e| Error::Io(std::io::Error::other(e)))?
}

/// Builder-style API for configuring a run.
///
/// # Example
///
/// ```no_run
/// use scopesheet::Scopesheet;
///
/// let output = Scopesheet::new()
///     .with_bold_headings()
///     .with_subtotal_rows()
///     .process_file("scope.docx")?;
/// # Ok::<(), scopesheet::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Scopesheet {
    options: PipelineOptions,
}

impl Scopesheet {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom classifier vocabulary.
    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.options.vocabulary = vocabulary;
        self
    }

    /// Load the classifier vocabulary from a TOML file.
    pub fn with_vocabulary_file<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        Ok(self.with_vocabulary(Vocabulary::load(path)?))
    }

    /// Treat short all-bold paragraphs as headings.
    pub fn with_bold_headings(mut self) -> Self {
        self.options.read = self.options.read.with_bold_headings(true);
        self
    }

    /// Skip table content.
    pub fn without_tables(mut self) -> Self {
        self.options.read = self.options.read.without_tables();
        self
    }

    /// Add extra abbreviations that never end a sentence.
    pub fn with_abbreviations<I, S>(mut self, abbreviations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.segmenter = self.options.segmenter.with_abbreviations(abbreviations);
        self
    }

    /// Insert a subtotal row after each category.
    pub fn with_subtotal_rows(mut self) -> Self {
        self.options.workbook = self.options.workbook.with_subtotal_rows(true);
        self
    }

    /// Set the worksheet name.
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.options.workbook = self.options.workbook.with_sheet_name(name);
        self
    }

    /// Disable parallel batch processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Options collected so far.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Build the pipeline.
    pub fn build(self) -> Result<Pipeline> {
        Pipeline::new(self.options)
    }

    /// Turn a Word file into workbook bytes.
    pub fn process_file<P: AsRef<Path>>(self, path: P) -> Result<ProcessOutput> {
        self.build()?.process_file(path)
    }

    /// Turn Word document bytes into workbook bytes.
    pub fn process_bytes(self, data: &[u8], source_name: Option<&str>) -> Result<ProcessOutput> {
        self.build()?.process(data, source_name)
    }

    /// Extract grouped tasks from Word document bytes.
    pub fn extract_bytes(self, data: &[u8]) -> Result<ExtractionResult> {
        self.build()?.extract(data)
    }
}
