//! End-to-end document processing.
//!
//! The [`Pipeline`] wires the stages together:
//! reader → segmenter → classifier → aggregator → workbook builder.
//! A pipeline holds no per-document state, so one instance can process many
//! documents, including from several threads at once.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::aggregate::Aggregator;
use crate::classify::{Classifier, RuleClassifier, Vocabulary};
use crate::error::Result;
use crate::model::{Block, ExtractionResult, ExtractionStats, Sentence, StyleHint};
use crate::reader::{DocxReader, ReadOptions};
use crate::render::{WorkbookBuilder, WorkbookOptions};
use crate::segment::{Segmenter, SegmenterOptions};

/// File name used when the input name is unknown or unusable.
pub const DEFAULT_OUTPUT_NAME: &str = "scope_of_work.xlsx";

/// Options for the whole pipeline.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Document reading options
    pub read: ReadOptions,

    /// Sentence segmentation options
    pub segmenter: SegmenterOptions,

    /// Classifier vocabulary
    pub vocabulary: Vocabulary,

    /// Workbook rendering options
    pub workbook: WorkbookOptions,

    /// Process batches in parallel
    pub parallel: bool,
}

impl PipelineOptions {
    /// Create new pipeline options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the read options.
    pub fn with_read_options(mut self, read: ReadOptions) -> Self {
        self.read = read;
        self
    }

    /// Set the segmenter options.
    pub fn with_segmenter_options(mut self, segmenter: SegmenterOptions) -> Self {
        self.segmenter = segmenter;
        self
    }

    /// Set the classifier vocabulary.
    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    /// Set the workbook options.
    pub fn with_workbook_options(mut self, workbook: WorkbookOptions) -> Self {
        self.workbook = workbook;
        self
    }

    /// Enable or disable parallel batch processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Process batches one document at a time.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            read: ReadOptions::default(),
            segmenter: SegmenterOptions::default(),
            vocabulary: Vocabulary::default(),
            workbook: WorkbookOptions::default(),
            parallel: true,
        }
    }
}

/// Workbook bytes plus the data they were rendered from.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// `.xlsx` bytes
    pub bytes: Vec<u8>,

    /// Suggested output file name
    pub file_name: String,

    /// The extraction result rendered into `bytes`
    pub result: ExtractionResult,
}

impl ProcessOutput {
    /// Write the workbook bytes to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, &self.bytes)?;
        Ok(())
    }
}

/// Outcome of one document in a batch.
#[derive(Debug)]
pub struct BatchItem {
    /// Input path
    pub path: PathBuf,

    /// Output or the error that stopped this document
    pub output: Result<ProcessOutput>,
}

/// Document-to-workbook pipeline.
pub struct Pipeline {
    options: PipelineOptions,
    segmenter: Segmenter,
    classifier: Box<dyn Classifier>,
}

impl Pipeline {
    /// Create a pipeline with the rule classifier built from the options'
    /// vocabulary.
    pub fn new(options: PipelineOptions) -> Result<Self> {
        let classifier = RuleClassifier::new(options.vocabulary.clone())?;
        Ok(Self::with_classifier(options, Box::new(classifier)))
    }

    /// Create a pipeline with a custom classifier.
    ///
    /// The options' vocabulary is not used.
    pub fn with_classifier(options: PipelineOptions, classifier: Box<dyn Classifier>) -> Self {
        let segmenter = Segmenter::new(&options.segmenter);
        Self {
            options,
            segmenter,
            classifier,
        }
    }

    /// Pipeline options.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Name of the classifier in use.
    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Read, classify and aggregate a document.
    pub fn extract(&self, data: &[u8]) -> Result<ExtractionResult> {
        let reader = DocxReader::from_bytes_with_options(data, self.options.read.clone())?;
        self.extract_from_reader(&reader)
    }

    /// Classify and aggregate the blocks of an opened document.
    pub fn extract_from_reader(&self, reader: &DocxReader) -> Result<ExtractionResult> {
        let mut stats = ExtractionStats::new();
        let mut aggregator = Aggregator::new().with_metadata(reader.metadata().clone());
        let mut anchor: Option<Block> = None;

        for block in reader.blocks() {
            let block = block?;
            stats.block_count += 1;

            match block.style_hint {
                StyleHint::Heading => {
                    stats.heading_count += 1;
                    stats.sentence_count += self.segmenter.segment(&block).count() as u32;
                    anchor = Some(block);
                    continue;
                }
                StyleHint::TableCell => stats.table_row_count += 1,
                StyleHint::Body => {}
            }

            let anchor_sentence = anchor.as_ref().map(Sentence::anchor);
            for sentence in self.segmenter.segment(&block) {
                stats.sentence_count += 1;
                if let Some(record) = self.classifier.classify(&sentence, anchor_sentence.as_ref()) {
                    stats.task_count += 1;
                    aggregator.push(record);
                }
            }
        }

        log::debug!(
            "Pipeline[{}]: {} blocks, {} sentences, {} tasks",
            self.classifier.name(),
            stats.block_count,
            stats.sentence_count,
            stats.task_count
        );
        aggregator.with_stats(stats).finish()
    }

    /// Render an extraction result to workbook bytes.
    pub fn render(&self, result: &ExtractionResult) -> Result<Vec<u8>> {
        WorkbookBuilder::new(self.options.workbook.clone()).build(result)
    }

    /// Turn document bytes into workbook bytes.
    ///
    /// `source_name` is the input file name, used for the suggested output
    /// name.
    pub fn process(&self, data: &[u8], source_name: Option<&str>) -> Result<ProcessOutput> {
        let result = self.extract(data)?;
        let bytes = self.render(&result)?;
        Ok(ProcessOutput {
            bytes,
            file_name: suggested_file_name(source_name),
            result,
        })
    }

    /// Turn a document file into workbook bytes.
    pub fn process_file<P: AsRef<Path>>(&self, path: P) -> Result<ProcessOutput> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        self.process(&data, path.file_name().and_then(|n| n.to_str()))
    }

    /// Process several files. Each document succeeds or fails on its own;
    /// results keep the input order.
    pub fn process_batch<P: AsRef<Path> + Sync>(&self, paths: &[P]) -> Vec<BatchItem> {
        self.process_batch_with(paths, |_| {})
    }

    /// Like [`process_batch`](Self::process_batch), calling `on_item` as each
    /// document finishes (in completion order).
    pub fn process_batch_with<P, F>(&self, paths: &[P], on_item: F) -> Vec<BatchItem>
    where
        P: AsRef<Path> + Sync,
        F: Fn(&BatchItem) + Sync,
    {
        let run = |path: &P| {
            let item = BatchItem {
                path: path.as_ref().to_path_buf(),
                output: self.process_file(path),
            };
            on_item(&item);
            item
        };
        if self.options.parallel {
            paths.par_iter().map(run).collect()
        } else {
            paths.iter().map(run).collect()
        }
    }
}

/// Output file name for an input name: the extension becomes `xlsx`.
///
/// Directory parts are dropped. Falls back to [`DEFAULT_OUTPUT_NAME`].
pub fn suggested_file_name(source_name: Option<&str>) -> String {
    let Some(name) = source_name else {
        return DEFAULT_OUTPUT_NAME.to_string();
    };
    let name = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    let stem = match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    };
    let stem = stem.trim();
    if stem.is_empty() || stem.chars().all(|c| c == '.') {
        DEFAULT_OUTPUT_NAME.to_string()
    } else {
        format!("{}.xlsx", stem)
    }
}
