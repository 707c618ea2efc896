//! Aggregated extraction output.

use super::{Amount, Metadata, TaskRecord};
use serde::{Deserialize, Serialize};

/// Records sharing a category, in extraction order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGroup {
    /// Category name
    pub category: String,

    /// Records in original extraction order
    pub records: Vec<TaskRecord>,

    /// Sum of record budgets
    pub subtotal: Amount,
}

impl CategoryGroup {
    /// Create an empty group.
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            records: Vec::new(),
            subtotal: Amount::ZERO,
        }
    }

    /// Number of records in the group.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the group has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Recompute the sum of record budgets, `None` on overflow.
    pub fn compute_subtotal(&self) -> Option<Amount> {
        Amount::checked_sum(self.records.iter().map(|r| r.budget))
    }
}

/// The validated output of one extraction run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Source document metadata
    pub metadata: Metadata,

    /// Groups in first-seen category order
    pub groups: Vec<CategoryGroup>,

    /// Sum of group subtotals
    pub grand_total: Amount,

    /// Counters collected along the pipeline
    pub stats: ExtractionStats,
}

impl ExtractionResult {
    /// Total number of records across groups.
    pub fn record_count(&self) -> usize {
        self.groups.iter().map(CategoryGroup::len).sum()
    }

    /// Check if there are no records.
    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }

    /// Iterate over all records in output order.
    pub fn records(&self) -> impl Iterator<Item = &TaskRecord> {
        self.groups.iter().flat_map(|g| g.records.iter())
    }

    /// Find a group by category name.
    pub fn group(&self, category: &str) -> Option<&CategoryGroup> {
        self.groups.iter().find(|g| g.category == category)
    }

    /// Check that every subtotal and the grand total match their parts.
    pub fn verify_totals(&self) -> bool {
        let groups_ok = self
            .groups
            .iter()
            .all(|g| g.compute_subtotal() == Some(g.subtotal));
        let grand = Amount::checked_sum(self.groups.iter().map(|g| g.subtotal));
        groups_ok && grand == Some(self.grand_total)
    }
}

/// Statistics collected during extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Blocks read from the document
    pub block_count: u32,

    /// Heading blocks (category anchors)
    pub heading_count: u32,

    /// Table-row blocks
    pub table_row_count: u32,

    /// Sentences produced by the segmenter
    pub sentence_count: u32,

    /// Sentences classified as tasks
    pub task_count: u32,

    /// Records dropped as duplicates
    pub duplicate_count: u32,

    /// Distinct categories in the result
    pub category_count: u32,
}

impl ExtractionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ExtractionStats) {
        self.block_count += other.block_count;
        self.heading_count += other.heading_count;
        self.table_row_count += other.table_row_count;
        self.sentence_count += other.sentence_count;
        self.task_count += other.task_count;
        self.duplicate_count += other.duplicate_count;
        self.category_count += other.category_count;
    }
}
