//! Deduplication, grouping and totals.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::model::{Amount, CategoryGroup, ExtractionResult, ExtractionStats, Metadata, TaskRecord};

/// Collects task records into a validated [`ExtractionResult`].
///
/// Records equal in category, description and budget are duplicates; the
/// first one is kept. Groups appear in the order their category was first
/// seen, records within a group in push order.
#[derive(Debug, Default)]
pub struct Aggregator {
    groups: Vec<CategoryGroup>,
    index: HashMap<String, usize>,
    seen: HashSet<(String, String, Amount)>,
    duplicates: u32,
    metadata: Metadata,
    stats: ExtractionStats,
}

impl Aggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach document metadata to the result.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Attach upstream counters (blocks, sentences, tasks) to the result.
    pub fn with_stats(mut self, stats: ExtractionStats) -> Self {
        self.stats = stats;
        self
    }

    /// Add one record. Returns `false` if it was a duplicate.
    pub fn push(&mut self, record: TaskRecord) -> bool {
        let (category, description, budget) = record.dedup_key();
        let key = (category.to_string(), description.to_string(), budget);
        if !self.seen.insert(key) {
            self.duplicates += 1;
            log::debug!("Aggregator: dropped duplicate {:?}", record.description);
            return false;
        }

        let slot = match self.index.get(&record.category) {
            Some(&slot) => slot,
            None => {
                self.groups.push(CategoryGroup::new(record.category.clone()));
                self.index
                    .insert(record.category.clone(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        self.groups[slot].records.push(record);
        true
    }

    /// Add many records.
    pub fn extend<I: IntoIterator<Item = TaskRecord>>(&mut self, records: I) {
        for record in records {
            self.push(record);
        }
    }

    /// Number of records kept so far.
    pub fn len(&self) -> usize {
        self.groups.iter().map(CategoryGroup::len).sum()
    }

    /// Check if no record has been kept.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Compute totals and produce the result.
    ///
    /// Fails with [`Error::ExtractionEmpty`] when no record was kept and with
    /// [`Error::InvalidDocument`] when a total does not fit in an [`Amount`].
    pub fn finish(self) -> Result<ExtractionResult> {
        let Self {
            mut groups,
            duplicates,
            metadata,
            mut stats,
            ..
        } = self;

        if groups.is_empty() {
            return Err(Error::ExtractionEmpty);
        }

        let mut grand_total = Amount::ZERO;
        for group in &mut groups {
            group.subtotal = group.compute_subtotal().ok_or_else(|| overflow(&group.category))?;
            grand_total = grand_total
                .checked_add(group.subtotal)
                .ok_or_else(|| overflow("grand total"))?;
        }

        stats.duplicate_count = duplicates;
        stats.category_count = groups.len() as u32;

        let result = ExtractionResult {
            metadata,
            groups,
            grand_total,
            stats,
        };
        if !result.verify_totals() {
            return Err(Error::InvalidDocument("totals do not add up".into()));
        }

        log::debug!(
            "Aggregator: {} records in {} categories, {} duplicates, total {}",
            result.record_count(),
            result.groups.len(),
            duplicates,
            result.grand_total
        );
        Ok(result)
    }
}

fn overflow(what: &str) -> Error {
    Error::InvalidDocument(format!("budget total overflows for {}", what))
}

/// Aggregate records without metadata.
pub fn aggregate<I: IntoIterator<Item = TaskRecord>>(records: I) -> Result<ExtractionResult> {
    let mut aggregator = Aggregator::new();
    aggregator.extend(records);
    aggregator.finish()
}
