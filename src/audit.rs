//! End-to-end reference occurrence counting.
//!
//! `EndToEndId` values are not required to be unique, so repeated references
//! are reported for review rather than rejected.

use crate::types::PaymentBatch;
use std::collections::BTreeMap;

/// Occurrence count of every end-to-end reference seen across batches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceIndex {
    counts: BTreeMap<String, usize>,
    total: usize,
}

impl ReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every reference of `batch`.
    pub fn record(&mut self, batch: &PaymentBatch) {
        for transaction in batch.transactions() {
            *self.counts.entry(transaction.reference.clone()).or_insert(0) += 1;
            self.total += 1;
        }
    }

    /// Number of references recorded, duplicates included.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Distinct references in sorted order.
    pub fn unique(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    pub fn unique_count(&self) -> usize {
        self.counts.len()
    }

    /// References seen more than once, with their count, in sorted order.
    pub fn duplicates(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts
            .iter()
            .filter(|&(_, &count)| count > 1)
            .map(|(reference, &count)| (reference.as_str(), count))
    }

    pub fn has_duplicates(&self) -> bool {
        self.counts.values().any(|&count| count > 1)
    }
}
