use crate::stats::extract::GroupKey;
use std::collections::HashMap;

/// Occurrence count per group key for one reporting interval.
///
/// Every key present has a count of at least 1.
#[derive(Debug, Default)]
pub struct AggregationTable {
    counts: HashMap<GroupKey, u64>,
}

impl AggregationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulate(&mut self, key: GroupKey) {
        *self.counts.entry(key).or_insert(0) += 1;
    }

    /// Entries sorted by count descending, ties by key ascending.
    pub fn snapshot(&self) -> Vec<(GroupKey, u64)> {
        let mut entries: Vec<(GroupKey, u64)> = self
            .counts
            .iter()
            .map(|(key, count)| (key.clone(), *count))
            .collect();
        entries.sort_by(|(ka, ca), (kb, cb)| cb.cmp(ca).then_with(|| ka.cmp(kb)));
        entries
    }

    pub fn get(&self, key: &GroupKey) -> Option<u64> {
        self.counts.get(key).copied()
    }

    pub fn reset(&mut self) {
        self.counts.clear();
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}
