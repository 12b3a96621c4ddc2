use std::collections::BTreeMap;

use crate::record::TransactionRecord;

/// Positions of records grouped by `bucket_key`. Records are referenced by
/// their index in the collection the index was built from.
#[derive(Debug, Clone, Default)]
pub struct BucketIndex {
    buckets: BTreeMap<i64, Vec<usize>>,
}

impl BucketIndex {
    pub fn build(records: &[TransactionRecord]) -> Self {
        let mut buckets: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (idx, record) in records.iter().enumerate() {
            buckets.entry(record.bucket_key).or_default().push(idx);
        }
        Self { buckets }
    }

    pub fn bucket(&self, key: i64) -> &[usize] {
        self.buckets.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Record positions in buckets `key - 1`, `key` and `key + 1`, in that order.
    pub fn neighborhood(&self, key: i64) -> impl Iterator<Item = usize> + '_ {
        [key.checked_sub(1), Some(key), key.checked_add(1)]
            .into_iter()
            .flatten()
            .flat_map(move |k| self.bucket(k).iter().copied())
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn largest_bucket(&self) -> usize {
        self.buckets.values().map(Vec::len).max().unwrap_or(0)
    }
}
