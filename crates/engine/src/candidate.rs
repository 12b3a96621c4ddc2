use std::ops::Range;

use crate::bucket::BucketIndex;
use crate::record::TransactionRecord;
use crate::score::{CandidatePair, Scorer};

/// Proposes bank records for each internal record: same or adjacent amount
/// bucket, and dates no further apart than the tolerance (inclusive).
pub struct CandidateGenerator<'a> {
    internal: &'a [TransactionRecord],
    bank: &'a [TransactionRecord],
    bank_index: &'a BucketIndex,
    date_tolerance_days: i64,
}

impl<'a> CandidateGenerator<'a> {
    pub fn new(
        internal: &'a [TransactionRecord],
        bank: &'a [TransactionRecord],
        bank_index: &'a BucketIndex,
        date_tolerance_days: i64,
    ) -> Self {
        Self {
            internal,
            bank,
            bank_index,
            date_tolerance_days,
        }
    }

    /// Bank positions proposed for the internal record at `internal_idx`.
    pub fn candidates_for(&self, internal_idx: usize) -> impl Iterator<Item = usize> + '_ {
        let record = &self.internal[internal_idx];
        self.bank_index
            .neighborhood(record.bucket_key)
            .filter(move |&bank_idx| {
                record.date_diff_days(&self.bank[bank_idx]) <= self.date_tolerance_days
            })
    }

    /// Generates and scores candidates for the internal records in `range`.
    /// Ranges are independent, so disjoint ranges can be handled by separate workers
    /// and their outputs concatenated.
    pub fn scored(&self, range: Range<usize>, scorer: &Scorer) -> Vec<CandidatePair> {
        let mut pairs = Vec::new();
        for internal_idx in range {
            let internal = &self.internal[internal_idx];
            pairs.extend(self.candidates_for(internal_idx).filter_map(|bank_idx| {
                scorer.score(internal_idx, internal, bank_idx, &self.bank[bank_idx])
            }));
        }
        pairs
    }

    pub fn scored_all(&self, scorer: &Scorer) -> Vec<CandidatePair> {
        self.scored(0..self.internal.len(), scorer)
    }
}
