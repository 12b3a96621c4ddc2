use concord_core::{Money, RecordId};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::record::TransactionRecord;
use crate::similarity::vendor_similarity;

/// Weight of the relative amount difference subtracted from vendor similarity.
pub const AMOUNT_PENALTY_WEIGHT: f64 = 0.25;

/// A scored (internal, bank) pairing that passed every filter but has not
/// been committed. `internal_idx`/`bank_idx` point into the run's record
/// collections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidatePair {
    pub internal_idx: usize,
    pub bank_idx: usize,
    pub internal_id: RecordId,
    pub bank_id: RecordId,
    pub date_diff_days: i64,
    pub amount_diff: Money,
    pub vendor_similarity: f64,
    pub score: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    pub similarity_threshold: f64,
}

impl Scorer {
    pub fn new(similarity_threshold: f64) -> Self {
        Self { similarity_threshold }
    }

    /// Scores a pair that already passed the bucket and date filters.
    /// Returns `None` when vendor similarity is under the threshold.
    pub fn score(
        &self,
        internal_idx: usize,
        internal: &TransactionRecord,
        bank_idx: usize,
        bank: &TransactionRecord,
    ) -> Option<CandidatePair> {
        let similarity = vendor_similarity(&internal.normalized_vendor, &bank.normalized_vendor);
        if similarity < self.similarity_threshold {
            return None;
        }

        let amount_diff = internal.amount.abs_diff(bank.amount);
        let score = similarity - amount_penalty(amount_diff, internal.amount);

        Some(CandidatePair {
            internal_idx,
            bank_idx,
            internal_id: internal.id.clone(),
            bank_id: bank.id.clone(),
            date_diff_days: internal.date_diff_days(bank),
            amount_diff,
            vendor_similarity: similarity,
            score,
        })
    }
}

/// `amount_diff / (base + 1) * weight`, relative to the internal amount.
/// The `+ 1` keeps zero-amount records finite.
fn amount_penalty(amount_diff: Money, base: Money) -> f64 {
    let ratio = amount_diff.as_decimal() / (base.as_decimal() + Decimal::ONE);
    ratio.to_f64().unwrap_or(f64::MAX) * AMOUNT_PENALTY_WEIGHT
}
