use std::collections::HashSet;

use chrono::NaiveDate;
use concord_core::{LedgerEntry, Money, Origin, RecordId, ReconError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::normalize::VendorNormalizer;

/// A ledger entry readied for matching. Built once per run; never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: RecordId,
    pub origin: Origin,
    pub date: NaiveDate,
    pub raw_vendor: String,
    pub normalized_vendor: String,
    pub amount: Money,
    pub bucket_key: i64,
}

impl TransactionRecord {
    /// Checks the entry against the engine's input contract and derives the
    /// normalized vendor and bucket key. Bad data is rejected, not coerced.
    pub fn prepare(
        entry: &LedgerEntry,
        origin: Origin,
        normalizer: &VendorNormalizer,
        bucket_width: Decimal,
    ) -> Result<Self, ReconError> {
        if entry.id.as_str().trim().is_empty() {
            return Err(ReconError::malformed(origin, &entry.id, "id", "is empty"));
        }

        let amount = Money::exact(entry.amount).ok_or_else(|| {
            ReconError::malformed(
                origin,
                &entry.id,
                "amount",
                format!("{} has more than two decimal places", entry.amount),
            )
        })?;
        if amount.is_negative() {
            return Err(ReconError::malformed(
                origin,
                &entry.id,
                "amount",
                format!("{} is negative", entry.amount),
            ));
        }

        let bucket_key = amount.bucket_key(bucket_width).ok_or_else(|| {
            ReconError::malformed(
                origin,
                &entry.id,
                "amount",
                format!("{} is out of range for bucket width {bucket_width}", entry.amount),
            )
        })?;

        Ok(TransactionRecord {
            id: entry.id.clone(),
            origin,
            date: entry.date,
            raw_vendor: entry.vendor.clone().unwrap_or_default(),
            normalized_vendor: normalizer.normalize(entry.vendor.as_deref()),
            amount,
            bucket_key,
        })
    }

    pub fn date_diff_days(&self, other: &TransactionRecord) -> i64 {
        (self.date - other.date).num_days().abs()
    }
}

/// Prepares a whole collection, failing on the first contract violation.
pub fn prepare_all(
    entries: &[LedgerEntry],
    origin: Origin,
    normalizer: &VendorNormalizer,
    bucket_width: Decimal,
) -> Result<Vec<TransactionRecord>, ReconError> {
    let mut seen = HashSet::with_capacity(entries.len());
    entries
        .iter()
        .map(|entry| {
            if !seen.insert(&entry.id) {
                return Err(ReconError::DuplicateId {
                    origin,
                    id: entry.id.clone(),
                });
            }
            TransactionRecord::prepare(entry, origin, normalizer, bucket_width)
        })
        .collect()
}
