use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use concord_core::Money;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::assign::Assignment;
use crate::record::TransactionRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Same date, same amount, identical normalized vendor.
    Exact,
    /// Same date and amount; vendor text differs.
    DateAndAmount,
    Fuzzy,
}

impl MatchKind {
    fn classify(date_diff_days: i64, amount_diff: Money, vendor_similarity: f64) -> Self {
        match (date_diff_days == 0 && amount_diff.is_zero(), vendor_similarity >= 1.0) {
            (true, true) => MatchKind::Exact,
            (true, false) => MatchKind::DateAndAmount,
            (false, _) => MatchKind::Fuzzy,
        }
    }
}

/// One committed internal ↔ bank pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub internal: TransactionRecord,
    pub bank: TransactionRecord,
    pub kind: MatchKind,
    pub date_diff_days: i64,
    pub amount_diff: Money,
    pub vendor_similarity: f64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub internal_count: usize,
    pub bank_count: usize,
    pub matched_count: usize,
    pub unmatched_internal_count: usize,
    pub unmatched_bank_count: usize,
    /// `matched / internal`, or 0.0 when there are no internal records.
    pub match_rate: f64,
    pub matched_amount: Money,
}

impl ReportSummary {
    pub fn match_percent(&self) -> f64 {
        (self.match_rate * 10_000.0).round() / 100.0
    }
}

/// Per-date totals for both sides of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DailyTotal {
    pub internal: Money,
    pub bank: Money,
}

/// Matches in commit order (best score first) and the unmatched records of
/// each side in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub matches: Vec<MatchResult>,
    pub unmatched_internal: Vec<TransactionRecord>,
    pub unmatched_bank: Vec<TransactionRecord>,
    pub summary: ReportSummary,
}

impl ReconciliationReport {
    pub fn assemble(
        internal: Vec<TransactionRecord>,
        bank: Vec<TransactionRecord>,
        assignment: Assignment,
    ) -> Self {
        let internal_count = internal.len();
        let bank_count = bank.len();
        let mut internal: Vec<Option<TransactionRecord>> = internal.into_iter().map(Some).collect();
        let mut bank: Vec<Option<TransactionRecord>> = bank.into_iter().map(Some).collect();

        let matches: Vec<MatchResult> = assignment
            .committed
            .into_iter()
            .filter_map(|pair| {
                // A record claimed twice would vanish from both matched and unmatched.
                let fresh = internal[pair.internal_idx].is_some() && bank[pair.bank_idx].is_some();
                debug_assert!(
                    fresh,
                    "record committed twice: {} / {}",
                    pair.internal_id, pair.bank_id
                );
                if !fresh {
                    error!(
                        internal = %pair.internal_id,
                        bank = %pair.bank_id,
                        "record committed twice, pair dropped"
                    );
                    return None;
                }
                let i = internal[pair.internal_idx].take()?;
                let b = bank[pair.bank_idx].take()?;
                Some(MatchResult {
                    kind: MatchKind::classify(
                        pair.date_diff_days,
                        pair.amount_diff,
                        pair.vendor_similarity,
                    ),
                    internal: i,
                    bank: b,
                    date_diff_days: pair.date_diff_days,
                    amount_diff: pair.amount_diff,
                    vendor_similarity: pair.vendor_similarity,
                    score: pair.score,
                })
            })
            .collect();

        let unmatched_internal: Vec<TransactionRecord> = internal.into_iter().flatten().collect();
        let unmatched_bank: Vec<TransactionRecord> = bank.into_iter().flatten().collect();

        let match_rate = if internal_count == 0 {
            0.0
        } else {
            matches.len() as f64 / internal_count as f64
        };

        let summary = ReportSummary {
            internal_count,
            bank_count,
            matched_count: matches.len(),
            unmatched_internal_count: unmatched_internal.len(),
            unmatched_bank_count: unmatched_bank.len(),
            match_rate,
            matched_amount: matches.iter().map(|m| m.internal.amount).sum(),
        };

        ReconciliationReport {
            matches,
            unmatched_internal,
            unmatched_bank,
            summary,
        }
    }

    /// Unmatched internal records grouped by raw vendor, most frequent first.
    pub fn top_unmatched_vendors(&self, limit: usize) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for record in &self.unmatched_internal {
            *counts.entry(record.raw_vendor.as_str()).or_default() += 1;
        }
        let mut ranked: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(vendor, count)| (vendor.to_string(), count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(limit);
        ranked
    }

    /// Amount totals per date across every record of the run, matched or not.
    pub fn daily_totals(&self) -> BTreeMap<NaiveDate, DailyTotal> {
        let mut totals: BTreeMap<NaiveDate, DailyTotal> = BTreeMap::new();
        let internal = self
            .matches
            .iter()
            .map(|m| &m.internal)
            .chain(&self.unmatched_internal);
        for record in internal {
            let day = totals.entry(record.date).or_default();
            day.internal = day.internal + record.amount;
        }
        let bank = self.matches.iter().map(|m| &m.bank).chain(&self.unmatched_bank);
        for record in bank {
            let day = totals.entry(record.date).or_default();
            day.bank = day.bank + record.amount;
        }
        totals
    }
}
