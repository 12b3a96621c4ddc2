//! Pairs internal ledger entries with bank statement entries.
//!
//! A run flows through: vendor normalization, amount bucketing of the bank
//! side, candidate generation (adjacent buckets within the date tolerance),
//! scoring, greedy one-to-one assignment and report assembly.

pub mod assign;
pub mod bucket;
pub mod candidate;
mod concurrent;
pub mod normalize;
pub mod record;
pub mod report;
pub mod score;
pub mod similarity;

use concord_core::{LedgerEntry, MatchConfig, Origin, ReconError};
use tracing::{debug, info};

pub use assign::{Assignment, AssignmentResolver};
pub use bucket::BucketIndex;
pub use candidate::CandidateGenerator;
pub use normalize::VendorNormalizer;
pub use record::TransactionRecord;
pub use report::{DailyTotal, MatchKind, MatchResult, ReconciliationReport, ReportSummary};
pub use score::{CandidatePair, Scorer};

/// A validated configuration ready to run reconciliations. Holds no state
/// between runs, so one engine can serve many runs, concurrently or not.
#[derive(Debug, Clone)]
pub struct ReconciliationEngine {
    config: MatchConfig,
    normalizer: VendorNormalizer,
}

impl ReconciliationEngine {
    pub fn new(config: MatchConfig) -> Result<Self, ReconError> {
        config.validate()?;
        let normalizer = VendorNormalizer::new(&config.stopwords);
        Ok(Self { config, normalizer })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn run(
        &self,
        internal: &[LedgerEntry],
        bank: &[LedgerEntry],
    ) -> Result<ReconciliationReport, ReconError> {
        let (internal, bank) = self.prepare(internal, bank)?;

        let bank_index = BucketIndex::build(&bank);
        debug!(
            buckets = bank_index.bucket_count(),
            largest_bucket = bank_index.largest_bucket(),
            "bank side indexed"
        );

        let scorer = Scorer::new(self.config.similarity_threshold);
        let candidates = CandidateGenerator::new(
            &internal,
            &bank,
            &bank_index,
            self.config.date_tolerance_days,
        )
        .scored_all(&scorer);
        debug!(candidates = candidates.len(), "candidates scored");

        let assignment = AssignmentResolver::new(internal.len(), bank.len()).resolve(candidates);
        Ok(self.finish(internal, bank, assignment))
    }

    fn prepare(
        &self,
        internal: &[LedgerEntry],
        bank: &[LedgerEntry],
    ) -> Result<(Vec<TransactionRecord>, Vec<TransactionRecord>), ReconError> {
        let width = self.config.amount_bucket_width;
        let internal = record::prepare_all(internal, Origin::Internal, &self.normalizer, width)?;
        let bank = record::prepare_all(bank, Origin::Bank, &self.normalizer, width)?;
        debug!(internal = internal.len(), bank = bank.len(), "records prepared");
        Ok((internal, bank))
    }

    fn finish(
        &self,
        internal: Vec<TransactionRecord>,
        bank: Vec<TransactionRecord>,
        assignment: Assignment,
    ) -> ReconciliationReport {
        let report = ReconciliationReport::assemble(internal, bank, assignment);
        info!(
            matched = report.summary.matched_count,
            unmatched_internal = report.summary.unmatched_internal_count,
            unmatched_bank = report.summary.unmatched_bank_count,
            "reconciliation finished"
        );
        report
    }
}

/// One-shot reconciliation: validates `config`, then runs it sequentially.
pub fn reconcile(
    internal: &[LedgerEntry],
    bank: &[LedgerEntry],
    config: &MatchConfig,
) -> Result<ReconciliationReport, ReconError> {
    ReconciliationEngine::new(config.clone())?.run(internal, bank)
}
