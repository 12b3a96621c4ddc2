use std::sync::Arc;

use concord_core::{LedgerEntry, ReconError};
use tokio::task::JoinSet;
use tracing::debug;

use crate::assign::AssignmentResolver;
use crate::bucket::BucketIndex;
use crate::candidate::CandidateGenerator;
use crate::record::TransactionRecord;
use crate::report::ReconciliationReport;
use crate::score::{CandidatePair, Scorer};
use crate::ReconciliationEngine;

/// Shared, read-only state handed to every worker.
struct RunState {
    internal: Vec<TransactionRecord>,
    bank: Vec<TransactionRecord>,
    bank_index: BucketIndex,
    date_tolerance_days: i64,
    scorer: Scorer,
}

impl RunState {
    fn scored(&self, range: std::ops::Range<usize>) -> Vec<CandidatePair> {
        CandidateGenerator::new(
            &self.internal,
            &self.bank,
            &self.bank_index,
            self.date_tolerance_days,
        )
        .scored(range, &self.scorer)
    }
}

impl ReconciliationEngine {
    /// Same result as [`ReconciliationEngine::run`], with candidate generation
    /// and scoring split across up to `workers` blocking tasks. Assignment
    /// still happens on one thread once every chunk has been collected.
    pub async fn run_concurrent(
        &self,
        internal: &[LedgerEntry],
        bank: &[LedgerEntry],
        workers: usize,
    ) -> Result<ReconciliationReport, ReconError> {
        let (internal, bank) = self.prepare(internal, bank)?;
        let bank_index = BucketIndex::build(&bank);
        let internal_len = internal.len();
        let bank_len = bank.len();

        let state = Arc::new(RunState {
            internal,
            bank,
            bank_index,
            date_tolerance_days: self.config().date_tolerance_days,
            scorer: Scorer::new(self.config().similarity_threshold),
        });

        let workers = workers.max(1);
        let chunk = internal_len.div_ceil(workers).max(1);
        let mut tasks = JoinSet::new();
        for (chunk_no, start) in (0..internal_len).step_by(chunk).enumerate() {
            let end = (start + chunk).min(internal_len);
            let state = Arc::clone(&state);
            tasks.spawn_blocking(move || (chunk_no, state.scored(start..end)));
        }

        let mut chunks: Vec<(usize, Vec<CandidatePair>)> = Vec::with_capacity(workers);
        while let Some(joined) = tasks.join_next().await {
            chunks.push(joined.map_err(|e| ReconError::Worker(e.to_string()))?);
        }
        // Concatenate in chunk order so the candidate list matches a sequential run.
        chunks.sort_by_key(|(chunk_no, _)| *chunk_no);
        let candidates: Vec<CandidatePair> =
            chunks.into_iter().flat_map(|(_, pairs)| pairs).collect();

        debug!(
            chunks = internal_len.div_ceil(chunk),
            candidates = candidates.len(),
            "concurrent candidate generation finished"
        );

        let assignment = AssignmentResolver::new(internal_len, bank_len).resolve(candidates);
        let RunState { internal, bank, .. } =
            Arc::try_unwrap(state).map_err(|_| ReconError::Worker("run state still shared".into()))?;
        Ok(self.finish(internal, bank, assignment))
    }
}
