use std::cmp::Ordering;

use tracing::debug;

use crate::score::CandidatePair;

/// Outcome of greedy assignment: committed pairs in commit order, plus the
/// positions left unconsumed on each side (ascending).
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub committed: Vec<CandidatePair>,
    pub unmatched_internal: Vec<usize>,
    pub unmatched_bank: Vec<usize>,
}

/// Greedy approximation to maximum-weight bipartite matching.
///
/// Candidates are walked best-first; a candidate is committed only when
/// neither of its records has been consumed. This is not optimal in general
/// but it is deterministic and each record is used at most once.
///
/// Raising the similarity threshold can therefore *add* matches. Score mixes
/// similarity with the amount penalty, so a low-similarity, high-score pair
/// can block two others:
///
/// | pair    | similarity | score |
/// |---------|------------|-------|
/// | i0 ↔ b0 | 0.76       | 0.76  |
/// | i0 ↔ b1 | 0.90       | 0.70  |
/// | i1 ↔ b0 | 0.90       | 0.70  |
///
/// At threshold 0.75 only i0 ↔ b0 commits; at 0.80 it is filtered out and
/// both remaining pairs commit.
pub struct AssignmentResolver {
    internal_len: usize,
    bank_len: usize,
}

impl AssignmentResolver {
    pub fn new(internal_len: usize, bank_len: usize) -> Self {
        Self {
            internal_len,
            bank_len,
        }
    }

    pub fn resolve(&self, mut candidates: Vec<CandidatePair>) -> Assignment {
        candidates.sort_by(rank);

        let mut internal_used = vec![false; self.internal_len];
        let mut bank_used = vec![false; self.bank_len];
        let mut committed = Vec::new();
        let mut skipped = 0usize;

        // Check-and-mark must stay sequential: every decision depends on all earlier ones.
        for candidate in candidates {
            if internal_used[candidate.internal_idx] || bank_used[candidate.bank_idx] {
                skipped += 1;
                continue;
            }
            internal_used[candidate.internal_idx] = true;
            bank_used[candidate.bank_idx] = true;
            committed.push(candidate);
        }

        debug!(
            committed = committed.len(),
            skipped, "greedy assignment finished"
        );

        Assignment {
            committed,
            unmatched_internal: unused(&internal_used),
            unmatched_bank: unused(&bank_used),
        }
    }
}

/// Best first: higher score, then smaller date gap, then smaller internal id,
/// then smaller bank id.
fn rank(a: &CandidatePair, b: &CandidatePair) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.date_diff_days.cmp(&b.date_diff_days))
        .then_with(|| a.internal_id.cmp(&b.internal_id))
        .then_with(|| a.bank_id.cmp(&b.bank_id))
}

fn unused(flags: &[bool]) -> Vec<usize> {
    flags
        .iter()
        .enumerate()
        .filter(|&(_, &used)| !used)
        .map(|(idx, _)| idx)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use concord_core::Money;

    fn pair(internal_idx: usize, bank_idx: usize, score: f64, date_diff_days: i64) -> CandidatePair {
        CandidatePair {
            internal_idx,
            bank_idx,
            internal_id: format!("i{internal_idx}").into(),
            bank_id: format!("b{bank_idx}").into(),
            date_diff_days,
            amount_diff: Money::zero(),
            vendor_similarity: score.max(0.0),
            score,
        }
    }

    fn committed_pairs(assignment: &Assignment) -> Vec<(usize, usize)> {
        assignment
            .committed
            .iter()
            .map(|c| (c.internal_idx, c.bank_idx))
            .collect()
    }

    #[test]
    fn highest_score_claims_shared_bank_record() {
        let resolver = AssignmentResolver::new(2, 1);
        let assignment = resolver.resolve(vec![pair(0, 0, 0.8, 0), pair(1, 0, 0.95, 0)]);
        assert_eq!(committed_pairs(&assignment), vec![(1, 0)]);
        assert_eq!(assignment.unmatched_internal, vec![0]);
        assert!(assignment.unmatched_bank.is_empty());
    }

    #[test]
    fn loser_falls_back_to_next_best() {
        let resolver = AssignmentResolver::new(2, 2);
        let assignment = resolver.resolve(vec![
            pair(0, 0, 0.9, 0),
            pair(0, 1, 0.7, 0),
            pair(1, 0, 0.95, 0),
        ]);
        assert_eq!(committed_pairs(&assignment), vec![(1, 0), (0, 1)]);
        assert!(assignment.unmatched_internal.is_empty());
        assert!(assignment.unmatched_bank.is_empty());
    }

    #[test]
    fn greedy_is_not_globally_optimal() {
        // Optimal would be (0,1)+(1,0) = 1.6; greedy takes 0.9 first and strands record 1.
        let resolver = AssignmentResolver::new(2, 2);
        let assignment = resolver.resolve(vec![
            pair(0, 0, 0.9, 0),
            pair(0, 1, 0.8, 0),
            pair(1, 0, 0.8, 0),
        ]);
        assert_eq!(committed_pairs(&assignment), vec![(0, 0)]);
        assert_eq!(assignment.unmatched_internal, vec![1]);
        assert_eq!(assignment.unmatched_bank, vec![1]);
    }

    #[test]
    fn raising_threshold_can_add_matches() {
        let blocker = CandidatePair {
            vendor_similarity: 0.76,
            ..pair(0, 0, 0.76, 0)
        };
        let others = [
            CandidatePair {
                vendor_similarity: 0.9,
                ..pair(0, 1, 0.7, 0)
            },
            CandidatePair {
                vendor_similarity: 0.9,
                ..pair(1, 0, 0.7, 0)
            },
        ];
        let all: Vec<CandidatePair> = std::iter::once(blocker).chain(others).collect();
        let above = |threshold: f64| -> Vec<CandidatePair> {
            all.iter()
                .filter(|c| c.vendor_similarity >= threshold)
                .cloned()
                .collect()
        };

        let resolver = AssignmentResolver::new(2, 2);
        assert_eq!(resolver.resolve(above(0.75)).committed.len(), 1);
        assert_eq!(resolver.resolve(above(0.80)).committed.len(), 2);
    }

    #[test]
    fn ties_break_on_date_gap_then_ids() {
        let resolver = AssignmentResolver::new(3, 1);
        let assignment = resolver.resolve(vec![
            pair(2, 0, 0.9, 0),
            pair(0, 0, 0.9, 1),
            pair(1, 0, 0.9, 0),
        ]);
        // i1 and i2 tie on score and date gap; "i1" < "i2".
        assert_eq!(committed_pairs(&assignment), vec![(1, 0)]);
    }

    #[test]
    fn input_order_does_not_change_outcome() {
        let candidates = vec![
            pair(0, 0, 0.9, 1),
            pair(1, 0, 0.9, 1),
            pair(1, 1, 0.85, 0),
            pair(2, 1, 0.85, 0),
            pair(2, 2, 0.6, 2),
        ];
        let resolver = AssignmentResolver::new(3, 3);
        let forward = resolver.resolve(candidates.clone());
        let mut reversed = candidates;
        reversed.reverse();
        assert_eq!(forward, resolver.resolve(reversed));
    }

    #[test]
    fn no_candidates_leaves_everything_unmatched() {
        let assignment = AssignmentResolver::new(2, 3).resolve(Vec::new());
        assert!(assignment.committed.is_empty());
        assert_eq!(assignment.unmatched_internal, vec![0, 1]);
        assert_eq!(assignment.unmatched_bank, vec![0, 1, 2]);
    }
}
