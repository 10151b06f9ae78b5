//! Final ordering and packaging of a run.

use crate::domain::model::{CanonicalPosting, RunResult, SourceOutcome};
use std::collections::BTreeMap;

/// Orders the canonical collection (score descending, fingerprint ascending
/// as the reproducible tie-break) and attaches the per-source outcome map.
pub fn assemble(
    mut postings: Vec<CanonicalPosting>,
    outcomes: BTreeMap<String, SourceOutcome>,
) -> RunResult {
    postings.sort_by(|a, b| {
        b.posting
            .score
            .cmp(&a.posting.score)
            .then_with(|| a.fingerprint.cmp(&b.fingerprint))
    });
    RunResult { postings, outcomes }
}
