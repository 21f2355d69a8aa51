use crate::pow::{is_valid, Difficulty};
use rayon::prelude::*;
use tracing::info;

/// Candidates checked per parallel round.
const PROOFS_PER_BATCH: u64 = 1 << 14;

/// Parallel form of [`crate::pow::find_proof`].
///
/// Candidates are scanned in ascending batches; within a batch rayon spreads
/// the work across threads and `find_first` keeps the lowest hit, so the
/// result is identical to the sequential search.
pub fn find_proof_parallel(last_proof: u64, difficulty: Difficulty) -> u64 {
    let mut start = 0u64;
    loop {
        let end = start.saturating_add(PROOFS_PER_BATCH);
        let found = (start..end)
            .into_par_iter()
            .find_first(|proof| is_valid(last_proof, *proof, difficulty));

        if let Some(proof) = found {
            info!(last_proof, proof, %difficulty, "found proof");
            return proof;
        }
        start = end;
    }
}
