//! Proof-of-work puzzle: find `p'` such that `sha256("{p}{p'}")` starts with
//! `difficulty` zero hex digits, where `p` is the previous block's proof.

use crate::constants::{BITS_PER_HEX_DIGIT, DEFAULT_DIFFICULTY, HASH_HEX_SIZE};
use crate::error::{LedgerError, Result};
use crate::{sha256, Hash};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Number of leading `'0'` hex characters a proof hash must carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Difficulty(usize);

impl Difficulty {
    pub fn new(zeros: usize) -> Result<Self> {
        if zeros > HASH_HEX_SIZE {
            return Err(LedgerError::InvalidDifficulty(zeros));
        }
        Ok(Self(zeros))
    }

    pub fn zeros(self) -> usize {
        self.0
    }

    pub fn zero_bits(self) -> u32 {
        (self.0 * BITS_PER_HEX_DIGIT) as u32
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self(DEFAULT_DIFFICULTY)
    }
}

impl TryFrom<usize> for Difficulty {
    type Error = LedgerError;

    fn try_from(zeros: usize) -> Result<Self> {
        Self::new(zeros)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn guess_digest(last_proof: u64, proof: u64) -> Hash {
    sha256(format!("{last_proof}{proof}").as_bytes())
}

/// Hex digest of the two proofs' decimal strings concatenated.
pub fn guess_hash(last_proof: u64, proof: u64) -> String {
    hex::encode(guess_digest(last_proof, proof))
}

/// A hex prefix of `n` zeros is exactly `4n` leading zero bits.
pub fn is_valid(last_proof: u64, proof: u64, difficulty: Difficulty) -> bool {
    count_leading_zero_bits(&guess_digest(last_proof, proof)) >= difficulty.zero_bits()
}

/// Smallest non-negative proof valid against `last_proof`.
///
/// Searches upward from zero with no bound; use [`ProofSearch`] to cap it.
pub fn find_proof(last_proof: u64, difficulty: Difficulty) -> u64 {
    let mut proof = 0u64;
    while !is_valid(last_proof, proof, difficulty) {
        proof += 1;
    }
    proof
}

pub fn count_leading_zero_bits(hash: &Hash) -> u32 {
    let mut total = 0u32;
    for b in hash {
        if *b == 0 {
            total += 8;
        } else {
            total += b.leading_zeros();
            break;
        }
    }
    total
}

/// Shared flag that stops a running [`ProofSearch`]. Once triggered it stays set.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Configurable form of [`find_proof`] with optional attempt cap and cancellation.
#[derive(Clone, Debug, Default)]
pub struct ProofSearch {
    difficulty: Difficulty,
    max_attempts: Option<u64>,
    cancel: Option<CancelFlag>,
}

impl ProofSearch {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            max_attempts: None,
            cancel: None,
        }
    }

    pub fn max_attempts(mut self, attempts: u64) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    pub fn cancel_on(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn run(&self, last_proof: u64) -> Result<u64> {
        let mut proof = 0u64;
        loop {
            if let Some(max) = self.max_attempts {
                if proof >= max {
                    return Err(LedgerError::SearchExhausted { attempts: proof });
                }
            }
            if self.cancel.as_ref().is_some_and(CancelFlag::is_triggered) {
                return Err(LedgerError::SearchCancelled { attempts: proof });
            }
            if is_valid(last_proof, proof, self.difficulty) {
                return Ok(proof);
            }
            proof += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::GENESIS_PROOF;

    #[test]
    fn leading_zero_bits_examples() {
        let mut h = [0u8; 32];
        assert_eq!(count_leading_zero_bits(&h), 256);
        h[0] = 0x0F; // 00001111
        assert_eq!(count_leading_zero_bits(&h), 4);
        h = [0u8; 32];
        h[1] = 0x80; // 00000000 10000000
        assert_eq!(count_leading_zero_bits(&h), 8);
        h[1] = 0x40; // 01000000
        assert_eq!(count_leading_zero_bits(&h), 9);
    }

    #[test]
    fn guess_hash_concatenates_decimal_strings() {
        let expected = hex::encode(sha256(b"10035293"));
        assert_eq!(guess_hash(100, 35_293), expected);
    }

    #[test]
    fn is_valid_matches_hex_prefix() {
        for zeros in 0..=3 {
            let difficulty = Difficulty::new(zeros).unwrap();
            let prefix = "0".repeat(zeros);
            for proof in 0..2_000u64 {
                assert_eq!(
                    is_valid(7, proof, difficulty),
                    guess_hash(7, proof).starts_with(&prefix),
                    "zeros={zeros} proof={proof}"
                );
            }
        }
    }

    #[test]
    fn find_proof_is_valid_and_minimal() {
        let difficulty = Difficulty::new(3).unwrap();
        for last_proof in [0u64, 1, 42, 100, 12_345] {
            let proof = find_proof(last_proof, difficulty);
            assert!(is_valid(last_proof, proof, difficulty));
            assert!((0..proof).all(|p| !is_valid(last_proof, p, difficulty)));
        }
    }

    #[test]
    fn find_proof_default_difficulty_from_genesis() {
        let proof = find_proof(GENESIS_PROOF, Difficulty::default());
        assert!(guess_hash(GENESIS_PROOF, proof).starts_with("0000"));
    }

    #[test]
    fn zero_difficulty_accepts_first_candidate() {
        let difficulty = Difficulty::new(0).unwrap();
        assert_eq!(find_proof(9, difficulty), 0);
    }

    #[test]
    fn difficulty_bounds() {
        assert!(Difficulty::new(HASH_HEX_SIZE).is_ok());
        assert_eq!(
            Difficulty::new(HASH_HEX_SIZE + 1),
            Err(LedgerError::InvalidDifficulty(HASH_HEX_SIZE + 1))
        );
        assert_eq!(Difficulty::default().zeros(), DEFAULT_DIFFICULTY);
        assert_eq!(Difficulty::default().zero_bits(), 16);
    }

    #[test]
    fn unbounded_search_equals_find_proof() {
        let difficulty = Difficulty::new(2).unwrap();
        let search = ProofSearch::new(difficulty);
        assert_eq!(search.run(55).unwrap(), find_proof(55, difficulty));
    }

    #[test]
    fn search_exhausts_attempts() {
        // 64 zero hex digits is never hit in practice.
        let search = ProofSearch::new(Difficulty::new(HASH_HEX_SIZE).unwrap()).max_attempts(500);
        assert_eq!(
            search.run(1),
            Err(LedgerError::SearchExhausted { attempts: 500 })
        );
    }

    #[test]
    fn search_with_enough_attempts_finds_proof() {
        let difficulty = Difficulty::new(2).unwrap();
        let expected = find_proof(3, difficulty);
        let search = ProofSearch::new(difficulty).max_attempts(expected + 1);
        assert_eq!(search.run(3), Ok(expected));
        let short = ProofSearch::new(difficulty).max_attempts(expected);
        assert!(short.run(3).is_err());
    }

    #[test]
    fn search_stops_when_cancelled() {
        let flag = CancelFlag::new();
        flag.trigger();
        let search = ProofSearch::new(Difficulty::new(HASH_HEX_SIZE).unwrap()).cancel_on(flag);
        assert_eq!(
            search.run(1),
            Err(LedgerError::SearchCancelled { attempts: 0 })
        );
    }

    #[test]
    fn cancel_from_another_thread() {
        let flag = CancelFlag::new();
        let search =
            ProofSearch::new(Difficulty::new(HASH_HEX_SIZE).unwrap()).cancel_on(flag.clone());
        let worker = std::thread::spawn(move || search.run(1));
        std::thread::sleep(std::time::Duration::from_millis(20));
        flag.trigger();
        let result = worker.join().unwrap();
        assert!(matches!(result, Err(LedgerError::SearchCancelled { .. })));
    }
}
