use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("proof {proof} is not valid against last proof {last_proof}")]
    InvalidProof { last_proof: u64, proof: u64 },

    #[error("block {index} links to {found}, expected {expected}")]
    BrokenLink {
        index: u64,
        expected: String,
        found: String,
    },

    #[error("block at position {position} carries index {index}")]
    NonContiguousIndex { position: usize, index: u64 },

    #[error("genesis block is malformed")]
    InvalidGenesis,

    #[error("chain is empty")]
    EmptyChain,

    #[error("difficulty {0} exceeds the digest length")]
    InvalidDifficulty(usize),

    #[error("no valid proof within {attempts} attempts")]
    SearchExhausted { attempts: u64 },

    #[error("proof search cancelled after {attempts} attempts")]
    SearchCancelled { attempts: u64 },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
