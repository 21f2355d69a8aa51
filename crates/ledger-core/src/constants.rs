pub const BITS_PER_HEX_DIGIT: usize = 4;
pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;

/// Leading `'0'` hex characters a proof hash must carry by default.
pub const DEFAULT_DIFFICULTY: usize = 4;

pub const GENESIS_INDEX: u64 = 1;
pub const GENESIS_PROOF: u64 = 100;
pub const GENESIS_PREVIOUS_HASH: &str = "1";
