use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

pub mod chain;
pub mod constants;
pub mod error;
pub mod mine;
pub mod pow;

pub use chain::Ledger;
pub use error::LedgerError;
pub use pow::{CancelFlag, Difficulty, ProofSearch};

pub type Hash = [u8; 32];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: i64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: i64) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    /// Seconds since the Unix epoch, with sub-second precision.
    pub timestamp: f64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

impl Block {
    /// Build a block stamped with the current wall-clock time.
    pub fn new(
        index: u64,
        transactions: Vec<Transaction>,
        proof: u64,
        previous_hash: impl Into<String>,
    ) -> Self {
        Self {
            index,
            timestamp: now_secs(),
            transactions,
            proof,
            previous_hash: previous_hash.into(),
        }
    }

    /// JSON encoding with object keys sorted by name at every level.
    ///
    /// # Panics
    ///
    /// Only if serde_json refuses the block, which the derived impls never do.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let value = serde_json::to_value(self).expect("block encodes as json");
        serde_json::to_vec(&sorted(value)).expect("json value encodes")
    }

    /// Lowercase hex SHA-256 of [`Block::canonical_bytes`].
    pub fn hash(&self) -> String {
        hex::encode(sha256(&self.canonical_bytes()))
    }
}

// Rebuild objects in key order so the output does not depend on serde_json's
// map backend (`preserve_order` keeps insertion order).
fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut out = Map::with_capacity(entries.len());
            for (key, inner) in entries {
                out.insert(key, sorted(inner));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}

pub fn sha256(bytes: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..]);
    out
}

pub fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::HASH_HEX_SIZE;

    fn sample_txs() -> Vec<Transaction> {
        vec![
            Transaction::new("alice", "bob", 10),
            Transaction::new("bob", "carol", 5),
        ]
    }

    #[test]
    fn transaction_serialization_example() {
        let tx = Transaction::new("alice", "bob", 10);
        let json = serde_json::to_string(&tx).unwrap();
        let expected_json = r#"{"sender":"alice","recipient":"bob","amount":10}"#;
        assert_eq!(json, expected_json);
        let deserialized: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(tx, deserialized);
    }

    #[test]
    fn canonical_bytes_sort_keys() {
        let block = Block {
            index: 2,
            timestamp: 1_600_000_000.5,
            transactions: vec![Transaction::new("alice", "bob", -3)],
            proof: 35_293,
            previous_hash: "abc".to_string(),
        };
        let json = String::from_utf8(block.canonical_bytes()).unwrap();
        let expected = r#"{"index":2,"previous_hash":"abc","proof":35293,"timestamp":1600000000.5,"transactions":[{"amount":-3,"recipient":"bob","sender":"alice"}]}"#;
        assert_eq!(json, expected);
    }

    #[test]
    fn block_hash_is_sha256_of_canonical_bytes() {
        let mut block = Block::new(1, sample_txs(), 100, "1");
        block.timestamp = 1_600_000_200.0;
        let expected = hex::encode(Sha256::digest(block.canonical_bytes()));
        let hash = block.hash();
        assert_eq!(hash, expected);
        assert_eq!(hash.len(), HASH_HEX_SIZE);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn block_equality_independent_construction() {
        // Same values, fields assigned in a different order.
        let block1 = Block {
            index: 3,
            timestamp: 1_600_000_000.25,
            transactions: sample_txs(),
            proof: 7,
            previous_hash: "prev".to_string(),
        };
        let block2 = Block {
            previous_hash: "prev".to_string(),
            proof: 7,
            transactions: sample_txs(),
            timestamp: 1_600_000_000.25,
            index: 3,
        };
        assert_eq!(block1.hash(), block2.hash());
    }

    #[test]
    fn block_hash_survives_json_roundtrip() {
        let block = Block::new(4, sample_txs(), 99, "prev");
        let json = serde_json::to_string(&block).unwrap();
        let decoded: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(block.hash(), decoded.hash());
    }

    #[test]
    fn block_hash_changes_with_proof() {
        let mut block = Block::new(2, sample_txs(), 0, "prev");
        block.timestamp = 1_600_000_200.0;
        let hash1 = block.hash();
        block.proof += 1;
        let hash2 = block.hash();
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn block_hash_changes_with_transaction_order() {
        let mut block = Block::new(2, sample_txs(), 0, "prev");
        block.timestamp = 1_600_000_200.0;
        let hash1 = block.hash();
        block.transactions.reverse();
        assert_ne!(hash1, block.hash());
    }

    #[test]
    fn block_new_stamps_current_time() {
        let before = now_secs();
        let block = Block::new(1, vec![], 100, "1");
        assert!(block.timestamp >= before);
        assert!(block.timestamp > 0.0);
    }
}
