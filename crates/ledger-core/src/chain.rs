use crate::constants::{GENESIS_INDEX, GENESIS_PREVIOUS_HASH, GENESIS_PROOF};
use crate::error::{LedgerError, Result};
use crate::pow::{self, Difficulty};
use crate::{Block, Transaction};
use tracing::{debug, info, warn};

/// Sealed blocks plus the buffer of transactions waiting for the next one.
///
/// `submit_transaction` and `seal_block` take `&mut self`; share a ledger
/// between tasks behind a mutex.
#[derive(Clone, Debug)]
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
    difficulty: Difficulty,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::with_difficulty(Difficulty::default())
    }

    pub fn with_difficulty(difficulty: Difficulty) -> Self {
        Self {
            chain: vec![genesis_block()],
            pending: Vec::new(),
            difficulty,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Always false: the genesis block is present from construction.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn last_block(&self) -> &Block {
        // chain is seeded with genesis and only ever grows
        &self.chain[self.chain.len() - 1]
    }

    /// Queue a transaction and return the index of the block that will carry it.
    pub fn submit_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: i64,
    ) -> u64 {
        let tx = Transaction::new(sender, recipient, amount);
        debug!(
            sender = %tx.sender,
            recipient = %tx.recipient,
            amount = tx.amount,
            "transaction queued"
        );
        self.pending.push(tx);
        self.last_block().index + 1
    }

    /// Seal the pending transactions into a new block.
    ///
    /// The proof must satisfy [`pow::is_valid`] against the last block's proof.
    /// `previous_hash` overrides the link to the last block; `None` or an empty
    /// string derives it from [`Block::hash`].
    pub fn seal_block(&mut self, proof: u64, previous_hash: Option<&str>) -> Result<Block> {
        let last = self.last_block();
        if !pow::is_valid(last.proof, proof, self.difficulty) {
            warn!(last_proof = last.proof, proof, "rejected seal with invalid proof");
            return Err(LedgerError::InvalidProof {
                last_proof: last.proof,
                proof,
            });
        }

        let previous_hash = match previous_hash {
            Some(hash) if !hash.is_empty() => hash.to_string(),
            _ => last.hash(),
        };
        let index = self.chain.len() as u64 + 1;
        let block = Block::new(index, std::mem::take(&mut self.pending), proof, previous_hash);

        info!(
            index,
            proof,
            txs = block.transactions.len(),
            "sealed block"
        );
        self.chain.push(block.clone());
        Ok(block)
    }

    /// Canonical hash of any block.
    pub fn hash(block: &Block) -> String {
        block.hash()
    }

    pub fn validate_chain(&self) -> Result<()> {
        Self::valid_chain(&self.chain, self.difficulty)
    }

    /// Check genesis shape, index contiguity, hash links and proofs over `chain`.
    pub fn valid_chain(chain: &[Block], difficulty: Difficulty) -> Result<()> {
        let genesis = chain.first().ok_or(LedgerError::EmptyChain)?;
        if genesis.index != GENESIS_INDEX || genesis.previous_hash != GENESIS_PREVIOUS_HASH {
            return Err(LedgerError::InvalidGenesis);
        }

        for (position, pair) in chain.windows(2).enumerate() {
            let (prev, block) = (&pair[0], &pair[1]);
            if block.index != prev.index + 1 {
                return Err(LedgerError::NonContiguousIndex {
                    position: position + 1,
                    index: block.index,
                });
            }
            let expected = prev.hash();
            if block.previous_hash != expected {
                return Err(LedgerError::BrokenLink {
                    index: block.index,
                    expected,
                    found: block.previous_hash.clone(),
                });
            }
            if !pow::is_valid(prev.proof, block.proof, difficulty) {
                return Err(LedgerError::InvalidProof {
                    last_proof: prev.proof,
                    proof: block.proof,
                });
            }
        }
        Ok(())
    }
}

/// Empty block at index 1 with the sentinel link and fixed proof; no work is done for it.
pub fn genesis_block() -> Block {
    Block::new(GENESIS_INDEX, vec![], GENESIS_PROOF, GENESIS_PREVIOUS_HASH)
}
