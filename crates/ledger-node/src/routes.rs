use axum::{extract::State, http::StatusCode, Json};
use ledger_core::{mine::find_proof_parallel, pow, Block, LedgerError, Transaction};
use serde::{Deserialize, Serialize};
use tokio::task;
use tracing::info;

use crate::constants::{MINING_REWARD, REWARD_SENDER};
use crate::error::ApiError;
use crate::AppState;

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct FullChain {
    pub chain: Vec<Block>,
    pub length: usize,
}

#[derive(Serialize)]
pub struct Head {
    pub height: u64,
    pub hash: String,
    pub last_block: Block,
}

#[derive(Deserialize)]
pub struct TxIn {
    pub sender: String,
    pub recipient: String,
    pub amount: i64,
}

#[derive(Serialize)]
pub struct TxAccepted {
    pub message: String,
    pub index: u64,
}

#[derive(Serialize)]
pub struct Mined {
    pub message: &'static str,
    #[serde(flatten)]
    pub block: Block,
}

#[derive(Serialize)]
pub struct Validation {
    pub valid: bool,
    pub error: Option<String>,
}

/// GET /health
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// GET /chain
pub async fn full_chain(State(state): State<AppState>) -> Json<FullChain> {
    let ledger = state.ledger.lock().await;
    Json(FullChain {
        chain: ledger.chain().to_vec(),
        length: ledger.len(),
    })
}

/// GET /chain/head
pub async fn head(State(state): State<AppState>) -> Json<Head> {
    let ledger = state.ledger.lock().await;
    let last = ledger.last_block();
    Json(Head {
        height: last.index,
        hash: last.hash(),
        last_block: last.clone(),
    })
}

/// GET /chain/validate
pub async fn validate(State(state): State<AppState>) -> Json<Validation> {
    let ledger = state.ledger.lock().await;
    let result = ledger.validate_chain();
    Json(Validation {
        valid: result.is_ok(),
        error: result.err().map(|e| e.to_string()),
    })
}

/// GET /transactions/pending
pub async fn pending(State(state): State<AppState>) -> Json<Vec<Transaction>> {
    Json(state.ledger.lock().await.pending().to_vec())
}

/// POST /transactions/new
pub async fn new_transaction(
    State(state): State<AppState>,
    Json(tx): Json<TxIn>,
) -> (StatusCode, Json<TxAccepted>) {
    let index = state
        .ledger
        .lock()
        .await
        .submit_transaction(tx.sender, tx.recipient, tx.amount);
    (
        StatusCode::CREATED,
        Json(TxAccepted {
            message: format!("Transaction will be added to Block {index}"),
            index,
        }),
    )
}

/// POST /mine
///
/// The search runs on the blocking pool without holding the ledger lock.
pub async fn mine(State(state): State<AppState>) -> Result<Json<Mined>, ApiError> {
    let (last_proof, difficulty) = {
        let ledger = state.ledger.lock().await;
        (ledger.last_block().proof, ledger.difficulty())
    };

    let proof = task::spawn_blocking(move || find_proof_parallel(last_proof, difficulty)).await?;

    let mut ledger = state.ledger.lock().await;
    let current = ledger.last_block().proof;
    // Check before queueing the reward so a lost race leaves pending untouched.
    if !pow::is_valid(current, proof, difficulty) {
        return Err(LedgerError::InvalidProof {
            last_proof: current,
            proof,
        }
        .into());
    }
    ledger.submit_transaction(REWARD_SENDER, state.node_id.clone(), MINING_REWARD);
    let block = ledger.seal_block(proof, None)?;
    info!(index = block.index, node = %state.node_id, "forged block");

    Ok(Json(Mined {
        message: "New Block Forged",
        block,
    }))
}
