//! In-memory HTTP front end for a single [`Ledger`].

pub mod constants;
pub mod error;
pub mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use ledger_core::Ledger;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Mutex<Ledger>>,
    /// Recipient of the mining reward.
    pub node_id: String,
}

impl AppState {
    pub fn new(ledger: Ledger, node_id: impl Into<String>) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(ledger)),
            node_id: node_id.into(),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/healthz", get(routes::health))
        .route("/chain", get(routes::full_chain))
        .route("/chain/head", get(routes::head))
        .route("/chain/validate", get(routes::validate))
        .route("/transactions/pending", get(routes::pending))
        .route("/transactions/new", post(routes::new_transaction))
        .route("/mine", post(routes::mine))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
