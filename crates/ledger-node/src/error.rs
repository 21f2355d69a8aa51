use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ledger_core::LedgerError;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("proof search did not complete: {0}")]
    Search(#[from] JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            // another block was sealed while the proof was being searched
            ApiError::Ledger(LedgerError::InvalidProof { .. }) => StatusCode::CONFLICT,
            ApiError::Ledger(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Search(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{self}");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
