use axum::response::{IntoResponse, Redirect};
use thiserror::Error;

use crate::utils::consts::ERROR_PATH;

/// Failures while accepting a cross-app session handoff. All of them
/// terminate in a redirect to the error route; none of them leak the
/// rejected payload back to the client.
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("transfer request missing token or user parameter")]
    MissingParams,

    #[error("transfer user payload is not valid JSON: {0}")]
    MalformedUser(#[from] serde_json::Error),

    #[error("only authors can access the dashboard")]
    ForbiddenRole,
}

impl IntoResponse for TransferError {
    fn into_response(self) -> axum::response::Response {
        log::warn!("session transfer rejected: {self}");
        Redirect::to(ERROR_PATH).into_response()
    }
}
