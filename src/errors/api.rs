use axum::http::StatusCode;
use thiserror::Error;

use crate::validation::PostFormErrors;

/// Errors surfaced to callers of the REST client and the typed services
/// built on it. Transport and status failures are inline page-level
/// errors; `Unauthorized` is terminal for the session (storage has been
/// cleared by the time it is returned).
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("session is no longer authorized")]
    Unauthorized,
}

/// Errors from the auth endpoints themselves (login/refresh/logout).
#[derive(Error, Debug)]
pub enum AuthApiError {
    #[error("auth request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("refresh cookie rejected")]
    Unauthorized,

    #[error("malformed auth response")]
    Malformed,
}

/// Saving a post can fail locally (field validation, never networked)
/// or remotely (the REST call itself).
#[derive(Error, Debug)]
pub enum SavePostError {
    #[error(transparent)]
    Invalid(#[from] PostFormErrors),

    #[error(transparent)]
    Api(#[from] ApiError),
}
