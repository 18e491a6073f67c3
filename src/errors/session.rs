use thiserror::Error;

/// Fatal session failures. Whenever one of these surfaces, persisted
/// session state has already been cleared and the caller is expected to
/// navigate to the error route; protected content must not render.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("no persisted session")]
    NoSession,

    #[error("stored user is not valid JSON")]
    MalformedUser,

    #[error("stored user does not have the author role")]
    ForbiddenRole,

    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("login failed: {0}")]
    LoginFailed(String),

    #[error("request unauthorized even after a refreshed retry")]
    UnauthorizedAfterRefresh,
}
