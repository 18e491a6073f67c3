//! Authenticated REST client.
//!
//! Every request goes through two interception phases. Request phase:
//! when the stored token is expiring soon, refresh it first and send
//! the new one; a failed proactive refresh does not block the request,
//! which proceeds with the stale token. Response phase: a single 401 is
//! recoverable (one coalesced refresh, one retry); a 401 on the retried
//! request is terminal and invalidates the session. Requests are never
//! retried more than once.
//!
//! Refresh traffic itself never passes through this client; it goes
//! straight to the auth backend, so the refresh exclusion in both
//! phases holds structurally.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::errors::{ApiError, SessionError};
use crate::services::SessionManager;
use crate::utils::token::is_expiring_soon;
use crate::utils::Config;

/// Explicit response classification instead of retry-via-exception.
enum RequestOutcome {
    Success(reqwest::Response),
    /// First 401 on this request: refresh once and retry.
    RecoverableUnauthorized,
    /// Terminal for this request; `ApiError::Unauthorized` is also
    /// terminal for the session.
    Fatal(ApiError),
}

fn classify(response: reqwest::Response, already_retried: bool) -> RequestOutcome {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        if already_retried {
            RequestOutcome::Fatal(ApiError::Unauthorized)
        } else {
            RequestOutcome::RecoverableUnauthorized
        }
    } else if status.is_success() {
        RequestOutcome::Success(response)
    } else {
        RequestOutcome::Fatal(ApiError::Status(status))
    }
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionManager>,
}

impl ApiClient {
    pub fn new(config: &Config, session: Arc<SessionManager>) -> Result<Self, ApiError> {
        Self::with_base_url(config.api_base_url(), session)
    }

    pub fn with_base_url(base_url: &str, session: Arc<SessionManager>) -> Result<Self, ApiError> {
        // Cookie store so the HTTP-only refresh cookie travels with
        // credentialed requests, like the browser client it replaces.
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            session,
        })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(Method::GET, path, None).await?;
        Self::decode(response).await
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)?;
        let response = self.send(Method::POST, path, Some(body)).await?;
        Self::decode(response).await
    }

    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)?;
        let response = self.send(Method::PUT, path, Some(body)).await?;
        Self::decode(response).await
    }

    pub async fn post_unit<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let body = serde_json::to_value(body)?;
        self.send(Method::POST, path, Some(body)).await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(Method::DELETE, path, None).await?;
        Ok(())
    }

    /// Issue one request through both interception phases.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<reqwest::Response, ApiError> {
        // Request phase: proactive refresh for an expiring token. A
        // failure here keeps the stale token on the request and falls
        // through to the 401 path rather than blocking.
        let mut token = self.session.access_token().await;
        if let Some(current) = token.clone() {
            if is_expiring_soon(&current, self.session.now_millis()) {
                match self.session.refresh_if_needed().await {
                    Ok(_) => token = self.session.access_token().await,
                    Err(err) => {
                        log::warn!("proactive refresh failed, sending with stale token: {err}")
                    }
                }
            }
        }

        let first = self
            .execute(&method, path, body.as_ref(), token.as_deref())
            .await?;

        match classify(first, false) {
            RequestOutcome::Success(response) => Ok(response),
            RequestOutcome::Fatal(err) => Err(err),
            RequestOutcome::RecoverableUnauthorized => {
                if self
                    .session
                    .refresh_after_unauthorized(token.as_deref())
                    .await
                    .is_err()
                {
                    // The manager already cleared the session.
                    return Err(ApiError::Unauthorized);
                }

                let fresh = self.session.access_token().await;
                let second = self
                    .execute(&method, path, body.as_ref(), fresh.as_deref())
                    .await?;

                match classify(second, true) {
                    RequestOutcome::Success(response) => Ok(response),
                    RequestOutcome::RecoverableUnauthorized => {
                        unreachable!("retried requests never classify as recoverable")
                    }
                    RequestOutcome::Fatal(err) => {
                        if matches!(err, ApiError::Unauthorized) {
                            self.session
                                .invalidate(SessionError::UnauthorizedAfterRefresh)
                                .await;
                        }
                        Err(err)
                    }
                }
            }
        }
    }

    async fn execute(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<reqwest::Response, ApiError> {
        let mut request = self.http.request(method.clone(), self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
