use reqwest::StatusCode;

use crate::domain::AuthResponse;
use crate::errors::AuthApiError;
use crate::utils::Config;

/// The auth endpoints of the backend REST API. Behind a trait so the
/// session manager can be exercised against a scripted fake.
#[async_trait::async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthApiError>;

    /// Exchange the HTTP-only refresh cookie for a fresh user + access
    /// token pair.
    async fn refresh(&self) -> Result<AuthResponse, AuthApiError>;

    async fn logout(&self) -> Result<(), AuthApiError>;
}

/// reqwest-backed implementation. The client keeps a cookie store so
/// the refresh cookie set by the backend flows with every auth call.
pub struct HttpAuthBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAuthBackend {
    pub fn new(config: &Config) -> Result<Self, AuthApiError> {
        Self::with_base_url(config.api_base_url())
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, AuthApiError> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn auth_response(&self, response: reqwest::Response) -> Result<AuthResponse, AuthApiError> {
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(AuthApiError::Unauthorized);
        }
        let response = response.error_for_status()?;
        response
            .json::<AuthResponse>()
            .await
            .map_err(|_| AuthApiError::Malformed)
    }
}

#[async_trait::async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthApiError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&body)
            .send()
            .await?;
        self.auth_response(response).await
    }

    async fn refresh(&self) -> Result<AuthResponse, AuthApiError> {
        let response = self.http.post(self.url("/auth/refresh")).send().await?;
        self.auth_response(response).await
    }

    async fn logout(&self) -> Result<(), AuthApiError> {
        self.http
            .post(self.url("/auth/logout"))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
