use std::env;

use dotenvy::dotenv;
use thiserror::Error;

/// Environment-backed configuration: the dashboard only needs to know
/// where the REST API lives, where the public web app lives, and what
/// address the transfer endpoint should listen on.
#[derive(Clone)]
pub struct Config {
    api_base_url: String,
    web_app_url: String,
    listen_addr: String,
}

impl Config {
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }
    pub fn web_app_url(&self) -> &str {
        &self.web_app_url
    }
    pub fn listen_addr(&self) -> &str {
        &self.listen_addr
    }

    pub fn default() -> Result<Self, ConfigError> {
        // Load .env in dev; no-op in prod if not present.
        let _ = dotenv();

        let api_base_url = req_var("API_BASE_URL")?;
        let web_app_url = req_var("WEB_APP_URL")?;
        let listen_addr = opt_var("LISTEN_ADDR").unwrap_or_else(|| "0.0.0.0:3000".into());

        if api_base_url.is_empty() {
            return Err(ConfigError::Invalid("API_BASE_URL"));
        }
        if web_app_url.is_empty() {
            return Err(ConfigError::Invalid("WEB_APP_URL"));
        }

        Ok(Self {
            api_base_url,
            web_app_url,
            listen_addr,
        })
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing env var {0}")]
    Missing(&'static str),
    #[error("invalid env var {0}")]
    Invalid(&'static str),
}

fn req_var(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn opt_var(key: &str) -> Option<String> {
    env::var(key).ok()
}
