use serde::{Deserialize, Serialize};

use super::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Lenient parse used at the transfer boundary: anything other than
    /// "dark" falls back to light.
    pub fn parse(value: Option<&str>) -> Theme {
        match value {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// The in-memory view of a persisted session. Created on login or
/// cross-app transfer, replaced on every refresh, destroyed on logout
/// or an irrecoverable auth failure.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: User,
    pub access_token: String,
    pub theme: Theme,
}

/// Body of `POST /auth/login` and `POST /auth/refresh` responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    #[serde(rename = "accessToken")]
    pub access_token: String,
}
