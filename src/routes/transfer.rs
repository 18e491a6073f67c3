//! Cross-app session transfer endpoint.
//!
//! The public web app hands an authenticated session to the dashboard
//! through this route: token, serialized user, and theme preference
//! arrive as query parameters, and the response is a small HTML
//! document whose script persists them into the dashboard origin's
//! storage and navigates to the dashboard root.
//!
//! The token and user payload arrive via a URL, which makes this a
//! reflected-injection vector: both are embedded only as JSON string
//! literals with `<` and `>` encoded away, so the emitted document can
//! never grow a premature `</script>` or a nested tag out of them.

use axum::extract::Query;
use axum::http::header;
use axum::response::{Html, IntoResponse};
use serde::Deserialize;

use crate::domain::{Theme, User};
use crate::errors::TransferError;
use crate::utils::consts::{DASHBOARD_PATH, ERROR_PATH};

#[derive(Debug, Deserialize)]
pub struct TransferParams {
    pub token: Option<String>,
    pub user: Option<String>,
    pub theme: Option<String>,
}

pub async fn transfer(
    Query(params): Query<TransferParams>,
) -> Result<impl IntoResponse, TransferError> {
    // Presence checks come before any parsing of the payload.
    let (Some(token), Some(raw_user)) = (params.token.as_deref(), params.user.as_deref()) else {
        return Err(TransferError::MissingParams);
    };

    let user: User = serde_json::from_str(raw_user)?;
    if !user.is_author() {
        return Err(TransferError::ForbiddenRole);
    }

    let theme = Theme::parse(params.theme.as_deref());
    let document = transfer_document(token, raw_user, theme);

    log::info!("session transfer accepted for user {}", user.id);

    Ok((
        // The document embeds a one-time secret; nothing may cache it.
        [(
            header::CACHE_CONTROL,
            "no-store, no-cache, must-revalidate",
        )],
        Html(document),
    ))
}

/// Build the self-executing handoff document. The script clears any
/// prior session, writes the new one under the fixed storage keys,
/// mirrors the theme onto the document element, and navigates to the
/// dashboard; its own failure path lands on the error route.
fn transfer_document(token: &str, raw_user: &str, theme: Theme) -> String {
    let token_literal = js_string_literal(token);
    let user_literal = js_string_literal(raw_user);
    let theme = theme.as_str();

    let script = format!(
        r#"
      try {{
        localStorage.clear();
        localStorage.setItem('accessToken', {token_literal});
        localStorage.setItem('user', {user_literal});
        localStorage.setItem('theme', '{theme}');

        if ('{theme}' === 'dark') {{
          document.documentElement.classList.add('dark');
        }} else {{
          document.documentElement.classList.remove('dark');
        }}

        window.location.href = '{DASHBOARD_PATH}';
      }} catch (err) {{
        console.error('Transfer error:', err);
        window.location.href = '{ERROR_PATH}';
      }}
    "#
    );

    format!(
        "<!DOCTYPE html><html><head><title>Redirecting...</title></head><body><script>{script}</script></body></html>"
    )
}

/// Encode an untrusted value as a JS string literal safe to embed in a
/// `<script>` block: JSON-style escaping plus `<`/`>` encoded so the
/// value cannot terminate the surrounding script element.
fn js_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
