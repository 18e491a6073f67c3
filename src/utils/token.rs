//! Expiry inspection for access tokens.
//!
//! The dashboard treats the JWT as opaque except for the `exp` claim in
//! its payload segment; no signature verification happens here (that is
//! the backend's job). A token that cannot be decoded at all is treated
//! as already expiring, which funnels it into the refresh path.

use base64::engine::general_purpose::{STANDARD as B64_STD, URL_SAFE_NO_PAD as B64_URL};
use base64::Engine;
use serde::Deserialize;

use super::consts::EXPIRY_MARGIN_MS;

#[derive(Deserialize)]
struct ExpClaim {
    exp: i64,
}

/// Expiry instant in milliseconds since epoch, read from the token's
/// payload segment. `None` when the token is malformed.
pub fn token_expiry_millis(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = decode_b64_any(payload)?;
    let claims: ExpClaim = serde_json::from_slice(&bytes).ok()?;
    claims.exp.checked_mul(1000)
}

pub fn is_expiring_soon(token: &str, now_millis: i64) -> bool {
    match token_expiry_millis(token) {
        Some(expiry) => now_millis >= expiry - EXPIRY_MARGIN_MS,
        None => true,
    }
}

fn decode_b64_any(segment: &str) -> Option<Vec<u8>> {
    // JWT payloads are url-safe unpadded, but tolerate standard base64.
    B64_URL
        .decode(segment)
        .or_else(|_| B64_STD.decode(segment))
        .ok()
}
