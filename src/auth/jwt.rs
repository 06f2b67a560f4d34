//! Minimal JWT inspection — reads the `exp` claim without verifying the signature.
//!
//! Only used to decide whether to refresh proactively; the backend remains the
//! authority on token validity.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Expiry of a JWT, or `None` if the token is not a decodable JWT with `exp`.
pub fn expires_at(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    Utc.timestamp_opt(claims.exp?, 0).single()
}

/// Whether the token is expired at `now`. Undecodable tokens count as expired.
pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    expires_at(token).map_or(true, |exp| exp <= now)
}

pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now())
}

#[cfg(test)]
pub(crate) fn encode_for_test(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"token_type":"access","exp":{}}}"#, exp));
    format!("{}.{}.signature", header, payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_exp_claim() {
        let token = encode_for_test(1_700_000_000);
        assert_eq!(expires_at(&token).unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_expiry_relative_to_now() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert!(!is_expired_at(&encode_for_test(1_700_000_060), now));
        assert!(is_expired_at(&encode_for_test(1_699_999_999), now));
    }

    #[test]
    fn test_garbage_counts_as_expired() {
        assert!(expires_at("A1").is_none());
        assert!(is_expired("not.a-jwt.at-all"));
    }
}
