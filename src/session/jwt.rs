//! Local inspection of JWT access tokens. Signatures are not verified.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("token is not a three-part JWT")]
    Malformed,
    #[error("payload is not base64url: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("payload is not a JSON claims object: {0}")]
    Claims(#[from] serde_json::Error),
    #[error("exp claim out of range: {0}")]
    ExpRange(f64),
}

#[derive(Deserialize)]
struct Claims {
    /// NumericDate; fractional seconds are allowed and truncated.
    #[serde(default)]
    exp: Option<f64>,
}

/// The `exp` claim of `token`, if it carries one.
pub fn expires_at(token: &str) -> Result<Option<DateTime<Utc>>, JwtError> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return Err(JwtError::Malformed),
    };
    // Some encoders keep the padding.
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    let claims: Claims = serde_json::from_slice(&bytes)?;
    claims
        .exp
        .map(|exp| {
            exp.is_finite()
                .then(|| DateTime::from_timestamp(exp.trunc() as i64, 0))
                .flatten()
                .ok_or(JwtError::ExpRange(exp))
        })
        .transpose()
}

/// Undecodable tokens count as expired; tokens without `exp` never expire.
pub fn is_expired(token: &str, now: DateTime<Utc>) -> bool {
    match expires_at(token) {
        Ok(Some(exp)) => exp <= now,
        Ok(None) => false,
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::jwt_with_exp;

    #[test]
    fn test_expiry_against_now() {
        let now = Utc::now();
        let past = jwt_with_exp(now.timestamp() - 60);
        let future = jwt_with_exp(now.timestamp() + 3600);

        assert!(is_expired(&past, now));
        assert!(!is_expired(&future, now));
        assert_eq!(
            expires_at(&future).unwrap().map(|t| t.timestamp()),
            Some(now.timestamp() + 3600)
        );
    }

    #[test]
    fn test_garbage_counts_as_expired() {
        let now = Utc::now();
        assert!(is_expired("not-a-jwt", now));
        assert!(is_expired("a.!!!.c", now));
        assert!(matches!(expires_at("a.b"), Err(JwtError::Malformed)));
    }

    #[test]
    fn test_missing_exp_never_expires() {
        let payload = URL_SAFE_NO_PAD.encode(br#"{"user_id":7}"#);
        let token = format!("h.{payload}.s");
        assert_eq!(expires_at(&token).unwrap(), None);
        assert!(!is_expired(&token, Utc::now()));
    }

    #[test]
    fn test_fractional_exp_is_truncated() {
        let now = Utc::now();
        let exp = now.timestamp() + 3600;
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp}.75}}"#));
        let token = format!("h.{payload}.s");
        assert_eq!(expires_at(&token).unwrap().map(|t| t.timestamp()), Some(exp));
        assert!(!is_expired(&token, now));
    }

    #[test]
    fn test_out_of_range_exp_is_rejected() {
        let payload = URL_SAFE_NO_PAD.encode(br#"{"exp":1e300}"#);
        let token = format!("h.{payload}.s");
        assert!(matches!(expires_at(&token), Err(JwtError::ExpRange(_))));
    }
}
