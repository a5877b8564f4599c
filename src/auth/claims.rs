//! Local decoding of the session token's claims.
//!
//! The backend issues compact JWS tokens. The client never verifies the
//! signature - the server already authenticated the credentials - it only
//! reads the payload to re-check the role claim before granting UI access
//! and to derive a session expiry.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClaimsError {
    #[error("Token is not a three-part compact JWS")]
    Malformed,

    #[error("Token payload is not valid base64url: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("Token payload is not valid JSON: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Claims embedded in the session token payload.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub role: Option<String>,
    /// Expiry as seconds since the Unix epoch, when the issuer set one.
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Decode the payload segment of a compact JWS token.
pub fn decode(token: &str) -> Result<TokenClaims, ClaimsError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(ClaimsError::Malformed);
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
pub(crate) fn encode_for_test(payload: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
    format!("{}.{}.sig", header, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_role_and_exp() {
        let token = encode_for_test(&serde_json::json!({
            "role": "ADMIN",
            "exp": 1750000000,
            "email": "admin@example.com"
        }));

        let claims = decode(&token).unwrap();
        assert_eq!(claims.role.as_deref(), Some("ADMIN"));
        assert_eq!(claims.exp, Some(1750000000));
    }

    #[test]
    fn test_decode_missing_optional_claims() {
        let token = encode_for_test(&serde_json::json!({ "sub": "42" }));
        let claims = decode(&token).unwrap();
        assert!(claims.role.is_none());
        assert!(claims.exp.is_none());
    }

    #[test]
    fn test_decode_rejects_wrong_segment_count() {
        assert!(matches!(decode("onlyonepart"), Err(ClaimsError::Malformed)));
        assert!(matches!(decode("two.parts"), Err(ClaimsError::Malformed)));
        assert!(matches!(decode("a.b.c.d"), Err(ClaimsError::Malformed)));
    }

    #[test]
    fn test_decode_rejects_bad_encoding() {
        assert!(matches!(
            decode("head.!!!notbase64!!!.sig"),
            Err(ClaimsError::Encoding(_))
        ));
    }

    #[test]
    fn test_decode_rejects_non_json_payload() {
        let payload = URL_SAFE_NO_PAD.encode(b"not json at all");
        let token = format!("head.{}.sig", payload);
        assert!(matches!(decode(&token), Err(ClaimsError::Payload(_))));
    }
}
