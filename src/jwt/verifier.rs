//! Ordered, fail-fast token verification.
//!
//! # Data Flow
//! ```text
//! "h.p.s"
//!     → split (exactly two dots)            InvalidFormat
//!     → base64url decode h, p, s            provider error (InvalidBase64Url)
//!     → UTF-8 + JsonProvider parse h, p     InvalidJson / provider error
//!     → alg present and known               UnsupportedAlg
//!     → alg allowed by policy               UnsupportedAlg
//!     → kid present                         KeyNotFound
//!     → CryptoProvider::verify("h.p", s)    provider error
//!     → validate_policy(claims, now)        InvalidIssuer .. NotYetValid
//! ```
//!
//! # Design Decisions
//! - The signature covers the original encoded text, never re-encoded JSON
//! - On failure the result keeps whatever was decoded so far

use super::alg::JwtAlg;
use super::claims::{get_str, ClaimMap, ClaimValue, HeaderMap};
use super::engine::Jwt;
use super::error::{ErrorCode, JwtError, JwtResult};
use super::policy::{now_epoch_seconds, validate_policy};
use crate::observability::metrics;

/// Outcome of one `Jwt::verify` call. Read-only once returned.
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    ok: bool,
    error: Option<JwtError>,
    raw_token: String,
    raw_header_json: String,
    raw_payload_json: String,
    header: HeaderMap,
    claims: ClaimMap,
}

impl Verification {
    fn new(token: &str) -> Self {
        Self {
            ok: false,
            error: None,
            raw_token: token.to_string(),
            raw_header_json: String::new(),
            raw_payload_json: String::new(),
            header: HeaderMap::new(),
            claims: ClaimMap::new(),
        }
    }

    pub fn ok(&self) -> bool {
        self.ok
    }

    /// `ErrorCode::Ok` on success.
    pub fn code(&self) -> ErrorCode {
        self.error.as_ref().map_or(ErrorCode::Ok, JwtError::code)
    }

    pub fn error(&self) -> Option<&JwtError> {
        self.error.as_ref()
    }

    pub fn raw_token(&self) -> &str {
        &self.raw_token
    }

    pub fn raw_header_json(&self) -> &str {
        &self.raw_header_json
    }

    pub fn raw_payload_json(&self) -> &str {
        &self.raw_payload_json
    }

    pub fn header(&self) -> &HeaderMap {
        &self.header
    }

    pub fn claims(&self) -> &ClaimMap {
        &self.claims
    }

    pub fn has_claim(&self, name: &str) -> bool {
        self.claims.contains_key(name)
    }

    pub fn claim_str(&self, name: &str) -> Option<&str> {
        self.claims.get(name).and_then(ClaimValue::as_str)
    }

    pub fn claim_i64(&self, name: &str) -> Option<i64> {
        self.claims.get(name).and_then(ClaimValue::as_i64)
    }

    pub fn claim_f64(&self, name: &str) -> Option<f64> {
        self.claims.get(name).and_then(ClaimValue::as_f64)
    }

    pub fn claim_bool(&self, name: &str) -> Option<bool> {
        self.claims.get(name).and_then(ClaimValue::as_bool)
    }

    /// Claims on success, the recorded error otherwise.
    pub fn into_result(self) -> JwtResult<ClaimMap> {
        match self.error {
            None if self.ok => Ok(self.claims),
            Some(err) => Err(err),
            None => Err(JwtError::new(ErrorCode::InvalidFormat, "Token was not verified")),
        }
    }
}

impl Jwt {
    /// Verify `token` against the current policy at the current time.
    pub fn verify(&self, token: &str) -> Verification {
        self.verify_at(token, now_epoch_seconds())
    }

    /// Verify `token` with an explicit clock, in seconds since the epoch.
    pub fn verify_at(&self, token: &str, now: i64) -> Verification {
        let mut result = Verification::new(token);

        match self.run_pipeline(token, now, &mut result) {
            Ok(()) => {
                result.ok = true;
                tracing::debug!(kid = ?get_str(&result.header, "kid"), "Token verified");
            }
            Err(err) => {
                tracing::debug!(code = %err.code, reason = %err.message, "Token rejected");
                result.error = Some(err);
            }
        }

        metrics::record_verification(result.code());
        result
    }

    fn run_pipeline(&self, token: &str, now: i64, out: &mut Verification) -> JwtResult<()> {
        let (header_part, payload_part, signature_part) = split_token(token)?;

        let crypto = self.crypto();
        let header_bytes = crypto.base64url_decode(header_part)?;
        let payload_bytes = crypto.base64url_decode(payload_part)?;
        let signature = crypto.base64url_decode(signature_part)?;

        out.raw_header_json = String::from_utf8_lossy(&header_bytes).into_owned();
        out.raw_payload_json = String::from_utf8_lossy(&payload_bytes).into_owned();

        let header_text = std::str::from_utf8(&header_bytes)
            .map_err(|_| JwtError::new(ErrorCode::InvalidJson, "Header is not valid UTF-8"))?;
        let payload_text = std::str::from_utf8(&payload_bytes)
            .map_err(|_| JwtError::new(ErrorCode::InvalidJson, "Payload is not valid UTF-8"))?;

        out.header = self.json().parse_header(header_text)?;
        out.claims = self.json().parse_claims(payload_text)?;

        let alg_text = get_str(&out.header, "alg")
            .ok_or_else(|| JwtError::new(ErrorCode::UnsupportedAlg, "Missing alg header"))?;
        let alg = JwtAlg::parse(alg_text)
            .ok_or_else(|| JwtError::new(ErrorCode::UnsupportedAlg, "Unknown algorithm"))?;

        let policy = &self.options().policy;
        if !policy.allows(alg) {
            return Err(JwtError::new(
                ErrorCode::UnsupportedAlg,
                "Algorithm not allowed by policy",
            ));
        }

        let kid = get_str(&out.header, "kid")
            .ok_or_else(|| JwtError::new(ErrorCode::KeyNotFound, "Missing kid header"))?;

        let signed_len = header_part.len() + 1 + payload_part.len();
        crypto.verify(alg, kid, &token.as_bytes()[..signed_len], &signature)?;

        validate_policy(policy, &out.claims, now)
    }
}

/// Split into exactly three parts on `.`.
fn split_token(token: &str) -> JwtResult<(&str, &str, &str)> {
    let mut parts = token.splitn(4, '.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(payload), Some(signature), None) => Ok((header, payload, signature)),
        (_, _, None, _) => Err(JwtError::new(
            ErrorCode::InvalidFormat,
            "Token must contain 3 parts",
        )),
        _ => Err(JwtError::new(
            ErrorCode::InvalidFormat,
            "Token must contain exactly 3 parts",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_token() {
        assert_eq!(split_token("a.b.c").unwrap(), ("a", "b", "c"));
        assert_eq!(split_token("..").unwrap(), ("", "", ""));
        assert_eq!(split_token("a.b").unwrap_err().code, ErrorCode::InvalidFormat);
        assert_eq!(split_token("abc").unwrap_err().code, ErrorCode::InvalidFormat);
        assert_eq!(split_token("a.b.c.d").unwrap_err().code, ErrorCode::InvalidFormat);
    }

    #[test]
    fn test_unverified_result_defaults() {
        let result = Verification::new("t");
        assert!(!result.ok());
        assert_eq!(result.code(), ErrorCode::Ok);
        assert_eq!(result.raw_token(), "t");
        assert!(result.into_result().is_err());
    }
}
