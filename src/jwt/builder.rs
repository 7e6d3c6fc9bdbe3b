//! Token assembly and signing.
//!
//! # Data Flow
//! ```text
//! header + claims
//!     → JsonProvider::to_json (both)
//!     → CryptoProvider::base64url_encode (both)
//!     → signing input "h.p"
//!     → CryptoProvider::sign(alg, kid, input)
//!     → "h.p." + base64url(signature)
//! ```

use super::alg::JwtAlg;
use super::claims::{get_str, ClaimMap, ClaimValue, HeaderMap};
use super::engine::Jwt;
use super::error::{ErrorCode, JwtError, JwtResult};
use crate::observability::metrics;

/// Draft token bound to an engine. Header starts as `alg=HS256`, `typ=JWT`.
#[derive(Clone)]
pub struct TokenBuilder<'j> {
    jwt: &'j Jwt,
    header: HeaderMap,
    claims: ClaimMap,
}

impl<'j> TokenBuilder<'j> {
    pub(crate) fn new(jwt: &'j Jwt) -> Self {
        let mut header = HeaderMap::new();
        header.insert("alg".to_string(), JwtAlg::HS256.as_str().into());
        header.insert("typ".to_string(), "JWT".into());
        Self {
            jwt,
            header,
            claims: ClaimMap::new(),
        }
    }

    pub fn alg(mut self, alg: JwtAlg) -> Self {
        self.header.insert("alg".to_string(), alg.as_str().into());
        self
    }

    pub fn kid(mut self, kid: impl Into<String>) -> Self {
        self.header.insert("kid".to_string(), ClaimValue::Text(kid.into()));
        self
    }

    pub fn typ(mut self, typ: impl Into<String>) -> Self {
        self.header.insert("typ".to_string(), ClaimValue::Text(typ.into()));
        self
    }

    /// Set an arbitrary claim, replacing any previous value.
    pub fn claim(mut self, name: impl Into<String>, value: impl Into<ClaimValue>) -> Self {
        self.claims.insert(name.into(), value.into());
        self
    }

    pub fn issuer(self, value: impl Into<String>) -> Self {
        self.claim("iss", ClaimValue::Text(value.into()))
    }

    pub fn subject(self, value: impl Into<String>) -> Self {
        self.claim("sub", ClaimValue::Text(value.into()))
    }

    pub fn audience(self, value: impl Into<String>) -> Self {
        self.claim("aud", ClaimValue::Text(value.into()))
    }

    pub fn jwt_id(self, value: impl Into<String>) -> Self {
        self.claim("jti", ClaimValue::Text(value.into()))
    }

    pub fn expires_at(self, epoch_seconds: i64) -> Self {
        self.claim("exp", epoch_seconds)
    }

    pub fn not_before(self, epoch_seconds: i64) -> Self {
        self.claim("nbf", epoch_seconds)
    }

    pub fn issued_at(self, epoch_seconds: i64) -> Self {
        self.claim("iat", epoch_seconds)
    }

    /// Produce the compact token. Any provider error aborts with no output.
    pub fn sign(&self) -> JwtResult<String> {
        let alg_text = get_str(&self.header, "alg").ok_or_else(|| {
            JwtError::new(ErrorCode::UnsupportedAlg, "Missing algorithm in token header")
        })?;
        let alg = JwtAlg::parse(alg_text).ok_or_else(|| {
            JwtError::new(ErrorCode::UnsupportedAlg, "Unsupported algorithm in token header")
        })?;
        let kid = get_str(&self.header, "kid")
            .ok_or_else(|| JwtError::new(ErrorCode::KeyNotFound, "Missing kid in token header"))?;

        let json = self.jwt.json();
        let crypto = self.jwt.crypto();

        let header_json = json.to_json(&self.header)?;
        let payload_json = json.to_json(&self.claims)?;

        let header_b64 = crypto.base64url_encode(header_json.as_bytes())?;
        let payload_b64 = crypto.base64url_encode(payload_json.as_bytes())?;
        let signing_input = format!("{header_b64}.{payload_b64}");

        let signature = crypto.sign(alg, kid, signing_input.as_bytes())?;
        let signature_b64 = crypto.base64url_encode(&signature)?;

        tracing::debug!(alg = %alg, kid = %kid, claims = self.claims.len(), "Token signed");
        metrics::record_token_signed(alg);

        Ok(format!("{signing_input}.{signature_b64}"))
    }

    pub fn header(&self) -> &HeaderMap {
        &self.header
    }

    pub fn claims(&self) -> &ClaimMap {
        &self.claims
    }

    pub fn clear_claims(&mut self) {
        self.claims.clear();
    }
}
