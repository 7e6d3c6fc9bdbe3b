//! Signing algorithms and key usage.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Algorithm named in a token's `alg` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JwtAlg {
    HS256,
    RS256,
    ES256,
    EdDSA,
}

impl JwtAlg {
    pub fn as_str(&self) -> &'static str {
        match self {
            JwtAlg::HS256 => "HS256",
            JwtAlg::RS256 => "RS256",
            JwtAlg::ES256 => "ES256",
            JwtAlg::EdDSA => "EdDSA",
        }
    }

    /// Exact, case-sensitive header value lookup.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "HS256" => Some(JwtAlg::HS256),
            "RS256" => Some(JwtAlg::RS256),
            "ES256" => Some(JwtAlg::ES256),
            "EdDSA" => Some(JwtAlg::EdDSA),
            _ => None,
        }
    }
}

impl fmt::Display for JwtAlg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Intended use of a public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyUse {
    /// Signing and signature verification.
    #[default]
    Sig,
    /// Reserved for encryption; the engine never requests it.
    Enc,
}
