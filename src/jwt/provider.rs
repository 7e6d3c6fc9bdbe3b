//! Pluggable backends the engine delegates to.
//!
//! # Design Decisions
//! - The engine never touches key material, files or JSON text directly
//! - Providers are shared as `Arc<dyn ...>` trait objects, so every method
//!   takes `&self`; key stores use interior mutability
//! - Errors a provider returns reach the caller unchanged

use std::path::Path;

use super::alg::{JwtAlg, KeyUse};
use super::claims::{ClaimMap, HeaderMap};
use super::error::JwtResult;

/// Key lifecycle, signatures and the base64url codec.
pub trait CryptoProvider: Send + Sync {
    fn load_private_key_from_pem_file(&self, kid: &str, path: &Path) -> JwtResult<()>;

    fn load_public_key_from_pem_file(&self, kid: &str, path: &Path, key_use: KeyUse)
        -> JwtResult<()>;

    fn load_certificate_from_pem_file(&self, kid: &str, path: &Path) -> JwtResult<()>;

    fn save_private_key_to_pem_file(&self, kid: &str, path: &Path) -> JwtResult<()>;

    fn save_public_key_to_pem_file(&self, kid: &str, path: &Path, key_use: KeyUse)
        -> JwtResult<()>;

    /// Create key material for `kid`. `params` is free-form and provider defined.
    fn generate_key_pair(&self, kid: &str, alg: JwtAlg, params: &str) -> JwtResult<()>;

    fn remove_key(&self, kid: &str) -> JwtResult<()>;

    fn sign(&self, alg: JwtAlg, kid: &str, data: &[u8]) -> JwtResult<Vec<u8>>;

    fn verify(&self, alg: JwtAlg, kid: &str, data: &[u8], signature: &[u8]) -> JwtResult<()>;

    fn base64url_encode(&self, data: &[u8]) -> JwtResult<String>;

    fn base64url_decode(&self, text: &str) -> JwtResult<Vec<u8>>;

    /// The engine asks for key-store mutations to be serialised against
    /// concurrent sign/verify calls. Providers that always serialise can
    /// ignore it.
    fn request_thread_safety(&self, _enabled: bool) {}
}

/// Claim map to and from JSON text.
///
/// Must round-trip all five claim value kinds losslessly.
pub trait JsonProvider: Send + Sync {
    fn parse_header(&self, text: &str) -> JwtResult<HeaderMap>;

    fn parse_claims(&self, text: &str) -> JwtResult<ClaimMap>;

    fn to_json(&self, values: &ClaimMap) -> JwtResult<String>;
}
