//! HS256 crypto provider.
//!
//! # Responsibilities
//! - Hold one shared secret per `kid`
//! - Generate secrets from the OS random source
//! - Persist secrets as PEM-armoured base64
//! - HMAC-SHA256 sign and constant-time verify
//!
//! # Design Decisions
//! - Symmetric: "private" and "public" files carry the same secret
//! - The key store is a `DashMap`, so mutations are always serialised against
//!   concurrent readers whatever the engine requests
//! - Token parts use unpadded base64url; PEM bodies use standard base64

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use dashmap::DashMap;
use ::hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

use crate::jwt::alg::{JwtAlg, KeyUse};
use crate::jwt::error::{ErrorCode, JwtError, JwtResult};
use crate::jwt::provider::CryptoProvider;

type HmacSha256 = Hmac<Sha256>;

const PEM_BEGIN: &str = "-----BEGIN HMAC SECRET KEY-----";
const PEM_END: &str = "-----END HMAC SECRET KEY-----";
const PEM_LINE: usize = 64;

/// Default and minimum generated secret size (256 bits).
pub const MIN_SECRET_BYTES: usize = 32;

#[derive(Debug, Default)]
pub struct HmacCryptoProvider {
    keys: DashMap<String, Vec<u8>>,
    thread_safe: AtomicBool,
}

impl HmacCryptoProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an existing secret under `kid`.
    pub fn insert_secret(&self, kid: &str, secret: &[u8]) -> JwtResult<()> {
        if secret.is_empty() {
            return Err(JwtError::new(ErrorCode::CryptoError, "HMAC secret is empty"));
        }
        self.keys.insert(kid.to_string(), secret.to_vec());
        Ok(())
    }

    pub fn has_key(&self, kid: &str) -> bool {
        self.keys.contains_key(kid)
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Last value passed to `request_thread_safety`.
    pub fn thread_safety_requested(&self) -> bool {
        self.thread_safe.load(Ordering::Relaxed)
    }

    fn mac_for(&self, alg: JwtAlg, kid: &str) -> JwtResult<HmacSha256> {
        require_hs256(alg)?;
        let secret = self
            .keys
            .get(kid)
            .ok_or_else(|| JwtError::new(ErrorCode::KeyNotFound, format!("Unknown kid '{kid}'")))?;
        HmacSha256::new_from_slice(secret.value())
            .map_err(|e| JwtError::new(ErrorCode::CryptoError, e.to_string()))
    }

    fn load_secret(&self, kid: &str, path: &Path) -> JwtResult<()> {
        let text = fs::read_to_string(path).map_err(|e| io_error("read", path, e))?;
        let secret = decode_pem(&text)?;
        self.insert_secret(kid, &secret)?;
        tracing::debug!(kid = %kid, path = %path.display(), "HMAC secret loaded");
        Ok(())
    }

    fn save_secret(&self, kid: &str, path: &Path) -> JwtResult<()> {
        let pem = {
            let secret = self.keys.get(kid).ok_or_else(|| {
                JwtError::new(ErrorCode::KeyNotFound, format!("Unknown kid '{kid}'"))
            })?;
            encode_pem(secret.value())
        };
        fs::write(path, pem).map_err(|e| io_error("write", path, e))?;
        tracing::debug!(kid = %kid, path = %path.display(), "HMAC secret saved");
        Ok(())
    }
}

impl CryptoProvider for HmacCryptoProvider {
    fn load_private_key_from_pem_file(&self, kid: &str, path: &Path) -> JwtResult<()> {
        self.load_secret(kid, path)
    }

    fn load_public_key_from_pem_file(
        &self,
        kid: &str,
        path: &Path,
        key_use: KeyUse,
    ) -> JwtResult<()> {
        require_sig(key_use)?;
        self.load_secret(kid, path)
    }

    fn load_certificate_from_pem_file(&self, kid: &str, path: &Path) -> JwtResult<()> {
        if !path.is_file() {
            return Err(JwtError::new(
                ErrorCode::CertificateNotFound,
                format!("No certificate at {}", path.display()),
            ));
        }
        Err(JwtError::new(
            ErrorCode::CryptoError,
            format!("HMAC keys have no certificates (kid '{kid}')"),
        ))
    }

    fn save_private_key_to_pem_file(&self, kid: &str, path: &Path) -> JwtResult<()> {
        self.save_secret(kid, path)
    }

    fn save_public_key_to_pem_file(
        &self,
        kid: &str,
        path: &Path,
        key_use: KeyUse,
    ) -> JwtResult<()> {
        require_sig(key_use)?;
        self.save_secret(kid, path)
    }

    /// `params` may be empty or `bytes=<n>` with `n >= 32`.
    fn generate_key_pair(&self, kid: &str, alg: JwtAlg, params: &str) -> JwtResult<()> {
        require_hs256(alg)?;
        let size = secret_size(params)?;

        let mut secret = vec![0u8; size];
        OsRng
            .try_fill_bytes(&mut secret)
            .map_err(|e| JwtError::new(ErrorCode::CryptoError, e.to_string()))?;
        self.keys.insert(kid.to_string(), secret);

        tracing::info!(kid = %kid, bytes = size, "HMAC secret generated");
        Ok(())
    }

    fn remove_key(&self, kid: &str) -> JwtResult<()> {
        if self.keys.remove(kid).is_some() {
            tracing::debug!(kid = %kid, "HMAC secret removed");
        }
        Ok(())
    }

    fn sign(&self, alg: JwtAlg, kid: &str, data: &[u8]) -> JwtResult<Vec<u8>> {
        let mut mac = self.mac_for(alg, kid)?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn verify(&self, alg: JwtAlg, kid: &str, data: &[u8], signature: &[u8]) -> JwtResult<()> {
        let mut mac = self.mac_for(alg, kid)?;
        mac.update(data);
        mac.verify_slice(signature)
            .map_err(|_| JwtError::new(ErrorCode::SignatureMismatch, "Signature mismatch"))
    }

    fn base64url_encode(&self, data: &[u8]) -> JwtResult<String> {
        Ok(URL_SAFE_NO_PAD.encode(data))
    }

    fn base64url_decode(&self, text: &str) -> JwtResult<Vec<u8>> {
        URL_SAFE_NO_PAD
            .decode(text)
            .map_err(|e| JwtError::new(ErrorCode::InvalidBase64Url, e.to_string()))
    }

    fn request_thread_safety(&self, enabled: bool) {
        self.thread_safe.store(enabled, Ordering::Relaxed);
    }
}

fn require_hs256(alg: JwtAlg) -> JwtResult<()> {
    match alg {
        JwtAlg::HS256 => Ok(()),
        other => Err(JwtError::new(
            ErrorCode::UnsupportedAlg,
            format!("HMAC provider cannot handle {other}"),
        )),
    }
}

fn require_sig(key_use: KeyUse) -> JwtResult<()> {
    match key_use {
        KeyUse::Sig => Ok(()),
        KeyUse::Enc => Err(JwtError::new(
            ErrorCode::CryptoError,
            "HMAC secrets cannot be used for encryption",
        )),
    }
}

fn secret_size(params: &str) -> JwtResult<usize> {
    let params = params.trim();
    if params.is_empty() {
        return Ok(MIN_SECRET_BYTES);
    }

    let size = params
        .strip_prefix("bytes=")
        .and_then(|n| n.trim().parse::<usize>().ok())
        .ok_or_else(|| {
            JwtError::new(ErrorCode::CryptoError, format!("Unrecognised key parameters '{params}'"))
        })?;

    if size < MIN_SECRET_BYTES {
        return Err(JwtError::new(
            ErrorCode::CryptoError,
            format!("HMAC secret must be at least {MIN_SECRET_BYTES} bytes"),
        ));
    }
    Ok(size)
}

fn io_error(action: &str, path: &Path, err: std::io::Error) -> JwtError {
    tracing::warn!(path = %path.display(), error = %err, "Key file {action} failed");
    JwtError::new(
        ErrorCode::IOError,
        format!("Cannot {action} {}: {err}", path.display()),
    )
}

fn encode_pem(secret: &[u8]) -> String {
    let body = STANDARD.encode(secret);
    let mut pem = String::with_capacity(body.len() + PEM_BEGIN.len() + PEM_END.len() + 8);
    pem.push_str(PEM_BEGIN);
    pem.push('\n');
    // Base64 output is ASCII, so byte chunks are valid UTF-8.
    for line in body.as_bytes().chunks(PEM_LINE) {
        pem.push_str(&String::from_utf8_lossy(line));
        pem.push('\n');
    }
    pem.push_str(PEM_END);
    pem.push('\n');
    pem
}

fn decode_pem(text: &str) -> JwtResult<Vec<u8>> {
    let malformed = || JwtError::new(ErrorCode::CryptoError, "Malformed HMAC PEM file");

    let after_begin = text.split_once(PEM_BEGIN).ok_or_else(malformed)?.1;
    let body = after_begin.split_once(PEM_END).ok_or_else(malformed)?.0;
    let joined: String = body.split_whitespace().collect();

    let secret = STANDARD.decode(joined).map_err(|_| malformed())?;
    if secret.is_empty() {
        return Err(malformed());
    }
    Ok(secret)
}
