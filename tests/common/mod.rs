//! Shared utilities for integration testing.
//!
//! Deterministic providers that make token contents readable in assertions:
//! "base64url" is uppercase hex, a signature is `alg|kid|data`, and JSON is
//! `key|type|value` items joined by `;`.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use httpapp_core::jwt::{
    ClaimMap, ClaimValue, CryptoProvider, EngineOptions, ErrorCode, HeaderMap, JsonProvider, Jwt,
    JwtAlg, JwtError, JwtResult, KeyUse,
};

fn err(code: ErrorCode, message: &str) -> JwtError {
    JwtError::new(code, message)
}

/// In-memory key set with call counters.
#[derive(Default)]
pub struct FakeCryptoProvider {
    keys: Mutex<HashSet<String>>,
    pub load_private_calls: AtomicUsize,
    pub load_public_calls: AtomicUsize,
    pub save_private_calls: AtomicUsize,
    pub save_public_calls: AtomicUsize,
    pub generate_calls: AtomicUsize,
    last_private_path: Mutex<Option<PathBuf>>,
    last_public_path: Mutex<Option<PathBuf>>,
}

impl FakeCryptoProvider {
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn last_private_path(&self) -> Option<PathBuf> {
        self.last_private_path.lock().unwrap().clone()
    }

    pub fn last_public_path(&self) -> Option<PathBuf> {
        self.last_public_path.lock().unwrap().clone()
    }

    pub fn has_key(&self, kid: &str) -> bool {
        self.keys.lock().unwrap().contains(kid)
    }

    fn require_key(&self, kid: &str) -> JwtResult<()> {
        if self.has_key(kid) {
            Ok(())
        } else {
            Err(err(ErrorCode::KeyNotFound, "missing kid"))
        }
    }

    fn load(&self, kid: &str, path: &Path, slot: &Mutex<Option<PathBuf>>) -> JwtResult<()> {
        *slot.lock().unwrap() = Some(path.to_path_buf());
        if !path.exists() {
            return Err(err(ErrorCode::IOError, "key path missing"));
        }
        self.keys.lock().unwrap().insert(kid.to_string());
        Ok(())
    }

    fn save(
        &self,
        kid: &str,
        path: &Path,
        slot: &Mutex<Option<PathBuf>>,
        body: &str,
    ) -> JwtResult<()> {
        *slot.lock().unwrap() = Some(path.to_path_buf());
        self.require_key(kid)?;
        std::fs::write(path, body).map_err(|_| err(ErrorCode::IOError, "cannot write key"))
    }
}

impl CryptoProvider for FakeCryptoProvider {
    fn load_private_key_from_pem_file(&self, kid: &str, path: &Path) -> JwtResult<()> {
        self.load_private_calls.fetch_add(1, Ordering::SeqCst);
        self.load(kid, path, &self.last_private_path)
    }

    fn load_public_key_from_pem_file(&self, kid: &str, path: &Path, _: KeyUse) -> JwtResult<()> {
        self.load_public_calls.fetch_add(1, Ordering::SeqCst);
        self.load(kid, path, &self.last_public_path)
    }

    fn load_certificate_from_pem_file(&self, kid: &str, path: &Path) -> JwtResult<()> {
        if path.as_os_str().is_empty() {
            return Err(err(ErrorCode::CertificateNotFound, "certificate path empty"));
        }
        self.keys.lock().unwrap().insert(kid.to_string());
        Ok(())
    }

    fn save_private_key_to_pem_file(&self, kid: &str, path: &Path) -> JwtResult<()> {
        self.save_private_calls.fetch_add(1, Ordering::SeqCst);
        self.save(kid, path, &self.last_private_path, "private-key")
    }

    fn save_public_key_to_pem_file(&self, kid: &str, path: &Path, _: KeyUse) -> JwtResult<()> {
        self.save_public_calls.fetch_add(1, Ordering::SeqCst);
        self.save(kid, path, &self.last_public_path, "public-key")
    }

    fn generate_key_pair(&self, kid: &str, _: JwtAlg, _: &str) -> JwtResult<()> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.keys.lock().unwrap().insert(kid.to_string());
        Ok(())
    }

    fn remove_key(&self, kid: &str) -> JwtResult<()> {
        self.keys.lock().unwrap().remove(kid);
        Ok(())
    }

    fn sign(&self, alg: JwtAlg, kid: &str, data: &[u8]) -> JwtResult<Vec<u8>> {
        self.require_key(kid)?;
        let mut signature = format!("{alg}|{kid}|").into_bytes();
        signature.extend_from_slice(data);
        Ok(signature)
    }

    fn verify(&self, alg: JwtAlg, kid: &str, data: &[u8], signature: &[u8]) -> JwtResult<()> {
        let expected = self.sign(alg, kid, data)?;
        if expected != signature {
            return Err(err(ErrorCode::SignatureMismatch, "signature mismatch"));
        }
        Ok(())
    }

    fn base64url_encode(&self, data: &[u8]) -> JwtResult<String> {
        Ok(data.iter().map(|b| format!("{b:02X}")).collect())
    }

    fn base64url_decode(&self, text: &str) -> JwtResult<Vec<u8>> {
        if text.len() % 2 != 0 {
            return Err(err(ErrorCode::InvalidBase64Url, "invalid hex length"));
        }
        (0..text.len())
            .step_by(2)
            .map(|i| {
                text.get(i..i + 2)
                    .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                    .ok_or_else(|| err(ErrorCode::InvalidBase64Url, "invalid hex char"))
            })
            .collect()
    }
}

/// Line-oriented stand-in for a JSON library.
#[derive(Default)]
pub struct FakeJsonProvider;

impl FakeJsonProvider {
    fn parse_map(text: &str) -> JwtResult<BTreeMap<String, ClaimValue>> {
        let mut out = BTreeMap::new();
        if text.is_empty() {
            return Ok(out);
        }

        for item in text.split(';') {
            let mut fields = item.splitn(3, '|');
            let (Some(key), Some(kind), Some(value)) = (fields.next(), fields.next(), fields.next())
            else {
                return Err(err(ErrorCode::InvalidJson, "invalid item"));
            };

            let value = match kind {
                "n" => ClaimValue::Null,
                "b" => ClaimValue::Bool(value == "1"),
                "i" => ClaimValue::Int(
                    value
                        .parse()
                        .map_err(|_| err(ErrorCode::InvalidJson, "invalid int"))?,
                ),
                "d" => ClaimValue::Double(
                    value
                        .parse()
                        .map_err(|_| err(ErrorCode::InvalidJson, "invalid double"))?,
                ),
                "s" => ClaimValue::Text(value.to_string()),
                _ => return Err(err(ErrorCode::InvalidJson, "invalid type")),
            };
            out.insert(key.to_string(), value);
        }
        Ok(out)
    }
}

impl JsonProvider for FakeJsonProvider {
    fn parse_header(&self, text: &str) -> JwtResult<HeaderMap> {
        Self::parse_map(text)
    }

    fn parse_claims(&self, text: &str) -> JwtResult<ClaimMap> {
        Self::parse_map(text)
    }

    fn to_json(&self, values: &ClaimMap) -> JwtResult<String> {
        let items: Vec<String> = values
            .iter()
            .map(|(key, value)| match value {
                ClaimValue::Null => format!("{key}|n|"),
                ClaimValue::Bool(b) => format!("{key}|b|{}", u8::from(*b)),
                ClaimValue::Int(i) => format!("{key}|i|{i}"),
                ClaimValue::Double(d) => format!("{key}|d|{d}"),
                ClaimValue::Text(s) => format!("{key}|s|{s}"),
            })
            .collect();
        Ok(items.join(";"))
    }
}

/// Engine over fresh fakes; the crypto fake is returned for counter checks.
pub fn fake_engine(options: EngineOptions) -> (Jwt, Arc<FakeCryptoProvider>) {
    let crypto = Arc::new(FakeCryptoProvider::default());
    let jwt = Jwt::new(crypto.clone(), Arc::new(FakeJsonProvider), options);
    (jwt, crypto)
}
