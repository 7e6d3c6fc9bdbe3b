//! The token engine: provider handles plus an options snapshot.
//!
//! # Responsibilities
//! - Forward key lifecycle calls to the crypto provider
//! - Bootstrap a key pair from disk, or generate and persist one
//! - Hand out token builders and run verification (`verifier.rs`)
//!
//! # Design Decisions
//! - Providers are shared (`Arc`), the engine does not own their lifetime
//! - Options are replaced wholesale; the engine keeps no other state

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::alg::{JwtAlg, KeyUse};
use super::builder::TokenBuilder;
use super::error::{ErrorCode, JwtError, JwtResult};
use super::policy::EngineOptions;
use super::provider::{CryptoProvider, JsonProvider};

/// Key pair to bootstrap: identity, algorithm and file names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct KeyPairSpec {
    pub kid: String,
    pub alg: JwtAlg,
    pub private_key_file: String,
    pub public_key_file: String,
    pub key_use: KeyUse,
    /// Free-form provider parameters for generation.
    pub params: String,
}

impl Default for KeyPairSpec {
    fn default() -> Self {
        Self {
            kid: "default".to_string(),
            alg: JwtAlg::HS256,
            private_key_file: "jwt.private.pem".to_string(),
            public_key_file: "jwt.public.pem".to_string(),
            key_use: KeyUse::Sig,
            params: String::new(),
        }
    }
}

impl KeyPairSpec {
    pub fn new(kid: impl Into<String>, alg: JwtAlg) -> Self {
        Self {
            kid: kid.into(),
            alg,
            ..Self::default()
        }
    }

    pub fn files(
        mut self,
        private_key_file: impl Into<String>,
        public_key_file: impl Into<String>,
    ) -> Self {
        self.private_key_file = private_key_file.into();
        self.public_key_file = public_key_file.into();
        self
    }
}

/// JWT engine over one crypto provider and one JSON provider.
pub struct Jwt {
    crypto: Arc<dyn CryptoProvider>,
    json: Arc<dyn JsonProvider>,
    options: EngineOptions,
}

impl Jwt {
    pub fn new(
        crypto: Arc<dyn CryptoProvider>,
        json: Arc<dyn JsonProvider>,
        options: EngineOptions,
    ) -> Self {
        crypto.request_thread_safety(options.thread_safe);
        Self {
            crypto,
            json,
            options,
        }
    }

    pub fn load_private_key_from_pem_file(
        &self,
        kid: &str,
        path: impl AsRef<Path>,
    ) -> JwtResult<()> {
        self.crypto.load_private_key_from_pem_file(kid, path.as_ref())
    }

    pub fn load_public_key_from_pem_file(
        &self,
        kid: &str,
        path: impl AsRef<Path>,
        key_use: KeyUse,
    ) -> JwtResult<()> {
        self.crypto
            .load_public_key_from_pem_file(kid, path.as_ref(), key_use)
    }

    pub fn load_certificate_from_pem_file(
        &self,
        kid: &str,
        path: impl AsRef<Path>,
    ) -> JwtResult<()> {
        self.crypto.load_certificate_from_pem_file(kid, path.as_ref())
    }

    pub fn save_private_key_to_pem_file(
        &self,
        kid: &str,
        path: impl AsRef<Path>,
    ) -> JwtResult<()> {
        self.crypto.save_private_key_to_pem_file(kid, path.as_ref())
    }

    pub fn save_public_key_to_pem_file(
        &self,
        kid: &str,
        path: impl AsRef<Path>,
        key_use: KeyUse,
    ) -> JwtResult<()> {
        self.crypto
            .save_public_key_to_pem_file(kid, path.as_ref(), key_use)
    }

    pub fn generate_key_pair(&self, kid: &str, alg: JwtAlg, params: &str) -> JwtResult<()> {
        self.crypto.generate_key_pair(kid, alg, params)
    }

    pub fn remove_key(&self, kid: &str) -> JwtResult<()> {
        self.crypto.remove_key(kid)
    }

    /// Load the key pair from `dir` when both files exist, otherwise
    /// generate one and write both files.
    pub fn ensure_key_pair_in_dir(&self, dir: &Path, spec: &KeyPairSpec) -> JwtResult<()> {
        let private_path = dir.join(&spec.private_key_file);
        let public_path = dir.join(&spec.public_key_file);

        if private_path.is_file() && public_path.is_file() {
            tracing::debug!(
                kid = %spec.kid,
                private_key = %private_path.display(),
                public_key = %public_path.display(),
                "Loading existing key pair"
            );
            self.crypto
                .load_private_key_from_pem_file(&spec.kid, &private_path)?;
            self.crypto
                .load_public_key_from_pem_file(&spec.kid, &public_path, spec.key_use)?;
            return Ok(());
        }

        self.crypto
            .generate_key_pair(&spec.kid, spec.alg, &spec.params)?;
        self.crypto
            .save_private_key_to_pem_file(&spec.kid, &private_path)?;
        self.crypto
            .save_public_key_to_pem_file(&spec.kid, &public_path, spec.key_use)?;

        tracing::info!(
            kid = %spec.kid,
            alg = %spec.alg,
            dir = %dir.display(),
            "Generated and saved new key pair"
        );
        Ok(())
    }

    /// [`Jwt::ensure_key_pair_in_dir`] next to the running executable.
    pub fn ensure_key_pair_in_binary_dir(&self, spec: &KeyPairSpec) -> JwtResult<()> {
        let dir = binary_dir()?;
        self.ensure_key_pair_in_dir(&dir, spec)
    }

    /// Start a token with default header fields.
    pub fn token(&self) -> TokenBuilder<'_> {
        TokenBuilder::new(self)
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: EngineOptions) {
        self.crypto.request_thread_safety(options.thread_safe);
        self.options = options;
    }

    pub fn crypto(&self) -> &dyn CryptoProvider {
        self.crypto.as_ref()
    }

    pub fn json(&self) -> &dyn JsonProvider {
        self.json.as_ref()
    }
}

fn binary_dir() -> JwtResult<PathBuf> {
    let exe = std::env::current_exe().map_err(|e| {
        JwtError::new(ErrorCode::IOError, format!("Cannot resolve executable path: {e}"))
    })?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        JwtError::new(ErrorCode::IOError, "Executable path has no parent directory")
    })
}
