//! JSON Web Token engine.
//!
//! # Data Flow
//! ```text
//! Signing:
//!     jwt.token().kid(..).claim(..)  (builder.rs)
//!     → JsonProvider::to_json → CryptoProvider::base64url_encode
//!     → CryptoProvider::sign → "header.payload.signature"
//!
//! Verification:
//!     jwt.verify(token)  (verifier.rs)
//!     → split → decode → parse → alg/kid checks
//!     → CryptoProvider::verify → policy.rs
//!     → Verification { ok, error, header, claims, raw text }
//! ```
//!
//! # Design Decisions
//! - All key material, file formats and JSON text live behind the provider
//!   traits (`provider.rs`); `providers/` has the production implementations
//! - Errors are values (`JwtError { code, message }`), never panics
//! - Signing only; encryption is not implemented

pub mod alg;
pub mod builder;
pub mod claims;
pub mod engine;
pub mod error;
pub mod policy;
pub mod provider;
pub mod providers;
pub mod verifier;

pub use alg::{JwtAlg, KeyUse};
pub use builder::TokenBuilder;
pub use claims::{ClaimMap, ClaimValue, HeaderMap};
pub use engine::{Jwt, KeyPairSpec};
pub use error::{ErrorCode, JwtError, JwtResult};
pub use policy::{validate_policy, EngineOptions, Policy};
pub use provider::{CryptoProvider, JsonProvider};
pub use providers::{HmacCryptoProvider, SerdeJsonProvider};
pub use verifier::Verification;
