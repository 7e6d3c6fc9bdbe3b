//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files and
//! default every field, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::jwt::{EngineOptions, KeyPairSpec, Policy};
use crate::routing::{HttpMethod, RouterOptions};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Router behaviour.
    pub router: RouterOptions,

    /// Token engine settings.
    pub jwt: JwtConfig,

    /// Static route table.
    pub routes: Vec<RouteConfig>,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Token engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Ask the crypto provider to serialise key-store mutations.
    pub thread_safe: bool,

    /// Verification policy.
    pub policy: Policy,

    /// Key pair bootstrapped at startup.
    pub keys: KeysConfig,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            thread_safe: true,
            policy: Policy::default(),
            keys: KeysConfig::default(),
        }
    }
}

impl JwtConfig {
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            policy: self.policy.clone(),
            thread_safe: self.thread_safe,
        }
    }
}

/// Key pair location and identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KeysConfig {
    /// Directory holding the key files.
    pub dir: String,

    #[serde(flatten)]
    pub spec: KeyPairSpec,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            dir: ".".to_string(),
            spec: KeyPairSpec::default(),
        }
    }
}

/// One static route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Uppercase method name, `ANY` allowed.
    pub method: HttpMethod,

    /// Route pattern, e.g. `/users/<id:int>`.
    pub pattern: String,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` overrides it.
    pub log_level: String,

    /// `pretty` or `json`.
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}
