//! Request-dispatch and token core for HTTP services.
//!
//! # Architecture Overview
//!
//! ```text
//!     (method, path, ctx)
//!     ──────────────────▶ routing ──▶ middleware ──▶ handler
//!                         trie        global, route,
//!                         typed       bearer (jwt)
//!                         params           │
//!                                          ▼
//!                               jwt engine ──▶ CryptoProvider / JsonProvider
//!                               builder        (hmac, serde_json)
//!                               verifier
//!                               policy
//!
//!     cross-cutting: config (TOML) · observability (tracing, metrics)
//! ```

// Core subsystems
pub mod jwt;
pub mod middleware;
pub mod routing;

// Cross-cutting concerns
pub mod config;
pub mod observability;

pub use config::AppConfig;
pub use jwt::{Jwt, JwtError, Verification};
pub use middleware::{Handler, Middleware, Next, Outcome};
pub use routing::{HttpMethod, PathParams, Router, SharedRouter};
