//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! routing, middleware and jwt produce:
//!     → tracing events (registration, misses, key bootstrap, failures)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → logging.rs subscriber (stderr, pretty or JSON)
//!     → whatever `metrics` recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
