//! Middleware pipeline.
//!
//! # Data Flow
//! ```text
//! Router::execute(route, ctx)
//!     → chain.rs (global stack, then route stack, then handler)
//!     → next.rs  (single-use continuation between layers)
//!     → Outcome::Completed | Outcome::Interrupted
//! ```
//!
//! # Design Decisions
//! - Synchronous call stack, no suspension points
//! - A middleware interrupts by returning without calling `next.run`
//! - `Next` is consumed by `run`, so calling it twice is rejected at compile time
//! - Interruption is not an error; the caller reads it from `Outcome`

use std::sync::Arc;

pub mod bearer;
pub mod chain;
pub mod next;

pub use chain::MiddlewareChain;
pub use next::{Next, Outcome};

/// Terminal request handler.
pub type Handler<C> = Arc<dyn Fn(&mut C) + Send + Sync>;

/// Pipeline stage: receives the context and the continuation.
pub type Middleware<C> = Arc<dyn Fn(&mut C, Next<'_, C>) + Send + Sync>;
