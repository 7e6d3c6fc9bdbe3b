//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (startup, or SharedRouter::update):
//!     pattern "/users/<id:int>"
//!     → segment.rs (split + classify segments)
//!     → trie.rs (descend/create nodes, store Route per method)
//!
//! Matching:
//!     (method, path, ctx)
//!     → segment.rs (split path)
//!     → trie.rs (literal first, then typed children by specificity)
//!     → context.rs (captured parameters reported to ctx)
//!     → Some(&Route) or None
//! ```
//!
//! # Design Decisions
//! - Patterns parsed once at registration, never during matching
//! - Literal segments always outrank parameters
//! - Among parameters: int, base64id, uuid, float, string, generic
//! - First match wins, no backtracking
//! - Exact method first, then the ANY record

pub mod context;
pub mod method;
pub mod router;
pub mod segment;
pub mod shared;
mod trie;

pub use context::{PathParams, RouteContext};
pub use method::HttpMethod;
pub use router::{Route, Router, RouterOptions};
pub use segment::{ParamType, Segment};
pub use shared::SharedRouter;
