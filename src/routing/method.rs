//! HTTP method enumeration.
//!
//! # Design Decisions
//! - Closed set: GET, POST, PUT, PATCH, DELETE, OPTIONS, HEAD plus the `Any`
//!   pseudo-method used only as a per-node fallback
//! - `from_method_string` is case-sensitive and maps anything it does not
//!   recognise (including `"ANY"` and lowercase names) to GET
//! - Config files deserialize strictly (uppercase names, `ANY` accepted)

use std::fmt;

use serde::{Deserialize, Serialize};

/// HTTP method a route is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Head,
    /// Wildcard record, consulted only when the exact method is absent.
    Any,
}

impl HttpMethod {
    /// Every concrete method, in declaration order (excludes `Any`).
    pub const CONCRETE: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
    ];

    /// Convert a request-line method token into a method.
    ///
    /// Matching is exact: `"get"` and `"ANY"` are not recognised and, like any
    /// other unknown token, fall back to [`HttpMethod::Get`]. Adapters that
    /// need to reject unknown methods must check the token themselves.
    pub fn from_method_string(method: &str) -> Self {
        match method {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "PATCH" => HttpMethod::Patch,
            "DELETE" => HttpMethod::Delete,
            "OPTIONS" => HttpMethod::Options,
            "HEAD" => HttpMethod::Head,
            _ => HttpMethod::Get,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Any => "ANY",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
