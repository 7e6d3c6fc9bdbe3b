//! Metrics collection.
//!
//! # Metrics
//! - `router_dispatch_total` (counter): dispatched requests by outcome
//! - `router_route_miss_total` (counter): lookups with no matching route
//! - `jwt_verifications_total` (counter): verifications by result code
//! - `jwt_tokens_signed_total` (counter): signed tokens by algorithm
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Labels are static strings so updates stay allocation-free

use ::metrics::counter;

use crate::jwt::{ErrorCode, JwtAlg};
use crate::middleware::Outcome;

pub fn record_dispatch(outcome: Outcome) {
    counter!("router_dispatch_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_route_miss() {
    counter!("router_route_miss_total").increment(1);
}

/// Count one verification; `code` is `Ok` on success.
pub fn record_verification(code: ErrorCode) {
    counter!("jwt_verifications_total", "code" => code.as_str()).increment(1);
}

pub fn record_token_signed(alg: JwtAlg) {
    counter!("jwt_tokens_signed_total", "alg" => alg.as_str()).increment(1);
}
