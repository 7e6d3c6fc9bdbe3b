//! Bearer-token authentication middleware.
//!
//! Reads the token from the context, verifies it with the engine and either
//! attaches the verification and proceeds, or rejects and stops the chain.

use std::sync::Arc;

use super::{Middleware, Next};
use crate::jwt::{ErrorCode, Jwt, JwtError, Verification};

/// What the bearer middleware needs from a request context.
pub trait BearerContext {
    /// Raw token, without the `Bearer ` scheme prefix.
    fn bearer_token(&self) -> Option<&str>;

    fn attach_verification(&mut self, verification: Verification);

    /// Record the rejection; the chain is interrupted right after.
    fn reject(&mut self, error: &JwtError);
}

/// Token from an `Authorization` header value. The scheme is case-insensitive.
pub fn parse_authorization(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Middleware rejecting requests without a valid token.
pub fn require_bearer<C>(jwt: Arc<Jwt>) -> Middleware<C>
where
    C: BearerContext + 'static,
{
    Arc::new(move |ctx: &mut C, next: Next<'_, C>| {
        let Some(token) = ctx.bearer_token().map(str::to_owned) else {
            tracing::debug!("Request without bearer token");
            ctx.reject(&JwtError::new(ErrorCode::InvalidFormat, "Missing bearer token"));
            return;
        };

        let verification = jwt.verify(&token);
        if let Some(err) = verification.error().cloned() {
            ctx.reject(&err);
            return;
        }

        ctx.attach_verification(verification);
        next.run(ctx);
    })
}
