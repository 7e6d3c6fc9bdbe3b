//! Onion-style execution of global middleware, route middleware and handler.
//!
//! # Data Flow
//! ```text
//! execute(route_mws, handler, ctx)
//!     → global[0](ctx, next) → ... → global[n](ctx, next)
//!     → route[0](ctx, next)  → ... → route[m](ctx, next)
//!     → handler(ctx)
//!     ← each layer may run code after next.run() returns
//! ```

use std::cell::Cell;

use super::next::{Next, Outcome};
use super::{Handler, Middleware};

/// Ordered global middleware stack.
pub struct MiddlewareChain<C> {
    stack: Vec<Middleware<C>>,
}

impl<C> MiddlewareChain<C> {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn use_middleware(&mut self, middleware: Middleware<C>) {
        self.stack.push(middleware);
    }

    /// Run the stack, then `route_middlewares`, then `handler`.
    pub fn execute(
        &self,
        route_middlewares: &[Middleware<C>],
        handler: &Handler<C>,
        ctx: &mut C,
    ) -> Outcome {
        run(&self.stack, route_middlewares, handler, ctx)
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

impl<C> Default for MiddlewareChain<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for MiddlewareChain<C> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
        }
    }
}

/// Run one pipeline and report whether the handler was reached.
pub fn run<C>(
    globals: &[Middleware<C>],
    route_middlewares: &[Middleware<C>],
    handler: &Handler<C>,
    ctx: &mut C,
) -> Outcome {
    let reached = Cell::new(false);
    Next::new(globals, route_middlewares, handler, &reached).run(ctx);

    if reached.get() {
        Outcome::Completed
    } else {
        Outcome::Interrupted
    }
}
