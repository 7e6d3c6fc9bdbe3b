//! Route registration, lookup and dispatch.
//!
//! # Responsibilities
//! - Register handlers by method and pattern
//! - Attach global and per-route middleware
//! - Match a request path and report captured parameters
//! - Run the middleware pipeline for a matched route
//!
//! # Design Decisions
//! - Registering the same (method, pattern) twice replaces the first record
//! - "No route" is `None`, never an error
//! - Matching takes `&self`; concurrent matching on a built router needs no
//!   locking (see `shared.rs` for registration after startup)
//! - Generic over the request context `C` so adapters bring their own type

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::context::RouteContext;
use super::method::HttpMethod;
use super::segment::{parse_pattern, split_path};
use super::trie::TrieNode;
use crate::middleware::{Handler, Middleware, MiddlewareChain, Next, Outcome};
use crate::observability::metrics;

/// Router behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterOptions {
    /// Treat `/users/` and `/users` as the same path.
    pub normalize_trailing_slash: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            normalize_trailing_slash: true,
        }
    }
}

/// A registered route.
pub struct Route<C> {
    pattern: String,
    method: HttpMethod,
    handler: Handler<C>,
    middlewares: Vec<Middleware<C>>,
}

impl<C> Route<C> {
    pub fn new(pattern: impl Into<String>, method: HttpMethod, handler: Handler<C>) -> Self {
        Self {
            pattern: pattern.into(),
            method,
            handler,
            middlewares: Vec::new(),
        }
    }

    /// Pattern text exactly as registered.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn handler(&self) -> &Handler<C> {
        &self.handler
    }

    pub fn middlewares(&self) -> &[Middleware<C>] {
        &self.middlewares
    }

    /// Append a route-scoped middleware, chaining.
    pub fn with_middleware<F>(&mut self, middleware: F) -> &mut Self
    where
        F: Fn(&mut C, Next<'_, C>) + Send + Sync + 'static,
    {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    pub fn push_middleware(&mut self, middleware: Middleware<C>) {
        self.middlewares.push(middleware);
    }
}

impl<C> Clone for Route<C> {
    fn clone(&self) -> Self {
        Self {
            pattern: self.pattern.clone(),
            method: self.method,
            handler: Arc::clone(&self.handler),
            middlewares: self.middlewares.clone(),
        }
    }
}

impl<C> fmt::Debug for Route<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern)
            .field("method", &self.method)
            .field("middlewares", &self.middlewares.len())
            .finish()
    }
}

/// Trie-backed router over request context `C`.
pub struct Router<C> {
    root: TrieNode<C>,
    globals: MiddlewareChain<C>,
    options: RouterOptions,
}

impl<C> Router<C> {
    pub fn new() -> Self {
        Self::with_options(RouterOptions::default())
    }

    pub fn with_options(options: RouterOptions) -> Self {
        Self {
            root: TrieNode::default(),
            globals: MiddlewareChain::new(),
            options,
        }
    }

    pub fn options(&self) -> RouterOptions {
        self.options
    }

    /// Register `handler` for `method` on `pattern`.
    ///
    /// Returns the stored record so route middleware can be chained on.
    pub fn add<F>(&mut self, method: HttpMethod, pattern: &str, handler: F) -> &mut Route<C>
    where
        F: Fn(&mut C) + Send + Sync + 'static,
    {
        self.add_handler(method, pattern, Arc::new(handler))
    }

    /// Same as [`Router::add`] for an already shared handler.
    pub fn add_handler(
        &mut self,
        method: HttpMethod,
        pattern: &str,
        handler: Handler<C>,
    ) -> &mut Route<C> {
        let segments = parse_pattern(pattern, self.options.normalize_trailing_slash);
        let node = self.root.descend_or_insert(&segments);

        if node.route_exact_mut(method).is_some() {
            tracing::debug!(method = %method, pattern = %pattern, "Route replaced");
        } else {
            tracing::debug!(method = %method, pattern = %pattern, "Route registered");
        }

        node.insert_route(Route::new(pattern, method, handler))
    }

    pub fn get<F>(&mut self, pattern: &str, handler: F) -> &mut Route<C>
    where
        F: Fn(&mut C) + Send + Sync + 'static,
    {
        self.add(HttpMethod::Get, pattern, handler)
    }

    pub fn post<F>(&mut self, pattern: &str, handler: F) -> &mut Route<C>
    where
        F: Fn(&mut C) + Send + Sync + 'static,
    {
        self.add(HttpMethod::Post, pattern, handler)
    }

    pub fn put<F>(&mut self, pattern: &str, handler: F) -> &mut Route<C>
    where
        F: Fn(&mut C) + Send + Sync + 'static,
    {
        self.add(HttpMethod::Put, pattern, handler)
    }

    pub fn patch<F>(&mut self, pattern: &str, handler: F) -> &mut Route<C>
    where
        F: Fn(&mut C) + Send + Sync + 'static,
    {
        self.add(HttpMethod::Patch, pattern, handler)
    }

    pub fn delete<F>(&mut self, pattern: &str, handler: F) -> &mut Route<C>
    where
        F: Fn(&mut C) + Send + Sync + 'static,
    {
        self.add(HttpMethod::Delete, pattern, handler)
    }

    pub fn options_route<F>(&mut self, pattern: &str, handler: F) -> &mut Route<C>
    where
        F: Fn(&mut C) + Send + Sync + 'static,
    {
        self.add(HttpMethod::Options, pattern, handler)
    }

    pub fn head<F>(&mut self, pattern: &str, handler: F) -> &mut Route<C>
    where
        F: Fn(&mut C) + Send + Sync + 'static,
    {
        self.add(HttpMethod::Head, pattern, handler)
    }

    /// Fallback for every method not registered explicitly on the same node.
    pub fn any<F>(&mut self, pattern: &str, handler: F) -> &mut Route<C>
    where
        F: Fn(&mut C) + Send + Sync + 'static,
    {
        self.add(HttpMethod::Any, pattern, handler)
    }

    /// Append a global middleware. Globals run before route middleware.
    pub fn use_middleware<F>(&mut self, middleware: F)
    where
        F: Fn(&mut C, Next<'_, C>) + Send + Sync + 'static,
    {
        self.globals.use_middleware(Arc::new(middleware));
    }

    /// Append middleware to the route registered for exactly `method` and
    /// `pattern`. Parameters are compared by name and type.
    ///
    /// Returns `false` when no such registration exists.
    pub fn add_route_middleware(
        &mut self,
        method: HttpMethod,
        pattern: &str,
        middleware: Middleware<C>,
    ) -> bool {
        let segments = parse_pattern(pattern, self.options.normalize_trailing_slash);
        match self
            .root
            .find_mut(&segments)
            .and_then(|node| node.route_exact_mut(method))
        {
            Some(route) => {
                route.push_middleware(middleware);
                true
            }
            None => {
                tracing::debug!(
                    method = %method,
                    pattern = %pattern,
                    "No route to attach middleware to"
                );
                false
            }
        }
    }

    /// Find the route for `method` on `path`.
    ///
    /// Parameters are reported to `ctx` as segments are consumed. On `None`
    /// the context may hold parameters from a partial walk.
    pub fn match_route<X>(&self, method: HttpMethod, path: &str, ctx: &mut X) -> Option<&Route<C>>
    where
        X: RouteContext + ?Sized,
    {
        let segments = split_path(path, self.options.normalize_trailing_slash);
        let found = self
            .root
            .walk(segments, ctx)
            .and_then(|node| node.route_for(method));

        if found.is_none() {
            tracing::trace!(method = %method, path = %path, "No route matched");
            metrics::record_route_miss();
        }
        found
    }

    /// Run global middleware, `route`'s middleware and its handler.
    pub fn execute(&self, route: &Route<C>, ctx: &mut C) -> Outcome {
        let outcome = self.globals.execute(&route.middlewares, &route.handler, ctx);
        metrics::record_dispatch(outcome);
        outcome
    }

    /// Match and execute. `None` means no route.
    pub fn dispatch(&self, method: HttpMethod, path: &str, ctx: &mut C) -> Option<Outcome>
    where
        C: RouteContext,
    {
        let route = self.match_route(method, path, ctx)?;
        Some(self.execute(route, ctx))
    }

    /// Every registered route, depth first.
    pub fn routes(&self) -> Vec<&Route<C>> {
        let mut routes = Vec::new();
        self.root.for_each_route(&mut |route| routes.push(route));
        routes
    }

    pub fn global_middleware_count(&self) -> usize {
        self.globals.len()
    }
}

impl<C> Default for Router<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for Router<C> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            globals: self.globals.clone(),
            options: self.options,
        }
    }
}
