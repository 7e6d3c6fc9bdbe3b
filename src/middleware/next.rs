//! Continuation handed to each middleware.

use std::cell::Cell;

use super::{Handler, Middleware};

/// How a pipeline run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The terminal handler ran.
    Completed,
    /// Some middleware returned without calling [`Next::run`].
    Interrupted,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Completed => "completed",
            Outcome::Interrupted => "interrupted",
        }
    }
}

/// Single-use capability to run everything downstream of the current middleware.
///
/// `run` consumes the value, so a second call does not compile. Dropping it
/// without calling `run` interrupts the chain.
pub struct Next<'a, C> {
    globals: &'a [Middleware<C>],
    route: &'a [Middleware<C>],
    handler: &'a Handler<C>,
    reached: &'a Cell<bool>,
}

impl<'a, C> Next<'a, C> {
    pub(crate) fn new(
        globals: &'a [Middleware<C>],
        route: &'a [Middleware<C>],
        handler: &'a Handler<C>,
        reached: &'a Cell<bool>,
    ) -> Self {
        Self {
            globals,
            route,
            handler,
            reached,
        }
    }

    /// Proceed to the next middleware, or to the handler when none remain.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use httpapp_core::middleware::{chain, Handler, Middleware, Next, Outcome};
    ///
    /// type Log = Vec<&'static str>;
    ///
    /// let wrap: Middleware<Log> = Arc::new(|log: &mut Log, next: Next<'_, Log>| {
    ///     log.push("before");
    ///     next.run(log);
    ///     log.push("after");
    /// });
    /// let handler: Handler<Log> = Arc::new(|log: &mut Log| log.push("handler"));
    ///
    /// let mut log = Log::new();
    /// assert_eq!(chain::run(&[wrap], &[], &handler, &mut log), Outcome::Completed);
    /// assert_eq!(log, vec!["before", "handler", "after"]);
    /// ```
    ///
    /// Downstream stages run at most once per request:
    ///
    /// ```compile_fail
    /// use std::sync::Arc;
    /// use httpapp_core::middleware::{Middleware, Next};
    ///
    /// type Log = Vec<&'static str>;
    ///
    /// let twice: Middleware<Log> = Arc::new(|log: &mut Log, next: Next<'_, Log>| {
    ///     next.run(log);
    ///     next.run(log);
    /// });
    /// ```
    pub fn run(self, ctx: &mut C) {
        if let Some((first, rest)) = self.globals.split_first() {
            first(ctx, Next { globals: rest, ..self });
        } else if let Some((first, rest)) = self.route.split_first() {
            first(ctx, Next { route: rest, ..self });
        } else {
            self.reached.set(true);
            (self.handler)(ctx);
        }
    }

    /// Middlewares still ahead of the handler.
    pub fn remaining(&self) -> usize {
        self.globals.len() + self.route.len()
    }
}
