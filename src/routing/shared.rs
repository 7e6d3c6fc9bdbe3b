//! Router shared between matching threads and a late registrant.
//!
//! # Data Flow
//! ```text
//! readers:  shared.load() → Arc<Router> snapshot → match_route / dispatch
//! writer:   shared.update(|r| ...) → lock → clone current → mutate → swap
//! ```
//!
//! # Design Decisions
//! - Readers never lock; they keep whatever snapshot they loaded
//! - Writers are serialised by a mutex so concurrent updates do not lose edits
//! - Copy-on-write: each update clones the whole trie

use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;

use super::router::Router;

pub struct SharedRouter<C> {
    current: ArcSwap<Router<C>>,
    writer: Mutex<()>,
}

impl<C> SharedRouter<C> {
    pub fn new(router: Router<C>) -> Self {
        Self {
            current: ArcSwap::from_pointee(router),
            writer: Mutex::new(()),
        }
    }

    /// Snapshot for matching. Later updates do not affect it.
    pub fn load(&self) -> Arc<Router<C>> {
        self.current.load_full()
    }

    /// Apply `mutate` to a copy of the current router and publish it.
    pub fn update<R>(&self, mutate: impl FnOnce(&mut Router<C>) -> R) -> R {
        // Poisoning leaves the published router intact.
        let _guard = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut next = Router::clone(&self.current.load());
        let result = mutate(&mut next);
        self.current.store(Arc::new(next));

        tracing::debug!(routes = self.current.load().routes().len(), "Router updated");
        result
    }
}

impl<C> Default for SharedRouter<C> {
    fn default() -> Self {
        Self::new(Router::new())
    }
}
