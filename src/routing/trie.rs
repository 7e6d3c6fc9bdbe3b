//! Prefix tree indexing route segments.
//!
//! # Data Flow
//! ```text
//! Registration:  [Segment] → descend_or_insert → node.routes[method] = Route
//! Matching:      [&str]    → literal child? → typed child (rank order, first
//!                            validator that accepts) → node.route_for(method)
//! ```
//!
//! # Design Decisions
//! - Literal children are a map keyed by segment text and always win
//! - Typed children are a `Vec` kept sorted by `ParamType::rank`; insertion uses
//!   binary search and reuses an existing child of the same type, so the
//!   captured name is the one from the first registration at that position
//! - Matching is first-match-wins with no backtracking into siblings
//! - Matching takes `&self` only; a built trie can be shared across threads

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use super::context::RouteContext;
use super::method::HttpMethod;
use super::router::Route;
use super::segment::{ParamType, Segment};

/// Parameter child at one trie position.
pub(crate) struct TypedChild<C> {
    pub(crate) name: String,
    pub(crate) kind: ParamType,
    pub(crate) next: TrieNode<C>,
}

impl<C> Clone for TypedChild<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind,
            next: self.next.clone(),
        }
    }
}

pub(crate) struct TrieNode<C> {
    literals: HashMap<String, TrieNode<C>>,
    typed: Vec<TypedChild<C>>,
    routes: HashMap<HttpMethod, Route<C>>,
}

impl<C> Default for TrieNode<C> {
    fn default() -> Self {
        Self {
            literals: HashMap::new(),
            typed: Vec::new(),
            routes: HashMap::new(),
        }
    }
}

impl<C> Clone for TrieNode<C> {
    fn clone(&self) -> Self {
        Self {
            literals: self.literals.clone(),
            typed: self.typed.clone(),
            routes: self.routes.clone(),
        }
    }
}

impl<C> TrieNode<C> {
    /// Walk `segments` from this node, creating children as needed.
    pub(crate) fn descend_or_insert(&mut self, segments: &[Segment]) -> &mut TrieNode<C> {
        let mut node = self;
        for segment in segments {
            node = match segment {
                Segment::Literal(text) => node.literals.entry(text.clone()).or_default(),
                Segment::Param { name, kind } => node.typed_child_or_insert(name, *kind),
            };
        }
        node
    }

    fn typed_child_or_insert(&mut self, name: &str, kind: ParamType) -> &mut TrieNode<C> {
        let index = match self
            .typed
            .binary_search_by_key(&kind.rank(), |child| child.kind.rank())
        {
            Ok(existing) => existing,
            Err(position) => {
                self.typed.insert(
                    position,
                    TypedChild {
                        name: name.to_string(),
                        kind,
                        next: TrieNode::default(),
                    },
                );
                position
            }
        };
        &mut self.typed[index].next
    }

    /// Walk `segments` by registration identity: literals by text, parameters
    /// by name and type. No validators run.
    pub(crate) fn find_mut(&mut self, segments: &[Segment]) -> Option<&mut TrieNode<C>> {
        let mut node = self;
        for segment in segments {
            node = match segment {
                Segment::Literal(text) => node.literals.get_mut(text)?,
                Segment::Param { name, kind } => {
                    &mut node
                        .typed
                        .iter_mut()
                        .find(|child| child.kind == *kind && child.name == *name)?
                        .next
                }
            };
        }
        Some(node)
    }

    /// Walk request path segments, reporting captured parameters to `ctx`.
    pub(crate) fn walk<'a, 'p, X>(
        &'a self,
        segments: impl Iterator<Item = &'p str>,
        ctx: &mut X,
    ) -> Option<&'a TrieNode<C>>
    where
        X: RouteContext + ?Sized,
    {
        let mut node = self;
        for segment in segments {
            if let Some(child) = node.literals.get(segment) {
                node = child;
                continue;
            }

            let child = node.typed.iter().find(|child| child.kind.validate(segment))?;
            ctx.set_param(&child.name, segment);
            node = &child.next;
        }
        Some(node)
    }

    /// Exact method first, then the ANY record.
    pub(crate) fn route_for(&self, method: HttpMethod) -> Option<&Route<C>> {
        self.routes
            .get(&method)
            .or_else(|| self.routes.get(&HttpMethod::Any))
    }

    pub(crate) fn route_exact_mut(&mut self, method: HttpMethod) -> Option<&mut Route<C>> {
        self.routes.get_mut(&method)
    }

    /// Store `route`, replacing any record for the same method.
    pub(crate) fn insert_route(&mut self, route: Route<C>) -> &mut Route<C> {
        match self.routes.entry(route.method()) {
            Entry::Occupied(mut slot) => {
                slot.insert(route);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(route),
        }
    }

    /// Depth-first visit of every route record.
    pub(crate) fn for_each_route<'a>(&'a self, visit: &mut dyn FnMut(&'a Route<C>)) {
        let mut methods: Vec<_> = self.routes.keys().copied().collect();
        methods.sort();
        for method in methods {
            if let Some(route) = self.routes.get(&method) {
                visit(route);
            }
        }

        let mut literals: Vec<_> = self.literals.iter().collect();
        literals.sort_by(|a, b| a.0.cmp(b.0));
        for (_, child) in literals {
            child.for_each_route(visit);
        }
        for child in &self.typed {
            child.next.for_each_route(visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::routing::context::PathParams;
    use crate::routing::segment::parse_pattern;

    fn route(method: HttpMethod, pattern: &str) -> Route<PathParams> {
        Route::new(pattern, method, Arc::new(|_: &mut PathParams| {}))
    }

    fn register(root: &mut TrieNode<PathParams>, method: HttpMethod, pattern: &str) {
        let segments = parse_pattern(pattern, true);
        root.descend_or_insert(&segments).insert_route(route(method, pattern));
    }

    #[test]
    fn test_typed_children_sorted_by_rank() {
        let mut root = TrieNode::default();
        register(&mut root, HttpMethod::Get, "/<a>");
        register(&mut root, HttpMethod::Get, "/<b:string>");
        register(&mut root, HttpMethod::Get, "/<c:int>");
        register(&mut root, HttpMethod::Get, "/<d:uuid>");

        let kinds: Vec<_> = root.typed.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![ParamType::Int, ParamType::Uuid, ParamType::String, ParamType::Generic]
        );
    }

    #[test]
    fn test_same_type_reuses_child() {
        let mut root = TrieNode::default();
        register(&mut root, HttpMethod::Get, "/users/<id:int>");
        register(&mut root, HttpMethod::Get, "/users/<uid:int>/posts");

        let users = &root.literals["users"];
        assert_eq!(users.typed.len(), 1);
        assert_eq!(users.typed[0].name, "id");
    }

    #[test]
    fn test_walk_reports_params() {
        let mut root = TrieNode::default();
        register(&mut root, HttpMethod::Get, "/users/<id:int>");

        let mut params = PathParams::new();
        let node = root.walk(["users", "42"].into_iter(), &mut params);
        assert!(node.is_some_and(|n| n.route_for(HttpMethod::Get).is_some()));
        assert_eq!(params.get("id"), Some("42"));
    }

    #[test]
    fn test_walk_no_backtracking() {
        let mut root = TrieNode::default();
        // "7" is taken by the int child, whose subtree has no "b".
        register(&mut root, HttpMethod::Get, "/<n:int>/a");
        register(&mut root, HttpMethod::Get, "/<s:string>/b");

        let mut params = PathParams::new();
        assert!(root.walk(["7", "b"].into_iter(), &mut params).is_none());
        // The first segment was still reported.
        assert_eq!(params.get("n"), Some("7"));
    }

    #[test]
    fn test_route_for_any_fallback() {
        let mut root = TrieNode::default();
        register(&mut root, HttpMethod::Any, "/");
        register(&mut root, HttpMethod::Post, "/");

        assert_eq!(root.route_for(HttpMethod::Post).map(|r| r.method()), Some(HttpMethod::Post));
        assert_eq!(root.route_for(HttpMethod::Delete).map(|r| r.method()), Some(HttpMethod::Any));
    }

    #[test]
    fn test_find_mut_requires_name_and_type() {
        let mut root = TrieNode::default();
        register(&mut root, HttpMethod::Get, "/items/<id:int>");

        assert!(root.find_mut(&parse_pattern("/items/<id:int>", true)).is_some());
        assert!(root.find_mut(&parse_pattern("/items/<key:int>", true)).is_none());
        assert!(root.find_mut(&parse_pattern("/items/<id:string>", true)).is_none());
    }
}
