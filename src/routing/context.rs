//! Parameter sink consumed by the router.
//!
//! The router knows nothing about request objects. It only needs somewhere to
//! put captured parameter values, one call per matched parameter segment in
//! left-to-right order.

use std::collections::{BTreeMap, HashMap};

/// Capability to record a named path parameter.
pub trait RouteContext {
    fn set_param(&mut self, name: &str, value: &str);
}

impl RouteContext for HashMap<String, String> {
    fn set_param(&mut self, name: &str, value: &str) {
        self.insert(name.to_string(), value.to_string());
    }
}

impl RouteContext for BTreeMap<String, String> {
    fn set_param(&mut self, name: &str, value: &str) {
        self.insert(name.to_string(), value.to_string());
    }
}

/// Ordered list of captured parameters.
///
/// Keeps capture order and duplicates, which a map would hide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    entries: Vec<(String, String)>,
}

impl PathParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value recorded under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl RouteContext for PathParams {
    fn set_param(&mut self, name: &str, value: &str) {
        self.entries.push((name.to_string(), value.to_string()));
    }
}
