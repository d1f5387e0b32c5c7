//! The capability content objects expose to the engine

use std::collections::{BTreeMap, HashMap};

/// A content object whose workflow state lives under a named attribute.
///
/// The engine calls these two methods and nothing else. Persisting the
/// value is the implementor's responsibility.
pub trait Stateful {
    /// Current value stored under `attr`, or `None` when uninitialized
    fn state_value(&self, attr: &str) -> Option<&str>;

    /// Store `state` under `attr`
    fn set_state_value(&mut self, attr: &str, state: &str);
}

impl Stateful for HashMap<String, String> {
    fn state_value(&self, attr: &str) -> Option<&str> {
        self.get(attr).map(String::as_str)
    }

    fn set_state_value(&mut self, attr: &str, state: &str) {
        self.insert(attr.to_string(), state.to_string());
    }
}

impl Stateful for BTreeMap<String, String> {
    fn state_value(&self, attr: &str) -> Option<&str> {
        self.get(attr).map(String::as_str)
    }

    fn set_state_value(&mut self, attr: &str, state: &str) {
        self.insert(attr.to_string(), state.to_string());
    }
}
