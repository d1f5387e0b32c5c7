//! Test support: a content object that records what happened to it

use content_workflow_types::Stateful;
use std::collections::HashMap;

/// A [`Stateful`] attribute bag that keeps a log of every state write
/// and of any events callbacks choose to record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordingContent {
    /// Display name, handy when several objects take part in one test
    pub name: String,
    attributes: HashMap<String, String>,
    writes: Vec<(String, String)>,
    events: Vec<String>,
}

impl RecordingContent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Pre-populate an attribute without logging it as a write
    pub fn with_state(mut self, attr: impl Into<String>, state: impl Into<String>) -> Self {
        self.attributes.insert(attr.into(), state.into());
        self
    }

    /// Remove an attribute, returning the content to "uninitialized"
    pub fn clear_state(&mut self, attr: &str) {
        self.attributes.remove(attr);
    }

    /// Every `(attr, state)` written through [`Stateful::set_state_value`]
    pub fn writes(&self) -> &[(String, String)] {
        &self.writes
    }

    pub fn record(&mut self, event: impl Into<String>) {
        self.events.push(event.into());
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }
}

impl Stateful for RecordingContent {
    fn state_value(&self, attr: &str) -> Option<&str> {
        self.attributes.get(attr).map(String::as_str)
    }

    fn set_state_value(&mut self, attr: &str, state: &str) {
        self.attributes.insert(attr.to_string(), state.to_string());
        self.writes.push((attr.to_string(), state.to_string()));
    }
}
