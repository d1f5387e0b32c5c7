//! Introspection and execution records
//!
//! These are owned, serializable snapshots. They never hold callbacks,
//! so they can be handed to templates or serialized into API responses.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which origin state an introspection query is about
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FromState<'a> {
    /// The content's current state (initializing it if necessary)
    #[default]
    Current,
    /// The "no state" sentinel used by initialization transitions
    NoState,
    /// An explicitly named state
    Named(&'a str),
}

impl<'a> FromState<'a> {
    /// The sentinel is represented as `None`, like a transition's `from_state`
    pub fn as_option(&self, current: &'a str) -> Option<&'a str> {
        match *self {
            FromState::Current => Some(current),
            FromState::NoState => None,
            FromState::Named(name) => Some(name),
        }
    }
}

impl<'a> From<&'a str> for FromState<'a> {
    fn from(name: &'a str) -> Self {
        FromState::Named(name)
    }
}

/// Snapshot of a declared transition
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionInfo {
    pub name: String,
    /// `None` is the "no state" sentinel
    pub from_state: Option<String>,
    pub to_state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

/// Per-state summary produced by `state_info`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateInfo {
    pub name: String,
    pub title: String,
    /// Arbitrary metadata attached when the state was declared
    #[serde(default)]
    pub data: HashMap<String, String>,
    /// This is the workflow's configured initial state
    pub initial: bool,
    /// This is the content's current state
    pub current: bool,
    /// Permitted transitions leading from the queried origin into this state
    pub transitions: Vec<TransitionInfo>,
}

/// What an executed transition did
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub transition: String,
    pub from_state: String,
    pub to_state: String,
}

/// Result of `initialize` / `reset`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEntry {
    /// The state now stored on the content
    pub state: String,
    /// Whether the state's enter-callback ran
    pub entered: bool,
}
