//! Serializable workflow documents
//!
//! ```json
//! {
//!   "workflows": [{
//!     "type": "publishing",
//!     "name": "Publishing",
//!     "state_attr": "review_state",
//!     "initial_state": "pending",
//!     "content_types": ["Document"],
//!     "permission_checker": "acl",
//!     "states": [
//!       { "name": "pending", "aliases": ["new"] },
//!       { "name": "published", "title": "Public", "callback": "notify" }
//!     ],
//!     "transitions": [
//!       { "name": "publish", "from_state": "pending", "to_state": "published",
//!         "permission": "moderate" }
//!     ]
//!   }]
//! }
//! ```
//!
//! Callables (`callback`, `guards`, `permission_checker`, `elector`) are
//! names resolved against a [`Callables`](crate::Callables) table.

use crate::errors::LoaderResult;
use content_workflow_engine::ContentType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkflowDocument {
    #[serde(default)]
    pub workflows: Vec<WorkflowSpec>,
}

impl WorkflowDocument {
    pub fn from_json(json: &str) -> LoaderResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// One workflow declaration, registered once per content type
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkflowSpec {
    /// Workflow-type label, e.g. "security" or "publishing"
    #[serde(rename = "type")]
    pub workflow_type: String,
    pub name: String,
    /// Defaults to `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_attr: Option<String>,
    pub initial_state: String,
    /// Empty means the default content type
    #[serde(default)]
    pub content_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_checker: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub states: Vec<StateSpec>,
    #[serde(default)]
    pub transitions: Vec<TransitionSpec>,
}

impl WorkflowSpec {
    pub fn state_attr(&self) -> &str {
        self.state_attr.as_deref().unwrap_or(&self.name)
    }

    pub fn content_types(&self) -> Vec<ContentType> {
        if self.content_types.is_empty() {
            return vec![ContentType::Default];
        }
        self.content_types
            .iter()
            .map(|name| ContentType::named(name.as_str()))
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransitionSpec {
    pub name: String,
    /// Absent or empty means the "no state" sentinel
    #[serde(default)]
    pub from_state: Option<String>,
    pub to_state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
    #[serde(default)]
    pub guards: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl TransitionSpec {
    pub fn from_state(&self) -> Option<&str> {
        self.from_state.as_deref().filter(|s| !s.is_empty())
    }
}
