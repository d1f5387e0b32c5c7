//! Declarative loading for content workflows
//!
//! Workflows are described as JSON documents and compiled into checked
//! [`Workflow`](content_workflow_engine::Workflow)s, which are then
//! registered per content type in a
//! [`WorkflowRegistry`](content_workflow_engine::WorkflowRegistry).
//! The engine itself never sees a document; it only sees the populated,
//! checked workflow.
//!
//! # Example
//!
//! ```rust
//! use content_workflow_engine::{ContentType, WorkflowRegistry};
//! use content_workflow_loader::{load_document, Callables};
//! use std::collections::HashMap;
//!
//! type Content = HashMap<String, String>;
//!
//! let json = r#"{
//!     "workflows": [{
//!         "type": "publishing",
//!         "name": "Publishing",
//!         "state_attr": "review_state",
//!         "initial_state": "pending",
//!         "content_types": ["Document"],
//!         "states": [{"name": "pending"}, {"name": "published"}],
//!         "transitions": [
//!             {"name": "publish", "from_state": "pending", "to_state": "published"}
//!         ]
//!     }]
//! }"#;
//!
//! let callables = Callables::<Content, (), Content>::new();
//! let mut registry = WorkflowRegistry::new();
//! let registered = load_document(json, &callables, &mut registry).unwrap();
//! assert_eq!(registered, 1);
//!
//! let workflow = registry
//!     .resolve(&ContentType::named("Document"), "publishing", None)
//!     .unwrap();
//! let mut doc = Content::new();
//! workflow.transition(&mut doc, None, "publish", None, &[]).unwrap();
//! assert_eq!(doc["review_state"], "published");
//! ```

#![deny(unsafe_code)]

pub mod callables;
pub mod compiler;
pub mod document;
pub mod errors;

pub use callables::Callables;
pub use compiler::{compile, load_document, register_document};
pub use document::{StateSpec, TransitionSpec, WorkflowDocument, WorkflowSpec};
pub use errors::{CallableKind, LoaderError, LoaderResult};
