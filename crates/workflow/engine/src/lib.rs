//! Content Workflow Engine
//!
//! Finite state machines over content objects. A [`Workflow`] declares
//! named states and named transitions between them; executing a
//! transition runs its guards, its callbacks and finally writes the new
//! state onto the content through the [`Stateful`] capability.
//!
//! # Key Principle
//!
//! **The workflow is read-only once checked.** Execution only mutates
//! the content it is handed, so one workflow can serve any number of
//! content objects concurrently.
//!
//! # Architecture
//!
//! - [`Workflow`], [`State`], [`Transition`]: definition and validation
//! - Executor (`state_of`, `initialize`, `reset`, `transition`,
//!   `transition_to_state`): guarded execution
//! - [`PermissionGuard`]: the guard synthesized for permissioned transitions
//! - Introspection (`get_transitions`, `state_info`): what can happen next
//! - [`WorkflowRegistry`], [`process_candidates`], [`get_workflow`]:
//!   choosing which workflow governs a piece of content
//! - [`TransitionTable`]: a minimal keyed machine without declared states
//!
//! # Example
//!
//! ```rust
//! use content_workflow_engine::{State, Transition, Workflow};
//! use std::collections::HashMap;
//!
//! type Content = HashMap<String, String>;
//!
//! let mut wf: Workflow<Content> = Workflow::new("review_state", "pending");
//! wf.add_state(State::new("pending")).unwrap();
//! wf.add_state(State::new("published")).unwrap();
//! wf.add_transition(Transition::new("publish", "pending", "published")).unwrap();
//! wf.check().unwrap();
//!
//! let mut doc = Content::new();
//! assert_eq!(wf.state_of(&mut doc).unwrap(), "pending");
//!
//! wf.transition(&mut doc, None, "publish", None, &[]).unwrap();
//! assert_eq!(doc["review_state"], "published");
//! ```

#![deny(unsafe_code)]

pub mod callback;
pub mod definition;
mod executor;
pub mod guards;
mod introspection;
pub mod registry;
pub mod table;
pub mod testing;

pub use callback::{guard_fn, Callback, CallbackInfo, Guard, PermissionChecker, SharedGuard};
pub use definition::{State, Transition, Workflow};
pub use guards::{permission_guard, PermissionGuard};
pub use registry::{
    get_workflow, process_candidates, Candidate, ContentType, Elector, WorkflowRegistry,
};
pub use table::{Action, AfterHook, Hook, TransitionTable};

pub use content_workflow_types::{
    FromState, StateEntry, StateInfo, Stateful, TransitionInfo, TransitionRecord, WorkflowError,
    WorkflowResult,
};
