//! Content Workflow Domain Types
//!
//! Shared vocabulary for the content workflow engine. A workflow is a
//! finite state machine over named states and named transitions; the
//! engine never owns the state of a piece of content, it only reads and
//! writes one attribute on a caller-supplied object.
//!
//! # Key Concepts
//!
//! - **Stateful**: the capability a content object exposes so the engine
//!   can read and write its current state under a named attribute.
//! - **WorkflowError**: the single error taxonomy for definition errors,
//!   transition errors and guard/permission vetoes.
//! - **StateInfo / TransitionInfo**: serializable snapshots produced by
//!   introspection, suitable for rendering "what can happen next" views.
//! - **TransitionRecord / StateEntry**: what an executed transition or an
//!   initialization actually did.
//!
//! # Design Principles
//!
//! 1. Content absence is meaningful. `None` from [`Stateful::state_value`]
//!    means "not yet initialized", never "unknown".
//! 2. Every failure is an explicit, typed error. Nothing is retried.
//! 3. State is written only after every guard and callback has succeeded.

#![deny(unsafe_code)]

mod content;
mod errors;
mod info;

pub use content::*;
pub use errors::*;
pub use info::*;
