//! Callback, guard and permission-checker signatures
//!
//! Every callback and guard receives a [`CallbackInfo`] describing the
//! in-flight operation. It is built per invocation and never stored.

use crate::definition::{Transition, Workflow};
use content_workflow_types::WorkflowResult;
use std::sync::Arc;

/// Enter-state or transition callback. Errors propagate to the caller unchanged.
pub type Callback<C, R> =
    Arc<dyn Fn(&mut C, &CallbackInfo<'_, C, R>) -> WorkflowResult<()> + Send + Sync>;

/// `(permission, context, request) -> allowed`
pub type PermissionChecker<C, R> = Arc<dyn Fn(&str, &C, &R) -> bool + Send + Sync>;

/// A guard declared on a transition, shared by every execution
pub type SharedGuard<C, R> = Arc<dyn Guard<C, R> + Send + Sync>;

/// Ephemeral description of the operation a callback or guard runs inside
pub struct CallbackInfo<'a, C: ?Sized, R: ?Sized> {
    /// The workflow executing the operation
    pub workflow: &'a Workflow<C, R>,
    /// The transition being fired; `None` during `initialize` and `reset`
    pub transition: Option<&'a Transition<C, R>>,
    /// The originating request, when the caller supplied one
    pub request: Option<&'a R>,
}

impl<'a, C: ?Sized, R: ?Sized> CallbackInfo<'a, C, R> {
    pub fn new(
        workflow: &'a Workflow<C, R>,
        transition: Option<&'a Transition<C, R>>,
        request: Option<&'a R>,
    ) -> Self {
        Self {
            workflow,
            transition,
            request,
        }
    }

    pub fn transition_name(&self) -> Option<&'a str> {
        self.transition.map(|t| t.name())
    }

    pub fn permission(&self) -> Option<&'a str> {
        self.transition.and_then(|t| t.permission())
    }
}

impl<C: ?Sized, R: ?Sized> Clone for CallbackInfo<'_, C, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: ?Sized, R: ?Sized> Copy for CallbackInfo<'_, C, R> {}

impl<C: ?Sized, R: ?Sized> std::fmt::Debug for CallbackInfo<'_, C, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackInfo")
            .field("workflow", &self.workflow.name())
            .field("transition", &self.transition_name())
            .field("has_request", &self.request.is_some())
            .finish()
    }
}

/// A predicate consulted before a transition commits.
///
/// Returning an error vetoes the transition: no callback runs and the
/// content's state is left untouched.
pub trait Guard<C: ?Sized, R: ?Sized> {
    /// `context` is the object permissions are evaluated against; it is
    /// the content itself unless the caller delegated to another object.
    fn check(&self, context: &C, info: &CallbackInfo<'_, C, R>) -> WorkflowResult<()>;

    /// Short description for logging
    fn description(&self) -> &str {
        "guard"
    }
}

impl<C: ?Sized, R: ?Sized, F> Guard<C, R> for F
where
    F: Fn(&C, &CallbackInfo<'_, C, R>) -> WorkflowResult<()>,
{
    fn check(&self, context: &C, info: &CallbackInfo<'_, C, R>) -> WorkflowResult<()> {
        self(context, info)
    }
}

/// Pin a closure to the guard signature so its argument types are inferred
pub fn guard_fn<C: ?Sized, R: ?Sized, F>(f: F) -> F
where
    F: Fn(&C, &CallbackInfo<'_, C, R>) -> WorkflowResult<()>,
{
    f
}
