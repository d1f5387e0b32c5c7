//! Permission guard synthesized for transitions that declare a permission
//!
//! Policy: permissions are only enforceable when a request exists. With
//! no request the guard passes, so system code (migrations, scripts) can
//! drive transitions without a user context.

use crate::callback::{CallbackInfo, Guard, PermissionChecker};
use content_workflow_types::{WorkflowError, WorkflowResult};

/// Vetoes a transition when the workflow's permission checker denies
/// the transition's permission for the current request
pub struct PermissionGuard<'a, C: ?Sized, R: ?Sized> {
    request: Option<&'a R>,
    /// Transition or target-state name reported in the error
    label: &'a str,
    checker: &'a PermissionChecker<C, R>,
}

impl<'a, C: ?Sized, R: ?Sized> PermissionGuard<'a, C, R> {
    pub fn new(request: Option<&'a R>, label: &'a str, checker: &'a PermissionChecker<C, R>) -> Self {
        Self {
            request,
            label,
            checker,
        }
    }
}

impl<C: ?Sized, R: ?Sized> Guard<C, R> for PermissionGuard<'_, C, R> {
    fn check(&self, context: &C, info: &CallbackInfo<'_, C, R>) -> WorkflowResult<()> {
        let (Some(request), Some(permission)) = (self.request, info.permission()) else {
            return Ok(());
        };
        if (self.checker)(permission, context, request) {
            Ok(())
        } else {
            Err(WorkflowError::PermissionDenied {
                permission: permission.to_string(),
                label: self.label.to_string(),
            })
        }
    }

    fn description(&self) -> &str {
        "permission required"
    }
}

/// Build the permission guard for one execution
pub fn permission_guard<'a, C: ?Sized, R: ?Sized>(
    request: Option<&'a R>,
    label: &'a str,
    checker: &'a PermissionChecker<C, R>,
) -> PermissionGuard<'a, C, R> {
    PermissionGuard::new(request, label, checker)
}
