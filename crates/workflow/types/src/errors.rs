//! Error types for the workflow layer

/// Boxed error carried out of caller-supplied callbacks and guards
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while defining or executing a workflow
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    // ── Definition errors ────────────────────────────────────────────
    #[error("State {0:?} already defined")]
    DuplicateState(String),

    #[error("Alias {alias:?} for state {state:?} collides with an existing state or alias")]
    DuplicateAlias { state: String, alias: String },

    #[error("Duplicate transition name {0:?}")]
    DuplicateTransition(String),

    #[error("No such state {0:?}")]
    UnknownState(String),

    #[error("Permission {permission:?} on transition {transition:?} defined without permission checker on workflow")]
    PermissionWithoutChecker {
        transition: String,
        permission: String,
    },

    #[error("Workflow must define its initial state {0:?}")]
    UndefinedInitialState(String),

    // ── Transition errors ────────────────────────────────────────────
    #[error("No transition from {state:?} using transition name {transition:?}")]
    NoSuchTransition { state: String, transition: String },

    #[error("No transition from state {from:?} to state {to:?}")]
    NoTransitionToState { from: String, to: String },

    // ── Guard / permission errors ────────────────────────────────────
    #[error("{permission} permission required for transition using {label:?}")]
    PermissionDenied { permission: String, label: String },

    #[error("Guard vetoed transition {transition:?}: {reason}")]
    GuardRejected { transition: String, reason: String },

    // ── Caller-supplied code ─────────────────────────────────────────
    #[error("Callback failed: {0}")]
    Callback(#[source] BoxError),
}

impl WorkflowError {
    /// Wrap an arbitrary caller error raised inside a callback or guard
    pub fn callback(err: impl Into<BoxError>) -> Self {
        Self::Callback(err.into())
    }

    /// Build a guard veto for the named transition
    pub fn guard_rejected(transition: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::GuardRejected {
            transition: transition.into(),
            reason: reason.into(),
        }
    }

    /// Raised while building a workflow (`add_state`, `add_transition`, `check`)
    pub fn is_definition_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateState(_)
                | Self::DuplicateAlias { .. }
                | Self::DuplicateTransition(_)
                | Self::UnknownState(_)
                | Self::PermissionWithoutChecker { .. }
                | Self::UndefinedInitialState(_)
        )
    }

    /// Raised while executing against content.
    ///
    /// `UnknownState` is in both classes: `add_transition` reports it for
    /// an undeclared endpoint, `reset` for content carrying an undeclared
    /// state.
    pub fn is_transition_error(&self) -> bool {
        matches!(
            self,
            Self::NoSuchTransition { .. } | Self::NoTransitionToState { .. } | Self::UnknownState(_)
        )
    }

    /// Raised by a guard, including the synthesized permission guard
    pub fn is_permission_error(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. } | Self::GuardRejected { .. })
    }
}

/// Result type alias for workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;
