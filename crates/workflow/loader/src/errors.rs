//! Loader error types

use content_workflow_engine::ContentType;
use content_workflow_types::WorkflowError;
use std::fmt;

/// The kind of named callable a document may reference
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallableKind {
    Callback,
    Guard,
    PermissionChecker,
    Elector,
}

impl fmt::Display for CallableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CallableKind::Callback => "callback",
            CallableKind::Guard => "guard",
            CallableKind::PermissionChecker => "permission checker",
            CallableKind::Elector => "elector",
        };
        f.write_str(label)
    }
}

/// Errors raised while loading a workflow document
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("Invalid workflow document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown {kind} {name:?}")]
    UnknownCallable { kind: CallableKind, name: String },

    #[error("Workflow {workflow:?}: {source}")]
    Definition {
        workflow: String,
        source: WorkflowError,
    },

    #[error("Conflicting {workflow_type:?} workflows for {content_type} on state attribute {state_attr:?}")]
    Conflict {
        content_type: ContentType,
        workflow_type: String,
        state_attr: String,
        elector: Option<String>,
    },
}

impl LoaderError {
    /// The underlying definition error, when there is one
    pub fn definition_error(&self) -> Option<&WorkflowError> {
        match self {
            LoaderError::Definition { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type alias for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;
