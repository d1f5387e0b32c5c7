//! Workflow registry and resolver
//!
//! Workflows are registered per `(content type, workflow type)` as an
//! ordered list of candidates. Resolution is a pure read: the
//! type-specific list is consulted first, then the list registered for
//! [`ContentType::Default`].
//!
//! Within one list the first candidate whose elector accepts the
//! context wins outright. Otherwise the first candidate without an
//! elector is the fallback.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// `(context) -> applies`
pub type Elector<X> = Arc<dyn Fn(&X) -> bool + Send + Sync>;

// ── ContentType ──────────────────────────────────────────────────────

/// The content-type token workflows are registered under
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// Generic marker consulted when no type-specific workflow applies
    Default,
    Named(String),
}

impl ContentType {
    pub fn named(name: impl Into<String>) -> Self {
        ContentType::Named(name.into())
    }

    /// Token derived from a Rust type name
    pub fn of<T: ?Sized>() -> Self {
        ContentType::Named(std::any::type_name::<T>().to_string())
    }

    pub fn is_default(&self) -> bool {
        matches!(self, ContentType::Default)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentType::Default => f.write_str("<default>"),
            ContentType::Named(name) => f.write_str(name),
        }
    }
}

impl From<&str> for ContentType {
    fn from(name: &str) -> Self {
        ContentType::Named(name.to_string())
    }
}

impl From<String> for ContentType {
    fn from(name: String) -> Self {
        ContentType::Named(name)
    }
}

// ── Candidate ────────────────────────────────────────────────────────

/// A registered workflow, optionally restricted by an elector
pub struct Candidate<W, X: ?Sized> {
    pub workflow: Arc<W>,
    pub elector: Option<Elector<X>>,
}

impl<W, X: ?Sized> Candidate<W, X> {
    /// An elector-less candidate, eligible as fallback
    pub fn new(workflow: Arc<W>) -> Self {
        Self {
            workflow,
            elector: None,
        }
    }

    pub fn with_elector<F>(mut self, elector: F) -> Self
    where
        F: Fn(&X) -> bool + Send + Sync + 'static,
    {
        self.elector = Some(Arc::new(elector));
        self
    }

    pub fn with_shared_elector(mut self, elector: Elector<X>) -> Self {
        self.elector = Some(elector);
        self
    }

    pub fn is_fallback(&self) -> bool {
        self.elector.is_none()
    }
}

impl<W, X: ?Sized> Clone for Candidate<W, X> {
    fn clone(&self) -> Self {
        Self {
            workflow: Arc::clone(&self.workflow),
            elector: self.elector.clone(),
        }
    }
}

impl<W: fmt::Debug, X: ?Sized> fmt::Debug for Candidate<W, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("workflow", &self.workflow)
            .field("elector", &self.elector.is_some())
            .finish()
    }
}

/// Select a workflow from one candidate list.
///
/// Candidates are scanned in registration order. An elector that
/// accepts `context` returns its workflow immediately. Otherwise the
/// first elector-less candidate is returned. Electors are never
/// consulted when `context` is `None`.
pub fn process_candidates<'a, W, X: ?Sized>(
    candidates: &'a [Candidate<W, X>],
    context: Option<&X>,
) -> Option<&'a Arc<W>> {
    let mut fallback = None;
    for (position, candidate) in candidates.iter().enumerate() {
        match (&candidate.elector, context) {
            (None, _) => {
                if fallback.is_none() {
                    fallback = Some(&candidate.workflow);
                }
            }
            (Some(elector), Some(context)) => {
                if elector(context) {
                    tracing::trace!(position, "Elector accepted context");
                    return Some(&candidate.workflow);
                }
            }
            (Some(_), None) => {}
        }
    }
    if fallback.is_some() {
        tracing::trace!("Using fallback candidate");
    }
    fallback
}

/// Resolve the workflow governing content of `content_type`.
///
/// The type-specific list is tried first; when it is missing or yields
/// nothing, the [`ContentType::Default`] list is processed the same way.
pub fn get_workflow<W, X: ?Sized>(
    registry: &WorkflowRegistry<W, X>,
    content_type: &ContentType,
    workflow_type: &str,
    context: Option<&X>,
) -> Option<Arc<W>> {
    if !content_type.is_default() {
        let specific = registry.candidates(content_type, workflow_type);
        if let Some(workflow) = process_candidates(specific, context) {
            tracing::trace!(%content_type, workflow_type, "Resolved from type-specific list");
            return Some(Arc::clone(workflow));
        }
    }

    let generic = registry.candidates(&ContentType::Default, workflow_type);
    let resolved = process_candidates(generic, context).map(Arc::clone);
    tracing::trace!(
        %content_type,
        workflow_type,
        found = resolved.is_some(),
        "Resolved from default list"
    );
    resolved
}

// ── WorkflowRegistry ─────────────────────────────────────────────────

/// Ordered candidate lists keyed by `(content type, workflow type)`
pub struct WorkflowRegistry<W, X: ?Sized> {
    lists: HashMap<(ContentType, String), Vec<Candidate<W, X>>>,
}

impl<W, X: ?Sized> WorkflowRegistry<W, X> {
    pub fn new() -> Self {
        Self {
            lists: HashMap::new(),
        }
    }

    /// Append a candidate; earlier registrations keep priority
    pub fn register(
        &mut self,
        content_type: ContentType,
        workflow_type: impl Into<String>,
        candidate: Candidate<W, X>,
    ) {
        let workflow_type = workflow_type.into();
        tracing::info!(
            %content_type,
            workflow_type = %workflow_type,
            elector = candidate.elector.is_some(),
            "Workflow candidate registered"
        );
        self.lists
            .entry((content_type, workflow_type))
            .or_default()
            .push(candidate);
    }

    /// Candidates in registration order; empty when nothing is registered
    pub fn candidates(&self, content_type: &ContentType, workflow_type: &str) -> &[Candidate<W, X>] {
        self.lists
            .get(&(content_type.clone(), workflow_type.to_string()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn resolve(
        &self,
        content_type: &ContentType,
        workflow_type: &str,
        context: Option<&X>,
    ) -> Option<Arc<W>> {
        get_workflow(self, content_type, workflow_type, context)
    }

    /// Total number of registered candidates
    pub fn count(&self) -> usize {
        self.lists.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Drop a whole candidate list, returning it
    pub fn remove(&mut self, content_type: &ContentType, workflow_type: &str) -> Vec<Candidate<W, X>> {
        let removed = self
            .lists
            .remove(&(content_type.clone(), workflow_type.to_string()))
            .unwrap_or_default();
        if !removed.is_empty() {
            tracing::info!(%content_type, workflow_type, count = removed.len(), "Workflow candidates removed");
        }
        removed
    }
}

impl<W, X: ?Sized> Default for WorkflowRegistry<W, X> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W, X: ?Sized> Clone for WorkflowRegistry<W, X> {
    fn clone(&self) -> Self {
        Self {
            lists: self.lists.clone(),
        }
    }
}

impl<W, X: ?Sized> fmt::Debug for WorkflowRegistry<W, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowRegistry")
            .field("lists", &self.lists.len())
            .field("candidates", &self.count())
            .finish()
    }
}
