//! Name → callable table consulted while compiling documents

use crate::errors::{CallableKind, LoaderError, LoaderResult};
use content_workflow_engine::{Callback, CallbackInfo, Elector, Guard, PermissionChecker, SharedGuard};
use content_workflow_types::WorkflowResult;
use std::collections::HashMap;
use std::sync::Arc;

/// Callables a document may reference, for content `C`, requests `R`
/// and elector contexts `X`
pub struct Callables<C: ?Sized, R: ?Sized, X: ?Sized> {
    callbacks: HashMap<String, Callback<C, R>>,
    guards: HashMap<String, SharedGuard<C, R>>,
    permission_checkers: HashMap<String, PermissionChecker<C, R>>,
    electors: HashMap<String, Elector<X>>,
}

impl<C: ?Sized, R: ?Sized, X: ?Sized> Callables<C, R, X> {
    pub fn new() -> Self {
        Self {
            callbacks: HashMap::new(),
            guards: HashMap::new(),
            permission_checkers: HashMap::new(),
            electors: HashMap::new(),
        }
    }

    /// Usable as a state or transition callback
    pub fn with_callback<F>(mut self, name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&mut C, &CallbackInfo<'_, C, R>) -> WorkflowResult<()> + Send + Sync + 'static,
    {
        self.callbacks.insert(name.into(), Arc::new(callback));
        self
    }

    pub fn with_guard<G>(mut self, name: impl Into<String>, guard: G) -> Self
    where
        G: Guard<C, R> + Send + Sync + 'static,
    {
        self.guards.insert(name.into(), Arc::new(guard));
        self
    }

    pub fn with_permission_checker<F>(mut self, name: impl Into<String>, checker: F) -> Self
    where
        F: Fn(&str, &C, &R) -> bool + Send + Sync + 'static,
    {
        self.permission_checkers
            .insert(name.into(), Arc::new(checker));
        self
    }

    pub fn with_elector<F>(mut self, name: impl Into<String>, elector: F) -> Self
    where
        F: Fn(&X) -> bool + Send + Sync + 'static,
    {
        self.electors.insert(name.into(), Arc::new(elector));
        self
    }

    pub fn callback(&self, name: &str) -> LoaderResult<Callback<C, R>> {
        lookup(&self.callbacks, CallableKind::Callback, name)
    }

    pub fn guard(&self, name: &str) -> LoaderResult<SharedGuard<C, R>> {
        lookup(&self.guards, CallableKind::Guard, name)
    }

    pub fn permission_checker(&self, name: &str) -> LoaderResult<PermissionChecker<C, R>> {
        lookup(&self.permission_checkers, CallableKind::PermissionChecker, name)
    }

    pub fn elector(&self, name: &str) -> LoaderResult<Elector<X>> {
        lookup(&self.electors, CallableKind::Elector, name)
    }
}

fn lookup<T: ?Sized>(table: &HashMap<String, Arc<T>>, kind: CallableKind, name: &str) -> LoaderResult<Arc<T>> {
    table
        .get(name)
        .cloned()
        .ok_or_else(|| LoaderError::UnknownCallable {
            kind,
            name: name.to_string(),
        })
}

impl<C: ?Sized, R: ?Sized, X: ?Sized> Default for Callables<C, R, X> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ?Sized, R: ?Sized, X: ?Sized> std::fmt::Debug for Callables<C, R, X> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = |table: Vec<&String>| {
            let mut table: Vec<String> = table.into_iter().cloned().collect();
            table.sort();
            table
        };
        f.debug_struct("Callables")
            .field("callbacks", &names(self.callbacks.keys().collect()))
            .field("guards", &names(self.guards.keys().collect()))
            .field("permission_checkers", &names(self.permission_checkers.keys().collect()))
            .field("electors", &names(self.electors.keys().collect()))
            .finish()
    }
}
