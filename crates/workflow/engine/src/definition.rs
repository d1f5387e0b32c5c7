//! Workflow definitions: states, transitions and structural validation
//!
//! A workflow is populated once (by code or by the declarative loader),
//! checked, and then only read. Execution never mutates the workflow;
//! it mutates the state attribute of the content it is given.
//!
//! Declaration order is significant everywhere: it decides which of
//! several matching transitions is tried first.

use crate::callback::{Callback, CallbackInfo, Guard, PermissionChecker, SharedGuard};
use content_workflow_types::{TransitionInfo, WorkflowError, WorkflowResult};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

// ── State ────────────────────────────────────────────────────────────

/// A named condition a piece of content can occupy
pub struct State<C: ?Sized, R: ?Sized = ()> {
    name: String,
    title: Option<String>,
    callback: Option<Callback<C, R>>,
    aliases: Vec<String>,
    metadata: HashMap<String, String>,
}

impl<C: ?Sized, R: ?Sized> State<C, R> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            callback: None,
            aliases: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Invoked whenever content enters this state
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut C, &CallbackInfo<'_, C, R>) -> WorkflowResult<()> + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }

    pub fn with_shared_callback(mut self, callback: Callback<C, R>) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Content storing `alias` is read as being in this state
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display title, defaulting to the state name
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Run the enter-callback, reporting whether one was declared
    pub(crate) fn enter(&self, content: &mut C, info: &CallbackInfo<'_, C, R>) -> WorkflowResult<bool> {
        match &self.callback {
            Some(callback) => {
                callback(content, info)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl<C: ?Sized, R: ?Sized> Clone for State<C, R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            title: self.title.clone(),
            callback: self.callback.clone(),
            aliases: self.aliases.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

impl<C: ?Sized, R: ?Sized> std::fmt::Debug for State<C, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("name", &self.name)
            .field("title", &self.title)
            .field("callback", &self.callback.is_some())
            .field("aliases", &self.aliases)
            .field("metadata", &self.metadata)
            .finish()
    }
}

// ── Transition ───────────────────────────────────────────────────────

/// A named, directed edge between two states
pub struct Transition<C: ?Sized, R: ?Sized = ()> {
    name: String,
    /// `None` is the "no state" sentinel
    from_state: Option<String>,
    to_state: String,
    callback: Option<Callback<C, R>>,
    permission: Option<String>,
    title: Option<String>,
    guards: Vec<SharedGuard<C, R>>,
    metadata: HashMap<String, String>,
}

impl<C: ?Sized, R: ?Sized> Transition<C, R> {
    pub fn new(
        name: impl Into<String>,
        from_state: impl Into<String>,
        to_state: impl Into<String>,
    ) -> Self {
        Self::build(name.into(), Some(from_state.into()), to_state.into())
    }

    /// A transition that applies to content with no state yet
    pub fn from_no_state(name: impl Into<String>, to_state: impl Into<String>) -> Self {
        Self::build(name.into(), None, to_state.into())
    }

    fn build(name: String, from_state: Option<String>, to_state: String) -> Self {
        Self {
            name,
            from_state,
            to_state,
            callback: None,
            permission: None,
            title: None,
            guards: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    /// Invoked on firing, before the destination state's enter-callback
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut C, &CallbackInfo<'_, C, R>) -> WorkflowResult<()> + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }

    pub fn with_shared_callback(mut self, callback: Callback<C, R>) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Requires the workflow to carry a permission checker
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Runs before any caller-supplied guard on every execution
    pub fn with_guard<G>(mut self, guard: G) -> Self
    where
        G: Guard<C, R> + Send + Sync + 'static,
    {
        self.guards.push(Arc::new(guard));
        self
    }

    pub fn with_shared_guard(mut self, guard: SharedGuard<C, R>) -> Self {
        self.guards.push(guard);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn from_state(&self) -> Option<&str> {
        self.from_state.as_deref()
    }

    pub fn to_state(&self) -> &str {
        &self.to_state
    }

    pub fn permission(&self) -> Option<&str> {
        self.permission.as_deref()
    }

    /// Display title, defaulting to the transition name
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    pub(crate) fn callback(&self) -> Option<&Callback<C, R>> {
        self.callback.as_ref()
    }

    pub(crate) fn guards(&self) -> &[SharedGuard<C, R>] {
        &self.guards
    }

    /// Owned, serializable snapshot
    pub fn info(&self) -> TransitionInfo {
        TransitionInfo {
            name: self.name.clone(),
            from_state: self.from_state.clone(),
            to_state: self.to_state.clone(),
            permission: self.permission.clone(),
            title: self.title().to_string(),
            metadata: self.metadata.clone(),
        }
    }
}

impl<C: ?Sized, R: ?Sized> Clone for Transition<C, R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            from_state: self.from_state.clone(),
            to_state: self.to_state.clone(),
            callback: self.callback.clone(),
            permission: self.permission.clone(),
            title: self.title.clone(),
            guards: self.guards.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

impl<C: ?Sized, R: ?Sized> std::fmt::Debug for Transition<C, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("name", &self.name)
            .field("from_state", &self.from_state)
            .field("to_state", &self.to_state)
            .field("callback", &self.callback.is_some())
            .field("permission", &self.permission)
            .field("guards", &self.guards.len())
            .finish()
    }
}

// ── Workflow ─────────────────────────────────────────────────────────

/// A finite state machine over content of type `C`, driven by requests of type `R`
pub struct Workflow<C: ?Sized, R: ?Sized = ()> {
    name: String,
    description: String,
    /// Attribute under which content stores its current state
    state_attr: String,
    initial_state: String,
    permission_checker: Option<PermissionChecker<C, R>>,
    states: Vec<State<C, R>>,
    state_index: HashMap<String, usize>,
    /// alias → canonical state name
    aliases: HashMap<String, String>,
    transitions: Vec<Transition<C, R>>,
    transition_index: HashMap<String, usize>,
}

impl<C: ?Sized, R: ?Sized> Workflow<C, R> {
    /// Create an empty workflow. Populate it, then call [`Workflow::check`].
    pub fn new(state_attr: impl Into<String>, initial_state: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            state_attr: state_attr.into(),
            initial_state: initial_state.into(),
            permission_checker: None,
            states: Vec::new(),
            state_index: HashMap::new(),
            aliases: HashMap::new(),
            transitions: Vec::new(),
            transition_index: HashMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Required before any transition may declare a permission
    pub fn with_permission_checker<F>(mut self, checker: F) -> Self
    where
        F: Fn(&str, &C, &R) -> bool + Send + Sync + 'static,
    {
        self.permission_checker = Some(Arc::new(checker));
        self
    }

    pub fn with_shared_permission_checker(mut self, checker: PermissionChecker<C, R>) -> Self {
        self.permission_checker = Some(checker);
        self
    }

    /// Declare a state.
    ///
    /// The name and every alias must be new among both state names and
    /// aliases. Nothing is registered if any of them collides.
    pub fn add_state(&mut self, state: State<C, R>) -> WorkflowResult<()> {
        if self.state_index.contains_key(&state.name) || self.aliases.contains_key(&state.name) {
            return Err(WorkflowError::DuplicateState(state.name));
        }

        let mut seen = HashSet::new();
        for alias in &state.aliases {
            let collides = *alias == state.name
                || self.state_index.contains_key(alias)
                || self.aliases.contains_key(alias)
                || !seen.insert(alias.as_str());
            if collides {
                return Err(WorkflowError::DuplicateAlias {
                    state: state.name.clone(),
                    alias: alias.clone(),
                });
            }
        }

        for alias in &state.aliases {
            self.aliases.insert(alias.clone(), state.name.clone());
        }
        self.state_index.insert(state.name.clone(), self.states.len());
        self.states.push(state);
        Ok(())
    }

    /// Declare a transition between previously declared states
    pub fn add_transition(&mut self, transition: Transition<C, R>) -> WorkflowResult<()> {
        if self.transition_index.contains_key(&transition.name) {
            return Err(WorkflowError::DuplicateTransition(transition.name));
        }
        if let Some(from_state) = &transition.from_state {
            if !self.state_index.contains_key(from_state) {
                return Err(WorkflowError::UnknownState(from_state.clone()));
            }
        }
        if !self.state_index.contains_key(&transition.to_state) {
            return Err(WorkflowError::UnknownState(transition.to_state));
        }
        if let Some(permission) = &transition.permission {
            if self.permission_checker.is_none() {
                return Err(WorkflowError::PermissionWithoutChecker {
                    transition: transition.name.clone(),
                    permission: permission.clone(),
                });
            }
        }

        self.transition_index
            .insert(transition.name.clone(), self.transitions.len());
        self.transitions.push(transition);
        Ok(())
    }

    /// Validate the populated workflow. Call once before executing anything.
    pub fn check(&self) -> WorkflowResult<()> {
        if !self.state_index.contains_key(&self.initial_state) {
            return Err(WorkflowError::UndefinedInitialState(
                self.initial_state.clone(),
            ));
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn state_attr(&self) -> &str {
        &self.state_attr
    }

    pub fn initial_state(&self) -> &str {
        &self.initial_state
    }

    pub fn has_permission_checker(&self) -> bool {
        self.permission_checker.is_some()
    }

    pub(crate) fn permission_checker(&self) -> Option<&PermissionChecker<C, R>> {
        self.permission_checker.as_ref()
    }

    /// States in declaration order
    pub fn states(&self) -> &[State<C, R>] {
        &self.states
    }

    /// Transitions in declaration order
    pub fn transitions(&self) -> &[Transition<C, R>] {
        &self.transitions
    }

    pub fn get_state(&self, name: &str) -> Option<&State<C, R>> {
        self.state_index.get(name).map(|&i| &self.states[i])
    }

    pub fn get_transition(&self, name: &str) -> Option<&Transition<C, R>> {
        self.transition_index.get(name).map(|&i| &self.transitions[i])
    }

    /// Map an alias to its canonical state name; other values pass through
    pub fn resolve_alias<'a>(&'a self, value: &'a str) -> &'a str {
        self.aliases.get(value).map(String::as_str).unwrap_or(value)
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }
}

impl<C: ?Sized, R: ?Sized> Clone for Workflow<C, R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            description: self.description.clone(),
            state_attr: self.state_attr.clone(),
            initial_state: self.initial_state.clone(),
            permission_checker: self.permission_checker.clone(),
            states: self.states.clone(),
            state_index: self.state_index.clone(),
            aliases: self.aliases.clone(),
            transitions: self.transitions.clone(),
            transition_index: self.transition_index.clone(),
        }
    }
}

impl<C: ?Sized, R: ?Sized> std::fmt::Debug for Workflow<C, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workflow")
            .field("name", &self.name)
            .field("state_attr", &self.state_attr)
            .field("initial_state", &self.initial_state)
            .field("permission_checker", &self.permission_checker.is_some())
            .field("states", &self.states)
            .field("transitions", &self.transitions)
            .finish()
    }
}
