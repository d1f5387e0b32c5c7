//! Keyed transition table
//!
//! A smaller machine than [`Workflow`](crate::Workflow): no declared
//! states, no guards, no permissions. Entries map
//! `(state, transition id)` to `(new state, action)`, and an entry whose
//! id is `None` catches every id not matched exactly for that state.

use content_workflow_types::{Stateful, TransitionRecord, WorkflowError, WorkflowResult};
use std::collections::HashMap;
use std::sync::Arc;

/// `(current_state, new_state, transition_id, content)`
pub type Action<C> = Arc<dyn Fn(&str, &str, &str, &mut C) -> WorkflowResult<()> + Send + Sync>;

/// Same shape as [`Action`]. A failing before-hook vetoes the step.
pub type Hook<C> = Action<C>;

/// Runs after the write has been committed, so it cannot fail the step
pub type AfterHook<C> = Arc<dyn Fn(&str, &str, &str, &mut C) + Send + Sync>;

type Key = (String, Option<String>);

struct Entry<C: ?Sized> {
    key: Key,
    new_state: String,
    action: Action<C>,
}

pub struct TransitionTable<C: ?Sized> {
    state_attr: String,
    initial_state: String,
    entries: Vec<Entry<C>>,
    index: HashMap<Key, usize>,
    before: Option<Hook<C>>,
    after: Option<AfterHook<C>>,
}

impl<C: Stateful + ?Sized> TransitionTable<C> {
    pub fn new(state_attr: impl Into<String>, initial_state: impl Into<String>) -> Self {
        Self {
            state_attr: state_attr.into(),
            initial_state: initial_state.into(),
            entries: Vec::new(),
            index: HashMap::new(),
            before: None,
            after: None,
        }
    }

    /// Runs after the entry is found and before its action
    pub fn with_before_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &str, &str, &mut C) -> WorkflowResult<()> + Send + Sync + 'static,
    {
        self.before = Some(Arc::new(hook));
        self
    }

    /// Runs once the new state has been written
    pub fn with_after_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &str, &str, &mut C) + Send + Sync + 'static,
    {
        self.after = Some(Arc::new(hook));
        self
    }

    /// Add or replace the entry for `(state, transition_id)`.
    ///
    /// `None` as the id declares the catch-all for `state`. Replacing an
    /// entry keeps its original position.
    pub fn add<F>(
        &mut self,
        state: impl Into<String>,
        transition_id: Option<&str>,
        new_state: impl Into<String>,
        action: F,
    ) where
        F: Fn(&str, &str, &str, &mut C) -> WorkflowResult<()> + Send + Sync + 'static,
    {
        let key = (state.into(), transition_id.map(str::to_string));
        let entry = Entry {
            key: key.clone(),
            new_state: new_state.into(),
            action: Arc::new(action),
        };
        match self.index.get(&key) {
            Some(&i) => self.entries[i] = entry,
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Stored state, or the initial state. Never writes.
    pub fn state_of(&self, content: &C) -> String {
        content
            .state_value(&self.state_attr)
            .unwrap_or(self.initial_state.as_str())
            .to_string()
    }

    /// Ids leaving `from_state` (default: the content's state), catch-alls excluded
    pub fn transitions(&self, content: &C, from_state: Option<&str>) -> Vec<String> {
        let state = match from_state {
            Some(state) => state.to_string(),
            None => self.state_of(content),
        };
        self.entries
            .iter()
            .filter(|e| e.key.0 == state)
            .filter_map(|e| e.key.1.clone())
            .collect()
    }

    pub fn execute(&self, content: &mut C, transition_id: &str) -> WorkflowResult<TransitionRecord> {
        let state = self.state_of(content);
        let entry = self
            .lookup(&state, Some(transition_id))
            .or_else(|| self.lookup(&state, None))
            .ok_or_else(|| WorkflowError::NoSuchTransition {
                state: state.clone(),
                transition: transition_id.to_string(),
            })?;
        let new_state = entry.new_state.as_str();

        if let Some(before) = &self.before {
            before(&state, new_state, transition_id, content)?;
        }
        (entry.action)(&state, new_state, transition_id, content)?;
        content.set_state_value(&self.state_attr, new_state);
        if let Some(after) = &self.after {
            after(&state, new_state, transition_id, content);
        }

        tracing::debug!(from = %state, to = %new_state, transition_id, "Table transition executed");
        Ok(TransitionRecord {
            transition: transition_id.to_string(),
            from_state: state,
            to_state: new_state.to_string(),
        })
    }

    fn lookup(&self, state: &str, transition_id: Option<&str>) -> Option<&Entry<C>> {
        let key = (state.to_string(), transition_id.map(str::to_string));
        self.index.get(&key).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
