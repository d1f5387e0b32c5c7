//! Transition execution against stateful content
//!
//! The executor reads and writes exactly one attribute on the content:
//! the workflow's `state_attr`. A transition commits in a fixed order:
//!
//! 1. guards declared on the transition
//! 2. guards supplied by the caller
//! 3. the permission guard, when the workflow has a checker and the
//!    transition declares a permission
//! 4. the transition's callback
//! 5. the destination state's enter-callback
//! 6. the state write
//!
//! Any failure in 1-3 leaves the content untouched. A failure in 4 or 5
//! skips the state write but keeps whatever the callbacks already did.

use crate::callback::{CallbackInfo, Guard};
use crate::definition::{State, Transition, Workflow};
use crate::guards::permission_guard;
use content_workflow_types::{
    StateEntry, Stateful, TransitionRecord, WorkflowError, WorkflowResult,
};

impl<C: Stateful + ?Sized, R: ?Sized> Workflow<C, R> {
    /// The content's state, alias-resolved, without initializing it
    pub fn peek_state(&self, content: &C) -> Option<String> {
        content
            .state_value(self.state_attr())
            .map(|value| self.resolve_alias(value).to_string())
    }

    pub fn has_state(&self, content: &C) -> bool {
        content.state_value(self.state_attr()).is_some()
    }

    /// The content's current state.
    ///
    /// Content without a state is initialized first, so reading can
    /// write the state attribute and run the initial state's callback.
    pub fn state_of(&self, content: &mut C) -> WorkflowResult<String> {
        if let Some(state) = self.peek_state(content) {
            return Ok(state);
        }
        tracing::debug!(
            workflow = %self.name(),
            state = %self.initial_state(),
            "Lazily initializing content"
        );
        Ok(self.initialize(content)?.state)
    }

    /// Put the content into the initial state, whatever it held before
    pub fn initialize(&self, content: &mut C) -> WorkflowResult<StateEntry> {
        let state = self
            .get_state(self.initial_state())
            .ok_or_else(|| WorkflowError::UndefinedInitialState(self.initial_state().to_string()))?;
        self.enter(content, state)
    }

    /// Replay the entry side effects of the content's current state.
    ///
    /// Content without a state is initialized instead. The canonical
    /// state name is written back, so an aliased value is normalized.
    pub fn reset(&self, content: &mut C) -> WorkflowResult<StateEntry> {
        let Some(current) = self.peek_state(content) else {
            return self.initialize(content);
        };
        let state = self
            .get_state(&current)
            .ok_or_else(|| WorkflowError::UnknownState(current.clone()))?;
        tracing::debug!(workflow = %self.name(), state = %current, "Resetting content");
        self.enter(content, state)
    }

    fn enter(&self, content: &mut C, state: &State<C, R>) -> WorkflowResult<StateEntry> {
        let info = CallbackInfo::new(self, None, None);
        let entered = state.enter(content, &info)?;
        content.set_state_value(self.state_attr(), state.name());
        Ok(StateEntry {
            state: state.name().to_string(),
            entered,
        })
    }

    /// Fire the transition named `transition_name` out of the current state.
    ///
    /// `context` is what guards and the permission checker see; it
    /// defaults to the content itself.
    pub fn transition(
        &self,
        content: &mut C,
        request: Option<&R>,
        transition_name: &str,
        context: Option<&C>,
        guards: &[&dyn Guard<C, R>],
    ) -> WorkflowResult<TransitionRecord> {
        let current = self.state_of(content)?;
        let transition = self
            .transitions()
            .iter()
            .find(|t| t.name() == transition_name && t.from_state() == Some(current.as_str()))
            .ok_or_else(|| WorkflowError::NoSuchTransition {
                state: current.clone(),
                transition: transition_name.to_string(),
            })?;
        self.fire(content, request, transition, context, guards, &current, transition_name)
    }

    /// Move the content into `to_state` by any transition that leads there.
    ///
    /// Candidates are tried in declaration order and the first success
    /// wins. When every candidate fails, the last failure is returned.
    /// Returns `Ok(None)` when the content is already in `to_state` and
    /// `skip_same` is set.
    pub fn transition_to_state(
        &self,
        content: &mut C,
        request: Option<&R>,
        to_state: &str,
        context: Option<&C>,
        guards: &[&dyn Guard<C, R>],
        skip_same: bool,
    ) -> WorkflowResult<Option<TransitionRecord>> {
        let current = self.state_of(content)?;
        if skip_same && current == to_state {
            return Ok(None);
        }

        let mut last_error = None;
        let candidates = self
            .transitions()
            .iter()
            .filter(|t| t.from_state() == Some(current.as_str()) && t.to_state() == to_state);
        for transition in candidates {
            match self.fire(content, request, transition, context, guards, &current, to_state) {
                Ok(record) => return Ok(Some(record)),
                Err(err) => {
                    tracing::debug!(
                        workflow = %self.name(),
                        transition = %transition.name(),
                        error = %err,
                        "Candidate transition failed"
                    );
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| WorkflowError::NoTransitionToState {
            from: current,
            to: to_state.to_string(),
        }))
    }

    #[allow(clippy::too_many_arguments)]
    fn fire(
        &self,
        content: &mut C,
        request: Option<&R>,
        transition: &Transition<C, R>,
        context: Option<&C>,
        guards: &[&dyn Guard<C, R>],
        from_state: &str,
        label: &str,
    ) -> WorkflowResult<TransitionRecord> {
        let info = CallbackInfo::new(self, Some(transition), request);

        let guard_context = context.unwrap_or(&*content);
        for guard in transition.guards() {
            guard.check(guard_context, &info)?;
        }
        for guard in guards {
            guard.check(guard_context, &info)?;
        }
        if let (Some(checker), Some(_)) = (self.permission_checker(), transition.permission()) {
            permission_guard(request, label, checker).check(guard_context, &info)?;
        }

        let destination = self
            .get_state(transition.to_state())
            .ok_or_else(|| WorkflowError::UnknownState(transition.to_state().to_string()))?;

        if let Some(callback) = transition.callback() {
            callback(content, &info)?;
        }
        destination.enter(content, &info)?;
        content.set_state_value(self.state_attr(), destination.name());

        tracing::debug!(
            workflow = %self.name(),
            transition = %transition.name(),
            from = %from_state,
            to = %destination.name(),
            "Transition fired"
        );

        Ok(TransitionRecord {
            transition: transition.name().to_string(),
            from_state: from_state.to_string(),
            to_state: destination.name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::guard_fn;
    use crate::testing::RecordingContent;

    struct Request {
        roles: Vec<&'static str>,
    }

    impl Request {
        fn with_roles(roles: &[&'static str]) -> Self {
            Self {
                roles: roles.to_vec(),
            }
        }
    }

    type Wf = Workflow<RecordingContent, Request>;

    fn checker(permission: &str, _: &RecordingContent, request: &Request) -> bool {
        request.roles.contains(&permission)
    }

    fn make_publishing() -> Wf {
        let mut wf = Wf::new("review_state", "pending")
            .with_name("Publishing")
            .with_permission_checker(checker);
        wf.add_state(State::new("pending").with_callback(|c: &mut RecordingContent, _| {
            c.record("enter pending");
            Ok(())
        }))
        .unwrap();
        wf.add_state(
            State::new("published")
                .with_alias("public")
                .with_callback(|c: &mut RecordingContent, _| {
                    c.record("enter published");
                    Ok(())
                }),
        )
        .unwrap();
        wf.add_state(State::new("private")).unwrap();
        wf.add_transition(
            Transition::new("publish", "pending", "published")
                .with_permission("moderate")
                .with_callback(|c: &mut RecordingContent, info| {
                    c.record(format!("fire {}", info.transition_name().unwrap_or("?")));
                    Ok(())
                }),
        )
        .unwrap();
        wf.add_transition(Transition::new("reject", "pending", "private"))
            .unwrap();
        wf.add_transition(Transition::new("retract", "published", "pending"))
            .unwrap();
        wf.add_transition(Transition::new("submit", "private", "pending"))
            .unwrap();
        wf.check().unwrap();
        wf
    }

    fn pending() -> RecordingContent {
        RecordingContent::new("doc").with_state("review_state", "pending")
    }

    #[test]
    fn test_state_of_lazily_initializes() {
        let wf = make_publishing();
        let mut content = RecordingContent::new("doc");

        assert!(!wf.has_state(&content));
        assert_eq!(wf.peek_state(&content), None);
        assert_eq!(wf.state_of(&mut content).unwrap(), "pending");
        assert!(wf.has_state(&content));
        assert_eq!(content.events(), &["enter pending".to_string()]);

        // Second read does not re-run the callback
        assert_eq!(wf.state_of(&mut content).unwrap(), "pending");
        assert_eq!(content.events().len(), 1);
    }

    #[test]
    fn test_state_of_resolves_alias() {
        let wf = make_publishing();
        let mut content = RecordingContent::new("doc").with_state("review_state", "public");
        assert_eq!(wf.peek_state(&content).as_deref(), Some("published"));
        assert_eq!(wf.state_of(&mut content).unwrap(), "published");
        assert!(content.writes().is_empty());
    }

    #[test]
    fn test_initialize_overwrites() {
        let wf = make_publishing();
        let mut content = RecordingContent::new("doc").with_state("review_state", "private");
        let entry = wf.initialize(&mut content).unwrap();
        assert_eq!(entry.state, "pending");
        assert!(entry.entered);
        assert_eq!(content.state_value("review_state"), Some("pending"));
    }

    #[test]
    fn test_initialize_without_callback() {
        let mut wf: Wf = Workflow::new("state", "private");
        wf.add_state(State::new("private")).unwrap();
        let mut content = RecordingContent::new("doc");
        let entry = wf.initialize(&mut content).unwrap();
        assert_eq!(entry.state, "private");
        assert!(!entry.entered);
    }

    #[test]
    fn test_initialize_undeclared_initial_state() {
        let wf: Wf = Workflow::new("state", "nowhere");
        let mut content = RecordingContent::new("doc");
        let result = wf.initialize(&mut content);
        assert!(matches!(result, Err(WorkflowError::UndefinedInitialState(_))));
        assert!(content.writes().is_empty());
    }

    #[test]
    fn test_reset_replays_entry_and_normalizes_alias() {
        let wf = make_publishing();
        let mut content = RecordingContent::new("doc").with_state("review_state", "public");
        let entry = wf.reset(&mut content).unwrap();
        assert_eq!(entry.state, "published");
        assert!(entry.entered);
        assert_eq!(content.events(), &["enter published".to_string()]);
        assert_eq!(content.state_value("review_state"), Some("published"));
    }

    #[test]
    fn test_reset_uninitialized_initializes() {
        let wf = make_publishing();
        let mut content = RecordingContent::new("doc");
        let entry = wf.reset(&mut content).unwrap();
        assert_eq!(entry.state, "pending");
        assert_eq!(content.events(), &["enter pending".to_string()]);
    }

    #[test]
    fn test_reset_unknown_state() {
        let wf = make_publishing();
        let mut content = RecordingContent::new("doc").with_state("review_state", "archived");
        let result = wf.reset(&mut content);
        assert!(matches!(result, Err(WorkflowError::UnknownState(ref s)) if s == "archived"));
    }

    #[test]
    fn test_transition_runs_callbacks_in_order() {
        let wf = make_publishing();
        let mut content = pending();
        let request = Request::with_roles(&["moderate"]);

        let record = wf
            .transition(&mut content, Some(&request), "publish", None, &[])
            .unwrap();
        assert_eq!(record.from_state, "pending");
        assert_eq!(record.to_state, "published");
        assert_eq!(
            content.events(),
            &["fire publish".to_string(), "enter published".to_string()]
        );
        assert_eq!(content.state_value("review_state"), Some("published"));
    }

    #[test]
    fn test_no_such_transition() {
        let wf = make_publishing();
        let mut content = pending();
        let result = wf.transition(&mut content, None, "retract", None, &[]);
        match result {
            Err(WorkflowError::NoSuchTransition { state, transition }) => {
                assert_eq!(state, "pending");
                assert_eq!(transition, "retract");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(content.writes().is_empty());
    }

    #[test]
    fn test_permission_denied_leaves_content_untouched() {
        let wf = make_publishing();
        let mut content = pending();
        let request = Request::with_roles(&["view"]);

        let err = wf
            .transition(&mut content, Some(&request), "publish", None, &[])
            .unwrap_err();
        assert!(err.is_permission_error());
        assert_eq!(
            err.to_string(),
            "moderate permission required for transition using \"publish\""
        );
        assert!(content.events().is_empty());
        assert_eq!(content.state_value("review_state"), Some("pending"));
    }

    #[test]
    fn test_no_request_skips_permission() {
        let wf = make_publishing();
        let mut content = pending();
        assert!(wf.transition(&mut content, None, "publish", None, &[]).is_ok());
    }

    #[test]
    fn test_delegated_context() {
        let wf = make_publishing();
        let mut content = pending();
        let container = RecordingContent::new("folder");
        let request = Request::with_roles(&["moderate"]);
        let only_folders = guard_fn(|ctx: &RecordingContent, info: &CallbackInfo<'_, RecordingContent, Request>| {
            if ctx.name == "folder" {
                Ok(())
            } else {
                Err(WorkflowError::guard_rejected(
                    info.transition_name().unwrap_or_default(),
                    "guards must see the container",
                ))
            }
        });

        let result = wf.transition(&mut content, Some(&request), "publish", None, &[&only_folders]);
        assert!(matches!(result, Err(WorkflowError::GuardRejected { .. })));

        wf.transition(
            &mut content,
            Some(&request),
            "publish",
            Some(&container),
            &[&only_folders],
        )
        .unwrap();
        assert_eq!(content.state_value("review_state"), Some("published"));
    }

    #[test]
    fn test_guard_order() {
        use std::sync::{Arc, Mutex};

        let seen = Arc::new(Mutex::new(Vec::new()));
        let declared = Arc::clone(&seen);
        let mut wf = Wf::new("state", "a").with_permission_checker(checker);
        wf.add_state(State::new("a")).unwrap();
        wf.add_state(State::new("b")).unwrap();
        wf.add_transition(
            Transition::new("go", "a", "b")
                .with_permission("edit")
                .with_guard(guard_fn(move |_: &RecordingContent, _: &CallbackInfo<'_, RecordingContent, Request>| {
                    declared.lock().unwrap().push("declared");
                    Ok(())
                })),
        )
        .unwrap();

        let supplied = Arc::clone(&seen);
        let caller = guard_fn(move |_: &RecordingContent, _: &CallbackInfo<'_, RecordingContent, Request>| {
            supplied.lock().unwrap().push("caller");
            Ok(())
        });

        // Permission is checked last, after both guards ran
        let mut content = RecordingContent::new("doc");
        let request = Request::with_roles(&[]);
        let result = wf.transition(&mut content, Some(&request), "go", None, &[&caller]);
        assert!(matches!(result, Err(WorkflowError::PermissionDenied { .. })));
        assert_eq!(*seen.lock().unwrap(), vec!["declared", "caller"]);
        assert_eq!(content.state_value("state"), Some("a"));
    }

    #[test]
    fn test_callback_error_propagates_without_write() {
        let mut wf: Wf = Workflow::new("state", "a");
        wf.add_state(State::new("a")).unwrap();
        wf.add_state(State::new("b")).unwrap();
        wf.add_transition(Transition::new("go", "a", "b").with_callback(|_, _| {
            Err(WorkflowError::callback(std::io::Error::other("disk full")))
        }))
        .unwrap();

        let mut content = RecordingContent::new("doc").with_state("state", "a");
        let err = wf.transition(&mut content, None, "go", None, &[]).unwrap_err();
        assert!(matches!(err, WorkflowError::Callback(_)));
        assert_eq!(content.state_value("state"), Some("a"));
    }

    #[test]
    fn test_enter_callback_error_propagates_without_write() {
        let mut wf: Wf = Workflow::new("state", "a");
        wf.add_state(State::new("a")).unwrap();
        wf.add_state(State::new("b").with_callback(|_, _| {
            Err(WorkflowError::callback(std::io::Error::other("boom")))
        }))
        .unwrap();
        wf.add_transition(Transition::new("go", "a", "b").with_callback(|c: &mut RecordingContent, _| {
            c.record("t");
            Ok(())
        }))
        .unwrap();

        let mut content = RecordingContent::new("doc").with_state("state", "a");
        let err = wf.transition(&mut content, None, "go", None, &[]).unwrap_err();
        assert!(matches!(err, WorkflowError::Callback(_)));
        // The transition callback already ran; its effects are not undone
        assert_eq!(content.events(), &["t".to_string()]);
        assert_eq!(content.state_value("state"), Some("a"));
        assert!(content.writes().is_empty());
    }

    #[test]
    fn test_transition_to_state() {
        let wf = make_publishing();
        let mut content = pending();

        let record = wf
            .transition_to_state(&mut content, None, "private", None, &[], true)
            .unwrap()
            .unwrap();
        assert_eq!(record.transition, "reject");

        // Already there
        let skipped = wf
            .transition_to_state(&mut content, None, "private", None, &[], true)
            .unwrap();
        assert!(skipped.is_none());
    }

    #[test]
    fn test_transition_to_state_without_route() {
        let wf = make_publishing();
        let mut content = pending();
        let mut published = RecordingContent::new("doc").with_state("review_state", "published");

        let result = wf.transition_to_state(&mut published, None, "private", None, &[], true);
        match result {
            Err(WorkflowError::NoTransitionToState { from, to }) => {
                assert_eq!(from, "published");
                assert_eq!(to, "private");
            }
            other => panic!("unexpected: {other:?}"),
        }

        // skip_same off with no self-loop declared
        let result = wf.transition_to_state(&mut content, None, "pending", None, &[], false);
        assert!(matches!(result, Err(WorkflowError::NoTransitionToState { .. })));
    }

    #[test]
    fn test_transition_to_state_label_and_last_failure() {
        let mut wf = Wf::new("state", "draft").with_permission_checker(checker);
        wf.add_state(State::new("draft")).unwrap();
        wf.add_state(State::new("live")).unwrap();
        for (name, permission) in [("fast", "admin"), ("slow", "editor")] {
            wf.add_transition(
                Transition::new(name, "draft", "live")
                    .with_permission(permission)
                    .with_callback(|c: &mut RecordingContent, info| {
                        c.record(info.transition_name().unwrap_or("?"));
                        Ok(())
                    }),
            )
            .unwrap();
        }

        let mut content = RecordingContent::new("doc");
        let nobody = Request::with_roles(&[]);
        let err = wf
            .transition_to_state(&mut content, Some(&nobody), "live", None, &[], true)
            .unwrap_err();
        match err {
            WorkflowError::PermissionDenied { permission, label } => {
                assert_eq!(permission, "editor");
                assert_eq!(label, "live");
            }
            other => panic!("unexpected: {other}"),
        }

        // First candidate denied, second allowed
        let editor = Request::with_roles(&["editor"]);
        let record = wf
            .transition_to_state(&mut content, Some(&editor), "live", None, &[], true)
            .unwrap()
            .unwrap();
        assert_eq!(record.transition, "slow");
        assert_eq!(content.events(), &["slow".to_string()]);
    }
}
