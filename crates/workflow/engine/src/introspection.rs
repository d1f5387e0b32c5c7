//! "What can happen next" queries
//!
//! Both queries apply the same request policy as the permission guard:
//! a transition's permission is only consulted when a request is given.

use crate::definition::{Transition, Workflow};
use content_workflow_types::{FromState, StateInfo, Stateful, WorkflowResult};

impl<C: Stateful + ?Sized, R: ?Sized> Workflow<C, R> {
    /// Transitions leaving `from_state`, in declaration order, that the
    /// permission checker allows for `(context, request)`.
    ///
    /// Querying [`FromState::Current`] initializes uninitialized content.
    /// Without a request, permissioned transitions are listed unfiltered;
    /// the checker is never called with an absent request.
    pub fn get_transitions(
        &self,
        content: &mut C,
        request: Option<&R>,
        context: Option<&C>,
        from_state: FromState<'_>,
    ) -> WorkflowResult<Vec<&Transition<C, R>>> {
        let current = match from_state {
            FromState::Current => Some(self.state_of(content)?),
            _ => None,
        };
        let origin = from_state.as_option(current.as_deref().unwrap_or_default());
        let context = context.unwrap_or(&*content);

        Ok(self
            .transitions()
            .iter()
            .filter(|t| t.from_state() == origin && self.permits(t, context, request))
            .collect())
    }

    /// One record per declared state, in declaration order.
    ///
    /// Each record lists the permitted transitions from `from_state`
    /// into that state. `current` always refers to the content's actual
    /// state, whatever origin was queried.
    pub fn state_info(
        &self,
        content: &mut C,
        request: Option<&R>,
        context: Option<&C>,
        from_state: FromState<'_>,
    ) -> WorkflowResult<Vec<StateInfo>> {
        let current = self.state_of(content)?;
        let origin = from_state.as_option(&current);
        let context = context.unwrap_or(&*content);

        Ok(self
            .states()
            .iter()
            .map(|state| StateInfo {
                name: state.name().to_string(),
                title: state.title().to_string(),
                data: state.metadata().clone(),
                initial: state.name() == self.initial_state(),
                current: state.name() == current,
                transitions: self
                    .transitions()
                    .iter()
                    .filter(|t| {
                        t.from_state() == origin
                            && t.to_state() == state.name()
                            && self.permits(t, context, request)
                    })
                    .map(Transition::info)
                    .collect(),
            })
            .collect())
    }

    fn permits(&self, transition: &Transition<C, R>, context: &C, request: Option<&R>) -> bool {
        match (transition.permission(), self.permission_checker(), request) {
            (Some(permission), Some(checker), Some(request)) => checker(permission, context, request),
            _ => true,
        }
    }
}
