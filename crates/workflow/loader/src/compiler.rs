//! Compiler: turns workflow documents into checked, registered workflows
//!
//! Each declaration is compiled once per content type it names, so
//! every registration owns an independent [`Workflow`]. Nothing is
//! registered unless the whole document compiles.

use crate::callables::Callables;
use crate::document::{StateSpec, TransitionSpec, WorkflowDocument, WorkflowSpec};
use crate::errors::{LoaderError, LoaderResult};
use content_workflow_engine::{Candidate, ContentType, State, Transition, Workflow, WorkflowRegistry};
use content_workflow_types::WorkflowError;
use std::collections::HashSet;
use std::sync::Arc;

/// Build one workflow through `add_state`, `add_transition` and `check`
pub fn compile<C: ?Sized, R: ?Sized, X: ?Sized>(
    spec: &WorkflowSpec,
    callables: &Callables<C, R, X>,
) -> LoaderResult<Workflow<C, R>> {
    let definition_error = |source: WorkflowError| LoaderError::Definition {
        workflow: spec.name.clone(),
        source,
    };

    let mut workflow = Workflow::new(spec.state_attr(), spec.initial_state.as_str())
        .with_name(spec.name.as_str())
        .with_description(spec.description.as_str());
    if let Some(name) = &spec.permission_checker {
        workflow = workflow.with_shared_permission_checker(callables.permission_checker(name)?);
    }

    for state in &spec.states {
        workflow
            .add_state(compile_state(state, callables)?)
            .map_err(definition_error)?;
    }
    for transition in &spec.transitions {
        workflow
            .add_transition(compile_transition(transition, callables)?)
            .map_err(definition_error)?;
    }
    workflow.check().map_err(definition_error)?;

    tracing::debug!(
        workflow = %spec.name,
        states = workflow.state_count(),
        transitions = workflow.transition_count(),
        "Workflow compiled"
    );
    Ok(workflow)
}

fn compile_state<C: ?Sized, R: ?Sized, X: ?Sized>(
    spec: &StateSpec,
    callables: &Callables<C, R, X>,
) -> LoaderResult<State<C, R>> {
    let mut state = State::new(spec.name.as_str());
    if let Some(title) = &spec.title {
        state = state.with_title(title.as_str());
    }
    if let Some(name) = &spec.callback {
        state = state.with_shared_callback(callables.callback(name)?);
    }
    for alias in &spec.aliases {
        state = state.with_alias(alias.as_str());
    }
    for (key, value) in &spec.metadata {
        state = state.with_metadata(key.as_str(), value.as_str());
    }
    Ok(state)
}

fn compile_transition<C: ?Sized, R: ?Sized, X: ?Sized>(
    spec: &TransitionSpec,
    callables: &Callables<C, R, X>,
) -> LoaderResult<Transition<C, R>> {
    let mut transition = match spec.from_state() {
        Some(from_state) => Transition::new(spec.name.as_str(), from_state, spec.to_state.as_str()),
        None => Transition::from_no_state(spec.name.as_str(), spec.to_state.as_str()),
    };
    if let Some(title) = &spec.title {
        transition = transition.with_title(title.as_str());
    }
    if let Some(name) = &spec.callback {
        transition = transition.with_shared_callback(callables.callback(name)?);
    }
    if let Some(permission) = &spec.permission {
        transition = transition.with_permission(permission.as_str());
    }
    for name in &spec.guards {
        transition = transition.with_shared_guard(callables.guard(name)?);
    }
    for (key, value) in &spec.metadata {
        transition = transition.with_metadata(key.as_str(), value.as_str());
    }
    Ok(transition)
}

/// Two declarations may not target the same content type with the same
/// elector, workflow type and state attribute
fn check_conflicts(document: &WorkflowDocument) -> LoaderResult<()> {
    let mut seen = HashSet::new();
    for spec in &document.workflows {
        for content_type in spec.content_types() {
            let key = (
                content_type,
                spec.elector.clone(),
                spec.workflow_type.clone(),
                spec.state_attr().to_string(),
            );
            if !seen.insert(key.clone()) {
                let (content_type, elector, workflow_type, state_attr) = key;
                return Err(LoaderError::Conflict {
                    content_type,
                    workflow_type,
                    state_attr,
                    elector,
                });
            }
        }
    }
    Ok(())
}

/// Compile every declaration and register it, returning the number of
/// registrations made
pub fn register_document<C: ?Sized, R: ?Sized, X: ?Sized>(
    document: &WorkflowDocument,
    callables: &Callables<C, R, X>,
    registry: &mut WorkflowRegistry<Workflow<C, R>, X>,
) -> LoaderResult<usize> {
    check_conflicts(document)?;

    let mut compiled: Vec<(ContentType, String, Candidate<Workflow<C, R>, X>)> = Vec::new();
    for spec in &document.workflows {
        let elector = spec
            .elector
            .as_deref()
            .map(|name| callables.elector(name))
            .transpose()?;
        for content_type in spec.content_types() {
            let mut candidate = Candidate::new(Arc::new(compile(spec, callables)?));
            if let Some(elector) = &elector {
                candidate = candidate.with_shared_elector(Arc::clone(elector));
            }
            compiled.push((content_type, spec.workflow_type.clone(), candidate));
        }
    }

    let registrations = compiled.len();
    for (content_type, workflow_type, candidate) in compiled {
        registry.register(content_type, workflow_type, candidate);
    }

    tracing::info!(
        workflows = document.workflows.len(),
        registrations,
        "Workflow document loaded"
    );
    Ok(registrations)
}

/// Parse a JSON document, then [`register_document`] it
pub fn load_document<C: ?Sized, R: ?Sized, X: ?Sized>(
    json: &str,
    callables: &Callables<C, R, X>,
    registry: &mut WorkflowRegistry<Workflow<C, R>, X>,
) -> LoaderResult<usize> {
    let document = WorkflowDocument::from_json(json)?;
    register_document(&document, callables, registry)
}
