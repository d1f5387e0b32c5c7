//! Loading a multi-workflow document into a registry and driving the
//! resolved workflows.

use content_workflow_engine::testing::RecordingContent;
use content_workflow_engine::{
    guard_fn, CallbackInfo, ContentType, Stateful, Workflow, WorkflowError, WorkflowRegistry,
};
use content_workflow_loader::*;

struct Request {
    roles: Vec<&'static str>,
}

type Registry = WorkflowRegistry<Workflow<RecordingContent, Request>, RecordingContent>;

const DOCUMENT: &str = r#"{
    "workflows": [
        {
            "type": "security",
            "name": "Private folders",
            "state_attr": "security_state",
            "initial_state": "private",
            "content_types": ["Folder"],
            "elector": "is_private",
            "states": [{"name": "private"}]
        },
        {
            "type": "security",
            "name": "Public folders",
            "state_attr": "security_state",
            "initial_state": "public",
            "content_types": ["Folder"],
            "permission_checker": "roles",
            "states": [
                {"name": "public", "callback": "log_entry"},
                {"name": "private", "aliases": ["hidden"], "callback": "log_entry"}
            ],
            "transitions": [
                {"name": "hide", "from_state": "public", "to_state": "private",
                 "permission": "manage", "guards": ["not_locked"]},
                {"name": "show", "from_state": "private", "to_state": "public",
                 "permission": "manage"}
            ]
        },
        {
            "type": "security",
            "name": "Everything else",
            "state_attr": "security_state",
            "initial_state": "open",
            "states": [{"name": "open"}]
        }
    ]
}"#;

fn callables() -> Callables<RecordingContent, Request, RecordingContent> {
    Callables::<RecordingContent, Request, RecordingContent>::new()
        .with_callback(
            "log_entry",
            |content: &mut RecordingContent, info: &CallbackInfo<'_, RecordingContent, Request>| {
                content.record(format!("entered via {}", info.transition_name().unwrap_or("init")));
                Ok(())
            },
        )
        .with_guard(
            "not_locked",
            guard_fn(|content: &RecordingContent, info: &CallbackInfo<'_, RecordingContent, Request>| {
                if content.name.starts_with("locked") {
                    Err(WorkflowError::guard_rejected(
                        info.transition_name().unwrap_or_default(),
                        "content is locked",
                    ))
                } else {
                    Ok(())
                }
            }),
        )
        .with_permission_checker("roles", |permission: &str, _: &RecordingContent, request: &Request| {
            request.roles.contains(&permission)
        })
        .with_elector("is_private", |folder: &RecordingContent| folder.name.starts_with("secret"))
}

fn load() -> Registry {
    let mut registry = Registry::new();
    let count = load_document(DOCUMENT, &callables(), &mut registry).unwrap();
    assert_eq!(count, 3);
    registry
}

#[test]
fn resolves_by_elector_then_fallback_then_default() {
    let registry = load();
    let folder = ContentType::named("Folder");

    let secret = RecordingContent::new("secret plans");
    let chosen = registry.resolve(&folder, "security", Some(&secret)).unwrap();
    assert_eq!(chosen.name(), "Private folders");

    let shared = RecordingContent::new("shared");
    let chosen = registry.resolve(&folder, "security", Some(&shared)).unwrap();
    assert_eq!(chosen.name(), "Public folders");

    let chosen = registry
        .resolve(&ContentType::named("Image"), "security", None)
        .unwrap();
    assert_eq!(chosen.name(), "Everything else");

    assert!(registry.resolve(&folder, "publishing", None).is_none());
}

#[test]
fn loaded_workflow_enforces_guards_and_permissions() {
    let registry = load();
    let workflow = registry
        .resolve(&ContentType::named("Folder"), "security", None)
        .unwrap();
    let manager = Request {
        roles: vec!["manage"],
    };
    let visitor = Request { roles: vec![] };

    let mut folder = RecordingContent::new("shared");
    let err = workflow
        .transition(&mut folder, Some(&visitor), "hide", None, &[])
        .unwrap_err();
    assert!(err.is_permission_error());

    workflow
        .transition(&mut folder, Some(&manager), "hide", None, &[])
        .unwrap();
    assert_eq!(folder.state_value("security_state"), Some("private"));
    assert_eq!(folder.events(), &["entered via init", "entered via hide"].map(String::from));

    let mut locked = RecordingContent::new("locked folder");
    let err = workflow
        .transition(&mut locked, Some(&manager), "hide", None, &[])
        .unwrap_err();
    assert!(matches!(err, WorkflowError::GuardRejected { .. }));
}

#[test]
fn aliases_survive_loading() {
    let registry = load();
    let workflow = registry
        .resolve(&ContentType::named("Folder"), "security", None)
        .unwrap();
    let mut folder = RecordingContent::new("shared").with_state("security_state", "hidden");
    assert_eq!(workflow.state_of(&mut folder).unwrap(), "private");
}

#[test]
fn failing_document_registers_nothing() {
    let broken = r#"{
        "workflows": [
            {"type": "security", "name": "Fine", "initial_state": "a",
             "states": [{"name": "a"}]},
            {"type": "security", "name": "Broken", "initial_state": "missing",
             "content_types": ["Folder"], "states": [{"name": "a"}]}
        ]
    }"#;
    let mut registry = Registry::new();
    let err = load_document(broken, &callables(), &mut registry).unwrap_err();
    assert!(matches!(
        err.definition_error(),
        Some(WorkflowError::UndefinedInitialState(_))
    ));
    assert!(registry.is_empty());
}

#[test]
fn conflicting_declarations_are_rejected() {
    let conflicting = r#"{
        "workflows": [
            {"type": "security", "name": "A", "state_attr": "s", "initial_state": "a",
             "states": [{"name": "a"}]},
            {"type": "security", "name": "B", "state_attr": "s", "initial_state": "a",
             "states": [{"name": "a"}]}
        ]
    }"#;
    let mut registry = Registry::new();
    let err = load_document(conflicting, &callables(), &mut registry).unwrap_err();
    assert!(matches!(
        err,
        LoaderError::Conflict { content_type: ContentType::Default, .. }
    ));
    assert!(registry.is_empty());
}

#[test]
fn malformed_json_is_a_parse_error() {
    let mut registry = Registry::new();
    let err = load_document("{\"workflows\": [", &callables(), &mut registry).unwrap_err();
    assert!(matches!(err, LoaderError::Parse(_)));
}
