use serde_json::json;
use webpad_core::{
    normalize, Project, ProjectLoadError, ProjectShapeError, SourceSet, PROJECT_KIND,
    PROJECT_SCHEMA_VERSION,
};

fn sample_project() -> Project {
    Project::new(
        "Build a counter",
        "console.assert(count() === 1);",
        SourceSet::new("<p>x</p>", "p{color:red}", "console.log(1)"),
    )
}

#[test]
fn empty_object_normalizes_to_empty_fields() {
    let project = normalize(&json!({})).unwrap();

    assert_eq!(project.version(), PROJECT_SCHEMA_VERSION);
    assert_eq!(project.kind(), PROJECT_KIND);
    assert_eq!(project.assignment(), "");
    assert_eq!(project.test(), "");
    assert_eq!(project.html(), "");
    assert_eq!(project.css(), "");
    assert_eq!(project.js(), "");
}

#[test]
fn serialized_project_round_trips_through_normalize() {
    let project = sample_project();
    let text = project.to_pretty_json().unwrap();

    let decoded = normalize(&serde_json::from_str(&text).unwrap()).unwrap();
    assert_eq!(decoded, project);
}

#[test]
fn wire_form_carries_fixed_header() {
    let value = serde_json::to_value(sample_project()).unwrap();
    assert_eq!(value["version"], 1);
    assert_eq!(value["kind"], "web-only");
    assert_eq!(value["assignment"], "Build a counter");
    assert_eq!(value["html"], "<p>x</p>");
}

#[test]
fn header_in_input_is_ignored() {
    let project = normalize(&json!({ "version": 7, "kind": "python", "js": "x" })).unwrap();
    assert_eq!(project.version(), 1);
    assert_eq!(project.kind(), "web-only");
    assert_eq!(project.js(), "x");
}

#[test]
fn legacy_nested_web_sources_are_accepted() {
    let project = normalize(&json!({
        "web": { "html": "<h1>old</h1>", "css": "h1{}", "js": "old()" }
    }))
    .unwrap();
    assert_eq!(project.html(), "<h1>old</h1>");
    assert_eq!(project.css(), "h1{}");
    assert_eq!(project.js(), "old()");
}

#[test]
fn legacy_top_level_aliases_are_accepted_independently() {
    let from_task = normalize(&json!({ "task": "Do it" })).unwrap();
    assert_eq!(from_task.assignment(), "Do it");

    let from_misspelling = normalize(&json!({ "assignement": "Typo key" })).unwrap();
    assert_eq!(from_misspelling.assignment(), "Typo key");

    let from_tests = normalize(&json!({ "tests": "check()" })).unwrap();
    assert_eq!(from_tests.test(), "check()");
    assert_eq!(from_tests.assignment(), "");
}

#[test]
fn canonical_names_win_over_legacy() {
    let project = normalize(&json!({
        "assignment": "new",
        "assignement": "typo",
        "task": "old",
        "test": "new test",
        "tests": "old test",
        "html": "<new/>",
        "css": "new{}",
        "js": "newJs()",
        "web": { "html": "<old/>", "css": "old{}", "js": "oldJs()" }
    }))
    .unwrap();

    assert_eq!(project.assignment(), "new");
    assert_eq!(project.test(), "new test");
    assert_eq!(project.html(), "<new/>");
    assert_eq!(project.css(), "new{}");
    assert_eq!(project.js(), "newJs()");
}

#[test]
fn non_object_input_is_a_shape_error() {
    for (raw, found) in [
        (json!(42), "number"),
        (json!("project"), "string"),
        (json!(null), "null"),
        (json!(true), "boolean"),
    ] {
        let err = normalize(&raw).unwrap_err();
        assert_eq!(err, ProjectShapeError::NotAnObject { found });
    }
}

#[test]
fn from_json_str_distinguishes_parse_and_shape_errors() {
    let parse = Project::from_json_str("{ not json").unwrap_err();
    assert!(matches!(parse, ProjectLoadError::Parse(_)));

    let shape = Project::from_json_str("[]").unwrap_err();
    assert!(matches!(shape, ProjectLoadError::Shape(_)));
}

#[test]
fn typed_deserialize_uses_normalization() {
    let project: Project = serde_json::from_value(json!({ "tests": "t()" })).unwrap();
    assert_eq!(project.test(), "t()");

    let err = serde_json::from_value::<Project>(json!(3)).unwrap_err();
    assert!(err.to_string().contains("must be an object"), "{err}");
}
