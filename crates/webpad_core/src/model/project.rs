//! Project domain model and external-input normalization.
//!
//! # Responsibility
//! - Define the canonical persisted/exported project shape.
//! - Decode arbitrary external JSON (current and legacy layouts) into it.
//!
//! # Invariants
//! - All five text fields are always strings, never absent.
//! - `version` and `kind` are constants; they are not stored per instance.
//! - A `Project` cannot be mutated after construction.
//!
//! # See also
//! - `crate::service::project_service` for the load/save flows.

use log::debug;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Schema tag written into every serialized project.
pub const PROJECT_SCHEMA_VERSION: u32 = 1;
/// Discriminator written into every serialized project.
pub const PROJECT_KIND: &str = "web-only";

/// Source fragments for the three editing panes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSet {
    /// Markup pane content.
    pub html: String,
    /// Style pane content.
    pub css: String,
    /// Script pane content.
    pub js: String,
}

impl SourceSet {
    pub fn new(html: impl Into<String>, css: impl Into<String>, js: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            css: css.into(),
            js: js.into(),
        }
    }
}

/// Canonical project record.
///
/// Built either from live editor state (save path) or from [`normalize`]
/// (load path). Both paths yield the same immutable value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Project {
    assignment: String,
    test: String,
    sources: SourceSet,
}

impl Project {
    /// Creates a project from assignment text, test text and pane sources.
    pub fn new(assignment: impl Into<String>, test: impl Into<String>, sources: SourceSet) -> Self {
        Self {
            assignment: assignment.into(),
            test: test.into(),
            sources,
        }
    }

    pub fn version(&self) -> u32 {
        PROJECT_SCHEMA_VERSION
    }

    pub fn kind(&self) -> &'static str {
        PROJECT_KIND
    }

    pub fn assignment(&self) -> &str {
        &self.assignment
    }

    pub fn test(&self) -> &str {
        &self.test
    }

    pub fn sources(&self) -> &SourceSet {
        &self.sources
    }

    pub fn html(&self) -> &str {
        &self.sources.html
    }

    pub fn css(&self) -> &str {
        &self.sources.css
    }

    pub fn js(&self) -> &str {
        &self.sources.js
    }

    /// Serializes to the pretty-printed (two-space indented) wire form.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parses wire text and normalizes it.
    pub fn from_json_str(text: &str) -> Result<Self, ProjectLoadError> {
        let raw: Value = serde_json::from_str(text).map_err(ProjectLoadError::Parse)?;
        Ok(normalize(&raw)?)
    }
}

#[derive(Serialize)]
struct ProjectWire<'a> {
    version: u32,
    kind: &'a str,
    assignment: &'a str,
    test: &'a str,
    html: &'a str,
    css: &'a str,
    js: &'a str,
}

impl Serialize for Project {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ProjectWire {
            version: PROJECT_SCHEMA_VERSION,
            kind: PROJECT_KIND,
            assignment: &self.assignment,
            test: &self.test,
            html: &self.sources.html,
            css: &self.sources.css,
            js: &self.sources.js,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Project {
    // Same legacy layouts as file import.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        normalize(&raw).map_err(D::Error::custom)
    }
}

/// One place a field value may be read from in external input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPath {
    /// Top-level key, e.g. `html`.
    Top(&'static str),
    /// Key nested under a parent object, e.g. `web.html`.
    Nested(&'static str, &'static str),
}

impl FieldPath {
    fn lookup<'a>(&self, object: &'a Map<String, Value>) -> Option<&'a str> {
        match self {
            Self::Top(key) => object.get(*key).and_then(Value::as_str),
            Self::Nested(parent, key) => object
                .get(*parent)
                .and_then(Value::as_object)
                .and_then(|nested| nested.get(*key))
                .and_then(Value::as_str),
        }
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Top(key) => write!(f, "{key}"),
            Self::Nested(parent, key) => write!(f, "{parent}.{key}"),
        }
    }
}

/// Text fields carried by a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectField {
    Assignment,
    Test,
    Html,
    Css,
    Js,
}

impl ProjectField {
    pub const ALL: [ProjectField; 5] = [
        ProjectField::Assignment,
        ProjectField::Test,
        ProjectField::Html,
        ProjectField::Css,
        ProjectField::Js,
    ];

    /// Accepted input locations in precedence order; the first entry is the
    /// canonical key.
    ///
    /// `assignement` is the misspelled key written by early exports.
    pub fn aliases(self) -> &'static [FieldPath] {
        use FieldPath::{Nested, Top};
        match self {
            Self::Assignment => &[Top("assignment"), Top("assignement"), Top("task")],
            Self::Test => &[Top("test"), Top("tests")],
            Self::Html => &[Top("html"), Nested("web", "html")],
            Self::Css => &[Top("css"), Nested("web", "css")],
            Self::Js => &[Top("js"), Nested("web", "js")],
        }
    }

    pub fn canonical_name(self) -> &'static str {
        match self {
            Self::Assignment => "assignment",
            Self::Test => "test",
            Self::Html => "html",
            Self::Css => "css",
            Self::Js => "js",
        }
    }

    fn resolve(self, object: &Map<String, Value>) -> String {
        for path in self.aliases() {
            if let Some(value) = path.lookup(object) {
                if *path != self.aliases()[0] {
                    debug!(
                        "event=project_normalize module=model field={} source={} status=legacy",
                        self.canonical_name(),
                        path
                    );
                }
                return value.to_string();
            }
        }
        String::new()
    }
}

/// Decodes arbitrary external data into a canonical [`Project`].
///
/// # Contract
/// - Input must be a JSON object; anything else is a shape error.
/// - Each field resolves through [`ProjectField::aliases`]; only string values
///   are accepted, so a non-string canonical value falls through to legacy keys.
/// - Missing fields default to the empty string.
pub fn normalize(raw: &Value) -> Result<Project, ProjectShapeError> {
    let object = raw.as_object().ok_or(ProjectShapeError::NotAnObject {
        found: json_type_name(raw),
    })?;

    Ok(Project {
        assignment: ProjectField::Assignment.resolve(object),
        test: ProjectField::Test.resolve(object),
        sources: SourceSet {
            html: ProjectField::Html.resolve(object),
            css: ProjectField::Css.resolve(object),
            js: ProjectField::Js.resolve(object),
        },
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// External input is not shaped like a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectShapeError {
    NotAnObject { found: &'static str },
}

impl Display for ProjectShapeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject { found } => {
                write!(f, "project data must be an object, found {found}")
            }
        }
    }
}

impl Error for ProjectShapeError {}

/// Failure to turn external text into a project.
#[derive(Debug)]
pub enum ProjectLoadError {
    /// Text is not valid JSON.
    Parse(serde_json::Error),
    /// JSON is valid but not object-shaped.
    Shape(ProjectShapeError),
}

impl Display for ProjectLoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid project JSON: {err}"),
            Self::Shape(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProjectLoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Shape(err) => Some(err),
        }
    }
}

impl From<ProjectShapeError> for ProjectLoadError {
    fn from(value: ProjectShapeError) -> Self {
        Self::Shape(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize, FieldPath, Project, ProjectField, ProjectShapeError, SourceSet};
    use serde_json::json;

    #[test]
    fn canonical_key_is_first_alias() {
        for field in ProjectField::ALL {
            assert_eq!(
                field.aliases()[0],
                FieldPath::Top(field.canonical_name()),
                "canonical key must lead alias table for {field:?}"
            );
        }
    }

    #[test]
    fn non_string_canonical_value_falls_back_to_legacy() {
        let project = normalize(&json!({ "html": 42, "web": { "html": "<b>legacy</b>" } }))
            .expect("object input should normalize");
        assert_eq!(project.html(), "<b>legacy</b>");
    }

    #[test]
    fn nested_web_must_be_object() {
        let project = normalize(&json!({ "web": "not an object" })).unwrap();
        assert_eq!(project.sources(), &SourceSet::default());
    }

    #[test]
    fn array_input_is_rejected() {
        let err = normalize(&json!([1, 2])).unwrap_err();
        assert_eq!(err, ProjectShapeError::NotAnObject { found: "array" });
    }

    #[test]
    fn serialization_writes_fixed_header_in_order() {
        let project = Project::new("a", "t", SourceSet::new("h", "c", "j"));
        let text = project.to_pretty_json().unwrap();
        let version_at = text.find("\"version\"").unwrap();
        let kind_at = text.find("\"kind\"").unwrap();
        let js_at = text.find("\"js\"").unwrap();
        assert!(version_at < kind_at && kind_at < js_at);
        assert!(text.contains("\n  \"kind\": \"web-only\""));
    }
}
