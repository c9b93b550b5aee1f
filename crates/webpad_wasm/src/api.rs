//! wasm-bindgen API for the browser page.
//!
//! # Responsibility
//! - Expose core preview, project and pane logic to page scripts.
//! - Keep the page free of its own copies of these rules.
//!
//! # Invariants
//! - Exported functions must not panic across the wasm boundary.
//! - Inputs and outputs are plain strings/bools; failures come back as
//!   envelopes or empty strings, never as thrown exceptions.

use crate::console::init_console_logging;
use serde_json::json;
use wasm_bindgen::prelude::wasm_bindgen;
use webpad_core::config::{DEFAULT_DOWNLOAD_FILE_NAME, DEFAULT_STORAGE_KEY};
use webpad_core::editor::{command_for_chord, EditorCommand};
use webpad_core::{
    compose_document, core_version as core_version_inner, ping as ping_inner, render_line,
    EditorOptions, Pane, PaneNavigation, Platform, Project, Severity, SANDBOX_ATTRIBUTES,
};

/// Health check for page wiring.
#[wasm_bindgen]
pub fn ping() -> String {
    ping_inner().to_owned()
}

#[wasm_bindgen]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Routes core diagnostics to the browser console, once per page.
///
/// Returns an empty string on success and the error message otherwise;
/// repeating the call with the same level is a no-op.
#[wasm_bindgen]
pub fn init_logging(level: String) -> String {
    match init_console_logging(&level) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Result of turning a project file into something the page can use.
#[wasm_bindgen(getter_with_clone)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectResponse {
    /// Whether the input was a usable project.
    pub ok: bool,
    /// Canonical project JSON on success, empty otherwise.
    pub project_json: String,
    /// Composed document for `compose_preview`, empty otherwise.
    pub document: String,
    /// Diagnostic text; empty on success.
    pub message: String,
}

impl ProjectResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            project_json: String::new(),
            document: String::new(),
            message: message.into(),
        }
    }
}

/// Normalizes project file text (current or legacy layout).
#[wasm_bindgen]
pub fn normalize_project(text: String) -> ProjectResponse {
    let project = match Project::from_json_str(&text) {
        Ok(project) => project,
        Err(err) => return ProjectResponse::failure(err.to_string()),
    };
    match project.to_pretty_json() {
        Ok(project_json) => ProjectResponse {
            ok: true,
            project_json,
            document: String::new(),
            message: String::new(),
        },
        Err(err) => ProjectResponse::failure(err.to_string()),
    }
}

/// Composes the preview document for a project, optionally with its tests.
#[wasm_bindgen]
pub fn compose_preview(project_json: String, include_tests: bool) -> ProjectResponse {
    match Project::from_json_str(&project_json) {
        Ok(project) => ProjectResponse {
            ok: true,
            project_json: String::new(),
            document: compose_document(project.sources(), project.test(), include_tests),
            message: String::new(),
        },
        Err(err) => ProjectResponse::failure(err.to_string()),
    }
}

/// Pane id to activate after `key` is pressed on the tab of `active`.
///
/// Returns `active` unchanged for keys other than the left/right arrows and
/// an empty string for an unknown pane id.
#[wasm_bindgen]
pub fn pane_after_key(active: String, key: String) -> String {
    let Ok(pane) = active.parse::<Pane>() else {
        return String::new();
    };
    let target = match PaneNavigation::from_key(&key) {
        Some(PaneNavigation::Next) => pane.next(),
        Some(PaneNavigation::Previous) => pane.previous(),
        None => pane,
    };
    target.id().to_owned()
}

/// Renders one activity-log line as panel markup.
///
/// Unknown severities render as `info`.
#[wasm_bindgen]
pub fn render_log_line(time_label: String, message: String, severity: String) -> String {
    let severity = severity.parse().unwrap_or(Severity::Info);
    render_line(&time_label, &message, severity)
}

/// Editor configuration for one pane as JSON, or empty for an unknown pane.
#[wasm_bindgen]
pub fn editor_options_json(pane: String) -> String {
    let Ok(pane) = pane.parse::<Pane>() else {
        return String::new();
    };
    let options = EditorOptions::for_pane(pane);
    json!({
        "theme": options.theme,
        "mode": options.mode,
        "tabSize": options.tab_size,
        "useSoftTabs": options.use_soft_tabs,
        "showPrintMargin": options.show_print_margin,
        "wrap": options.wrap,
        "autoScrollEditorIntoView": options.auto_scroll_editor_into_view,
    })
    .to_string()
}

/// Global command (`run` or `save`) bound to `chord` on the page's
/// platform, or empty when nothing is bound.
#[wasm_bindgen]
pub fn command_for_key_chord(is_mac: bool, chord: String) -> String {
    let platform = if is_mac {
        Platform::Mac
    } else {
        Platform::Windows
    };
    match command_for_chord(platform, &chord) {
        Some(EditorCommand::Run) => "run".to_owned(),
        Some(EditorCommand::Save) => "save".to_owned(),
        None => String::new(),
    }
}

#[wasm_bindgen]
pub fn storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_owned()
}

#[wasm_bindgen]
pub fn download_file_name() -> String {
    DEFAULT_DOWNLOAD_FILE_NAME.to_owned()
}

#[wasm_bindgen]
pub fn sandbox_attributes() -> String {
    SANDBOX_ATTRIBUTES.to_owned()
}

#[cfg(test)]
mod tests {
    use super::{
        command_for_key_chord, compose_preview, core_version, editor_options_json, init_logging,
        normalize_project, pane_after_key, ping, render_log_line, storage_key,
    };

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn normalize_project_rewrites_legacy_file() {
        let response = normalize_project(r#"{ "tests": "t()", "web": { "js": "go()" } }"#.into());
        assert!(response.ok);
        assert!(response.message.is_empty());
        assert!(response.project_json.contains("\"test\": \"t()\""));
        assert!(response.project_json.contains("\"js\": \"go()\""));
    }

    #[test]
    fn normalize_project_reports_bad_input() {
        let response = normalize_project("not json".into());
        assert!(!response.ok);
        assert!(!response.message.is_empty());
        assert!(response.project_json.is_empty());

        assert!(!normalize_project("7".into()).ok);
    }

    #[test]
    fn compose_preview_honors_test_flag() {
        let project = r#"{ "js": "main()", "test": "check()" }"#.to_string();

        let plain = compose_preview(project.clone(), false);
        assert!(plain.ok);
        assert!(plain.document.contains("main()"));
        assert!(!plain.document.contains("check()"));

        let with_tests = compose_preview(project, true);
        assert!(with_tests.document.contains("check()"));
    }

    #[test]
    fn pane_after_key_wraps_and_ignores_other_keys() {
        assert_eq!(pane_after_key("html".into(), "ArrowLeft".into()), "js");
        assert_eq!(pane_after_key("js".into(), "ArrowRight".into()), "html");
        assert_eq!(pane_after_key("css".into(), "Enter".into()), "css");
        assert_eq!(pane_after_key("python".into(), "ArrowRight".into()), "");
    }

    #[test]
    fn render_log_line_escapes_and_colors() {
        let line = render_log_line("10:00:00".into(), "<b>".into(), "error".into());
        assert!(line.contains("var(--err)"));
        assert!(line.ends_with("&lt;b&gt;"));

        let fallback = render_log_line("10:00:00".into(), "x".into(), "loud".into());
        assert!(fallback.contains("var(--brand)"));
    }

    #[test]
    fn editor_options_per_pane() {
        let css: serde_json::Value =
            serde_json::from_str(&editor_options_json("css".into())).unwrap();
        assert_eq!(css["mode"], "ace/mode/css");
        assert_eq!(css["theme"], "ace/theme/dracula");
        assert_eq!(css["tabSize"], 2);
        assert!(editor_options_json("md".into()).is_empty());
    }

    #[test]
    fn chords_follow_platform() {
        assert_eq!(command_for_key_chord(true, "Command-S".into()), "save");
        assert_eq!(command_for_key_chord(false, "Ctrl-Enter".into()), "run");
        assert_eq!(command_for_key_chord(false, "Command-S".into()), "");
    }

    #[test]
    fn storage_key_matches_page_contract() {
        assert_eq!(storage_key(), "code-editor-content");
    }
}
