//! Preview document composition and rendering targets.
//!
//! # Responsibility
//! - Merge markup, style, script and optional tests into one document.
//! - Model the sandboxed frame and the detached preview window.
//!
//! # Invariants
//! - Source text is inserted verbatim; nothing is escaped or sanitized.
//! - Tests run after user script and only when requested and non-blank.
//! - Script faults are caught inside the document, never by the host.

use crate::model::project::SourceSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Sandbox attributes for the embedded frame; no `allow-same-origin`, so
/// user script cannot reach the host page.
pub const SANDBOX_ATTRIBUTES: &str = "allow-scripts allow-modals allow-forms";

/// Marker comment separating user script from the appended tests.
pub const TEST_BLOCK_MARKER: &str = "/* tests */";

/// Whether a run includes the test snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Preview,
    WithTests,
}

impl RunMode {
    pub fn includes_tests(self) -> bool {
        matches!(self, Self::WithTests)
    }

    /// Activity log message recorded after the frame is updated.
    pub fn log_message(self) -> &'static str {
        match self {
            Self::Preview => "Web Preview Updated",
            Self::WithTests => "Run with Tests",
        }
    }
}

/// Builds the standalone preview document.
///
/// `test_text` is trimmed; a blank snippet is treated as absent.
pub fn compose_document(sources: &SourceSet, test_text: &str, include_tests: bool) -> String {
    let tests = test_text.trim();
    let test_block = if include_tests && !tests.is_empty() {
        format!("\n{TEST_BLOCK_MARKER}\n{tests}\n")
    } else {
        String::new()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en" dir="ltr">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<style>
{css}
</style>
</head>
<body>
{html}
<script>
try {{
{js}
{test_block}}} catch (e) {{
  console.error("Error in user code:", e);
}}
</script>
</body>
</html>
"#,
        css = sources.css,
        html = sources.html,
        js = sources.js,
        test_block = test_block,
    )
}

/// Embedded preview region whose document is replaced on every run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SandboxedFrame {
    document: Option<String>,
    generation: u64,
}

impl SandboxedFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sandbox(&self) -> &'static str {
        SANDBOX_ATTRIBUTES
    }

    /// Current `srcdoc`, if the frame was ever rendered.
    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    /// Number of documents loaded so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn replace_document(&mut self, document: String) {
        self.document = Some(document);
        self.generation += 1;
    }
}

#[derive(Debug)]
pub enum PreviewError {
    /// Host refused to open a new window (e.g. popup blocked).
    WindowBlocked,
    Io(std::io::Error),
}

impl Display for PreviewError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WindowBlocked => write!(f, "preview window could not be opened"),
            Self::Io(err) => write!(f, "failed to write preview: {err}"),
        }
    }
}

impl Error for PreviewError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::WindowBlocked => None,
            Self::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for PreviewError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Host capability to show a document in a full, unsandboxed window.
pub trait PreviewWindow {
    fn open_document(&mut self, document: &str) -> Result<(), PreviewError>;
}

/// Keeps opened documents in memory; useful for headless hosts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetachedWindows {
    opened: Vec<String>,
}

impl DetachedWindows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> &[String] {
        &self.opened
    }
}

impl PreviewWindow for DetachedWindows {
    fn open_document(&mut self, document: &str) -> Result<(), PreviewError> {
        self.opened.push(document.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{compose_document, RunMode, SandboxedFrame, TEST_BLOCK_MARKER};
    use crate::model::project::SourceSet;

    fn sample() -> SourceSet {
        SourceSet::new("<p>x</p>", "p{color:red}", "console.log(1)")
    }

    #[test]
    fn document_holds_sources_verbatim_without_tests() {
        let doc = compose_document(&sample(), "console.log(2)", false);
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<style>\np{color:red}\n</style>"));
        assert!(doc.contains("<body>\n<p>x</p>\n"));
        assert!(doc.contains("console.log(1)"));
        assert!(!doc.contains("console.log(2)"));
        assert!(!doc.contains(TEST_BLOCK_MARKER));
    }

    #[test]
    fn tests_follow_user_script_inside_guard() {
        let doc = compose_document(&sample(), "  console.log(2)\n", true);
        let try_at = doc.find("try {").unwrap();
        let script_at = doc.find("console.log(1)").unwrap();
        let marker_at = doc.find(TEST_BLOCK_MARKER).unwrap();
        let test_at = doc.find("console.log(2)").unwrap();
        let catch_at = doc.find("} catch (e)").unwrap();
        assert!(try_at < script_at && script_at < marker_at);
        assert!(marker_at < test_at && test_at < catch_at);
        assert!(doc.contains("console.error(\"Error in user code:\", e);"));
    }

    #[test]
    fn blank_tests_are_omitted_even_when_requested() {
        let doc = compose_document(&sample(), " \n\t ", true);
        assert!(!doc.contains(TEST_BLOCK_MARKER));
        assert_eq!(doc, compose_document(&sample(), "", false));
    }

    #[test]
    fn markup_is_not_escaped() {
        let sources = SourceSet::new("<script>alert('&')</script>", "", "");
        let doc = compose_document(&sources, "", false);
        assert!(doc.contains("<script>alert('&')</script>"));
    }

    #[test]
    fn frame_replaces_document_each_run() {
        let mut frame = SandboxedFrame::new();
        frame.replace_document("a".to_string());
        frame.replace_document("b".to_string());
        assert_eq!(frame.document(), Some("b"));
        assert_eq!(frame.generation(), 2);
        assert!(!frame.sandbox().contains("allow-same-origin"));
        assert_eq!(RunMode::WithTests.log_message(), "Run with Tests");
    }
}
