//! Core logic for WebPad, a client-side HTML/CSS/JS playground.
//! This crate is the single source of truth for project, preview and pane
//! behavior; hosts (browser bridge, CLI) only wire events into it.

pub mod activity;
pub mod app;
pub mod config;
#[cfg(feature = "native")]
pub mod db;
pub mod editor;
pub mod logging;
pub mod model;
pub mod pane;
pub mod preview;
pub mod repo;
pub mod service;
pub mod workspace;

pub use activity::{
    escape_markup, render_line, ActivityLog, Clock, HtmlLogPanel, LocalClock, LogPanel, Severity,
};
pub use app::{Action, ActionError, ActionId, Playground, READY_MESSAGE};
pub use config::{ConfigError, PlaygroundConfig};
pub use editor::{EditorManager, EditorOptions, EditorSurface, Platform, TextBuffer};
pub use logging::{default_log_level, level_filter, normalize_level, LogTarget, LoggingError};
#[cfg(feature = "native")]
pub use logging::{init_logging, logging_status};
pub use model::project::{
    normalize, Project, ProjectField, ProjectLoadError, ProjectShapeError, SourceSet,
    PROJECT_KIND, PROJECT_SCHEMA_VERSION,
};
pub use pane::{Pane, PaneActivation, PaneError, PaneNavigation, PaneSwitcher, TAB_ORDER};
pub use preview::{
    compose_document, DetachedWindows, PreviewError, PreviewWindow, RunMode, SandboxedFrame,
    SANDBOX_ATTRIBUTES,
};
pub use repo::download::{DirectoryDownloads, DownloadFile, DownloadSink, ExportError};
pub use repo::kv_store::{KeyValueStore, MemoryKeyValueStore, StoreError, StoreResult};
#[cfg(feature = "native")]
pub use repo::sqlite_kv_store::SqliteKeyValueStore;
pub use service::project_service::{ProjectStore, RestoreOutcome, SaveError};
pub use workspace::{FormFields, TextField, Workspace};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
