//! Project load/save use-cases.
//!
//! # Responsibility
//! - Snapshot live workspace state into a `Project` and apply one back.
//! - Persist to key-value storage and offer file downloads.
//! - Import project files and restore the last saved project at startup.
//!
//! # Invariants
//! - Failures end in one activity-log entry; nothing propagates to the page.
//! - A rejected load leaves every editor and field untouched.
//! - No download is offered when the storage write fails.

use crate::activity::{Clock, LogPanel};
use crate::config::PlaygroundConfig;
use crate::model::project::{Project, ProjectLoadError, SourceSet};
use crate::pane::Pane;
use crate::repo::download::{DownloadFile, DownloadSink, ExportError};
use crate::repo::kv_store::{KeyValueStore, StoreError};
use crate::workspace::{TextField, Workspace};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const SAVED_MESSAGE: &str = "Saved locally and downloaded JSON file.";
pub const LOADED_MESSAGE: &str = "Project loaded.";
pub const INVALID_FILE_MESSAGE: &str = "Invalid project file";

/// Save pipeline failure.
#[derive(Debug)]
pub enum SaveError {
    Serialize(serde_json::Error),
    Storage(StoreError),
    Export(ExportError),
}

impl Display for SaveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialize(err) => write!(f, "failed to serialize project: {err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SaveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialize(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Export(err) => Some(err),
        }
    }
}

impl From<StoreError> for SaveError {
    fn from(value: StoreError) -> Self {
        Self::Storage(value)
    }
}

impl From<ExportError> for SaveError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

/// Result of the startup restore attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// A stored project was applied.
    Restored,
    /// Nothing stored under the key.
    Absent,
    /// Stored data was unreadable; the workspace was left as is.
    Failed,
}

/// Reads assignment, test and all three editors into a project.
pub fn to_project<P: LogPanel, C: Clock>(workspace: &Workspace<P, C>) -> Project {
    Project::new(
        workspace.fields.assignment_text(),
        workspace.fields.test_text(),
        workspace.editors.sources(),
    )
}

/// Writes a project into the workspace.
///
/// Missing form controls are skipped with a warning; missing editors are
/// skipped silently. Editors are written in html, css, js order.
pub fn apply<P: LogPanel, C: Clock>(workspace: &mut Workspace<P, C>, project: &Project) {
    set_field(workspace, FieldSlot::Assignment, project.assignment());
    set_field(workspace, FieldSlot::Test, project.test());

    workspace.editors.set_text(Pane::Markup, Some(project.html()));
    workspace.editors.set_text(Pane::Style, Some(project.css()));
    workspace.editors.set_text(Pane::Script, Some(project.js()));

    workspace.log.info(LOADED_MESSAGE);
}

#[derive(Clone, Copy)]
enum FieldSlot {
    Assignment,
    Test,
}

impl FieldSlot {
    fn id(self) -> &'static str {
        match self {
            Self::Assignment => crate::workspace::ASSIGNMENT_FIELD_ID,
            Self::Test => crate::workspace::TEST_FIELD_ID,
        }
    }
}

fn set_field<P: LogPanel, C: Clock>(workspace: &mut Workspace<P, C>, slot: FieldSlot, value: &str) {
    let field: Option<&mut TextField> = match slot {
        FieldSlot::Assignment => workspace.fields.assignment.as_mut(),
        FieldSlot::Test => workspace.fields.test_area.as_mut(),
    };
    match field {
        Some(field) => field.set_value(value),
        None => workspace.log.warn(&format!(
            "Warning: #{} not found; skipped setting value",
            slot.id()
        )),
    }
}

/// Welcome example shown when nothing was restored.
pub fn default_sources() -> SourceSet {
    SourceSet::new(
        r#"<!-- Welcome Card -->
<section class="card" style="max-width:520px;margin:24px auto;padding:18px;text-align:center">
  <h1>Welcome to the Project</h1>
  <p>This example runs locally in the browser.</p>
  <button id="btn">Try me</button>
</section>
"#,
        r#"body {
  font-family: system-ui;
  background: #f7fafc;
  margin: 0;
}
h1 {
  color: #0f172a;
}
#btn {
  padding: .75rem 1rem;
  border: 0;
  border-radius: 10px;
  background: #60a5fa;
  color: #08111f;
  font-weight: 700;
}
"#,
        r#"document.getElementById('btn').addEventListener('click', () => alert('Well done!'));
console.log('Hello from JavaScript!');
"#,
    )
}

/// Seeds the editors with [`default_sources`]; form fields are left alone.
pub fn seed_default_content<P: LogPanel, C: Clock>(workspace: &mut Workspace<P, C>) {
    let sources = default_sources();
    workspace.editors.set_text(Pane::Markup, Some(&sources.html));
    workspace.editors.set_text(Pane::Style, Some(&sources.css));
    workspace.editors.set_text(Pane::Script, Some(&sources.js));
    info!("event=seed_defaults module=service status=ok");
}

/// Project persistence over injected storage and download sinks.
pub struct ProjectStore<S: KeyValueStore, D: DownloadSink> {
    storage: S,
    downloads: D,
    storage_key: String,
    download_file_name: String,
}

impl<S: KeyValueStore, D: DownloadSink> ProjectStore<S, D> {
    pub fn new(storage: S, downloads: D, config: &PlaygroundConfig) -> Self {
        Self {
            storage,
            downloads,
            storage_key: config.storage_key.clone(),
            download_file_name: config.download_file_name.clone(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn downloads(&self) -> &D {
        &self.downloads
    }

    pub fn downloads_mut(&mut self) -> &mut D {
        &mut self.downloads
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Persists the workspace and offers it as a download.
    ///
    /// # Contract
    /// - Order: serialize, storage write, download.
    /// - Returns the offered file on success.
    pub fn try_save<P: LogPanel, C: Clock>(
        &mut self,
        workspace: &Workspace<P, C>,
    ) -> Result<DownloadFile, SaveError> {
        let data = to_project(workspace)
            .to_pretty_json()
            .map_err(SaveError::Serialize)?;
        self.storage.set_item(&self.storage_key, &data)?;

        let file = DownloadFile::json(self.download_file_name.as_str(), data);
        self.downloads.offer(&file)?;
        Ok(file)
    }

    /// Save action: like [`Self::try_save`], reporting through the log.
    ///
    /// Returns whether the save completed.
    pub fn save<P: LogPanel, C: Clock>(&mut self, workspace: &mut Workspace<P, C>) -> bool {
        match self.try_save(workspace) {
            Ok(file) => {
                info!(
                    "event=project_save module=service status=ok bytes={}",
                    file.contents.len()
                );
                workspace.log.info(SAVED_MESSAGE);
                true
            }
            Err(err) => {
                error!("event=project_save module=service status=error error={err}");
                workspace.log.error(&format!("Unable to save: {err}"));
                false
            }
        }
    }

    /// Imports project text (e.g. a picked file) into the workspace.
    ///
    /// Parse or shape failures log one error entry and change nothing.
    pub fn load_from_text<P: LogPanel, C: Clock>(
        &self,
        workspace: &mut Workspace<P, C>,
        text: &str,
    ) -> Result<(), ProjectLoadError> {
        match Project::from_json_str(text) {
            Ok(project) => {
                apply(workspace, &project);
                info!("event=project_load module=service status=ok source=file");
                Ok(())
            }
            Err(err) => {
                warn!("event=project_load module=service status=error source=file error={err}");
                workspace.log.error(INVALID_FILE_MESSAGE);
                Err(err)
            }
        }
    }

    /// Startup restore from storage.
    ///
    /// A missing or empty stored value counts as `Absent`. Callers seed
    /// default content for anything but `Restored`.
    pub fn restore<P: LogPanel, C: Clock>(&self, workspace: &mut Workspace<P, C>) -> RestoreOutcome {
        let cached = match self.storage.get_item(&self.storage_key) {
            Ok(Some(cached)) if !cached.is_empty() => cached,
            Ok(_) => {
                info!("event=project_restore module=service status=absent");
                return RestoreOutcome::Absent;
            }
            Err(err) => return self.restore_failed(workspace, &err),
        };

        match Project::from_json_str(&cached) {
            Ok(project) => {
                apply(workspace, &project);
                info!("event=project_restore module=service status=ok");
                RestoreOutcome::Restored
            }
            Err(err) => self.restore_failed(workspace, &err),
        }
    }

    fn restore_failed<P: LogPanel, C: Clock>(
        &self,
        workspace: &mut Workspace<P, C>,
        err: &dyn Error,
    ) -> RestoreOutcome {
        warn!("event=project_restore module=service status=error error={err}");
        workspace.log.warn(&format!("Skipping auto-restore: {err}"));
        RestoreOutcome::Failed
    }
}
