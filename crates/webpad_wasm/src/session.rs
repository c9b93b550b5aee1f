//! Page session handle for the browser host.
//!
//! # Responsibility
//! - Own one core `Playground` for the lifetime of the page.
//! - Queue downloads and detached previews for page scripts to carry out.
//!
//! # Invariants
//! - Storage is in memory; the page mirrors `stored_project` into
//!   `localStorage` after every save.
//! - Methods never panic; host wiring errors come back as message strings.

use log::warn;
use wasm_bindgen::prelude::wasm_bindgen;
use webpad_core::workspace::{ASSIGNMENT_FIELD_ID, TEST_FIELD_ID};
use webpad_core::{
    Action, DownloadFile, DownloadSink, ExportError, KeyValueStore, MemoryKeyValueStore, Pane,
    Platform, Playground, PlaygroundConfig, PreviewError, PreviewWindow, RestoreOutcome,
    TextField, Workspace,
};

/// Holds the last offered download until the page saves it.
#[derive(Debug, Default)]
pub struct PendingDownloads {
    pending: Option<DownloadFile>,
}

impl DownloadSink for PendingDownloads {
    fn offer(&mut self, file: &DownloadFile) -> Result<(), ExportError> {
        self.pending = Some(file.clone());
        Ok(())
    }
}

/// Holds the last detached preview until the page opens a window for it.
#[derive(Debug, Default)]
pub struct PendingWindow {
    pending: Option<String>,
}

impl PreviewWindow for PendingWindow {
    fn open_document(&mut self, document: &str) -> Result<(), PreviewError> {
        self.pending = Some(document.to_string());
        Ok(())
    }
}

type PagePlayground = Playground<MemoryKeyValueStore, PendingDownloads, PendingWindow>;

/// File the page should hand to the browser as a download.
#[wasm_bindgen(getter_with_clone)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDownload {
    pub file_name: String,
    pub mime_type: String,
    pub contents: String,
}

#[wasm_bindgen]
pub struct PlaygroundSession {
    playground: PagePlayground,
}

#[wasm_bindgen]
impl PlaygroundSession {
    /// Builds a session over `saved_project`, the raw value the page read
    /// from `localStorage` (if any). Call [`Self::start`] next.
    #[wasm_bindgen(constructor)]
    pub fn new(saved_project: Option<String>, is_mac: bool) -> PlaygroundSession {
        let config = PlaygroundConfig::default();
        let storage = MemoryKeyValueStore::new();
        if let Some(text) = saved_project {
            if let Err(err) = storage.set_item(&config.storage_key, &text) {
                warn!("event=session_seed module=wasm status=error error={err}");
            }
        }
        let platform = if is_mac {
            Platform::Mac
        } else {
            Platform::Windows
        };
        let playground = Playground::new(
            &config,
            Workspace::default(),
            storage,
            PendingDownloads::default(),
            PendingWindow::default(),
        )
        .with_platform(platform);
        Self { playground }
    }

    /// Restores the saved project or seeds the welcome example.
    ///
    /// Returns `restored`, `absent` or `failed`.
    pub fn start(&mut self) -> String {
        match self.playground.start() {
            RestoreOutcome::Restored => "restored",
            RestoreOutcome::Absent => "absent",
            RestoreOutcome::Failed => "failed",
        }
        .to_owned()
    }

    /// Handles a named action; returns an empty string or the wiring error.
    pub fn dispatch(&mut self, name: String, argument: Option<String>) -> String {
        match self.playground.dispatch_named(&name, argument.as_deref()) {
            Ok(()) => String::new(),
            Err(err) => err.to_string(),
        }
    }

    /// Returns whether the chord was consumed.
    pub fn handle_shortcut(&mut self, chord: String) -> bool {
        self.playground.handle_shortcut(&chord)
    }

    /// Pane whose editor was just revealed, or empty.
    pub fn settle(&mut self) -> String {
        self.playground
            .settle()
            .map(|pane| pane.id().to_owned())
            .unwrap_or_default()
    }

    pub fn active_pane(&self) -> String {
        self.playground.active_pane().id().to_owned()
    }

    /// Editor text for a pane id, or empty for an unknown pane.
    pub fn editor_text(&self, pane: String) -> String {
        match pane.parse::<Pane>() {
            Ok(pane) => self.playground.workspace().editors.text(pane),
            Err(_) => String::new(),
        }
    }

    /// Returns whether the pane exists and has an editor.
    pub fn set_editor_text(&mut self, pane: String, text: String) -> bool {
        let Ok(pane) = pane.parse::<Pane>() else {
            return false;
        };
        self.playground
            .workspace_mut()
            .editors
            .set_text(pane, Some(&text))
    }

    /// Value of the `assignment` or `testArea` control.
    pub fn field_text(&self, field_id: String) -> String {
        let fields = &self.playground.workspace().fields;
        match field_id.as_str() {
            ASSIGNMENT_FIELD_ID => fields.assignment_text().to_owned(),
            TEST_FIELD_ID => fields.test_text().to_owned(),
            _ => String::new(),
        }
    }

    /// Returns whether the control exists.
    pub fn set_field_text(&mut self, field_id: String, text: String) -> bool {
        match self.field_mut(&field_id) {
            Some(field) => {
                field.set_value(text);
                true
            }
            None => false,
        }
    }

    /// Imports project file text; failures are logged to the panel.
    pub fn load_project_text(&mut self, text: String) -> bool {
        self.playground.load_text(&text).is_ok()
    }

    /// Saves the workspace and returns the stored project JSON.
    pub fn save_project_text(&mut self) -> Option<String> {
        if self.playground.save() {
            self.stored_project()
        } else {
            None
        }
    }

    /// Project JSON currently held under the storage key.
    pub fn stored_project(&self) -> Option<String> {
        let store = self.playground.store();
        store.storage().get_item(store.storage_key()).ok().flatten()
    }

    /// Takes the download offered by the last save.
    pub fn take_download(&mut self) -> Option<PageDownload> {
        let file = self.playground.store_mut().downloads_mut().pending.take()?;
        Some(PageDownload {
            file_name: file.file_name,
            mime_type: file.mime_type.to_owned(),
            contents: file.contents,
        })
    }

    /// Takes the document queued by the last open-preview action.
    pub fn take_preview_document(&mut self) -> Option<String> {
        self.playground.window_mut().pending.take()
    }

    /// Logs that the page could not open the preview window.
    pub fn report_preview_blocked(&mut self) {
        let message = format!("Unable to open preview: {}", PreviewError::WindowBlocked);
        self.playground.workspace_mut().log.error(&message);
    }

    /// Current inline-frame document, or empty before the first run.
    pub fn frame_document(&self) -> String {
        self.playground
            .frame()
            .document()
            .unwrap_or_default()
            .to_owned()
    }

    pub fn log_html(&self) -> String {
        self.playground.workspace().log.panel().to_html()
    }
}

impl PlaygroundSession {
    fn field_mut(&mut self, field_id: &str) -> Option<&mut TextField> {
        let fields = &mut self.playground.workspace_mut().fields;
        match field_id {
            ASSIGNMENT_FIELD_ID => fields.assignment.as_mut(),
            TEST_FIELD_ID => fields.test_area.as_mut(),
            _ => None,
        }
    }
}
