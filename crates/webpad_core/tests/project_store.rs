use webpad_core::db::open_db_in_memory;
use webpad_core::{
    ActivityLog, Clock, DownloadFile, DownloadSink, EditorManager, ExportError, FormFields,
    HtmlLogPanel, KeyValueStore, MemoryKeyValueStore, Pane, PlaygroundConfig, ProjectStore,
    RestoreOutcome, SaveError, SqliteKeyValueStore, StoreError, StoreResult, Workspace,
};

struct FixedClock;

impl Clock for FixedClock {
    fn time_label(&self) -> String {
        "09:30:00".to_string()
    }
}

#[derive(Default)]
struct RecordingDownloads {
    files: Vec<DownloadFile>,
}

impl DownloadSink for RecordingDownloads {
    fn offer(&mut self, file: &DownloadFile) -> Result<(), ExportError> {
        self.files.push(file.clone());
        Ok(())
    }
}

struct RejectingDownloads;

impl DownloadSink for RejectingDownloads {
    fn offer(&mut self, file: &DownloadFile) -> Result<(), ExportError> {
        Err(ExportError::InvalidFileName(file.file_name.clone()))
    }
}

/// Store whose writes always fail, like a full browser storage quota.
struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get_item(&self, _key: &str) -> StoreResult<Option<String>> {
        Ok(None)
    }

    fn set_item(&self, _key: &str, _value: &str) -> StoreResult<()> {
        Err(StoreError::Unavailable("quota exceeded".to_string()))
    }

    fn remove_item(&self, _key: &str) -> StoreResult<()> {
        Ok(())
    }
}

type TestWorkspace = Workspace<HtmlLogPanel, FixedClock>;

fn workspace() -> TestWorkspace {
    workspace_with_fields(FormFields::default())
}

fn workspace_with_fields(fields: FormFields) -> TestWorkspace {
    Workspace::new(
        EditorManager::headless(),
        fields,
        ActivityLog::new(HtmlLogPanel::new(), FixedClock),
    )
}

fn fill(workspace: &mut TestWorkspace) {
    workspace.editors.set_text(Pane::Markup, Some("<p>x</p>"));
    workspace.editors.set_text(Pane::Style, Some("p{color:red}"));
    workspace.editors.set_text(Pane::Script, Some("console.log(1)"));
    if let Some(field) = workspace.fields.assignment.as_mut() {
        field.set_value("Make it red");
    }
    if let Some(field) = workspace.fields.test_area.as_mut() {
        field.set_value("console.log(2)");
    }
}

fn lines_with(workspace: &TestWorkspace, color: &str) -> usize {
    workspace
        .log
        .panel()
        .lines()
        .iter()
        .filter(|line| line.contains(color))
        .count()
}

fn error_lines(workspace: &TestWorkspace) -> usize {
    lines_with(workspace, "var(--err)")
}

#[test]
fn save_writes_storage_and_offers_download() {
    let config = PlaygroundConfig::default();
    let mut store = ProjectStore::new(
        MemoryKeyValueStore::new(),
        RecordingDownloads::default(),
        &config,
    );
    let mut ws = workspace();
    fill(&mut ws);

    assert!(store.save(&mut ws));

    let stored = store
        .storage()
        .get_item("code-editor-content")
        .unwrap()
        .expect("project should be stored");
    let files = &store.downloads().files;
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file_name, "your-test-idea.json");
    assert_eq!(files[0].mime_type, "application/json");
    assert_eq!(files[0].contents, stored);
    assert!(stored.starts_with("{\n  \"version\": 1,\n  \"kind\": \"web-only\""));
    assert!(stored.contains("\"test\": \"console.log(2)\""));
    assert!(ws
        .log
        .panel()
        .lines()
        .last()
        .unwrap()
        .ends_with("Saved locally and downloaded JSON file."));
}

#[test]
fn save_failure_logs_one_error_and_offers_nothing() {
    let config = PlaygroundConfig::default();
    let mut store = ProjectStore::new(FailingStore, RecordingDownloads::default(), &config);
    let mut ws = workspace();
    fill(&mut ws);

    assert!(!store.save(&mut ws));

    assert_eq!(ws.log.panel().lines().len(), 1);
    assert_eq!(error_lines(&ws), 1);
    assert!(ws.log.panel().lines()[0].contains("Unable to save: storage unavailable"));
    assert!(store.downloads().files.is_empty());
}

#[test]
fn quota_exceeded_is_reported_as_save_error() {
    let config = PlaygroundConfig::default();
    let storage = MemoryKeyValueStore::new().with_quota(Some(32));
    let mut store = ProjectStore::new(storage, RecordingDownloads::default(), &config);
    let mut ws = workspace();
    fill(&mut ws);

    let err = store.try_save(&ws).unwrap_err();
    assert!(matches!(
        err,
        SaveError::Storage(StoreError::QuotaExceeded { .. })
    ));
    assert!(store.storage().is_empty());
}

#[test]
fn export_failure_after_storage_write_is_logged() {
    let config = PlaygroundConfig::default();
    let mut store = ProjectStore::new(MemoryKeyValueStore::new(), RejectingDownloads, &config);
    let mut ws = workspace();

    assert!(!store.save(&mut ws));
    assert_eq!(error_lines(&ws), 1);
}

#[test]
fn load_from_text_applies_project() {
    let config = PlaygroundConfig::default();
    let store = ProjectStore::new(
        MemoryKeyValueStore::new(),
        RecordingDownloads::default(),
        &config,
    );
    let mut ws = workspace();

    store
        .load_from_text(
            &mut ws,
            r#"{ "task": "Legacy task", "web": { "html": "<i>hi</i>" }, "js": "go()" }"#,
        )
        .unwrap();

    assert_eq!(ws.fields.assignment_text(), "Legacy task");
    assert_eq!(ws.fields.test_text(), "");
    assert_eq!(ws.editors.text(Pane::Markup), "<i>hi</i>");
    assert_eq!(ws.editors.text(Pane::Style), "");
    assert_eq!(ws.editors.text(Pane::Script), "go()");
    assert!(ws.log.panel().lines()[0].ends_with("Project loaded."));
}

#[test]
fn unparseable_file_logs_one_error_and_keeps_editors() {
    let config = PlaygroundConfig::default();
    let store = ProjectStore::new(
        MemoryKeyValueStore::new(),
        RecordingDownloads::default(),
        &config,
    );
    let mut ws = workspace();
    fill(&mut ws);

    assert!(store.load_from_text(&mut ws, "this is not json").is_err());

    assert_eq!(ws.log.panel().lines().len(), 1);
    assert_eq!(error_lines(&ws), 1);
    assert!(ws.log.panel().lines()[0].ends_with("Invalid project file"));
    assert_eq!(ws.editors.text(Pane::Markup), "<p>x</p>");
    assert_eq!(ws.editors.text(Pane::Style), "p{color:red}");
    assert_eq!(ws.editors.text(Pane::Script), "console.log(1)");
    assert_eq!(ws.fields.assignment_text(), "Make it red");
}

#[test]
fn non_object_file_is_rejected_without_changes() {
    let config = PlaygroundConfig::default();
    let store = ProjectStore::new(
        MemoryKeyValueStore::new(),
        RecordingDownloads::default(),
        &config,
    );
    let mut ws = workspace();
    fill(&mut ws);

    assert!(store.load_from_text(&mut ws, "42").is_err());
    assert_eq!(error_lines(&ws), 1);
    assert_eq!(ws.editors.text(Pane::Script), "console.log(1)");
}

#[test]
fn missing_controls_warn_and_editors_still_load() {
    let config = PlaygroundConfig::default();
    let store = ProjectStore::new(
        MemoryKeyValueStore::new(),
        RecordingDownloads::default(),
        &config,
    );
    let mut ws = workspace_with_fields(FormFields::none());

    store
        .load_from_text(&mut ws, r#"{ "assignment": "a", "test": "t", "css": "b{}" }"#)
        .unwrap();

    let lines = ws.log.panel().lines();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("Warning: #assignment not found; skipped setting value"));
    assert!(lines[1].contains("Warning: #testArea not found; skipped setting value"));
    assert_eq!(lines_with(&ws, "var(--warn)"), 2);
    assert_eq!(ws.editors.text(Pane::Style), "b{}");
}

#[test]
fn restore_reports_absent_restored_and_failed() {
    let config = PlaygroundConfig::default();
    let conn = open_db_in_memory().unwrap();
    let storage = SqliteKeyValueStore::new(&conn);
    let store = ProjectStore::new(storage, RecordingDownloads::default(), &config);

    let mut ws = workspace();
    assert_eq!(store.restore(&mut ws), RestoreOutcome::Absent);
    assert!(ws.log.panel().lines().is_empty());

    store
        .storage()
        .set_item(store.storage_key(), r#"{ "html": "<b>saved</b>" }"#)
        .unwrap();
    assert_eq!(store.restore(&mut ws), RestoreOutcome::Restored);
    assert_eq!(ws.editors.text(Pane::Markup), "<b>saved</b>");

    store
        .storage()
        .set_item(store.storage_key(), "{ truncated")
        .unwrap();
    let mut fresh = workspace();
    assert_eq!(store.restore(&mut fresh), RestoreOutcome::Failed);
    assert_eq!(lines_with(&fresh, "var(--warn)"), 1);
    assert!(fresh.log.panel().lines()[0].contains("Skipping auto-restore:"));
    assert_eq!(fresh.editors.text(Pane::Markup), "");
}

#[test]
fn saved_project_restores_into_new_session() {
    let config = PlaygroundConfig::default();
    let conn = open_db_in_memory().unwrap();
    let mut store = ProjectStore::new(
        SqliteKeyValueStore::new(&conn),
        RecordingDownloads::default(),
        &config,
    );
    let mut first = workspace();
    fill(&mut first);
    assert!(store.save(&mut first));

    let mut second = workspace();
    assert_eq!(store.restore(&mut second), RestoreOutcome::Restored);
    assert_eq!(
        webpad_core::service::project_service::to_project(&second),
        webpad_core::service::project_service::to_project(&first)
    );
}
