//! Live in-page state: editors, auxiliary form fields and the activity log.
//!
//! # Responsibility
//! - Group the state that project load/save flows read and write.
//!
//! # Invariants
//! - The three editors plus the two form fields are the only durable
//!   in-memory project state; no `Project` is kept between operations.

use crate::activity::{ActivityLog, Clock, HtmlLogPanel, LocalClock, LogPanel};
use crate::editor::EditorManager;

/// Host control id of the assignment text area.
pub const ASSIGNMENT_FIELD_ID: &str = "assignment";
/// Host control id of the test snippet text area.
pub const TEST_FIELD_ID: &str = "testArea";

/// A plain text control on the host page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField {
    id: &'static str,
    value: String,
}

impl TextField {
    pub fn new(id: &'static str) -> Self {
        Self {
            id,
            value: String::new(),
        }
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }
}

/// Auxiliary controls; either may be missing from the host page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFields {
    pub assignment: Option<TextField>,
    pub test_area: Option<TextField>,
}

impl Default for FormFields {
    fn default() -> Self {
        Self {
            assignment: Some(TextField::new(ASSIGNMENT_FIELD_ID)),
            test_area: Some(TextField::new(TEST_FIELD_ID)),
        }
    }
}

impl FormFields {
    /// Page without any auxiliary controls.
    pub fn none() -> Self {
        Self {
            assignment: None,
            test_area: None,
        }
    }

    pub fn assignment_text(&self) -> &str {
        self.assignment.as_ref().map_or("", TextField::value)
    }

    pub fn test_text(&self) -> &str {
        self.test_area.as_ref().map_or("", TextField::value)
    }
}

/// Editors, form fields and log as one borrowable unit.
pub struct Workspace<P: LogPanel = HtmlLogPanel, C: Clock = LocalClock> {
    pub editors: EditorManager,
    pub fields: FormFields,
    pub log: ActivityLog<P, C>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(EditorManager::headless(), FormFields::default(), ActivityLog::default())
    }
}

impl<P: LogPanel, C: Clock> Workspace<P, C> {
    pub fn new(editors: EditorManager, fields: FormFields, log: ActivityLog<P, C>) -> Self {
        Self {
            editors,
            fields,
            log,
        }
    }
}
