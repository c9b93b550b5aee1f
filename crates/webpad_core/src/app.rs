//! Playground session state and action dispatch.
//!
//! # Responsibility
//! - Own every component for one page session, built once at startup.
//! - Route named actions (run, save, load, pane switching) to components.
//!
//! # Invariants
//! - All actions run to completion synchronously on the caller's thread.
//! - No action returns an error for user-facing failures; those are logged.

use crate::activity::{Clock, LogPanel};
use crate::config::PlaygroundConfig;
use crate::editor::{command_for_chord, EditorCommand, Platform};
use crate::model::project::{Project, ProjectLoadError};
use crate::pane::{Pane, PaneActivation, PaneError, PaneNavigation, PaneSwitcher};
use crate::preview::{compose_document, PreviewWindow, RunMode, SandboxedFrame};
use crate::repo::download::DownloadSink;
use crate::repo::kv_store::KeyValueStore;
use crate::service::project_service::{
    seed_default_content, to_project, ProjectStore, RestoreOutcome,
};
use crate::workspace::Workspace;
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const READY_MESSAGE: &str = "Ready — Web-only Editor (HTML/CSS/JS) ✨";

/// Named identifiers the host binds controls to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionId {
    Run,
    RunTests,
    OpenPreview,
    Save,
    Load,
    ClearLog,
    SwitchPane,
    NavigatePane,
}

impl ActionId {
    pub const ALL: [ActionId; 8] = [
        ActionId::Run,
        ActionId::RunTests,
        ActionId::OpenPreview,
        ActionId::Save,
        ActionId::Load,
        ActionId::ClearLog,
        ActionId::SwitchPane,
        ActionId::NavigatePane,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::RunTests => "run-tests",
            Self::OpenPreview => "open-preview",
            Self::Save => "save",
            Self::Load => "load",
            Self::ClearLog => "clear-log",
            Self::SwitchPane => "switch-pane",
            Self::NavigatePane => "navigate-pane",
        }
    }

    /// Whether the action needs an argument (file text, pane id, key name).
    pub fn takes_argument(self) -> bool {
        matches!(self, Self::Load | Self::SwitchPane | Self::NavigatePane)
    }
}

impl FromStr for ActionId {
    type Err = ActionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.name() == value.trim())
            .ok_or_else(|| ActionError::UnknownAction(value.to_string()))
    }
}

/// A user or browser event, already decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Run,
    RunTests,
    OpenPreview,
    Save,
    /// Text of a picked project file.
    Load(String),
    ClearLog,
    SwitchPane(Pane),
    NavigatePane(PaneNavigation),
}

impl Action {
    pub fn id(&self) -> ActionId {
        match self {
            Self::Run => ActionId::Run,
            Self::RunTests => ActionId::RunTests,
            Self::OpenPreview => ActionId::OpenPreview,
            Self::Save => ActionId::Save,
            Self::Load(_) => ActionId::Load,
            Self::ClearLog => ActionId::ClearLog,
            Self::SwitchPane(_) => ActionId::SwitchPane,
            Self::NavigatePane(_) => ActionId::NavigatePane,
        }
    }

    /// Builds an action from its name and optional argument.
    ///
    /// `navigate-pane` takes a key name; keys other than left/right arrows
    /// decode to `Ok(None)` because the event is simply ignored.
    pub fn parse(name: &str, argument: Option<&str>) -> Result<Option<Self>, ActionError> {
        let id = name.parse::<ActionId>()?;
        let argument = match (id.takes_argument(), argument) {
            (true, Some(argument)) => argument,
            (true, None) => return Err(ActionError::MissingArgument(id)),
            (false, _) => "",
        };
        let action = match id {
            ActionId::Run => Self::Run,
            ActionId::RunTests => Self::RunTests,
            ActionId::OpenPreview => Self::OpenPreview,
            ActionId::Save => Self::Save,
            ActionId::Load => Self::Load(argument.to_string()),
            ActionId::ClearLog => Self::ClearLog,
            ActionId::SwitchPane => Self::SwitchPane(argument.parse()?),
            ActionId::NavigatePane => match PaneNavigation::from_key(argument) {
                Some(navigation) => Self::NavigatePane(navigation),
                None => return Ok(None),
            },
        };
        Ok(Some(action))
    }
}

/// Host wiring errors (bad action names/arguments), not user-facing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    UnknownAction(String),
    MissingArgument(ActionId),
    Pane(PaneError),
}

impl Display for ActionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownAction(name) => write!(f, "unknown action `{name}`"),
            Self::MissingArgument(id) => write!(f, "action `{}` needs an argument", id.name()),
            Self::Pane(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ActionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Pane(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PaneError> for ActionError {
    fn from(value: PaneError) -> Self {
        Self::Pane(value)
    }
}

/// One page session of the playground.
pub struct Playground<S, D, W, P = crate::activity::HtmlLogPanel, C = crate::activity::LocalClock>
where
    S: KeyValueStore,
    D: DownloadSink,
    W: PreviewWindow,
    P: LogPanel,
    C: Clock,
{
    workspace: Workspace<P, C>,
    panes: PaneSwitcher,
    frame: SandboxedFrame,
    window: W,
    store: ProjectStore<S, D>,
    platform: Platform,
    pending_reveal: Option<Pane>,
}

impl<S, D, W, P, C> Playground<S, D, W, P, C>
where
    S: KeyValueStore,
    D: DownloadSink,
    W: PreviewWindow,
    P: LogPanel,
    C: Clock,
{
    /// Assembles a session without touching storage; see [`Self::start`].
    pub fn new(
        config: &PlaygroundConfig,
        workspace: Workspace<P, C>,
        storage: S,
        downloads: D,
        window: W,
    ) -> Self {
        let mut playground = Self {
            workspace,
            panes: PaneSwitcher::new(),
            frame: SandboxedFrame::new(),
            window,
            store: ProjectStore::new(storage, downloads, config),
            platform: Platform::current(),
            pending_reveal: None,
        };
        playground.pending_reveal = Some(playground.panes.active());
        playground
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Startup: restore the saved project or seed the welcome example, then
    /// announce readiness.
    pub fn start(&mut self) -> RestoreOutcome {
        let outcome = self.store.restore(&mut self.workspace);
        if outcome != RestoreOutcome::Restored {
            seed_default_content(&mut self.workspace);
        }
        self.workspace.log.info(READY_MESSAGE);
        info!("event=playground_start module=app status=ok restore={outcome:?}");
        outcome
    }

    pub fn workspace(&self) -> &Workspace<P, C> {
        &self.workspace
    }

    pub fn workspace_mut(&mut self) -> &mut Workspace<P, C> {
        &mut self.workspace
    }

    pub fn frame(&self) -> &SandboxedFrame {
        &self.frame
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut W {
        &mut self.window
    }

    pub fn store(&self) -> &ProjectStore<S, D> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ProjectStore<S, D> {
        &mut self.store
    }

    pub fn active_pane(&self) -> Pane {
        self.panes.active()
    }

    pub fn pane_activation(&self) -> PaneActivation {
        self.panes.activation()
    }

    pub fn to_project(&self) -> Project {
        to_project(&self.workspace)
    }

    /// Composes the preview document from live editor and test text.
    pub fn compose(&self, include_tests: bool) -> String {
        compose_document(
            &self.workspace.editors.sources(),
            self.workspace.fields.test_text(),
            include_tests,
        )
    }

    /// Handles one action.
    pub fn dispatch(&mut self, action: Action) {
        debug!("event=action module=app action={}", action.id().name());
        match action {
            Action::Run => self.run(RunMode::Preview),
            Action::RunTests => self.run(RunMode::WithTests),
            Action::OpenPreview => self.open_preview(),
            Action::Save => {
                self.save();
            }
            Action::Load(text) => {
                let _ = self.load_text(&text);
            }
            Action::ClearLog => self.workspace.log.clear(),
            Action::SwitchPane(pane) => {
                self.panes.select(pane);
                self.pending_reveal = Some(pane);
            }
            Action::NavigatePane(navigation) => {
                let activation = self.panes.navigate(navigation);
                self.pending_reveal = Some(activation.active);
            }
        }
    }

    /// Save action; returns whether storage and download both succeeded.
    pub fn save(&mut self) -> bool {
        self.store.save(&mut self.workspace)
    }

    /// Load action for text the host already read (e.g. a picked file).
    pub fn load_text(&mut self, text: &str) -> Result<(), ProjectLoadError> {
        self.store.load_from_text(&mut self.workspace, text)
    }

    /// Decodes and handles a named action.
    pub fn dispatch_named(&mut self, name: &str, argument: Option<&str>) -> Result<(), ActionError> {
        if let Some(action) = Action::parse(name, argument)? {
            self.dispatch(action);
        }
        Ok(())
    }

    /// Global shortcut handler; returns whether the chord was consumed (and
    /// the browser default must be suppressed).
    pub fn handle_shortcut(&mut self, chord: &str) -> bool {
        match command_for_chord(self.platform, chord) {
            Some(EditorCommand::Run) => {
                self.dispatch(Action::Run);
                true
            }
            Some(EditorCommand::Save) => {
                self.dispatch(Action::Save);
                true
            }
            None => false,
        }
    }

    /// Runs once the UI has laid out the newly visible pane: resizes and
    /// focuses its editor. Returns the revealed pane.
    pub fn settle(&mut self) -> Option<Pane> {
        let pane = self.pending_reveal.take()?;
        self.workspace.editors.reveal(pane);
        Some(pane)
    }

    fn run(&mut self, mode: RunMode) {
        let document = self.compose(mode.includes_tests());
        self.frame.replace_document(document);
        info!(
            "event=preview_run module=app status=ok mode={mode:?} generation={}",
            self.frame.generation()
        );
        self.workspace.log.info(mode.log_message());
    }

    fn open_preview(&mut self) {
        let document = self.compose(false);
        if let Err(err) = self.window.open_document(&document) {
            error!("event=preview_open module=app status=error error={err}");
            self.workspace.log.error(&format!("Unable to open preview: {err}"));
        }
    }
}
