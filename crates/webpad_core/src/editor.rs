//! Editing surfaces for the three panes.
//!
//! # Responsibility
//! - Own one editing surface per pane behind the [`EditorSurface`] seam.
//! - Carry widget options and the global run/save key bindings.
//!
//! # Invariants
//! - Replacing text never fails; absent input becomes the empty string.
//! - A missing surface reads as empty and ignores writes.

use crate::model::project::SourceSet;
use crate::pane::{Pane, TAB_ORDER};
use log::debug;
use std::collections::BTreeMap;

/// Operations the playground needs from a text-editing widget.
pub trait EditorSurface {
    fn text(&self) -> String;
    /// Replaces all text and moves the cursor to the document start.
    fn set_text(&mut self, text: &str);
    /// Re-measures the surface against its container.
    fn resize(&mut self);
    fn focus(&mut self);
}

/// Cursor location as zero-based line/column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub line: usize,
    pub column: usize,
}

/// Headless editing surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    cursor: Cursor,
    focused: bool,
    resize_count: usize,
}

impl TextBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn resize_count(&self) -> usize {
        self.resize_count
    }

    /// Moves the cursor to the end of the text, as typing would.
    pub fn move_to_end(&mut self) {
        let line = self.text.matches('\n').count();
        let column = self
            .text
            .rsplit('\n')
            .next()
            .map_or(0, |last| last.chars().count());
        self.cursor = Cursor { line, column };
    }
}

impl EditorSurface for TextBuffer {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
        self.cursor = Cursor::default();
    }

    fn resize(&mut self) {
        self.resize_count += 1;
    }

    fn focus(&mut self) {
        self.focused = true;
    }
}

/// Widget construction options shared by every pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorOptions {
    pub theme: &'static str,
    pub mode: &'static str,
    pub tab_size: u8,
    pub use_soft_tabs: bool,
    pub show_print_margin: bool,
    pub wrap: bool,
    pub auto_scroll_editor_into_view: bool,
}

impl EditorOptions {
    pub fn for_pane(pane: Pane) -> Self {
        Self {
            theme: "ace/theme/dracula",
            mode: match pane {
                Pane::Markup => "ace/mode/html",
                Pane::Style => "ace/mode/css",
                Pane::Script => "ace/mode/javascript",
            },
            tab_size: 2,
            use_soft_tabs: true,
            show_print_margin: false,
            wrap: true,
            auto_scroll_editor_into_view: true,
        }
    }
}

/// Host platform, for picking a key chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Mac,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        match std::env::consts::OS {
            "macos" | "ios" => Self::Mac,
            "windows" => Self::Windows,
            _ => Self::Linux,
        }
    }
}

/// Per-platform chord for one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub win: &'static str,
    pub mac: &'static str,
    pub linux: &'static str,
}

impl KeyBinding {
    pub fn chord(&self, platform: Platform) -> &'static str {
        match platform {
            Platform::Windows => self.win,
            Platform::Mac => self.mac,
            Platform::Linux => self.linux,
        }
    }
}

/// Commands reachable from every surface regardless of focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    Run,
    Save,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandBinding {
    pub name: &'static str,
    pub key: KeyBinding,
    pub command: EditorCommand,
}

pub const COMMAND_BINDINGS: [CommandBinding; 2] = [
    CommandBinding {
        name: "run",
        key: KeyBinding {
            win: "Ctrl-Enter",
            mac: "Command-Enter",
            linux: "Ctrl-Enter",
        },
        command: EditorCommand::Run,
    },
    CommandBinding {
        name: "save",
        key: KeyBinding {
            win: "Ctrl-S",
            mac: "Command-S",
            linux: "Ctrl-S",
        },
        command: EditorCommand::Save,
    },
];

/// Resolves a pressed chord (e.g. `ctrl-s`) to a global command.
pub fn command_for_chord(platform: Platform, chord: &str) -> Option<EditorCommand> {
    let chord = chord.trim();
    COMMAND_BINDINGS
        .iter()
        .find(|binding| binding.key.chord(platform).eq_ignore_ascii_case(chord))
        .map(|binding| binding.command)
}

/// Owner of the three pane surfaces.
#[derive(Default)]
pub struct EditorManager {
    surfaces: BTreeMap<Pane, Box<dyn EditorSurface>>,
}

impl EditorManager {
    /// Creates a manager without surfaces; see [`Self::attach`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manager with an empty [`TextBuffer`] per pane.
    pub fn headless() -> Self {
        let mut manager = Self::new();
        for pane in TAB_ORDER {
            manager.attach(pane, Box::new(TextBuffer::default()));
        }
        manager
    }

    /// Binds `surface` to `pane`, replacing any previous one.
    pub fn attach(&mut self, pane: Pane, surface: Box<dyn EditorSurface>) {
        self.surfaces.insert(pane, surface);
    }

    pub fn detach(&mut self, pane: Pane) -> Option<Box<dyn EditorSurface>> {
        self.surfaces.remove(&pane)
    }

    pub fn is_available(&self, pane: Pane) -> bool {
        self.surfaces.contains_key(&pane)
    }

    pub fn text(&self, pane: Pane) -> String {
        self.surfaces
            .get(&pane)
            .map(|surface| surface.text())
            .unwrap_or_default()
    }

    /// Replaces the pane's text; returns `false` when no surface is bound.
    pub fn set_text(&mut self, pane: Pane, text: Option<&str>) -> bool {
        match self.surfaces.get_mut(&pane) {
            Some(surface) => {
                surface.set_text(text.unwrap_or_default());
                true
            }
            None => {
                debug!("event=editor_set module=editor status=skipped pane={pane}");
                false
            }
        }
    }

    /// Resizes and focuses the pane's surface once it becomes visible.
    pub fn reveal(&mut self, pane: Pane) {
        if let Some(surface) = self.surfaces.get_mut(&pane) {
            surface.resize();
            surface.focus();
        }
    }

    pub fn sources(&self) -> SourceSet {
        SourceSet {
            html: self.text(Pane::Markup),
            css: self.text(Pane::Style),
            js: self.text(Pane::Script),
        }
    }
}
