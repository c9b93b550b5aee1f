//! Editor pane selection.
//!
//! # Responsibility
//! - Track which of the three editing panes is visible.
//! - Derive per-pane visibility and tab attributes for the selector strip.
//!
//! # Invariants
//! - Exactly one pane is active at any time; markup is active initially.
//! - Relative navigation wraps at both ends of [`TAB_ORDER`].

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One of the three editing panes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Pane {
    /// HTML editor.
    #[default]
    Markup,
    /// CSS editor.
    Style,
    /// JavaScript editor.
    Script,
}

/// Fixed cyclic order of the selector strip.
pub const TAB_ORDER: [Pane; 3] = [Pane::Markup, Pane::Style, Pane::Script];

impl Pane {
    /// Identifier used by the host page (`data-pane`).
    pub fn id(self) -> &'static str {
        match self {
            Self::Markup => "html",
            Self::Style => "css",
            Self::Script => "js",
        }
    }

    fn position(self) -> usize {
        match self {
            Self::Markup => 0,
            Self::Style => 1,
            Self::Script => 2,
        }
    }

    pub fn next(self) -> Self {
        TAB_ORDER[(self.position() + 1) % TAB_ORDER.len()]
    }

    pub fn previous(self) -> Self {
        TAB_ORDER[(self.position() + TAB_ORDER.len() - 1) % TAB_ORDER.len()]
    }
}

impl Display for Pane {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Pane {
    type Err = PaneError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        TAB_ORDER
            .into_iter()
            .find(|pane| pane.id() == value.trim())
            .ok_or_else(|| PaneError::UnknownPane(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaneError {
    UnknownPane(String),
}

impl Display for PaneError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownPane(value) => {
                write!(f, "unknown pane `{value}`; expected html|css|js")
            }
        }
    }
}

impl Error for PaneError {}

/// Relative move within the selector strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneNavigation {
    Previous,
    Next,
}

impl PaneNavigation {
    /// Maps a keyboard key name; only left/right arrows navigate.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Self::Previous),
            "ArrowRight" => Some(Self::Next),
            _ => None,
        }
    }
}

/// Rendered state of one pane and its selector control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneView {
    pub pane: Pane,
    /// Editor container `hidden` flag.
    pub hidden: bool,
    /// Selector `active` class and `aria-selected` value.
    pub selected: bool,
    /// Selector `tabindex`; only the active control is reachable.
    pub tab_index: i32,
}

/// Result of an activation, for the host to reflect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneActivation {
    pub active: Pane,
    pub views: [PaneView; 3],
}

impl PaneActivation {
    fn for_active(active: Pane) -> Self {
        let views = TAB_ORDER.map(|pane| {
            let on = pane == active;
            PaneView {
                pane,
                hidden: !on,
                selected: on,
                tab_index: if on { 0 } else { -1 },
            }
        });
        Self { active, views }
    }
}

/// Single-active-pane state machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaneSwitcher {
    active: Pane,
}

impl PaneSwitcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Pane {
        self.active
    }

    pub fn activation(&self) -> PaneActivation {
        PaneActivation::for_active(self.active)
    }

    pub fn select(&mut self, pane: Pane) -> PaneActivation {
        self.active = pane;
        self.activation()
    }

    pub fn navigate(&mut self, navigation: PaneNavigation) -> PaneActivation {
        let target = match navigation {
            PaneNavigation::Previous => self.active.previous(),
            PaneNavigation::Next => self.active.next(),
        };
        self.select(target)
    }

    /// Applies a key press from the selector strip; non-arrow keys are ignored.
    pub fn handle_key(&mut self, key: &str) -> Option<PaneActivation> {
        PaneNavigation::from_key(key).map(|navigation| self.navigate(navigation))
    }
}

#[cfg(test)]
mod tests {
    use super::{Pane, PaneError, PaneNavigation, PaneSwitcher};

    #[test]
    fn starts_on_markup() {
        assert_eq!(PaneSwitcher::new().active(), Pane::Markup);
    }

    #[test]
    fn next_next_previous_lands_on_style() {
        let mut switcher = PaneSwitcher::new();
        switcher.navigate(PaneNavigation::Next);
        switcher.navigate(PaneNavigation::Next);
        let activation = switcher.navigate(PaneNavigation::Previous);
        assert_eq!(activation.active, Pane::Style);
    }

    #[test]
    fn navigation_wraps_both_ends() {
        let mut switcher = PaneSwitcher::new();
        assert_eq!(switcher.navigate(PaneNavigation::Previous).active, Pane::Script);
        assert_eq!(switcher.navigate(PaneNavigation::Next).active, Pane::Markup);
    }

    #[test]
    fn activation_marks_exactly_one_view() {
        let mut switcher = PaneSwitcher::new();
        let activation = switcher.select(Pane::Script);

        let visible: Vec<Pane> = activation
            .views
            .iter()
            .filter(|view| !view.hidden)
            .map(|view| view.pane)
            .collect();
        assert_eq!(visible, vec![Pane::Script]);
        for view in activation.views {
            assert_eq!(view.selected, view.pane == Pane::Script);
            assert_eq!(view.tab_index, if view.selected { 0 } else { -1 });
        }
    }

    #[test]
    fn other_keys_are_ignored() {
        let mut switcher = PaneSwitcher::new();
        assert!(switcher.handle_key("ArrowUp").is_none());
        assert!(switcher.handle_key("Enter").is_none());
        assert_eq!(switcher.active(), Pane::Markup);
        assert_eq!(switcher.handle_key("ArrowLeft").unwrap().active, Pane::Script);
    }

    #[test]
    fn parses_host_identifiers() {
        assert_eq!("css".parse::<Pane>().unwrap(), Pane::Style);
        assert_eq!(
            "python".parse::<Pane>().unwrap_err(),
            PaneError::UnknownPane("python".to_string())
        );
    }
}
