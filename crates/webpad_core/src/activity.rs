//! On-screen activity log.
//!
//! # Responsibility
//! - Render operator-facing messages as timestamped, severity-colored lines.
//! - Mirror every entry into the diagnostic `log` facade.
//!
//! # Invariants
//! - Message text is always markup-escaped before it reaches the panel.
//! - Entries are not retained beyond what the panel itself displays.

use chrono::Local;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Entry severity; selects the line color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    #[default]
    Info,
    Warn,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// CSS color expression used for the timestamp span.
    pub fn color(self) -> &'static str {
        match self {
            Self::Info => "var(--brand)",
            Self::Warn => "var(--warn)",
            Self::Error => "var(--err)",
        }
    }
}

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(UnknownSeverity(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSeverity(pub String);

impl Display for UnknownSeverity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown severity `{}`; expected info|warn|error", self.0)
    }
}

impl Error for UnknownSeverity {}

/// Escapes `&`, `<`, `>` and `"` for insertion into markup.
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Renders one panel line.
pub fn render_line(time_label: &str, message: &str, severity: Severity) -> String {
    format!(
        "<span style=\"color:{}\">[{}]</span> {}",
        severity.color(),
        time_label,
        escape_markup(message)
    )
}

/// Source of wall-clock labels for log lines.
pub trait Clock {
    fn time_label(&self) -> String;
}

/// Local time of day, `HH:MM:SS`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn time_label(&self) -> String {
        Local::now().format("%H:%M:%S").to_string()
    }
}

/// Display region the log renders into.
pub trait LogPanel {
    fn append_line(&mut self, markup: String);
    fn clear(&mut self);
    fn scroll_to_bottom(&mut self);
}

/// In-memory panel: rendered lines plus the scroll position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlLogPanel {
    lines: Vec<String>,
    scroll_top: usize,
}

impl HtmlLogPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Index of the first visible line after the last scroll.
    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    pub fn to_html(&self) -> String {
        self.lines
            .iter()
            .map(|line| format!("<div>{line}</div>"))
            .collect()
    }
}

impl LogPanel for HtmlLogPanel {
    fn append_line(&mut self, markup: String) {
        self.lines.push(markup);
    }

    fn clear(&mut self) {
        self.lines.clear();
        self.scroll_top = 0;
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll_top = self.lines.len().saturating_sub(1);
    }
}

/// Diagnostic line for one activity entry; the entry text stays in the panel.
fn diagnostic_event(message: &str, severity: Severity) -> String {
    format!(
        "event=activity module=activity severity={} message_chars={}",
        severity.as_str(),
        message.chars().count()
    )
}

/// Activity log writing into a panel.
pub struct ActivityLog<P: LogPanel = HtmlLogPanel, C: Clock = LocalClock> {
    panel: P,
    clock: C,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(HtmlLogPanel::new(), LocalClock)
    }
}

impl<P: LogPanel, C: Clock> ActivityLog<P, C> {
    pub fn new(panel: P, clock: C) -> Self {
        Self { panel, clock }
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    /// Appends one entry and scrolls it into view.
    pub fn log(&mut self, message: &str, severity: Severity) {
        let event = diagnostic_event(message, severity);
        match severity {
            Severity::Info => info!("{event}"),
            Severity::Warn => warn!("{event}"),
            Severity::Error => error!("{event}"),
        }

        let line = render_line(&self.clock.time_label(), message, severity);
        self.panel.append_line(line);
        self.panel.scroll_to_bottom();
    }

    pub fn info(&mut self, message: &str) {
        self.log(message, Severity::Info);
    }

    pub fn warn(&mut self, message: &str) {
        self.log(message, Severity::Warn);
    }

    pub fn error(&mut self, message: &str) {
        self.log(message, Severity::Error);
    }

    /// Empties the panel, leaving only the "cleared" notice.
    pub fn clear(&mut self) {
        self.panel.clear();
        self.log("Log cleared", Severity::Warn);
    }
}

#[cfg(test)]
mod tests {
    use super::{diagnostic_event, escape_markup, ActivityLog, Clock, HtmlLogPanel, Severity};

    struct FixedClock;

    impl Clock for FixedClock {
        fn time_label(&self) -> String {
            "12:00:00".to_string()
        }
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_markup(r#"<a href="x">&</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;"
        );
    }

    #[test]
    fn log_renders_colored_timestamp_and_scrolls() {
        let mut log = ActivityLog::new(HtmlLogPanel::new(), FixedClock);
        log.info("first");
        log.log("<b>bad</b>", Severity::Error);

        let lines = log.panel().lines();
        assert_eq!(
            lines[0],
            "<span style=\"color:var(--brand)\">[12:00:00]</span> first"
        );
        assert_eq!(
            lines[1],
            "<span style=\"color:var(--err)\">[12:00:00]</span> &lt;b&gt;bad&lt;/b&gt;"
        );
        assert_eq!(log.panel().scroll_top(), 1);
    }

    #[test]
    fn clear_leaves_only_warn_notice() {
        let mut log = ActivityLog::new(HtmlLogPanel::new(), FixedClock);
        log.info("a");
        log.warn("b");
        log.clear();

        assert_eq!(log.panel().lines().len(), 1);
        assert!(log.panel().lines()[0].contains("var(--warn)"));
        assert!(log.panel().lines()[0].ends_with("Log cleared"));
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("WARNING".parse::<Severity>().unwrap(), Severity::Warn);
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn diagnostic_event_omits_entry_text() {
        let event = diagnostic_event("Saved draft for alice@example.com", Severity::Warn);
        assert_eq!(event, "event=activity module=activity severity=warn message_chars=33");
        assert!(!event.contains("alice"));
    }
}
