//! `log` backend writing to the browser console.
//!
//! # Invariants
//! - Installed at most once per page; repeating init with the same level is a no-op.
//! - Also installs the console panic hook so panics surface in devtools.

use log::{info, Level, Log, Metadata, Record};
use std::sync::Mutex;
use webpad_core::{level_filter, normalize_level, LoggingError};

static CONSOLE_LOGGER: ConsoleLogger = ConsoleLogger;
static ACTIVE_LEVEL: Mutex<Option<&'static str>> = Mutex::new(None);

struct ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            write_console(record.level(), &format_record(record));
        }
    }

    fn flush(&self) {}
}

fn format_record(record: &Record) -> String {
    format!("{} [{}] {}", record.level(), record.target(), record.args())
}

#[cfg(target_arch = "wasm32")]
fn write_console(level: Level, line: &str) {
    let line = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::Error => web_sys::console::error_1(&line),
        Level::Warn => web_sys::console::warn_1(&line),
        Level::Info => web_sys::console::info_1(&line),
        Level::Debug | Level::Trace => web_sys::console::debug_1(&line),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_console(_level: Level, line: &str) {
    eprintln!("{line}");
}

/// Routes `log` records to the console at `level`.
pub fn init_console_logging(level: &str) -> Result<(), LoggingError> {
    let requested = normalize_level(level)?;
    let filter = level_filter(requested)?;
    let mut active = ACTIVE_LEVEL
        .lock()
        .map_err(|_| LoggingError::Backend("console logger state poisoned".to_string()))?;

    if let Some(active) = *active {
        if active != requested {
            return Err(LoggingError::Conflict {
                active: active.to_string(),
                requested: requested.to_string(),
            });
        }
        return Ok(());
    }

    log::set_logger(&CONSOLE_LOGGER).map_err(|err| LoggingError::Backend(err.to_string()))?;
    log::set_max_level(filter);
    console_error_panic_hook::set_once();
    *active = Some(requested);
    info!("event=logging_init module=wasm status=ok level={requested} target=console");
    Ok(())
}

/// Level the console logger runs at, if installed.
pub fn console_logging_level() -> Option<&'static str> {
    ACTIVE_LEVEL.lock().ok().and_then(|active| *active)
}
