//! `log` backend that writes to the browser devtools console.

use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::JsValue;
use web_sys::console;

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!("[{}] {}", record.level(), record.args()));
        match record.level() {
            Level::Error => console::error_1(&line),
            Level::Warn => console::warn_1(&line),
            _ => console::log_1(&line),
        }
    }

    fn flush(&self) {}
}

/// Install the console logger. Later calls only adjust the level.
pub fn init(level: LevelFilter) {
    // set_logger fails once a logger is installed; the level still applies.
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}
