//! Console logger
//!
//! Routes `log` records to the browser console on wasm32. Native builds use
//! `env_logger` writing to stderr.

use log::LevelFilter;

#[cfg(target_arch = "wasm32")]
mod console {
    use log::{Level, Log, Metadata, Record};

    pub(super) struct ConsoleLogger;

    pub(super) static LOGGER: ConsoleLogger = ConsoleLogger;

    impl Log for ConsoleLogger {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= log::max_level()
        }

        fn log(&self, record: &Record) {
            if !self.enabled(record.metadata()) {
                return;
            }
            let value = wasm_bindgen::JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
            match record.level() {
                Level::Error => web_sys::console::error_1(&value),
                Level::Warn => web_sys::console::warn_1(&value),
                Level::Info => web_sys::console::info_1(&value),
                Level::Debug | Level::Trace => web_sys::console::debug_1(&value),
            }
        }

        fn flush(&self) {}
    }
}

#[cfg(target_arch = "wasm32")]
fn install() {
    let _ = log::set_logger(&console::LOGGER);
}

// The backend passes everything through; `log::max_level` does the filtering
// so later calls can change the level.
#[cfg(not(target_arch = "wasm32"))]
fn install() {
    let _ = env_logger::Builder::new().filter_level(LevelFilter::Trace).try_init();
}

/// Install the logger. Safe to call more than once; later calls only adjust
/// the level.
pub fn init_console_logger(level: LevelFilter) {
    install();
    log::set_max_level(level);
}
