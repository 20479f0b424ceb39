//! Diagnostic-aware logging setup for the host application.
//!
//! When diagnostics are disabled only WARN and ERROR records are emitted,
//! which still surfaces skipped emote ranges and unreadable settings.

use lazy_static::lazy_static;
use log::LevelFilter;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::models::settings::Settings;

lazy_static! {
    static ref DIAGNOSTICS_ENABLED: AtomicBool = AtomicBool::new(true);
}

/// Install the global logger. Call once at startup; later calls are
/// ignored because a logger is already set.
pub fn init_logging(settings: &Settings) {
    let result = env_logger::Builder::new()
        .filter_level(LevelFilter::Debug) // Allow all levels, max level gates output
        .format_timestamp_millis()
        .format_module_path(true)
        .try_init();

    if result.is_err() {
        log::debug!("[DiagnosticLogger] Logger already initialized");
    }

    set_diagnostics_enabled(settings.diagnostics_enabled);
}

/// Toggle debug/info output at runtime.
pub fn set_diagnostics_enabled(enabled: bool) {
    DIAGNOSTICS_ENABLED.store(enabled, Ordering::SeqCst);

    let level = if enabled {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    log::set_max_level(level);
}

pub fn is_diagnostics_enabled() -> bool {
    DIAGNOSTICS_ENABLED.load(Ordering::SeqCst)
}
