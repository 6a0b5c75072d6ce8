use log::LevelFilter;

/// Environment variable that switches the binaries to debug logging.
pub const DEBUG_ENV_VAR: &str = "CRYPTARITHM_DEBUG";

/// Initialize logging for the cryptarithm binaries.
///
/// # Behavior
/// - Logs at `Debug` if `debug_enabled`, otherwise at `Info`.
/// - `RUST_LOG`, when set, overrides these defaults.
/// - Safe to call more than once; later calls are ignored.
pub fn init_logger(debug_enabled: bool) {
    use std::env;
    let level = if debug_enabled {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter(None, level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);

    // Let RUST_LOG override our defaults if explicitly set
    if let Ok(spec) = env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    if builder.try_init().is_ok() {
        log::debug!("logger initialized at {level:?} level");
    }
}

/// True when [`DEBUG_ENV_VAR`] is set.
#[must_use]
pub fn debug_requested() -> bool {
    std::env::var_os(DEBUG_ENV_VAR).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logger_twice_is_harmless() {
        init_logger(false);
        init_logger(true);
        log::info!("still logging");
    }
}
