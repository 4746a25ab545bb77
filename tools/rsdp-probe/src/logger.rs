use std::io::Write;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Environment variable holding the maximum log level (`trace` … `off`).
pub const LEVEL_VAR: &str = "RSDP_PROBE_LOG";

pub struct StderrLogger {
    max_level: LevelFilter,
}

impl StderrLogger {
    #[must_use]
    pub const fn new(max_level: LevelFilter) -> Self {
        Self { max_level }
    }

    /// Level from [`LEVEL_VAR`], see [`level_from`](Self::level_from).
    #[must_use]
    pub fn from_env() -> Self {
        let value = std::env::var(LEVEL_VAR).ok();
        Self::new(Self::level_from(value.as_deref()))
    }

    /// Parse a level name, case-insensitively; `Warn` if absent or unknown.
    #[must_use]
    pub fn level_from(value: Option<&str>) -> LevelFilter {
        value
            .and_then(|level| level.trim().parse().ok())
            .unwrap_or(LevelFilter::Warn)
    }

    #[must_use]
    pub const fn max_level(&self) -> LevelFilter {
        self.max_level
    }

    /// Call this once at startup.
    #[allow(clippy::missing_errors_doc)]
    pub fn init(self) -> Result<(), SetLoggerError> {
        let max_level = self.max_level();
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(max_level);
        Ok(())
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        // Format: "[LEVEL] target: message"
        let _ = writeln!(
            std::io::stderr().lock(),
            "[{}] {}: {}",
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn level_names_are_parsed() {
        assert_eq!(StderrLogger::level_from(Some("trace")), LevelFilter::Trace);
        assert_eq!(StderrLogger::level_from(Some("DEBUG")), LevelFilter::Debug);
        assert_eq!(StderrLogger::level_from(Some(" info ")), LevelFilter::Info);
        assert_eq!(StderrLogger::level_from(Some("off")), LevelFilter::Off);
    }

    #[test]
    fn unset_or_unknown_level_falls_back_to_warn() {
        assert_eq!(StderrLogger::level_from(None), LevelFilter::Warn);
        assert_eq!(StderrLogger::level_from(Some("bogus")), LevelFilter::Warn);
        assert_eq!(StderrLogger::level_from(Some("")), LevelFilter::Warn);
    }

    #[test]
    fn records_above_the_max_level_are_disabled() {
        let logger = StderrLogger::new(LevelFilter::Info);
        assert_eq!(logger.max_level(), LevelFilter::Info);

        let at = |level| Metadata::builder().level(level).target("boot_rsdp").build();
        assert!(logger.enabled(&at(Level::Warn)));
        assert!(logger.enabled(&at(Level::Info)));
        assert!(!logger.enabled(&at(Level::Debug)));
        assert!(!StderrLogger::new(LevelFilter::Off).enabled(&at(Level::Error)));
    }

    #[test]
    fn second_init_is_rejected() {
        // Whichever call wins the global slot, the next one must fail.
        let _ = StderrLogger::new(LevelFilter::Off).init();
        assert!(StderrLogger::new(LevelFilter::Off).init().is_err());
    }
}
