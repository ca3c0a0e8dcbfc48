//! Stderr logger backing the `log` facade for the command-line tool.

use std::io::Write;

use log::{LevelFilter, Metadata, Record};

pub struct StderrLogger {
    level: LevelFilter,
}

static LOGGER: std::sync::OnceLock<StderrLogger> = std::sync::OnceLock::new();

/// Map a `-v` count to a level filter
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the stderr logger. Later calls keep the first logger.
pub fn init(verbosity: u8) {
    let level = level_for(verbosity);
    let logger = LOGGER.get_or_init(|| StderrLogger { level });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(logger.level);
    }
}

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        // Nowhere left to report a failed write to stderr
        let _ = write_log_entry_to(&mut stderr, record, self.level);
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn write_log_entry_to(writer: &mut impl Write, record: &Record, level: LevelFilter) -> std::io::Result<()> {
    if level >= LevelFilter::Trace {
        writeln!(
            writer,
            "[{} {}:{} {}] {}",
            record.level(),
            record.file().unwrap_or("unknown"),
            record.line().unwrap_or(0),
            record.target(),
            record.args()
        )
    } else {
        writeln!(writer, "[{:5}] {}", record.level(), record.args())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for(0), LevelFilter::Warn);
        assert_eq!(level_for(1), LevelFilter::Info);
        assert_eq!(level_for(2), LevelFilter::Debug);
        assert_eq!(level_for(9), LevelFilter::Trace);
    }

    #[test]
    fn test_enabled_respects_level() {
        let logger = StderrLogger { level: LevelFilter::Info };
        let info = Metadata::builder().level(Level::Info).build();
        let debug = Metadata::builder().level(Level::Debug).build();

        assert!(log::Log::enabled(&logger, &info));
        assert!(!log::Log::enabled(&logger, &debug));
    }

    #[test]
    fn test_entry_format() {
        let mut out = Vec::new();
        write_log_entry_to(
            &mut out,
            &Record::builder()
                .args(format_args!("memory compacted"))
                .level(Level::Info)
                .target("memsim")
                .build(),
            LevelFilter::Info,
        )
        .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[INFO ] memory compacted\n");
    }
}
