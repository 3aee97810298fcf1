//! Stderr logger configured from `SEABATTLE_LOG`.
//!
//! The variable holds comma-separated directives: a bare level sets the
//! default, `target=level` overrides it for a module path and everything
//! below it, e.g. `warn,seabattle::matcher=debug`. The longest matching
//! target wins.

use std::env;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{LevelFilter, Metadata, Record};

const ENV_VAR: &str = "SEABATTLE_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    default: LevelFilter,
    targets: Vec<(String, LevelFilter)>,
}

impl LogFilter {
    /// Parse directives. Unparseable entries are skipped; an empty spec
    /// means `info`.
    pub fn parse(spec: &str) -> Self {
        let mut filter = LogFilter {
            default: LevelFilter::Info,
            targets: Vec::new(),
        };
        for directive in spec.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            match directive.split_once('=') {
                Some((target, level)) => {
                    if let Ok(level) = level.trim().parse() {
                        filter.targets.push((target.trim().to_string(), level));
                    }
                }
                None => {
                    if let Ok(level) = directive.parse() {
                        filter.default = level;
                    }
                }
            }
        }
        // Longest target first so the most specific override matches.
        filter.targets.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        filter
    }

    /// Level in force for `target`.
    pub fn level_for(&self, target: &str) -> LevelFilter {
        self.targets
            .iter()
            .find(|(prefix, _)| {
                target == prefix
                    || target
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with("::"))
            })
            .map(|(_, level)| *level)
            .unwrap_or(self.default)
    }

    /// Most verbose level any directive allows.
    pub fn max_level(&self) -> LevelFilter {
        self.targets
            .iter()
            .map(|(_, level)| *level)
            .fold(self.default, Ord::max)
    }
}

struct Logger {
    filter: LogFilter,
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.filter.level_for(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        eprintln!(
            "{}.{:03} {:<5} [{}] {}",
            now.as_secs(),
            now.subsec_millis(),
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Install the logger using `SEABATTLE_LOG`. Later calls are no-ops.
pub fn init_logging() {
    let spec = env::var(ENV_VAR).unwrap_or_default();
    let logger = LOGGER.get_or_init(|| Logger {
        filter: LogFilter::parse(&spec),
    });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(logger.filter.max_level());
    }
}
