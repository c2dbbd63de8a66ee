//! Stderr logger for the estimator and its drivers.
//!
//! Lines look like `[  0.042s  INFO trunk_dbh] generated 12 diameter ...`.
//! A forest run emits one `debug!`/`trace!` line per hypothesis and tree, so
//! the per-tree crates get their own level, capped at `Info` by
//! [`init_with_level`]. Use [`init_with_levels`] to open them up.
//!
//! With the `tracing` feature, [`init_tracing`] sets up a `tracing-subscriber`
//! instead.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::prelude::*;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

/// Crates that log once per tree or per hypothesis.
const PER_TREE_TARGETS: [&str; 2] = ["trunk_dbh_estimator", "trunk_dbh_core"];

#[cfg(feature = "tracing")]
const DEFAULT_TRACING_FILTER: &str = "info";

struct StderrLogger {
    level: LevelFilter,
    per_tree: LevelFilter,
    started: Instant,
}

impl StderrLogger {
    fn level_for(&self, target: &str) -> LevelFilter {
        if PER_TREE_TARGETS.contains(&crate_name(target)) {
            self.per_tree
        } else {
            self.level
        }
    }
}

/// First path segment of a log target.
fn crate_name(target: &str) -> &str {
    target.split("::").next().unwrap_or(target)
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level_for(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{:7.3}s {:>5} {}] {}",
            self.started.elapsed().as_secs_f64(),
            record.level(),
            crate_name(record.target()),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Install the stderr logger at `level`, with per-tree output capped at
/// `Info`.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    init_with_levels(level, level.min(LevelFilter::Info))
}

/// Install the stderr logger with a separate level for the per-tree crates.
///
/// Only the first call installs anything; later calls return `Ok(())`.
pub fn init_with_levels(
    level: LevelFilter,
    per_tree: LevelFilter,
) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = LOGGER.get_or_init(|| StderrLogger {
        level,
        per_tree,
        started: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(level.max(per_tree));
    Ok(())
}

/// Install a `tracing` subscriber filtered by `RUST_LOG`, falling back to
/// `info` for every crate.
///
/// `json` switches to flattened JSON events, one per line. Span close events
/// carry the time spent per tree.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_TRACING_FILTER));

    let json_layer = json.then(|| {
        fmt::layer()
            .json()
            .flatten_event(true)
            .with_span_events(FmtSpan::CLOSE)
    });
    let text_layer = (!json).then(|| {
        fmt::layer()
            .with_timer(fmt::time::Uptime::default())
            .with_span_events(FmtSpan::CLOSE)
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init();
}
