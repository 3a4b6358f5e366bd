//! Logging infrastructure - structured tracing for registry activity
//!
//! Design: Uses `tracing` for structured, contextual logging with:
//! - Configurable log levels via environment
//! - Zero-cost when disabled
//! - Optional JSON and file output

use once_cell::sync::OnceCell;
use std::ffi::OsStr;
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

pub use tracing::{debug, error, info, trace, warn, Level};

static LOGGER_INITIALIZED: OnceCell<()> = OnceCell::new();

/// Keeps the non-blocking file writer flushing for the life of the process
static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default log level
    pub level: Level,
    /// Log file path (file output disabled when `None`)
    pub log_path: Option<String>,
    /// Enable JSON format (vs human-readable)
    pub json_format: bool,
    /// Show span events (enter/exit)
    pub show_spans: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            log_path: None,
            json_format: false,
            show_spans: false,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // GC_POINTER_LOG_LEVEL: trace, debug, info, warn, error
        if let Ok(level_str) = std::env::var("GC_POINTER_LOG_LEVEL") {
            config.level = parse_level(&level_str);
        }

        // GC_POINTER_LOG_FILE: path to log file
        if let Ok(path) = std::env::var("GC_POINTER_LOG_FILE") {
            config.log_path = Some(path);
        }

        config.json_format = std::env::var("GC_POINTER_LOG_JSON").is_ok();
        config.show_spans = std::env::var("GC_POINTER_LOG_SPANS").is_ok();

        config
    }

    /// Create quiet config (errors only)
    pub fn quiet() -> Self {
        Self {
            level: Level::ERROR,
            ..Self::default()
        }
    }

    /// Create verbose config (every retain/release is traced)
    pub fn verbose() -> Self {
        Self {
            level: Level::TRACE,
            show_spans: true,
            ..Self::default()
        }
    }
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Initialize logging with configuration from the environment
pub fn init() {
    init_with_config(LogConfig::from_env());
}

/// Initialize logging with custom configuration (first call wins)
pub fn init_with_config(config: LogConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("gc_pointer={}", config.level.as_str().to_lowercase()))
        });

        let span_events = if config.show_spans {
            FmtSpan::ENTER | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        let console = (!config.json_format).then(|| {
            fmt::layer()
                .with_writer(io::stderr)
                .with_span_events(span_events.clone())
                .with_target(true)
                .with_thread_ids(cfg!(debug_assertions))
        });

        let json = config.json_format.then(|| {
            fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_span_events(span_events.clone())
        });

        let file = config.log_path.as_deref().map(|path| {
            let path = Path::new(path);
            let directory = path.parent().unwrap_or_else(|| Path::new("."));
            let file_name = path.file_name().unwrap_or_else(|| OsStr::new("gc_pointer.log"));
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));
            let _ = FILE_GUARD.set(guard);
            fmt::layer().with_writer(writer).with_ansi(false)
        });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console)
            .with(json)
            .with(file)
            .try_init()
            .ok(); // Another subscriber may already be installed
    });
}

/// Check if logging is initialized
pub fn is_initialized() -> bool {
    LOGGER_INITIALIZED.get().is_some()
}

// ============================================================================
// Registry event helpers
// ============================================================================

/// Log memory allocation
#[inline]
pub fn log_allocation(size: usize, ptr: *const u8) {
    trace!(
        event = "allocation",
        size_bytes = size,
        address = ?ptr,
        "Memory allocated"
    );
}

/// Log memory deallocation
#[inline]
pub fn log_deallocation(ptr: *const u8) {
    trace!(event = "deallocation", address = ?ptr, "Memory deallocated");
}

/// Log first reference to an address
#[inline]
pub fn log_record_created(address: *const u8, element_count: usize) {
    trace!(
        event = "record_created",
        address = ?address,
        element_count,
        "Allocation record created"
    );
}

/// Log a reference count change
#[inline]
pub fn log_count_changed(address: *const u8, count: u32) {
    trace!(event = "count_changed", address = ?address, count, "Reference count changed");
}

/// Log release of a managed allocation
#[inline]
pub fn log_release(address: *const u8, is_array: bool) {
    trace!(
        event = "release",
        address = ?address,
        is_array,
        "Allocation released"
    );
}

/// Log a handle dropped after its record disappeared
pub fn log_missing_record(address: *const u8, strict: bool) {
    if strict {
        error!(
            event = "missing_record",
            address = ?address,
            "Handle dropped with no allocation record"
        );
    } else {
        debug!(
            event = "missing_record",
            address = ?address,
            "Handle dropped with no allocation record"
        );
    }
}

/// Log completion of a sweep that released something
pub fn log_collect_complete(duration_us: u64, freed: usize, remaining: usize) {
    debug!(
        event = "collect_complete",
        records_freed = freed,
        records_remaining = remaining,
        duration_us,
        "Sweep complete"
    );
}

/// Log forced drain of a registry
pub fn log_shutdown(registry: &str, tracked: usize) {
    info!(
        event = "registry_shutdown",
        registry,
        tracked,
        "Draining registry"
    );
}

/// Performance tracking utilities
pub mod perf {
    use std::time::Instant;
    use tracing::trace;

    /// Track operation duration (returns guard that logs on drop)
    #[must_use]
    pub fn track(operation: &'static str) -> PerformanceGuard {
        PerformanceGuard {
            operation,
            start: Instant::now(),
        }
    }

    pub struct PerformanceGuard {
        operation: &'static str,
        start: Instant,
    }

    impl PerformanceGuard {
        /// Elapsed time so far in microseconds
        pub fn elapsed_us(&self) -> u64 {
            self.start.elapsed().as_micros() as u64
        }
    }

    impl Drop for PerformanceGuard {
        fn drop(&mut self) {
            trace!(
                operation = self.operation,
                duration_us = self.elapsed_us(),
                "operation completed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = LogConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert!(config.log_path.is_none());

        assert_eq!(LogConfig::quiet().level, Level::ERROR);

        let verbose = LogConfig::verbose();
        assert_eq!(verbose.level, Level::TRACE);
        assert!(verbose.show_spans);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("TRACE"), Level::TRACE);
        assert_eq!(parse_level("warn"), Level::WARN);
        assert_eq!(parse_level("nonsense"), Level::INFO);
    }

    #[test]
    fn test_init_idempotent() {
        init_with_config(LogConfig::quiet());
        init(); // Should not panic
        assert!(is_initialized());
    }

    #[test]
    fn test_perf_guard_measures() {
        let guard = perf::track("unit");
        assert!(guard.elapsed_us() < 60_000_000);
    }
}
