//! Tracing setup: a human-readable console layer plus an optional JSON file
//! layer. Both are filtered per subsystem (tracing target prefix) using the
//! sections of [`LoggingConfig`]; the "default" section covers everything else.

use std::collections::HashMap;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};
use parking_lot::Mutex;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer};

use crate::config::{LogSection, LoggingConfig};

const DEFAULT_SECTION: &str = "default";
const DEFAULT_MAX_SIZE_MB: u64 = 100;

/// Parse a level name; "off"/"none" disable output, unknown names fall back to INFO.
pub fn parse_level(s: &str) -> LevelFilter {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" | "none" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

/// Returns true if target == prefix or target starts with "prefix::"
fn matches_prefix(target: &str, prefix: &str) -> bool {
    target == prefix
        || (target.starts_with(prefix) && target[prefix.len()..].starts_with("::"))
}

fn has_file(section: &LogSection) -> bool {
    !section.file.trim().is_empty()
}

// -------- rotating writer for files --------

#[derive(Clone)]
struct RotWriter(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl Write for RotWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.lock().flush()
    }
}

/// Writer handle that drops everything when no file is routed.
struct RoutedWriter(Option<RotWriter>);

impl Write for RoutedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.0 {
            Some(w) => w.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.0 {
            Some(w) => w.flush(),
            None => Ok(()),
        }
    }
}

/// Routes records to per-subsystem files by target prefix, falling back to
/// the default file.
#[derive(Default)]
struct FileRouter {
    default: Option<RotWriter>,
    by_prefix: HashMap<String, RotWriter>,
}

impl FileRouter {
    fn resolve_for(&self, target: &str) -> Option<RotWriter> {
        self.by_prefix
            .iter()
            .filter(|(prefix, _)| matches_prefix(target, prefix))
            // longest prefix wins
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, w)| w.clone())
            .or_else(|| self.default.clone())
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_prefix.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = RoutedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RoutedWriter(self.default.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        RoutedWriter(self.resolve_for(meta.target()))
    }
}

/// Resolve a log file path against `base_dir` (home_dir).
/// Absolute paths are kept as-is.
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

/// Retention: `max_backups` when set, otherwise `max_age_days`, otherwise a week.
fn file_limit(section: &LogSection) -> FileLimit {
    match (section.max_backups, section.max_age_days) {
        (Some(n), _) => FileLimit::MaxFiles(n.max(1)),
        (None, Some(days)) => FileLimit::Age(chrono::Duration::days(i64::from(days))),
        (None, None) => FileLimit::Age(chrono::Duration::days(7)),
    }
}

/// Open a rotating writer, creating the parent directory first.
fn open_rotating_writer(log_path: &Path, section: &LogSection) -> std::io::Result<RotWriter> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
    let rot = FileRotate::new(
        log_path,
        AppendTimestamp::default(file_limit(section)),
        ContentLimit::BytesSurpassed(usize::try_from(max_bytes).unwrap_or(usize::MAX)),
        Compression::None,
        #[cfg(unix)]
        None,
    );

    Ok(RotWriter(Arc::new(Mutex::new(rot))))
}

fn writer_for(name: &str, section: &LogSection, base_dir: &Path) -> Option<RotWriter> {
    if !has_file(section) {
        return None;
    }
    let log_path = resolve_log_path(&section.file, base_dir);
    match open_rotating_writer(&log_path, section) {
        Ok(w) => Some(w),
        Err(e) => {
            // the subscriber is not installed yet
            eprintln!(
                "Failed to open log file for '{}': {} ({})",
                name,
                log_path.display(),
                e
            );
            None
        }
    }
}

fn build_file_router(cfg: &LoggingConfig, base_dir: &Path) -> FileRouter {
    let mut router = FileRouter::default();
    for (name, section) in cfg {
        let Some(writer) = writer_for(name, section, base_dir) else {
            continue;
        };
        if name == DEFAULT_SECTION {
            router.default = Some(writer);
        } else {
            router.by_prefix.insert(name.clone(), writer);
        }
    }
    router
}

fn console_targets(cfg: &LoggingConfig) -> Targets {
    let default = cfg
        .get(DEFAULT_SECTION)
        .map_or(LevelFilter::INFO, |s| parse_level(&s.console_level));

    cfg.iter()
        .filter(|(name, _)| name.as_str() != DEFAULT_SECTION)
        .fold(Targets::new().with_default(default), |t, (name, s)| {
            t.with_target(name.clone(), parse_level(&s.console_level))
        })
}

/// Subsystems without a file of their own inherit the default file level.
fn file_targets(cfg: &LoggingConfig, router: &FileRouter) -> Targets {
    let default = match (cfg.get(DEFAULT_SECTION), &router.default) {
        (Some(s), Some(_)) => parse_level(&s.file_level),
        _ => LevelFilter::OFF,
    };

    cfg.iter()
        .filter(|(name, _)| router.by_prefix.contains_key(name.as_str()))
        .fold(Targets::new().with_default(default), |t, (name, s)| {
            t.with_target(name.clone(), parse_level(&s.file_level))
        })
}

/// Initialize logging from a configuration.
/// - `cfg`: subsystem sections
/// - `base_dir`: resolves relative log file paths (usually server.home_dir)
///
/// Calling it again once a subscriber is installed is a no-op.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    // Bridge `log` → `tracing` *before* installing the subscriber
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        let _ = tracing_subscriber::fmt()
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .try_init();
        return;
    }

    let console_layer = fmt::layer()
        .with_ansi(std::io::stdout().is_terminal())
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(console_targets(cfg));

    let router = build_file_router(cfg, base_dir);
    let file_layer = if router.is_empty() {
        None
    } else {
        let targets = file_targets(cfg, &router);
        Some(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(true)
                .with_level(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_writer(router)
                .with_filter(targets),
        )
    };

    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_logging_config;
    use tempfile::tempdir;

    fn section(console: &str, file: &str, file_level: &str) -> LogSection {
        LogSection {
            console_level: console.into(),
            file: file.into(),
            file_level: file_level.into(),
            max_age_days: None,
            max_backups: None,
            max_size_mb: Some(1),
        }
    }

    #[test]
    fn test_logging_level_parsing() {
        assert_eq!(parse_level("trace"), LevelFilter::TRACE);
        assert_eq!(parse_level("DEBUG"), LevelFilter::DEBUG);
        assert_eq!(parse_level("Info"), LevelFilter::INFO);
        assert_eq!(parse_level("warn"), LevelFilter::WARN);
        assert_eq!(parse_level("ERROR"), LevelFilter::ERROR);
        assert_eq!(parse_level("off"), LevelFilter::OFF);
        assert_eq!(parse_level("none"), LevelFilter::OFF);
        assert_eq!(parse_level("invalid"), LevelFilter::INFO);
    }

    #[test]
    fn test_prefix_matching_respects_module_boundaries() {
        assert!(matches_prefix("users", "users"));
        assert!(matches_prefix("users::api::rest", "users"));
        assert!(!matches_prefix("users_server", "users"));
        assert!(!matches_prefix("api_ingress", "users"));
    }

    #[test]
    fn test_file_paths_resolved_against_home_dir() {
        let tmp = tempdir().unwrap();
        let base_dir = tmp.path();

        let resolved = resolve_log_path("logs/test.log", base_dir);
        assert!(resolved.starts_with(base_dir));
        assert!(resolved.ends_with("logs/test.log"));

        let abs = base_dir.join("elsewhere.log");
        assert_eq!(resolve_log_path(abs.to_str().unwrap(), Path::new("/ignored")), abs);
    }

    #[test]
    fn test_retention_prefers_max_backups() {
        let mut s = section("info", "x.log", "debug");
        assert!(matches!(file_limit(&s), FileLimit::Age(d) if d == chrono::Duration::days(7)));

        s.max_age_days = Some(2);
        assert!(matches!(file_limit(&s), FileLimit::Age(d) if d == chrono::Duration::days(2)));

        s.max_backups = Some(3);
        assert!(matches!(file_limit(&s), FileLimit::MaxFiles(3)));
    }

    #[test]
    fn test_open_rotating_writer_creates_parent() {
        let tmp = tempdir().unwrap();
        let p = tmp.path().join("nested/dir/app.log");

        let mut w = open_rotating_writer(&p, &section("info", "x", "debug")).unwrap();
        w.write_all(b"{\"msg\":\"hello\"}\n").unwrap();
        w.flush().unwrap();

        assert!(p.parent().unwrap().is_dir());
        let written = std::fs::read_to_string(&p).unwrap();
        assert!(written.contains("hello"));
    }

    #[test]
    fn test_router_picks_subsystem_file_then_default() {
        let tmp = tempdir().unwrap();
        let mut cfg = default_logging_config();
        cfg.insert("users".into(), section("debug", "logs/users.log", "trace"));
        cfg.insert("api_ingress".into(), section("warn", "", "debug"));

        let router = build_file_router(&cfg, tmp.path());
        assert!(router.default.is_some());
        assert_eq!(router.by_prefix.len(), 1);
        assert!(router.by_prefix.contains_key("users"));

        let users = router.resolve_for("users::domain::service").unwrap();
        let dflt = router.resolve_for("api_ingress::request_id").unwrap();
        assert!(Arc::ptr_eq(&users.0, &router.by_prefix["users"].0));
        assert!(Arc::ptr_eq(&dflt.0, &router.default.as_ref().unwrap().0));
    }

    #[test]
    fn test_empty_file_names_disable_file_output() {
        let tmp = tempdir().unwrap();
        let mut cfg = LoggingConfig::new();
        cfg.insert(DEFAULT_SECTION.into(), section("info", "  ", "debug"));

        let router = build_file_router(&cfg, tmp.path());
        assert!(router.is_empty());
        assert!(router.resolve_for("anything").is_none());
    }

    #[test]
    fn test_targets_follow_sections() {
        let tmp = tempdir().unwrap();
        let mut cfg = default_logging_config();
        cfg.insert("users".into(), section("off", "logs/users.log", "trace"));

        let console = console_targets(&cfg);
        assert!(!console.would_enable("users::domain", &tracing::Level::ERROR));
        assert!(console.would_enable("api_ingress", &tracing::Level::INFO));
        assert!(!console.would_enable("api_ingress", &tracing::Level::DEBUG));

        let router = build_file_router(&cfg, tmp.path());
        let files = file_targets(&cfg, &router);
        assert!(files.would_enable("users", &tracing::Level::TRACE));
        assert!(files.would_enable("api_ingress", &tracing::Level::DEBUG));
        assert!(!files.would_enable("api_ingress", &tracing::Level::TRACE));
    }
}
