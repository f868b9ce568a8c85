//! Logging setup shared by the SyncMonitor services
//!
//! Console plus daily rolling files, a separate access log for the HTTP
//! surface (target `api_access`), and a reloadable filter so the level can be
//! changed at runtime through the admin endpoint.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use errors::{SyncMonError, SyncMonResult};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter,
    fmt::{
        self,
        format::{FmtSpan, Writer},
        FmtContext, FormatEvent, FormatFields,
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    reload,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::service_config::ENV_LOG_DIR;

/// Target used by [`http_request_logger`]; routed to its own file
pub const API_ACCESS_TARGET: &str = "api_access";

fn format_level(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "[TRACE]",
        Level::DEBUG => "[DEBUG]",
        Level::INFO => "[INFO]",
        Level::WARN => "[WARN]",
        Level::ERROR => "[ERROR]",
    }
}

/// `timestamp [LEVEL] message`, e.g. `2024-05-01T12:00:00.000000Z [INFO] Ingested 5 records`
struct BracketedLevelFormat;

impl<S, N> FormatEvent<S, N> for BracketedLevelFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = chrono::Utc::now();
        write!(writer, "{} ", now.format("%Y-%m-%dT%H:%M:%S%.6fZ"))?;

        let level = *event.metadata().level();
        if writer.has_ansi_escapes() {
            let color = match level {
                Level::TRACE => "\x1b[35m",
                Level::DEBUG => "\x1b[34m",
                Level::INFO => "\x1b[32m",
                Level::WARN => "\x1b[33m",
                Level::ERROR => "\x1b[31m",
            };
            write!(writer, "{}{}\x1b[0m ", color, format_level(&level))?;
        } else {
            write!(writer, "{} ", format_level(&level))?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

// Worker guards must outlive the subscriber or buffered lines are lost
static GUARDS: OnceLock<Mutex<Vec<WorkerGuard>>> = OnceLock::new();

// ============================================================================
// Log root directory
// ============================================================================

static LOG_ROOT: OnceLock<PathBuf> = OnceLock::new();

/// Initialize the log root once.
///
/// Priority: `SYNCMON_LOG_DIR` env > `config_dir` > `"logs"`.
pub fn init_log_root(config_dir: Option<&str>) {
    LOG_ROOT.get_or_init(|| {
        std::env::var(ENV_LOG_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                config_dir
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("logs"))
            })
    });
}

/// Configured log root; under `cargo test` falls back to the temp dir
pub fn get_log_root() -> PathBuf {
    LOG_ROOT.get().cloned().unwrap_or_else(|| {
        std::env::var(ENV_LOG_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                if is_test_environment() {
                    std::env::temp_dir().join("syncmon-test-logs")
                } else {
                    PathBuf::from("logs")
                }
            })
    })
}

fn is_test_environment() -> bool {
    if std::env::var("CARGO_TARGET_TMPDIR").is_ok() {
        return true;
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.to_str().map(|s| s.contains("target/debug/deps")))
        .unwrap_or(false)
}

// ============================================================================
// Daily rolling writer
// ============================================================================

/// Appends to `{YYYYMMDD}_{service}{suffix}.log`, switching files at midnight
/// (local time) or when the current file disappears.
struct DailyRollingWriter {
    service_name: String,
    suffix: &'static str,
    log_dir: PathBuf,
    state: Arc<Mutex<(String, File)>>,
}

impl DailyRollingWriter {
    fn new(service_name: String, suffix: &'static str, log_dir: PathBuf) -> std::io::Result<Self> {
        fs::create_dir_all(&log_dir)?;
        let date = today();
        let file = open_append(&log_file_name(&log_dir, &date, &service_name, suffix))?;
        Ok(Self {
            service_name,
            suffix,
            log_dir,
            state: Arc::new(Mutex::new((date, file))),
        })
    }

    fn with_file<R>(&self, f: impl FnOnce(&mut File) -> std::io::Result<R>) -> std::io::Result<R> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| std::io::Error::other(format!("Mutex poisoned: {}", e)))?;

        let date = today();
        let path = log_file_name(&self.log_dir, &state.0, &self.service_name, self.suffix);
        if state.0 != date || !path.exists() {
            fs::create_dir_all(&self.log_dir)?;
            let file = open_append(&log_file_name(
                &self.log_dir,
                &date,
                &self.service_name,
                self.suffix,
            ))?;
            *state = (date, file);
        }
        f(&mut state.1)
    }
}

impl Write for DailyRollingWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.with_file(|file| file.write(buf))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.with_file(|file| file.flush())
    }
}

fn today() -> String {
    chrono::Local::now().format("%Y%m%d").to_string()
}

fn log_file_name(dir: &Path, date: &str, service: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{}_{}{}.log", date, service, suffix))
}

fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

// ============================================================================
// Initialization and runtime level control
// ============================================================================

type EnvFilterReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;
static LOG_FILTER_HANDLE: OnceLock<EnvFilterReloadHandle> = OnceLock::new();
static CURRENT_LOG_LEVEL: OnceLock<Mutex<String>> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub service_name: String,
    pub log_dir: PathBuf,
    pub console_level: Level,
    pub file_level: Level,
    pub enable_json: bool,
    /// Daily files kept per log stream; older ones are pruned
    pub max_log_files: usize,
    pub enable_api_log: bool,
    pub api_log_level: Level,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".to_string(),
            log_dir: get_log_root(),
            console_level: Level::INFO,
            file_level: Level::DEBUG,
            enable_json: false,
            max_log_files: 30,
            enable_api_log: true,
            api_log_level: Level::INFO,
        }
    }
}

/// Filter directive used when `RUST_LOG` is not set
fn default_directive(config: &LogConfig) -> String {
    let api_level = if config.enable_api_log {
        config.api_log_level.as_str().to_lowercase()
    } else {
        "off".to_string()
    };
    format!(
        "{},{}={},{}={}",
        config.console_level.as_str().to_lowercase(),
        config.service_name,
        config.file_level.as_str().to_lowercase(),
        API_ACCESS_TARGET,
        api_level
    )
}

pub fn init_with_config(config: LogConfig) -> SyncMonResult<()> {
    fs::create_dir_all(&config.log_dir)?;

    let directive = match std::env::var("RUST_LOG") {
        Ok(env_str) if env_str.contains(API_ACCESS_TARGET) => env_str,
        Ok(env_str) => format!("{},{}=info", env_str, API_ACCESS_TARGET),
        Err(_) => default_directive(&config),
    };
    let env_filter = EnvFilter::try_new(&directive)
        .map_err(|e| SyncMonError::logging(format!("Invalid log filter '{}': {}", directive, e)))?;
    let (reload_filter, reload_handle) = reload::Layer::new(env_filter);
    let _ = LOG_FILTER_HANDLE.set(reload_handle);
    let _ = CURRENT_LOG_LEVEL.set(Mutex::new(directive));

    let guards = GUARDS.get_or_init(|| Mutex::new(Vec::new()));

    let writer = DailyRollingWriter::new(config.service_name.clone(), "", config.log_dir.clone())?;
    let (non_blocking, guard) = tracing_appender::non_blocking(writer);
    match guards.lock() {
        Ok(mut g) => g.push(guard),
        Err(poisoned) => poisoned.into_inner().push(guard),
    }

    let console_layer = fmt::layer()
        .with_ansi(true)
        .event_format(BracketedLevelFormat)
        .with_filter(filter::filter_fn(|m| m.target() != API_ACCESS_TARGET))
        .boxed();

    let file_layer = if config.enable_json {
        fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(filter::filter_fn(|m| m.target() != API_ACCESS_TARGET))
            .boxed()
    } else {
        fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .event_format(BracketedLevelFormat)
            .with_filter(filter::filter_fn(|m| m.target() != API_ACCESS_TARGET))
            .boxed()
    };

    let api_layer = if config.enable_api_log {
        let writer =
            DailyRollingWriter::new(config.service_name.clone(), "_api", config.log_dir.clone())?;
        let (non_blocking, guard) = tracing_appender::non_blocking(writer);
        match guards.lock() {
            Ok(mut g) => g.push(guard),
            Err(poisoned) => poisoned.into_inner().push(guard),
        }
        Some(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .event_format(BracketedLevelFormat)
                .with_filter(filter::filter_fn(|m| m.target() == API_ACCESS_TARGET))
                .boxed(),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(reload_filter)
        .with(console_layer)
        .with(file_layer)
        .with(api_layer)
        .try_init()
        .map_err(|e| SyncMonError::logging(e.to_string()))?;

    tracing::info!("Logging: {} @ {:?}", config.service_name, config.log_dir);
    start_log_retention_task(config.log_dir, config.service_name, config.max_log_files);
    Ok(())
}

/// Replace the active filter, e.g. `"debug"` or `"info,syncsrv=trace"`
pub fn set_log_level(level: &str) -> SyncMonResult<()> {
    let new_filter = EnvFilter::try_new(level)
        .map_err(|e| SyncMonError::logging(format!("Invalid log level '{}': {}", level, e)))?;

    let handle = LOG_FILTER_HANDLE
        .get()
        .ok_or_else(|| SyncMonError::logging("Logging not initialized with reload support"))?;
    handle
        .reload(new_filter)
        .map_err(|e| SyncMonError::logging(format!("Failed to reload log filter: {}", e)))?;

    if let Some(current) = CURRENT_LOG_LEVEL.get() {
        if let Ok(mut guard) = current.lock() {
            *guard = level.to_string();
        }
    }

    tracing::info!("Log level changed to: {}", level);
    Ok(())
}

pub fn get_log_level() -> String {
    CURRENT_LOG_LEVEL
        .get()
        .and_then(|m| m.lock().ok())
        .map(|guard| guard.clone())
        .unwrap_or_else(|| "unknown".to_string())
}

// ============================================================================
// Retention
// ============================================================================

/// Prune old daily files once a minute after startup, then every 24 hours
pub fn start_log_retention_task(log_dir: PathBuf, service_name: String, keep: usize) {
    use tokio::time::{interval, sleep, Duration};

    if tokio::runtime::Handle::try_current().is_err() {
        return;
    }
    tokio::spawn(async move {
        sleep(Duration::from_secs(60)).await;
        let mut ticker = interval(Duration::from_secs(86_400));
        loop {
            ticker.tick().await;
            for suffix in ["", "_api"] {
                match prune_old_logs(&log_dir, &service_name, suffix, keep) {
                    Ok(0) => {}
                    Ok(n) => tracing::debug!("Pruned {} log files", n),
                    Err(e) => tracing::error!("Log retention error for {}: {}", service_name, e),
                }
            }
        }
    });
}

/// Delete all but the newest `keep` files of one stream; returns how many were removed.
///
/// File names start with `YYYYMMDD` so lexical order is chronological.
pub fn prune_old_logs(
    log_dir: &Path,
    service_name: &str,
    suffix: &str,
    keep: usize,
) -> std::io::Result<usize> {
    let tail = format!("_{}{}.log", service_name, suffix);
    let mut files: Vec<PathBuf> = fs::read_dir(log_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.len() == 8 + tail.len() && n.ends_with(&tail))
        })
        .collect();
    files.sort();

    let excess = files.len().saturating_sub(keep);
    for path in &files[..excess] {
        fs::remove_file(path)?;
    }
    Ok(excess)
}

// ============================================================================
// HTTP access logging
// ============================================================================

/// Replace values of sensitive keys (api keys, tokens) in a JSON body
#[allow(clippy::disallowed_methods)] // json! macro internally uses unwrap (compile-time safe, never panics)
fn redact_sensitive_fields(json_str: &str) -> String {
    use serde_json::{json, Value};

    const SENSITIVE_KEYS: &[&str] = &["password", "token", "api_key", "secret", "authorization"];

    let Ok(mut value) = serde_json::from_str::<Value>(json_str) else {
        return json_str.to_string();
    };

    fn redact_recursive(value: &mut Value) {
        match value {
            Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    let key_lower = key.to_lowercase();
                    if SENSITIVE_KEYS.iter().any(|&k| key_lower.contains(k)) {
                        *val = json!("***REDACTED***");
                    } else {
                        redact_recursive(val);
                    }
                }
            },
            Value::Array(arr) => arr.iter_mut().for_each(redact_recursive),
            _ => {}
        }
    }

    redact_recursive(&mut value);
    serde_json::to_string(&value).unwrap_or_else(|_| json_str.to_string())
}

fn truncate_body(body: &str, max_length: usize) -> String {
    if body.len() <= max_length {
        return body.to_string();
    }
    let mut cut = max_length;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}[truncated {} bytes]", &body[..cut], body.len() - cut)
}

/// Axum middleware writing one `api_access` line per request.
///
/// Mutating requests are logged at INFO. Reads are logged at DEBUG only, and at
/// DEBUG the JSON body of mutating requests is included (redacted, truncated to
/// 500 bytes). Add it before `.with_state()`.
#[cfg(feature = "axum")]
pub async fn http_request_logger(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    use axum::body::Body;
    use std::time::Instant;
    use tracing::{debug, info, level_enabled};

    const MAX_BODY_LENGTH: usize = 500;

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let mutating = matches!(method.as_str(), "POST" | "PUT" | "PATCH" | "DELETE");
    let is_json = req
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));
    let start = Instant::now();

    let (req, body_str) = if mutating && is_json && level_enabled!(Level::DEBUG) {
        let (parts, body) = req.into_parts();
        let bytes = match axum::body::to_bytes(body, usize::MAX).await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!("Failed to read request body: {}", e);
                let req = axum::extract::Request::from_parts(parts, Body::empty());
                return next.run(req).await;
            },
        };
        let body_str = match std::str::from_utf8(&bytes) {
            Ok(s) => truncate_body(&redact_sensitive_fields(s), MAX_BODY_LENGTH),
            Err(_) => "<binary data>".to_string(),
        };
        (
            axum::extract::Request::from_parts(parts, Body::from(bytes)),
            Some(body_str),
        )
    } else {
        (req, None)
    };

    let response = next.run(req).await;
    let status = response.status().as_u16();
    let duration_ms = start.elapsed().as_millis();

    match (mutating, body_str) {
        (_, Some(body)) => debug!(
            target: "api_access",
            method = %method,
            path = %path,
            status,
            duration_ms = %duration_ms,
            request_body = %body,
            "HTTP request (detailed)"
        ),
        (true, None) => info!(
            target: "api_access",
            method = %method,
            path = %path,
            status,
            duration_ms = %duration_ms,
            "HTTP request"
        ),
        (false, None) => debug!(
            target: "api_access",
            method = %method,
            path = %path,
            status,
            duration_ms = %duration_ms,
            "HTTP request"
        ),
    }

    response
}
