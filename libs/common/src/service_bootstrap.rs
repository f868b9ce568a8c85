//! Service startup helpers: banner, logging, development env, port resolution

use crate::logging::{self, LogConfig};
use crate::service_config::LoggingConfig;
use errors::SyncMonResult;
use tracing::{info, Level};

/// Static identity of a service
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub default_port: u16,
}

impl ServiceInfo {
    pub fn new(name: impl Into<String>, description: impl Into<String>, default_port: u16) -> Self {
        Self {
            name: name.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: description.into(),
            default_port,
        }
    }
}

pub fn print_startup_banner(service: &ServiceInfo) {
    let banner = r#"
 ███████╗██╗   ██╗███╗   ██╗ ██████╗███╗   ███╗ ██████╗ ███╗   ██╗
 ██╔════╝╚██╗ ██╔╝████╗  ██║██╔════╝████╗ ████║██╔═══██╗████╗  ██║
 ███████╗ ╚████╔╝ ██╔██╗ ██║██║     ██╔████╔██║██║   ██║██╔██╗ ██║
 ╚════██║  ╚██╔╝  ██║╚██╗██║██║     ██║╚██╔╝██║██║   ██║██║╚██╗██║
 ███████║   ██║   ██║ ╚████║╚██████╗██║ ╚═╝ ██║╚██████╔╝██║ ╚████║
 ╚══════╝   ╚═╝   ╚═╝  ╚═══╝ ╚═════╝╚═╝     ╚═╝ ╚═════╝ ╚═╝  ╚═══╝
"#;

    info!("{}", banner);
    info!(" {} v{}", service.name.to_uppercase(), service.version);
    info!(" {}", service.description);
    info!(" Default Port: {}", service.default_port);
    info!("");
}

/// Initialize logging under `<log root>/<service>`.
///
/// The console level comes from `RUST_LOG`, falling back to the configured
/// level and then INFO.
pub fn init_logging(service: &ServiceInfo, config: Option<&LoggingConfig>) -> SyncMonResult<()> {
    logging::init_log_root(config.map(|c| c.dir.as_str()));

    let console_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse::<Level>().ok())
        .or_else(|| config.and_then(|c| c.level.parse::<Level>().ok()))
        .unwrap_or(Level::INFO);

    let log_config = LogConfig {
        service_name: service.name.clone(),
        log_dir: logging::get_log_root().join(&service.name),
        console_level,
        file_level: Level::DEBUG,
        enable_json: false,
        max_log_files: config.map_or(30, |c| c.max_files),
        enable_api_log: config.map_or(true, |c| c.enable_api_log),
        api_log_level: Level::INFO,
    };

    logging::init_with_config(log_config)
}

/// Load `.env` into the process environment (debug builds only).
/// Variables already set are left alone.
pub fn load_development_env() {
    #[cfg(debug_assertions)]
    {
        if let Ok(content) = std::fs::read_to_string(".env") {
            for (key, value) in parse_env_lines(&content) {
                if std::env::var(key).is_err() {
                    std::env::set_var(key, value);
                }
            }
        }
    }
}

fn parse_env_lines(content: &str) -> impl Iterator<Item = (&str, &str)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim(), v.trim()))
}

/// Resolve the listening port.
///
/// An explicit config port wins. When the config holds 0 or the default,
/// `SERVICE_PORT` then `<NAME>_PORT` may override it.
pub fn get_service_port(config_port: u16, service: &ServiceInfo) -> u16 {
    let is_default = config_port == 0 || config_port == service.default_port;

    if is_default {
        let service_var = format!("{}_PORT", service.name.to_uppercase());
        for var in ["SERVICE_PORT", service_var.as_str()] {
            if let Some(port) = std::env::var(var).ok().and_then(|p| p.parse::<u16>().ok()) {
                return port;
            }
        }
    }

    if config_port > 0 {
        config_port
    } else {
        service.default_port
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_service_info_creation() {
        let service = ServiceInfo::new("syncsrv", "Sync monitoring service", 6005);
        assert_eq!(service.name, "syncsrv");
        assert_eq!(service.default_port, 6005);
        assert!(!service.version.is_empty());
    }

    #[test]
    fn test_explicit_port_wins() {
        let service = ServiceInfo::new("bootstraptest", "Test", 6005);
        assert_eq!(get_service_port(7007, &service), 7007);
    }

    #[test]
    fn test_zero_port_falls_back_to_default() {
        let service = ServiceInfo::new("bootstraptest_unset", "Test", 6005);
        if std::env::var("SERVICE_PORT").is_err() {
            assert_eq!(get_service_port(0, &service), 6005);
        }
    }

    #[test]
    fn test_parse_env_lines() {
        let content = "# comment\nA=1\n\n B = two \nbroken\n";
        let pairs: Vec<_> = parse_env_lines(content).collect();
        assert_eq!(pairs, vec![("A", "1"), ("B", "two")]);
    }
}
