use crate::source::DEFAULT_FETCH_TIMEOUT;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data: DataConfig,
    pub output: OutputConfig,
    pub telemetry: TelemetryConfig,
}

/// Where project records are read from.
#[derive(Debug, Clone)]
pub struct DataConfig {
    pub path: Option<PathBuf>,
    pub remote_url: Option<String>,
    pub fetch_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub preview_rows: usize,
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IEOP_FETCH_TIMEOUT_SECS must be a whole number of seconds, got '{0}'")]
    InvalidTimeout(String),
    #[error("IEOP_PREVIEW_ROWS must be a non-negative integer, got '{0}'")]
    InvalidPreviewRows(String),
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let fetch_timeout = match non_empty_var("IEOP_FETCH_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidTimeout(raw))?,
            None => DEFAULT_FETCH_TIMEOUT,
        };
        let preview_rows = match non_empty_var("IEOP_PREVIEW_ROWS") {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidPreviewRows(raw))?,
            None => 5,
        };

        Ok(Self {
            data: DataConfig {
                path: non_empty_var("IEOP_DATA_PATH").map(PathBuf::from),
                remote_url: non_empty_var("IEOP_REMOTE_URL"),
                fetch_timeout,
            },
            output: OutputConfig {
                dir: non_empty_var("IEOP_OUTPUT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(".")),
                preview_rows,
            },
            telemetry: TelemetryConfig {
                log_level: non_empty_var("IEOP_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "IEOP_DATA_PATH",
            "IEOP_REMOTE_URL",
            "IEOP_FETCH_TIMEOUT_SECS",
            "IEOP_OUTPUT_DIR",
            "IEOP_PREVIEW_ROWS",
            "IEOP_LOG_LEVEL",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.data.path, None);
        assert_eq!(config.data.remote_url, None);
        assert_eq!(config.data.fetch_timeout, Duration::from_secs(8));
        assert_eq!(config.output.dir, PathBuf::from("."));
        assert_eq!(config.output.preview_rows, 5);
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn reads_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("IEOP_DATA_PATH", "data/obras.csv");
        env::set_var("IEOP_FETCH_TIMEOUT_SECS", "3");
        env::set_var("IEOP_PREVIEW_ROWS", "12");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.data.path, Some(PathBuf::from("data/obras.csv")));
        assert_eq!(config.data.fetch_timeout, Duration::from_secs(3));
        assert_eq!(config.output.preview_rows, 12);
        reset_env();
    }

    #[test]
    fn rejects_bad_timeout() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("IEOP_FETCH_TIMEOUT_SECS", "soon");
        let err = AppConfig::load().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout(ref v) if v == "soon"));
        reset_env();
    }
}
