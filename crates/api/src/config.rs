use std::path::PathBuf;
use std::time::Duration;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Simulated render duration in milliseconds (default: `30000`).
    pub render_delay_ms: u64,
    /// Path to the pre-rendered chart served as every job's result.
    pub chart_fixture_path: PathBuf,
    /// Dispatcher poll interval in milliseconds (default: `250`).
    pub dispatch_interval_ms: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default              |
    /// |------------------------|----------------------|
    /// | `HOST`                 | `0.0.0.0`            |
    /// | `PORT`                 | `3000`               |
    /// | `CORS_ORIGINS`         | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                 |
    /// | `RENDER_DELAY_MS`      | `30000`              |
    /// | `CHART_FIXTURE_PATH`   | `assets/chart.jpeg`  |
    /// | `DISPATCH_INTERVAL_MS` | `250`                |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let render_delay_ms: u64 = std::env::var("RENDER_DELAY_MS")
            .unwrap_or_else(|_| "30000".into())
            .parse()
            .expect("RENDER_DELAY_MS must be a valid u64");

        let chart_fixture_path = PathBuf::from(
            std::env::var("CHART_FIXTURE_PATH").unwrap_or_else(|_| "assets/chart.jpeg".into()),
        );

        let dispatch_interval_ms: u64 = std::env::var("DISPATCH_INTERVAL_MS")
            .unwrap_or_else(|_| "250".into())
            .parse()
            .expect("DISPATCH_INTERVAL_MS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            render_delay_ms,
            chart_fixture_path,
            dispatch_interval_ms,
        }
    }

    pub fn render_delay(&self) -> Duration {
        Duration::from_millis(self.render_delay_ms)
    }

    pub fn dispatch_interval(&self) -> Duration {
        Duration::from_millis(self.dispatch_interval_ms)
    }
}
