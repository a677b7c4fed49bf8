use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracker_client::ClientConfig;

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_SESSION_FILE: &str = ".tracker_session.json";

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub request_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub session_file: PathBuf,
    pub log_level: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let api_url = std::env::var("TRACKER_API_URL")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let request_timeout_ms = parse_u64_env("TRACKER_API_TIMEOUT_MS", 10_000)?;
        let connect_timeout_ms = parse_u64_env("TRACKER_CONNECT_TIMEOUT_MS", 5_000)?;
        let session_file = std::env::var("TRACKER_SESSION_FILE")
            .unwrap_or_else(|_| DEFAULT_SESSION_FILE.to_string());
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "warn".to_string());

        Ok(Self {
            api_url,
            request_timeout_ms,
            connect_timeout_ms,
            session_file: PathBuf::from(session_file),
            log_level,
        })
    }

    /// Конфигурация клиента; `server` из `--server` важнее переменной окружения.
    pub fn client_config(&self, server: Option<String>) -> ClientConfig {
        let base_url = normalize_server(server.unwrap_or_else(|| self.api_url.clone()));
        ClientConfig {
            base_url,
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }
}

pub fn normalize_server(server: String) -> String {
    let server = server.trim_end_matches('/').to_string();
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn parse_u64_env(key: &str, default: u64) -> Result<u64> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<u64>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}
