use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::error::AppError;

pub const DEFAULT_BARK_SERVER: &str = "https://api.day.app";
pub const DEFAULT_PORT: u16 = 8765;

#[derive(Clone, Debug)]
pub struct CanvasConfig {
    pub base_url: String,
    pub token: String,
}

impl CanvasConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let base_url = non_empty(lookup("CANVAS_URL"))
            .ok_or_else(|| AppError::Config("CANVAS_URL is not set".to_string()))?;
        let token = non_empty(lookup("CANVAS_TOKEN"))
            .ok_or_else(|| AppError::Config("CANVAS_TOKEN is not set".to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }
}

/// Push relay settings. Absent when no device key is configured.
#[derive(Clone, Debug)]
pub struct BarkConfig {
    pub key: String,
    pub server: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub data_file: PathBuf,
    pub listen_addr: SocketAddr,
    pub sync_interval_secs: u64,
    pub notify_completed: bool,
    pub canvas: Option<CanvasConfig>,
    pub bark: Option<BarkConfig>,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let data_file = non_empty(lookup("DATA_FILE"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("assignments.json"));

        let host = match non_empty(lookup("HOST")) {
            Some(raw) => raw
                .parse::<IpAddr>()
                .map_err(|e| AppError::Config(format!("HOST {:?} is invalid: {}", raw, e)))?,
            None => IpAddr::V4(Ipv4Addr::LOCALHOST),
        };
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        let sync_interval_secs = parse_or(&lookup, "SYNC_INTERVAL_SECS", 0)?;
        let notify_completed = match non_empty(lookup("NOTIFY_COMPLETED")) {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                AppError::Config(format!("NOTIFY_COMPLETED {:?} is not a boolean", raw))
            })?,
            None => true,
        };

        let canvas = CanvasConfig::from_lookup(&lookup).ok();

        let bark = non_empty(lookup("BARK_KEY")).map(|key| BarkConfig {
            key,
            server: non_empty(lookup("BARK_SERVER"))
                .unwrap_or_else(|| DEFAULT_BARK_SERVER.to_string())
                .trim_end_matches('/')
                .to_string(),
        });

        Ok(Self {
            data_file,
            listen_addr: SocketAddr::new(host, port),
            sync_interval_secs,
            notify_completed,
            canvas,
            bark,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(lookup(key)) {
        Some(raw) => raw
            .parse()
            .map_err(|e| AppError::Config(format!("{} {:?} is invalid: {}", key, raw, e))),
        None => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[])).expect("config");
        assert_eq!(config.data_file, PathBuf::from("assignments.json"));
        assert_eq!(config.listen_addr.port(), DEFAULT_PORT);
        assert!(config.listen_addr.ip().is_loopback());
        assert_eq!(config.sync_interval_secs, 0);
        assert!(config.notify_completed);
        assert!(config.canvas.is_none());
        assert!(config.bark.is_none());
    }

    #[test]
    fn test_canvas_and_bark() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("CANVAS_URL", "https://school.instructure.com/"),
            ("CANVAS_TOKEN", "secret"),
            ("BARK_KEY", "device-key"),
            ("NOTIFY_COMPLETED", "false"),
        ]))
        .expect("config");

        let canvas = config.canvas.expect("canvas configured");
        assert_eq!(canvas.base_url, "https://school.instructure.com");
        assert_eq!(canvas.token, "secret");

        let bark = config.bark.expect("bark configured");
        assert_eq!(bark.key, "device-key");
        assert_eq!(bark.server, DEFAULT_BARK_SERVER);
        assert!(!config.notify_completed);
    }

    #[test]
    fn test_blank_bark_key_disables_push() {
        let config = AppConfig::from_lookup(lookup_from(&[("BARK_KEY", "   ")])).expect("config");
        assert!(config.bark.is_none());
    }

    #[test]
    fn test_missing_token_is_config_error() {
        let err = CanvasConfig::from_lookup(lookup_from(&[("CANVAS_URL", "https://x")]))
            .expect_err("token required");
        assert_eq!(err.kind(), "config");
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("PORT", "eighty")]))
            .expect_err("bad port");
        assert_eq!(err.kind(), "config");
    }
}
