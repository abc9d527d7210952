use crate::error::AppError;
use crate::websocket::DEFAULT_BUFFER_CAPACITY;
use actix_middleware::IdentityPolicy;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_ROOT_TOPIC: &str = "Big long discussion";

#[derive(Debug, Clone)]
pub struct WsConfig {
    /// Outbound events buffered per viewer before it is dropped
    pub buffer_capacity: usize,
    pub heartbeat_interval: Duration,
    pub client_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub root_topic: String,
    pub ws: WsConfig,
    pub privileged_group: String,
    /// Handles treated as eboard regardless of group membership
    pub privileged_handles: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "PORT", 8080u16)?;
        let root_topic = lookup("ROOT_TOPIC")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ROOT_TOPIC.to_string());

        let buffer_capacity = parse_or(&lookup, "WS_BUFFER_CAPACITY", DEFAULT_BUFFER_CAPACITY)?;
        if buffer_capacity == 0 {
            return Err(AppError::Config("WS_BUFFER_CAPACITY must be positive".into()));
        }

        let heartbeat_secs = parse_or(&lookup, "WS_HEARTBEAT_INTERVAL_SECS", 5u64)?;
        let timeout_secs = parse_or(&lookup, "WS_CLIENT_TIMEOUT_SECS", 30u64)?;
        if heartbeat_secs == 0 || timeout_secs <= heartbeat_secs {
            return Err(AppError::Config(
                "WS_CLIENT_TIMEOUT_SECS must exceed a non-zero WS_HEARTBEAT_INTERVAL_SECS".into(),
            ));
        }

        let privileged_group = lookup("PRIVILEGED_GROUP")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "eboard".to_string());
        let privileged_handles = lookup("PRIVILEGED_HANDLES")
            .map(|value| parse_list(&value))
            .unwrap_or_default();

        Ok(Self {
            host,
            port,
            root_topic,
            ws: WsConfig {
                buffer_capacity,
                heartbeat_interval: Duration::from_secs(heartbeat_secs),
                client_timeout: Duration::from_secs(timeout_secs),
            },
            privileged_group,
            privileged_handles,
        })
    }

    pub fn identity_policy(&self) -> IdentityPolicy {
        IdentityPolicy::new(
            self.privileged_group.clone(),
            self.privileged_handles.iter().cloned(),
        )
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{key} has invalid value {raw:?}"))),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
