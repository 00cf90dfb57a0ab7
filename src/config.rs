use std::{
    env,
    net::{IpAddr, SocketAddr},
};

use anyhow::Context;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;
const DEFAULT_MAX_CONCURRENCY: usize = 100;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Apply pending migrations on startup.
    pub auto_migrate: bool,
    pub body_limit_bytes: usize,
    pub max_concurrency: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_var("APP_PORT", DEFAULT_PORT)?;
        let auto_migrate = env::var("APP_AUTO_MIGRATE")
            .ok()
            .map_or(true, |v| parse_flag(&v));
        let body_limit_bytes = parse_var("APP_BODY_LIMIT", DEFAULT_BODY_LIMIT)?;
        let max_concurrency = parse_var("APP_MAX_CONCURRENCY", DEFAULT_MAX_CONCURRENCY)?;
        Ok(Self {
            database_url,
            host,
            port,
            auto_migrate,
            body_limit_bytes,
            max_concurrency,
        })
    }

    /// Settings for tests and tools that never read the environment.
    pub fn with_database_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            auto_migrate: true,
            body_limit_bytes: DEFAULT_BODY_LIMIT,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .with_context(|| format!("APP_HOST {:?} is not an IP address", self.host))?;
        Ok(SocketAddr::from((ip, self.port)))
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> anyhow::Result<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{name} has an invalid value {raw:?}")),
        Err(_) => Ok(default),
    }
}

/// Anything but `0`, `false` or `no` turns the flag on.
fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags() {
        assert!(parse_flag("1"));
        assert!(parse_flag(" TRUE "));
        assert!(!parse_flag("False"));
        assert!(!parse_flag("no"));
        assert!(!parse_flag("0"));
    }

    #[test]
    fn socket_addr_needs_an_ip() {
        let mut config = AppConfig::with_database_url("sqlite::memory:");
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:3000");
        config.host = "localhost".into();
        assert!(config.socket_addr().is_err());
    }
}
