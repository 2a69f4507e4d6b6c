//! Database configuration module

use serde::{Deserialize, Serialize};

use super::env_or;
use crate::types::DatabaseInfo;

/// User database configuration.
///
/// When `url` is absent the service falls back to the in-memory user store.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[serde(default)]
    pub url: Option<String>,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            max_connections: env_or("DATABASE_MAX_CONNECTIONS", default_max_connections()),
        }
    }

    /// Create a configuration pointing at a database
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            max_connections: default_max_connections(),
        }
    }

    /// Driver, host, port and database name of the configured URL.
    ///
    /// Credentials and query options are never included.
    pub fn info(&self) -> DatabaseInfo {
        self.url
            .as_deref()
            .and_then(parse_database_url)
            .unwrap_or_default()
    }
}

fn parse_database_url(url: &str) -> Option<DatabaseInfo> {
    let (scheme, rest) = url.split_once("://")?;
    let rest = rest.split(|c: char| c == '?' || c == '#').next().unwrap_or_default();
    let (authority, path) = match rest.split_once('/') {
        Some((authority, path)) => (authority, Some(path)),
        None => (rest, None),
    };
    let host_port = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host_port)| host_port);

    let (host, port) = match host_port.strip_prefix('[') {
        Some(bracketed) => {
            let (host, tail) = bracketed.split_once(']')?;
            (host, tail.strip_prefix(':'))
        }
        None => match host_port.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (host_port, None),
        },
    };

    let port = match port {
        Some(port) => Some(port.parse().ok()?),
        None if scheme == "mysql" => Some(3306),
        None => None,
    };

    Some(DatabaseInfo {
        driver: scheme.to_string(),
        database: path.filter(|name| !name.is_empty()).map(String::from),
        host: Some(host).filter(|host| !host.is_empty()).map(String::from),
        port,
    })
}

fn default_max_connections() -> u32 {
    10
}
