//! Process configuration for the dashboard server

use serde::{Deserialize, Serialize};
use std::net::{AddrParseError, SocketAddr};

/// Fixed local port the launcher binds by default
pub const DEFAULT_PORT: u16 = 8501;

/// Server configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Application name
    pub app_name: String,
    /// Environment (dev, prod, etc.)
    pub environment: String,
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            app_name: "trading-desk".to_string(),
            environment: "development".to_string(),
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Read `DESK_HOST`, `DESK_PORT` and `DESK_ENV`, keeping defaults for anything unset or invalid
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("DESK_HOST").unwrap_or(defaults.host),
            port: lookup("DESK_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            environment: lookup("DESK_ENV").unwrap_or(defaults.environment),
            app_name: defaults.app_name,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// URL printed by the launcher
    pub fn url(&self) -> String {
        let host = if self.host == "0.0.0.0" { "localhost" } else { &self.host };
        format!("http://{}:{}", host, self.port)
    }
}
