//! Server configuration
//!
//! Layered in the usual order: built-in defaults, then an optional
//! `ctxforge.toml` next to the working directory, then `CTXFORGE_*`
//! environment variables.

use crate::error::CtxforgeError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

/// Configuration for the ctxforge server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server name reported during MCP initialization
    pub name: String,

    /// Server version reported during MCP initialization
    pub version: String,

    /// Default tracing filter when RUST_LOG is unset
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "ctxforge".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from defaults, `ctxforge.toml`, and environment.
    pub fn load() -> crate::error::Result<Self> {
        Self::figment()
            .extract()
            .map_err(|e| CtxforgeError::Configuration(e.to_string()))
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(ServerConfig::default()))
            .merge(Toml::file("ctxforge.toml"))
            .merge(Env::prefixed("CTXFORGE_"))
    }
}
