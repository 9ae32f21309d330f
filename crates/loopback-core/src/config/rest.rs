//! REST endpoint configuration.

use serde::{Deserialize, Serialize};

/// Settings for the HTTP transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestConfig {
    /// Root URL of the LoopBack REST API, including the mount path.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Total request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Value of the `User-Agent` header.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Access token sent in the `Authorization` header, if any.
    #[serde(default)]
    pub access_token: Option<String>,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            user_agent: default_user_agent(),
            access_token: None,
        }
    }
}

impl RestConfig {
    /// Configuration pointing at the given base URL with default timeouts.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("loopback-sdk/{}", env!("CARGO_PKG_VERSION"))
}
