use std::time::Duration;

use serde::{Deserialize, Serialize};

/// API ingress configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiIngressConfig {
    pub bind_addr: String,
    /// Per-request handler timeout in seconds; 0 selects the 30s default.
    #[serde(default)]
    pub timeout_sec: u64,
    #[serde(default)]
    pub cors_enabled: bool,
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8087".to_string(),
            timeout_sec: 0,
            cors_enabled: false,
            body_limit_bytes: default_body_limit_bytes(),
        }
    }
}

impl ApiIngressConfig {
    pub fn request_timeout(&self) -> Duration {
        match self.timeout_sec {
            0 => Duration::from_secs(30),
            s => Duration::from_secs(s),
        }
    }
}

fn default_body_limit_bytes() -> usize {
    16 * 1024 * 1024
}
