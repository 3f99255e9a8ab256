// Shared transport configuration for building reqwest::Client instances.
//
// Discovery and bridge clients share timeout and TLS settings through
// this module, avoiding duplicated builder logic.

use std::time::Duration;

use crate::auth::SecurityStrategy;
use crate::error::Error;

const USER_AGENT: &str = concat!("huecolors/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub security: SecurityStrategy,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            security: SecurityStrategy::Secure,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    pub fn new(security: SecurityStrategy, timeout: Duration) -> Self {
        Self { security, timeout }
    }

    /// Same timeout, different certificate policy.
    pub fn with_security(&self, security: SecurityStrategy) -> Self {
        Self {
            security,
            timeout: self.timeout,
        }
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT);

        if self.security.accepts_invalid_certs() {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}
