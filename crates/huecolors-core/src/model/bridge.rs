use std::fmt;
use std::net::Ipv4Addr;

use huecolors_api::AuthToken;
use serde::Serialize;

use crate::error::CoreError;

/// Port the bridge serves its HTTPS API on.
pub const DEFAULT_BRIDGE_PORT: u16 = 443;

/// A bridge known to the cache.
///
/// Rows are created on selection with empty keys and filled in once the
/// link-button handshake succeeds. `id` is `0` until the row is inserted.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct BridgeInfo {
    pub hostname: String,
    pub bridge_id: String,
    #[serde(skip_serializing)]
    pub app_key: String,
    #[serde(skip_serializing)]
    pub client_key: String,
    pub port: u16,
    pub id: i64,
}

impl BridgeInfo {
    /// A freshly selected, not yet authorized bridge.
    pub fn selected(hostname: impl Into<String>, bridge_id: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            bridge_id: bridge_id.into(),
            app_key: String::new(),
            client_key: String::new(),
            port: DEFAULT_BRIDGE_PORT,
            id: 0,
        }
    }

    /// An application key is present. Older bridges pair without issuing
    /// a client key, so that one may stay empty.
    pub fn has_credentials(&self) -> bool {
        !self.app_key.is_empty()
    }

    /// Copy of this row carrying the keys from `token`.
    pub fn with_token(&self, token: &AuthToken) -> Self {
        use secrecy::ExposeSecret;

        Self {
            app_key: token.application_key.expose_secret().to_owned(),
            client_key: token.client_key_or_empty(),
            ..self.clone()
        }
    }

    /// Credentials for the bridge client, if the row has any.
    pub fn auth_token(&self) -> Option<AuthToken> {
        if self.app_key.is_empty() {
            return None;
        }
        let client_key = (!self.client_key.is_empty()).then(|| self.client_key.clone());
        Some(AuthToken::new(self.app_key.clone(), client_key))
    }
}

impl fmt::Debug for BridgeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeInfo")
            .field("hostname", &self.hostname)
            .field("bridge_id", &self.bridge_id)
            .field("app_key", &redacted(&self.app_key))
            .field("client_key", &redacted(&self.client_key))
            .field("port", &self.port)
            .field("id", &self.id)
            .finish()
    }
}

fn redacted(key: &str) -> &'static str {
    if key.is_empty() { "" } else { "[REDACTED]" }
}

/// Insert a colon after every pair of characters: `001788fffe` becomes
/// `00:17:88:ff:fe`.
pub fn format_identifier(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    chars
        .chunks(2)
        .map(|pair| pair.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(":")
}

/// Only ASCII digits and dots.
pub fn is_numeric(input: &str) -> bool {
    input.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// Validate a manually entered bridge address.
pub fn parse_address(input: &str) -> Result<Ipv4Addr, CoreError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !is_numeric(trimmed) {
        return Err(CoreError::ValidationFailed {
            message: format!("'{trimmed}' is not a numeric IPv4 address"),
        });
    }
    trimmed
        .parse::<Ipv4Addr>()
        .map_err(|_| CoreError::ValidationFailed {
            message: format!("'{trimmed}' is not a valid IPv4 address"),
        })
}
