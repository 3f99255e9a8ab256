use secrecy::{ExposeSecret, SecretString};

/// Identifies this application to the bridge during pairing.
///
/// The bridge records it as the `devicetype` `"{app_name}#{instance_name}"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppId {
    pub app_name: String,
    pub instance_name: String,
}

impl AppId {
    pub fn new(app_name: impl Into<String>, instance_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            instance_name: instance_name.into(),
        }
    }

    /// The `devicetype` value sent to the pairing endpoint.
    pub fn device_type(&self) -> String {
        format!("{}#{}", self.app_name, self.instance_name)
    }
}

/// Long-lived credentials handed out by the bridge after the link button
/// has been pressed.
///
/// `application_key` authenticates CLIP v2 requests via the
/// `hue-application-key` header. `client_key` is only used for the
/// entertainment streaming API and may be absent on old firmware.
#[derive(Debug, Clone)]
pub struct AuthToken {
    pub application_key: SecretString,
    pub client_key: Option<SecretString>,
}

impl AuthToken {
    pub fn new(application_key: impl Into<String>, client_key: Option<String>) -> Self {
        Self {
            application_key: SecretString::from(application_key.into()),
            client_key: client_key.map(SecretString::from),
        }
    }

    /// The client key as plain text, or empty if the bridge did not issue one.
    pub fn client_key_or_empty(&self) -> String {
        self.client_key
            .as_ref()
            .map(|k| k.expose_secret().to_owned())
            .unwrap_or_default()
    }
}

/// How to validate the bridge's TLS certificate.
///
/// Bridges present a certificate signed by the vendor's private CA and
/// issued for the bridge id, not the IP address, so local connections
/// normally use [`Insecure`](Self::Insecure) pinned to the bridge host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityStrategy {
    /// Accept the bridge's certificate without verification.
    Insecure { hostname: String },
    /// Verify against the system trust store.
    Secure,
}

impl SecurityStrategy {
    pub fn insecure(hostname: impl Into<String>) -> Self {
        Self::Insecure {
            hostname: hostname.into(),
        }
    }

    pub fn accepts_invalid_certs(&self) -> bool {
        matches!(self, Self::Insecure { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_type_joins_with_hash() {
        let id = AppId::new("HueColors", "cli");
        assert_eq!(id.device_type(), "HueColors#cli");
    }

    #[test]
    fn missing_client_key_is_empty() {
        let token = AuthToken::new("abc", None);
        assert_eq!(token.client_key_or_empty(), "");
        assert_eq!(token.application_key.expose_secret(), "abc");
    }
}
