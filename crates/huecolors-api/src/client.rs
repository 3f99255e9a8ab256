// Bridge HTTP client
//
// Wraps `reqwest::Client` with bridge-specific URL construction, the
// `hue-application-key` header, and CLIP v2 envelope unwrapping. Endpoint
// groups (pairing, lights, devices) are implemented as inherent methods in
// separate files to keep this module focused on transport mechanics.

use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::auth::{AuthToken, SecurityStrategy};
use crate::error::Error;
use crate::models::{Envelope, ResourceRef};
use crate::transport::TransportConfig;

const APPLICATION_KEY_HEADER: &str = "hue-application-key";

/// Raw HTTP client for a single bridge.
///
/// Holds the bridge address and, once paired, the [`AuthToken`]. All
/// resource methods return the unwrapped `data` payload -- the envelope is
/// stripped before the caller sees it.
#[derive(Debug, Clone)]
pub struct BridgeClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<AuthToken>,
}

impl BridgeClient {
    /// Create a client for `hostname` using the given transport settings.
    ///
    /// `hostname` is usually a bare IP (`192.168.1.20`), which is reached
    /// over HTTPS. A full URL (`http://127.0.0.1:8080`) is used verbatim.
    pub fn new(
        hostname: &str,
        token: Option<AuthToken>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let base_url = Self::base_url_for(hostname)?;
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    /// Create a local-network client with the insecure strategy pinned to
    /// `hostname`, which is how freshly selected bridges are reached.
    pub fn insecure(
        hostname: &str,
        token: Option<AuthToken>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let transport = transport.with_security(SecurityStrategy::insecure(hostname));
        Self::new(hostname, token, &transport)
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, token: Option<AuthToken>) -> Self {
        Self {
            http,
            base_url,
            token,
        }
    }

    /// Resolve the base URL for a hostname or URL string.
    pub fn base_url_for(hostname: &str) -> Result<Url, Error> {
        let raw = if hostname.contains("://") {
            hostname.to_owned()
        } else {
            format!("https://{hostname}")
        };
        Ok(Url::parse(&raw)?)
    }

    /// Return a copy of this client carrying `token`.
    pub fn with_token(&self, token: AuthToken) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    /// The bridge base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Host portion of the base URL, as stored in the cache.
    pub fn hostname(&self) -> &str {
        self.base_url.host_str().unwrap_or_default()
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    pub fn is_paired(&self) -> bool {
        self.token.is_some()
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a URL relative to the bridge root, e.g. `api`.
    pub(crate) fn root_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// Build a CLIP v2 resource URL: `{base}/clip/v2/resource/{path}`.
    pub(crate) fn resource_url(&self, path: &str) -> Result<Url, Error> {
        self.root_url(&format!("clip/v2/resource/{path}"))
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn authorized(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, Error> {
        let token = self.token.as_ref().ok_or(Error::NotPaired)?;
        Ok(builder.header(
            APPLICATION_KEY_HEADER,
            token.application_key.expose_secret(),
        ))
    }

    /// Send an authenticated GET request and unwrap the envelope.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, Error> {
        debug!("GET {}", url);

        let resp = self.authorized(self.http.get(url))?.send().await?;

        parse_envelope(resp).await
    }

    /// Send an authenticated PUT request with JSON body and unwrap the envelope.
    pub(crate) async fn put(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<Vec<ResourceRef>, Error> {
        debug!("PUT {}", url);

        let resp = self
            .authorized(self.http.put(url).json(body))?
            .send()
            .await?;

        parse_envelope(resp).await
    }
}

/// Parse the `{ errors, data }` envelope, returning `data` on success or
/// an [`Error::Bridge`] when the bridge reports errors.
async fn parse_envelope<T: DeserializeOwned>(resp: reqwest::Response) -> Result<Vec<T>, Error> {
    let status = resp.status();

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(Error::Authentication {
            message: format!("application key rejected (HTTP {status})"),
        });
    }

    let body = resp.text().await?;
    trace!(bytes = body.len(), "response body received");

    if !status.is_success() {
        let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
            .ok()
            .and_then(|e| e.errors.into_iter().next())
            .map_or_else(|| preview(&body), |e| e.description);
        return Err(Error::Bridge {
            message,
            status: status.as_u16(),
        });
    }

    let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(&body)),
        body: body.clone(),
    })?;

    if let Some(first) = envelope.errors.into_iter().next() {
        return Err(Error::Bridge {
            message: first.description,
            status: status.as_u16(),
        });
    }

    Ok(envelope.data)
}

pub(crate) fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}
