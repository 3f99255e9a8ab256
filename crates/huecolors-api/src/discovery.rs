// Bridge discovery
//
// Bridges report their LAN address to the vendor's discovery service; a
// GET from inside the same network returns the bridges behind the caller's
// public IP.

use tracing::debug;
use url::Url;

use crate::client::preview;
use crate::error::Error;
use crate::models::DiscoveredBridge;
use crate::transport::TransportConfig;

/// Public discovery endpoint.
pub const DEFAULT_DISCOVERY_URL: &str = "https://discovery.meethue.com/";

/// Client for the online discovery service.
#[derive(Debug, Clone)]
pub struct DiscoveryClient {
    http: reqwest::Client,
    url: Url,
}

impl DiscoveryClient {
    pub fn new(url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            url,
        })
    }

    /// Create a discovery client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, url: Url) -> Self {
        Self { http, url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetch the bridges registered from this network.
    pub async fn discover(&self) -> Result<Vec<DiscoveredBridge>, Error> {
        debug!("GET {}", self.url);

        let resp = self.http.get(self.url.clone()).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(Error::Bridge {
                message: format!("discovery failed: {}", preview(&body)),
                status: status.as_u16(),
            });
        }

        let bridges: Vec<DiscoveredBridge> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&body)),
                body: body.clone(),
            })?;

        debug!(count = bridges.len(), "discovery complete");
        Ok(bridges)
    }
}
