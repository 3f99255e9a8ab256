// ── Bridge session ──
//
// `HueSession` owns the bridge client, the cache, and the photo library,
// and publishes the progress of every operation through `ResourceCell`s.
// Failures are logged, surfaced as a notice on the broadcast channel,
// recorded in the relevant cell, and returned to the caller.
//
// Light and palette operations live in `lights.rs`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use huecolors_api::{
    BridgeClient, Device, DiscoveredBridge, DiscoveryClient, SecurityStrategy, TransportConfig,
};
use image::DynamicImage;
use serde::Serialize;
use tokio::sync::{Mutex, broadcast};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use url::Url;

use crate::config::HueConfig;
use crate::error::CoreError;
use crate::library::{PhotoLibrary, open_image};
use crate::model::{BridgeInfo, LightInfo, parse_address};
use crate::palette::{Swatch, extract_palette};
use crate::resource::{Resource, ResourceCell};
use crate::store::Cache;

const NOTICE_CHANNEL_SIZE: usize = 64;

/// Which bridge the session talks to, as published in the `shade` cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub hostname: Option<String>,
    pub authorized: bool,
}

/// The bridge currently pointed at.
#[derive(Debug, Clone)]
pub(crate) struct Link {
    pub hostname: String,
    pub client: BridgeClient,
}

/// Cheaply cloneable handle to a bridge session.
#[derive(Clone)]
pub struct HueSession {
    pub(crate) inner: Arc<SessionInner>,
}

pub(crate) struct SessionInner {
    pub config: HueConfig,
    pub cache: Cache,
    pub library: PhotoLibrary,
    pub transport: TransportConfig,
    pub link: Mutex<Option<Link>>,
    pub notices: broadcast::Sender<String>,
    pub shade: ResourceCell<SessionState>,
    pub authorized: ResourceCell<bool>,
    pub bridges: ResourceCell<Vec<DiscoveredBridge>>,
    pub devices: ResourceCell<Vec<Device>>,
    pub lights: ResourceCell<Vec<LightInfo>>,
    pub images: ResourceCell<Vec<PathBuf>>,
}

impl HueSession {
    pub fn new(config: HueConfig, cache: Cache) -> Self {
        let (notices, _) = broadcast::channel(NOTICE_CHANNEL_SIZE);
        let transport = TransportConfig::new(SecurityStrategy::Secure, config.timeout);
        let library = PhotoLibrary::new(config.photos_dir.clone());

        Self {
            inner: Arc::new(SessionInner {
                config,
                cache,
                library,
                transport,
                link: Mutex::new(None),
                notices,
                shade: ResourceCell::new(),
                authorized: ResourceCell::new(),
                bridges: ResourceCell::new(),
                devices: ResourceCell::new(),
                lights: ResourceCell::new(),
                images: ResourceCell::new(),
            }),
        }
    }

    pub fn config(&self) -> &HueConfig {
        &self.inner.config
    }

    pub fn cache(&self) -> &Cache {
        &self.inner.cache
    }

    pub fn library(&self) -> &PhotoLibrary {
        &self.inner.library
    }

    // ── Initialization ───────────────────────────────────────────

    /// Point the session at the cached bridge.
    ///
    /// The most recently selected bridge wins, paired or not, so a later
    /// `authorize_bridge` pairs the bridge the user picked last. Without a
    /// recorded selection a credentialed bridge is used, then the most
    /// recently added one. Calling `init` again after it succeeded does
    /// nothing.
    pub async fn init(&self) -> Result<SessionState, CoreError> {
        match self.inner.shade.get() {
            Resource::Success(state) => {
                info!("session already initialized");
                return Ok(state);
            }
            Resource::Error { .. } => self.inner.shade.refetch(),
            Resource::Loading | Resource::Empty => {
                self.inner.shade.start();
            }
        }

        match self.connect_cached().await {
            Ok(state) => {
                self.inner.shade.succeed(state.clone());
                Ok(state)
            }
            Err(e) => {
                self.inner.shade.fail(e.to_string());
                Err(self.report("initialize session", e))
            }
        }
    }

    async fn connect_cached(&self) -> Result<SessionState, CoreError> {
        let credentialed = self.check_authorized()?;
        let cache = &self.inner.cache;
        let chosen = match (cache.selected_bridge()?, credentialed) {
            (Some(bridge), _) | (None, Some(bridge)) => Some(bridge),
            (None, None) => cache.bridges()?.pop(),
        };

        let Some(bridge) = chosen else {
            info!("session initialized without a bridge");
            return Ok(SessionState {
                hostname: None,
                authorized: false,
            });
        };

        let authorized = bridge.has_credentials();
        let client = self.build_client(&bridge)?;
        *self.inner.link.lock().await = Some(Link {
            hostname: bridge.hostname.clone(),
            client,
        });
        info!(hostname = %bridge.hostname, authorized, "session initialized");
        Ok(SessionState {
            hostname: Some(bridge.hostname),
            authorized,
        })
    }

    fn build_client(&self, bridge: &BridgeInfo) -> Result<BridgeClient, CoreError> {
        let token = bridge.auth_token();
        let client = if self.inner.config.insecure {
            BridgeClient::insecure(&bridge.hostname, token, &self.inner.transport)?
        } else {
            BridgeClient::new(&bridge.hostname, token, &self.inner.transport)?
        };
        Ok(client)
    }

    // ── Authorization ────────────────────────────────────────────

    /// Whether the cache holds a bridge with an application key.
    pub fn is_authorized(&self) -> Result<bool, CoreError> {
        self.check_authorized()
            .map(|bridge| bridge.is_some())
            .map_err(|e| self.report("check authorization", e))
    }

    fn check_authorized(&self) -> Result<Option<BridgeInfo>, CoreError> {
        match self.inner.cache.bridge_with_credentials() {
            Ok(bridge) => {
                self.inner.authorized.succeed(bridge.is_some());
                Ok(bridge)
            }
            Err(e) => {
                self.inner.authorized.fail(e.to_string());
                Err(e)
            }
        }
    }

    /// Wait for the link button on the selected bridge and store the
    /// issued keys.
    pub async fn authorize_bridge(
        &self,
        cancel: &CancellationToken,
    ) -> Result<BridgeInfo, CoreError> {
        self.inner.authorized.refetch();

        match self.pair(cancel).await {
            Ok(bridge) => {
                self.inner.authorized.succeed(true);
                self.inner.shade.succeed(SessionState {
                    hostname: Some(bridge.hostname.clone()),
                    authorized: true,
                });
                info!(hostname = %bridge.hostname, "bridge authorized");
                self.notify("Bridge authorized");
                Ok(bridge)
            }
            Err(e) => {
                self.inner.authorized.fail(e.to_string());
                Err(self.report("authorize bridge", e))
            }
        }
    }

    async fn pair(&self, cancel: &CancellationToken) -> Result<BridgeInfo, CoreError> {
        let link = self.link().await.ok_or(CoreError::NoBridgeSelected)?;
        let config = &self.inner.config;

        let token = link
            .client
            .await_token(
                &config.app_id,
                config.pairing_timeout,
                config.pairing_poll_interval,
                cancel,
            )
            .await?;

        let row = self
            .inner
            .cache
            .bridge_by_hostname(&link.hostname)?
            .unwrap_or_else(|| BridgeInfo::selected(link.hostname.clone(), ""));
        let stored = self.inner.cache.insert_or_update(&row.with_token(&token))?;

        *self.inner.link.lock().await = Some(Link {
            hostname: link.hostname,
            client: link.client.with_token(token),
        });
        Ok(stored)
    }

    // ── Discovery & selection ────────────────────────────────────

    /// Ask the discovery service for bridges on this network.
    pub async fn discover_bridges(&self) -> Result<Vec<DiscoveredBridge>, CoreError> {
        self.inner.bridges.refetch();

        let result = async {
            let url = Url::parse(&self.inner.config.discovery_url).map_err(|e| {
                CoreError::ValidationFailed {
                    message: format!("invalid discovery URL: {e}"),
                }
            })?;
            let discovery = DiscoveryClient::new(url, &self.inner.transport)?;
            Ok::<_, CoreError>(discovery.discover().await?)
        }
        .await;

        match result {
            Ok(bridges) => {
                if bridges.is_empty() {
                    info!("no bridges found");
                } else {
                    info!(count = bridges.len(), "bridge(s) found");
                }
                self.inner.bridges.succeed(bridges.clone());
                Ok(bridges)
            }
            Err(e) => {
                self.inner.bridges.fail(e.to_string());
                Err(self.report("discover bridges", e))
            }
        }
    }

    /// Select a discovered bridge.
    pub async fn select_bridge(&self, bridge: &DiscoveredBridge) -> Result<BridgeInfo, CoreError> {
        self.select_host(&bridge.internal_ip_address, &bridge.id).await
    }

    /// Select a bridge by manually entered IPv4 address.
    pub async fn select_address(&self, address: &str) -> Result<BridgeInfo, CoreError> {
        let ip = parse_address(address).map_err(|e| self.report("select bridge", e))?;
        self.select_host(&ip.to_string(), "").await
    }

    /// Point the session at `hostname` (an address or a full base URL)
    /// and record it in the cache without credentials.
    pub async fn select_host(
        &self,
        hostname: &str,
        bridge_id: &str,
    ) -> Result<BridgeInfo, CoreError> {
        let result = async {
            let bridge = BridgeInfo::selected(hostname, bridge_id);
            let client = self.build_client(&bridge)?;
            let stored = self.inner.cache.select(&bridge)?;
            *self.inner.link.lock().await = Some(Link {
                hostname: hostname.to_owned(),
                client,
            });
            Ok::<_, CoreError>(stored)
        }
        .await;

        match result {
            Ok(stored) => {
                info!(hostname, "selected bridge");
                self.inner.shade.succeed(SessionState {
                    hostname: Some(hostname.to_owned()),
                    authorized: false,
                });
                Ok(stored)
            }
            Err(e) => Err(self.report("select bridge", e)),
        }
    }

    /// Hostname of the bridge the session points at.
    pub async fn selected_hostname(&self) -> Option<String> {
        self.link().await.map(|link| link.hostname)
    }

    // ── Devices ──────────────────────────────────────────────────

    /// List every device on the authorized bridge.
    pub async fn grouped_devices(&self) -> Result<Vec<Device>, CoreError> {
        self.inner.devices.refetch();

        let result = async {
            let client = self.paired_client().await?;
            Ok::<_, CoreError>(client.list_devices().await?)
        }
        .await;

        match result {
            Ok(devices) => {
                debug!(count = devices.len(), "devices listed");
                self.inner.devices.succeed(devices.clone());
                Ok(devices)
            }
            Err(e) => {
                self.inner.devices.fail(e.to_string());
                Err(self.report("list devices", e))
            }
        }
    }

    // ── Photos ───────────────────────────────────────────────────

    /// Enumerate the photo library into the `images` cell.
    pub fn load_images(&self) -> Result<Vec<PathBuf>, CoreError> {
        self.inner.images.refetch();
        match self.inner.library.list() {
            Ok(images) => {
                self.inner.images.succeed(images.clone());
                Ok(images)
            }
            Err(e) => {
                self.inner.images.fail(e.to_string());
                Err(self.report("load images", e))
            }
        }
    }

    /// Drop the loaded image list.
    pub fn clear_images(&self) {
        self.inner.images.clear();
    }

    /// Save a photo into the library.
    pub fn save_photo(&self, image: &DynamicImage) -> Result<PathBuf, CoreError> {
        self.inner
            .library
            .save(image)
            .map_err(|e| self.report("save photo", e))
    }

    /// Copy an image file into the library.
    pub fn import_photo(&self, source: &Path) -> Result<PathBuf, CoreError> {
        self.inner
            .library
            .import(source)
            .map_err(|e| self.report("import photo", e))
    }

    /// Extract swatches from an image file, `max_colors` or the
    /// configured count.
    pub fn palette_from_file(
        &self,
        path: &Path,
        max_colors: Option<usize>,
    ) -> Result<Vec<Swatch>, CoreError> {
        let image = open_image(path).map_err(|e| self.report("open image", e))?;
        let max_colors = max_colors.unwrap_or(self.inner.config.max_colors);
        let swatches = extract_palette(&image, max_colors);
        debug!(path = %path.display(), count = swatches.len(), "palette extracted");
        Ok(swatches)
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to user-facing notices.
    pub fn notices(&self) -> broadcast::Receiver<String> {
        self.inner.notices.subscribe()
    }

    pub fn shade(&self) -> &ResourceCell<SessionState> {
        &self.inner.shade
    }

    pub fn authorized(&self) -> &ResourceCell<bool> {
        &self.inner.authorized
    }

    pub fn bridges(&self) -> &ResourceCell<Vec<DiscoveredBridge>> {
        &self.inner.bridges
    }

    pub fn devices(&self) -> &ResourceCell<Vec<Device>> {
        &self.inner.devices
    }

    pub fn lights(&self) -> &ResourceCell<Vec<LightInfo>> {
        &self.inner.lights
    }

    pub fn images(&self) -> &ResourceCell<Vec<PathBuf>> {
        &self.inner.images
    }

    // ── Helpers ──────────────────────────────────────────────────

    pub(crate) async fn link(&self) -> Option<Link> {
        self.inner.link.lock().await.clone()
    }

    /// Client for the selected bridge, which must be paired.
    pub(crate) async fn paired_client(&self) -> Result<BridgeClient, CoreError> {
        match self.link().await {
            Some(link) if link.client.is_paired() => Ok(link.client),
            Some(_) | None => Err(CoreError::NotAuthorized),
        }
    }

    pub(crate) fn notify(&self, message: impl Into<String>) {
        let _ = self.inner.notices.send(message.into());
    }

    /// Log a failure and publish it as a notice.
    pub(crate) fn report(&self, operation: &str, err: CoreError) -> CoreError {
        error!(error = %err, "failed to {operation}");
        self.notify(err.to_string());
        err
    }
}
