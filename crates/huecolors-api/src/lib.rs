// huecolors-api: Async Rust client for the Hue bridge REST API

pub mod auth;
pub mod client;
pub mod devices;
pub mod discovery;
pub mod error;
pub mod lights;
pub mod models;
pub mod pairing;
pub mod transport;

pub use auth::{AppId, AuthToken, SecurityStrategy};
pub use client::BridgeClient;
pub use discovery::{DEFAULT_DISCOVERY_URL, DiscoveryClient};
pub use error::Error;
pub use models::{
    ColorInfo, Device, DiscoveredBridge, Dimming, Light, LightUpdate, OnState, ResourceRef, Xy,
};
pub use transport::TransportConfig;
