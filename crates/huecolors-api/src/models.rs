// Wire types for the bridge REST API.
//
// Discovery and pairing use the v1 JSON shapes; lights and devices come
// from the CLIP v2 resource API wrapped in `{ errors, data }` envelopes.
// Unknown fields are ignored so firmware additions don't break parsing.

use serde::{Deserialize, Serialize};

// ── Discovery ───────────────────────────────────────────────────────

/// A bridge as reported by the public discovery endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredBridge {
    pub id: String,
    #[serde(rename = "internalipaddress")]
    pub internal_ip_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    443
}

// ── Pairing (v1) ────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct PairingRequest<'a> {
    pub devicetype: &'a str,
    pub generateclientkey: bool,
}

/// One element of the pairing endpoint's response array.
#[derive(Debug, Deserialize)]
pub(crate) struct PairingResult {
    pub success: Option<PairingSuccess>,
    pub error: Option<PairingError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PairingSuccess {
    pub username: String,
    pub clientkey: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PairingError {
    #[serde(rename = "type")]
    pub code: u16,
    #[serde(default)]
    pub description: String,
}

/// v1 error type for "link button not pressed".
pub(crate) const LINK_BUTTON_NOT_PRESSED: u16 = 101;

// ── CLIP v2 envelope ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub errors: Vec<EnvelopeError>,
    #[serde(default)]
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EnvelopeError {
    pub description: String,
}

/// Reference to another resource (`{ "rid": ..., "rtype": ... }`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub rid: String,
    pub rtype: String,
}

// ── Lights ──────────────────────────────────────────────────────────

/// A light service as returned by `GET /clip/v2/resource/light`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Light {
    pub id: String,
    pub id_v1: Option<String>,
    pub owner: ResourceRef,
    #[serde(default)]
    pub metadata: Option<LightMetadata>,
    pub on: OnState,
    #[serde(default)]
    pub dimming: Option<Dimming>,
    #[serde(default)]
    pub color: Option<ColorInfo>,
}

impl Light {
    /// Lights without a color block are white-only (plugs, ambiance bulbs).
    pub fn supports_color(&self) -> bool {
        self.color.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightMetadata {
    pub name: Option<String>,
    pub archetype: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OnState {
    pub on: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimming {
    /// Percentage, 0–100.
    pub brightness: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorInfo {
    pub xy: Xy,
    #[serde(default)]
    pub gamut_type: Option<String>,
}

/// CIE 1931 chromaticity coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Xy {
    pub x: f32,
    pub y: f32,
}

/// Body of `PUT /clip/v2/resource/light/{id}`. Absent fields are left
/// untouched by the bridge.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LightUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<OnState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimming: Option<Dimming>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorUpdate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorUpdate {
    pub xy: Xy,
}

impl LightUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn power(mut self, on: bool) -> Self {
        self.on = Some(OnState { on });
        self
    }

    pub fn brightness(mut self, brightness: f32) -> Self {
        self.dimming = Some(Dimming { brightness });
        self
    }

    pub fn xy(mut self, xy: Xy) -> Self {
        self.color = Some(ColorUpdate { xy });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.on.is_none() && self.dimming.is_none() && self.color.is_none()
    }
}

// ── Devices ─────────────────────────────────────────────────────────

/// A physical device (`GET /clip/v2/resource/device`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub id_v1: Option<String>,
    pub metadata: DeviceMetadata,
    #[serde(default)]
    pub product_data: Option<ProductData>,
    #[serde(default)]
    pub services: Vec<ResourceRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceMetadata {
    pub name: String,
    pub archetype: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductData {
    pub model_id: Option<String>,
    pub manufacturer_name: Option<String>,
    pub product_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct IdentifyRequest {
    pub identify: IdentifyAction,
}

#[derive(Debug, Serialize)]
pub(crate) struct IdentifyAction {
    pub action: &'static str,
}
