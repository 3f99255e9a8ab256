use huecolors_api::Light;
use serde::{Deserialize, Serialize};

use super::color::Rgb;

/// Cached view of a single bridge light.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightInfo {
    /// Last known color. `None` for white-only lights or lights the
    /// bridge could not report.
    pub color: Option<Rgb>,
    pub label: String,
    /// Id of the owning device.
    pub owner: String,
    /// Whether the light accepts color commands.
    pub is_hue: bool,
    pub power: bool,
    /// Percentage, 0–100.
    pub brightness: f32,
    /// Legacy `/lights/{n}` id.
    pub v1_id: String,
    /// Bridge light id (primary key).
    pub id: String,
}

impl LightInfo {
    /// Copy with color and power taken from a fresh bridge read. A light
    /// the bridge no longer reports reads as off with no color.
    pub fn refreshed(&self, light: Option<&Light>) -> Self {
        let (color, power) = light.map_or((None, false), |l| (light_color(l), l.on.on));
        Self {
            color,
            power,
            ..self.clone()
        }
    }
}

impl From<&Light> for LightInfo {
    fn from(light: &Light) -> Self {
        let v1_id = light.id_v1.clone();
        let number = v1_id
            .as_deref()
            .and_then(|v1| v1.split('/').nth(2))
            .filter(|n| !n.is_empty())
            .unwrap_or("Unknown");

        Self {
            color: light_color(light),
            label: format!("Lamp {number}"),
            owner: light.owner.rid.clone(),
            is_hue: light.supports_color(),
            power: light.on.on,
            brightness: light.dimming.map_or(0.0, |d| d.brightness.round()),
            v1_id: v1_id.unwrap_or_else(|| "Lamp".into()),
            id: light.id.clone(),
        }
    }
}

fn light_color(light: &Light) -> Option<Rgb> {
    light.color.as_ref().map(|c| Rgb::from_xy(c.xy))
}
