// ── Packed sRGB colors ──
//
// Lights report and accept CIE 1931 xy chromaticity; everything else in
// the app (swatches, the cache, terminal rendering) deals in 8-bit sRGB.

use std::fmt;
use std::str::FromStr;

use huecolors_api::Xy;
use palette::convert::FromColorUnclamped;
use palette::{FromColor, LinSrgb, Srgb, Yxy};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// D65 white point, used for black and other degenerate inputs.
const WHITE_XY: Xy = Xy {
    x: 0.3127,
    y: 0.3290,
};

/// A 24-bit sRGB color packed as `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgb(u32);

impl Rgb {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self(u32::from_be_bytes([0, red, green, blue]))
    }

    /// Build from a packed value; the top byte (alpha) is discarded.
    pub const fn from_packed(value: u32) -> Self {
        Self(value & 0x00FF_FFFF)
    }

    pub const fn packed(self) -> u32 {
        self.0
    }

    pub const fn components(self) -> (u8, u8, u8) {
        let [_, r, g, b] = self.0.to_be_bytes();
        (r, g, b)
    }

    /// Chromaticity of this color. Brightness is carried separately by
    /// the bridge, so luminance is dropped.
    pub fn to_xy(self) -> Xy {
        let (r, g, b) = self.components();
        if (r, g, b) == (0, 0, 0) {
            return WHITE_XY;
        }

        let linear: LinSrgb = Srgb::new(r, g, b).into_format::<f32>().into_linear();
        let yxy: Yxy = Yxy::from_color(linear);

        if yxy.x.is_finite() && yxy.y.is_finite() {
            Xy {
                x: yxy.x,
                y: yxy.y,
            }
        } else {
            WHITE_XY
        }
    }

    /// The brightest sRGB color with chromaticity `xy`.
    pub fn from_xy(xy: Xy) -> Self {
        if !(xy.x.is_finite() && xy.y.is_finite()) || xy.y <= 0.0 {
            return Self::new(255, 255, 255);
        }

        let yxy: Yxy = Yxy::new(xy.x, xy.y, 1.0);
        let linear: LinSrgb = LinSrgb::from_color_unclamped(yxy);

        let max = linear.red.max(linear.green).max(linear.blue);
        let scale = if max > 0.0 { max } else { 1.0 };
        let normalized = LinSrgb::new(
            (linear.red / scale).clamp(0.0, 1.0),
            (linear.green / scale).clamp(0.0, 1.0),
            (linear.blue / scale).clamp(0.0, 1.0),
        );

        let encoded: Srgb = Srgb::from_linear(normalized);
        let srgb: Srgb<u8> = encoded.into_format();
        Self::new(srgb.red, srgb.green, srgb.blue)
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

impl FromStr for Rgb {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 {
            return Err(CoreError::ValidationFailed {
                message: format!("'{s}' is not a #rrggbb color"),
            });
        }
        u32::from_str_radix(hex, 16)
            .map(Self::from_packed)
            .map_err(|_| CoreError::ValidationFailed {
                message: format!("'{s}' is not a #rrggbb color"),
            })
    }
}
