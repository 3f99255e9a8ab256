// ── Palette extraction and assignment ──
//
// Dominant colors come from NeuQuant (`color_quant`) run over a
// downscaled copy of the photo. Each resulting color's population is the
// number of pixels that map to it; swatches are reported most common first.

use color_quant::NeuQuant;
use image::DynamicImage;
use image::imageops::FilterType;
use serde::Serialize;
use tracing::debug;

use crate::model::{LightInfo, Rgb};

/// Longest edge the image is reduced to before quantizing.
const SAMPLE_EDGE: u32 = 128;

/// NeuQuant sampling factor: 1 is slowest and best, 30 fastest.
const SAMPLE_FACTOR: i32 = 10;

/// A representative color and how many sampled pixels it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Swatch {
    pub color: Rgb,
    pub population: u32,
}

/// Extract up to `max_colors` swatches from `image`, most common first.
pub fn extract_palette(image: &DynamicImage, max_colors: usize) -> Vec<Swatch> {
    if max_colors == 0 || image.width() == 0 || image.height() == 0 {
        return Vec::new();
    }

    let sample = if image.width() > SAMPLE_EDGE || image.height() > SAMPLE_EDGE {
        image.resize(SAMPLE_EDGE, SAMPLE_EDGE, FilterType::Triangle)
    } else {
        image.clone()
    };
    let pixels = sample.to_rgba8().into_raw();

    // NeuQuant needs at least two neurons; extras are trimmed below.
    let quant = NeuQuant::new(SAMPLE_FACTOR, max_colors.max(2), &pixels);
    let map = quant.color_map_rgb();

    let mut counts = vec![0u32; map.len() / 3];
    for pixel in pixels.chunks_exact(4) {
        if let Some(count) = counts.get_mut(quant.index_of(pixel)) {
            *count += 1;
        }
    }

    let mut swatches: Vec<Swatch> = map
        .chunks_exact(3)
        .zip(counts)
        .filter(|(_, population)| *population > 0)
        .map(|(rgb, population)| Swatch {
            color: Rgb::new(rgb[0], rgb[1], rgb[2]),
            population,
        })
        .collect();

    swatches.sort_by(|a, b| b.population.cmp(&a.population));
    swatches.truncate(max_colors);

    debug!(
        swatches = swatches.len(),
        width = sample.width(),
        height = sample.height(),
        "palette extracted"
    );
    swatches
}

/// Pair each light with a swatch color, round-robin: light `i` gets
/// swatch `i mod N`. No swatches means no assignments.
pub fn assign_swatches<'a>(
    lights: &'a [LightInfo],
    swatches: &[Swatch],
) -> Vec<(&'a LightInfo, Rgb)> {
    lights
        .iter()
        .zip(swatches.iter().cycle())
        .map(|(light, swatch)| (light, swatch.color))
        .collect()
}
