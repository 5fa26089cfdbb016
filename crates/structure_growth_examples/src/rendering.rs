//! Top-down PNG rendering of growth results.
use std::collections::HashMap;
use std::path::Path;

use image::{Rgb, RgbImage};
use structure_growth::prelude::*;
use tracing::info;

/// Routes `tracing` events through `log` to an `env_logger` backend.
///
/// `RUST_LOG` overrides the default `info` filter. Calling this twice is harmless.
pub fn init_tracing() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// Rendering options for [`render_layout_to_png`].
#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// Pixels per world column.
    pub pixel_scale: u32,
    /// Heights at or below this are drawn black, at or above `high` white.
    pub low: i32,
    pub high: i32,
    /// Used for prototypes without an explicit color.
    pub default_color: [u8; 3],
    pub outline: [u8; 3],
    colors: HashMap<String, [u8; 3]>,
}

impl RenderConfig {
    pub fn new(pixel_scale: u32) -> Self {
        Self {
            pixel_scale: pixel_scale.max(1),
            low: 56,
            high: 80,
            default_color: [200, 60, 60],
            outline: [25, 25, 25],
            colors: HashMap::new(),
        }
    }

    pub fn with_height_range(mut self, low: i32, high: i32) -> Self {
        self.low = low;
        self.high = high.max(low + 1);
        self
    }

    pub fn with_color(mut self, prototype: impl Into<String>, color: [u8; 3]) -> Self {
        self.colors.insert(prototype.into(), color);
        self
    }

    pub fn set_color(&mut self, prototype: impl Into<String>, color: [u8; 3]) {
        self.colors.insert(prototype.into(), color);
    }

    fn color_of(&self, prototype: &str) -> [u8; 3] {
        self.colors
            .get(prototype)
            .copied()
            .unwrap_or(self.default_color)
    }

    fn shade(&self, height: i32) -> [u8; 3] {
        let t = (height - self.low) as f32 / (self.high - self.low) as f32;
        let g = (t.clamp(0.0, 1.0) * 200.0) as u8 + 40;
        [g, g, g]
    }
}

/// Draws the site baseline as a grayscale height map and every placement's world box on top.
///
/// Columns whose ocean floor lies below the baseline are tinted blue. Placements are drawn
/// in order, so children cover the edges of their parents.
pub fn render_layout_to_png(
    site: &GrowthSite,
    result: &GrowthResult,
    config: &RenderConfig,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let path = path.as_ref();
    let scale = config.pixel_scale;
    let (width, depth) = site.baseline.size();
    let mut img = RgbImage::new(width as u32 * scale, depth as u32 * scale);

    for iz in 0..depth {
        for ix in 0..width {
            let i = iz * width + ix;
            let h = site.baseline.data[i];
            let mut color = config.shade(h);
            if site.ocean_floor.data.get(i).is_some_and(|&floor| floor < h) {
                color = [color[0] / 3, color[1] / 2, 220];
            }
            fill_cell(&mut img, ix as u32, iz as u32, scale, color);
        }
    }

    let origin = site.area.origin;
    for placed in &result.placements {
        let min = placed.world_box.min;
        let size = placed.world_box.size;
        let color = config.color_of(&placed.prototype);
        for dz in 0..size.z {
            for dx in 0..size.x {
                let lx = min.x + dx - origin.x;
                let lz = min.z + dz - origin.y;
                if lx < 0 || lz < 0 || lx as usize >= width || lz as usize >= depth {
                    continue;
                }
                let edge = dx == 0 || dz == 0 || dx == size.x - 1 || dz == size.z - 1;
                let c = if edge && scale > 2 { config.outline } else { color };
                fill_cell(&mut img, lx as u32, lz as u32, scale, c);
            }
        }
    }

    img.save(path)?;
    info!(
        "Rendered {} placements to {}.",
        result.placements.len(),
        path.display()
    );
    Ok(())
}

fn fill_cell(img: &mut RgbImage, x: u32, z: u32, scale: u32, color: [u8; 3]) {
    for py in z * scale..(z + 1) * scale {
        for px in x * scale..(x + 1) * scale {
            img.put_pixel(px, py, Rgb(color));
        }
    }
}
