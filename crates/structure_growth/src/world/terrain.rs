//! Terrain reads: block probing and height-map derivation.
use glam::{IVec2, IVec3};

use crate::error::{Error, Result};
use crate::geometry::{BuildArea, HeightMap};
use crate::prototype::materials;

/// Lowest Y a terrain walk descends to.
pub const WORLD_MIN_Y: i32 = -64;

/// Reads single blocks from the world.
pub trait TerrainProbe {
    /// Material at `position`, or `None` if unknown.
    fn block_at(&self, position: mint::Vector3<i32>) -> Option<String>;
}

impl<P: TerrainProbe + ?Sized> TerrainProbe for &P {
    fn block_at(&self, position: mint::Vector3<i32>) -> Option<String> {
        (**self).block_at(position)
    }
}

/// Baseline (ground without vegetation) and ocean-floor height maps of a build area.
#[derive(Clone, Debug, PartialEq)]
pub struct SiteHeights {
    pub baseline: HeightMap,
    pub ocean_floor: HeightMap,
}

/// Supplies the height maps of a build area.
pub trait HeightSampler {
    fn sample(&self, area: &BuildArea) -> Result<SiteHeights>;
}

/// Lowers each column past vegetation and air until solid ground (or liquid) is below it.
fn strip_cover(raw: &HeightMap, probe: &dyn TerrainProbe) -> HeightMap {
    let mut out = raw.clone();
    for iz in 0..raw.depth {
        for ix in 0..raw.width {
            let i = iz * raw.width + ix;
            let column = raw.origin + IVec2::new(ix as i32, iz as i32);
            let mut h = raw.data[i];
            while h > WORLD_MIN_Y {
                let below = IVec3::new(column.x, h - 1, column.y);
                match probe.block_at(below.into()) {
                    Some(material) if materials::is_ground_cover(&material) => h -= 1,
                    _ => break,
                }
            }
            out.data[i] = h.min(raw.data[i]);
        }
    }
    out
}

/// Derives baseline and ocean-floor maps from raw surface maps.
///
/// `raw_surface` is the first free Y above anything that blocks motion (leaves and plants
/// included); `raw_ocean_floor` the first free Y above anything solid. Both are walked down
/// past air, plants and tree blocks.
pub fn derive_height_maps(
    raw_surface: &HeightMap,
    raw_ocean_floor: &HeightMap,
    probe: &dyn TerrainProbe,
) -> SiteHeights {
    SiteHeights {
        baseline: strip_cover(raw_surface, probe),
        ocean_floor: strip_cover(raw_ocean_floor, probe),
    }
}

/// [`HeightSampler`] over raw surface maps plus a block probe.
///
/// The raw maps may cover more than the requested area; they are cropped first.
pub struct RawHeightSampler<P: TerrainProbe> {
    pub surface: HeightMap,
    pub ocean_floor: HeightMap,
    pub probe: P,
}

impl<P: TerrainProbe> RawHeightSampler<P> {
    pub fn new(surface: HeightMap, ocean_floor: HeightMap, probe: P) -> Self {
        Self {
            surface,
            ocean_floor,
            probe,
        }
    }
}

impl<P: TerrainProbe> HeightSampler for RawHeightSampler<P> {
    fn sample(&self, area: &BuildArea) -> Result<SiteHeights> {
        let far = area.far_corner();
        let surface = self.surface.crop(area.origin, far);
        let ocean_floor = self.ocean_floor.crop(area.origin, far);
        let wanted = (area.size.x.max(0) as usize, area.size.y.max(0) as usize);
        if surface.size() != wanted || ocean_floor.size() != wanted {
            return Err(Error::InvalidConfig(format!(
                "raw height maps do not cover build area at {:?} of size {:?}",
                area.origin, area.size
            )));
        }
        Ok(derive_height_maps(&surface, &ocean_floor, &self.probe))
    }
}
