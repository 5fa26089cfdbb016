//! Deterministic synthetic terrain for the example binaries.
use glam::{IVec2, IVec3};
use structure_growth::prelude::*;

/// Smooth hills with a lake below `sea_level` and sparse trees.
///
/// Every query is a pure function of the column, so the same hills can serve as both the
/// height sampler and the terrain probe of a run.
#[derive(Clone, Copy, Debug)]
pub struct RollingHills {
    pub seed: u32,
    pub base: f32,
    pub amplitude: f32,
    pub wavelength: f32,
    pub sea_level: i32,
    /// One column in `tree_spacing` (on average) carries a tree.
    pub tree_spacing: u32,
}

impl Default for RollingHills {
    fn default() -> Self {
        Self {
            seed: 7,
            base: 66.0,
            amplitude: 5.0,
            wavelength: 48.0,
            sea_level: 63,
            tree_spacing: 41,
        }
    }
}

const TRUNK_HEIGHT: i32 = 4;

impl RollingHills {
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn with_sea_level(mut self, sea_level: i32) -> Self {
        self.sea_level = sea_level;
        self
    }

    pub fn with_amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude;
        self
    }

    fn hash(&self, column: IVec2) -> u32 {
        let mut h = self.seed ^ 0x9e37_79b9;
        h ^= (column.x as u32).wrapping_mul(0x85eb_ca6b);
        h = h.rotate_left(13);
        h ^= (column.y as u32).wrapping_mul(0xc2b2_ae35);
        h ^= h >> 16;
        h = h.wrapping_mul(0x7feb_352d);
        h ^ (h >> 15)
    }

    /// First free Y above the soil of `column`.
    pub fn ground(&self, column: IVec2) -> i32 {
        let phase = (self.seed % 1024) as f32 * 0.37;
        let k = std::f32::consts::TAU / self.wavelength.max(1.0);
        let x = column.x as f32 * k + phase;
        let z = column.y as f32 * k - phase;
        let wave = 0.6 * x.sin() * z.cos() + 0.4 * (0.5 * x + 0.8 * z).sin();
        (self.base + self.amplitude * wave).round() as i32
    }

    fn has_tree(&self, column: IVec2) -> bool {
        self.tree_spacing > 0
            && self.ground(column) > self.sea_level
            && self.hash(column) % self.tree_spacing == 0
    }

    /// Raw surface map: first free Y above anything that blocks motion.
    pub fn surface_map(&self, area: BuildArea) -> HeightMap {
        self.map(area, |hills, column| {
            let ground = hills.ground(column);
            if hills.has_tree(column) {
                ground + TRUNK_HEIGHT + 1
            } else {
                ground.max(hills.sea_level)
            }
        })
    }

    /// Raw ocean-floor map: first free Y above anything solid.
    pub fn ocean_floor_map(&self, area: BuildArea) -> HeightMap {
        self.map(area, |hills, column| {
            let ground = hills.ground(column);
            if hills.has_tree(column) {
                ground + TRUNK_HEIGHT + 1
            } else {
                ground
            }
        })
    }

    fn map(&self, area: BuildArea, f: impl Fn(&Self, IVec2) -> i32) -> HeightMap {
        Grid2::from_fn(
            area.origin,
            area.size.x.max(0) as usize,
            area.size.y.max(0) as usize,
            |column| f(self, column),
        )
    }

    /// Samples the build area into a [`GrowthSite`], stripping trees from the height maps.
    pub fn site(&self, area: BuildArea) -> Result<GrowthSite> {
        let sampler = RawHeightSampler::new(
            self.surface_map(area),
            self.ocean_floor_map(area),
            self,
        );
        GrowthSite::from_sampler(area, &sampler)
    }
}

impl TerrainProbe for RollingHills {
    fn block_at(&self, position: mint::Vector3<i32>) -> Option<String> {
        let p = IVec3::from(position);
        let column = IVec2::new(p.x, p.z);
        let ground = self.ground(column);
        let material = if p.y < ground - 4 {
            "minecraft:stone"
        } else if p.y < ground - 1 {
            "minecraft:dirt"
        } else if p.y == ground - 1 {
            if ground <= self.sea_level {
                "minecraft:sand"
            } else {
                "minecraft:grass_block"
            }
        } else if p.y < self.sea_level {
            "minecraft:water"
        } else if self.has_tree(column) && p.y < ground + TRUNK_HEIGHT {
            "minecraft:oak_log"
        } else if self.has_tree(column) && p.y == ground + TRUNK_HEIGHT {
            "minecraft:oak_leaves"
        } else {
            "minecraft:air"
        };
        Some(material.to_string())
    }
}
