//! Recursive growth of connected structures.
//!
//! - [`GrowthSite`]: the build area with its baseline and ocean-floor height maps.
//! - [`GrowthContext`]: the shared state threaded through every [`node::Node`]: occupancy,
//!   budget, registry, random source, world writer and event sink.
//! - [`node`]: the placement decision engine.
//! - [`runner`]: configuration and the high-level entry points.
use glam::IVec2;
use rand::RngCore;
use tracing::warn;

use crate::error::{Error, Result};
use crate::geometry::{BuildArea, HeightMap, OccupancyGrid};
use crate::prototype::PrototypeRegistry;
use crate::world::{HeightSampler, TerrainProbe, VoxelWriter};

pub mod budget;
pub mod containers;
pub mod events;
pub mod node;
mod postprocess;
pub mod runner;
pub mod selection;

pub use budget::ConstructionBudget;
pub use containers::ContainerOptions;
pub use events::{EventSink, FnSink, GrowthEvent, GrowthEventKind, MultiSink, VecSink};
pub use node::{Anchor, ConnectorOutcome, Node, NodeState, Placability, Rejection};
pub use runner::{GrowthResult, GrowthRunner, PlacedStructure, RunConfig, Start};
pub use selection::{SelectionStrategy, MIN_SELECTION_COST};

/// The build area and its terrain.
///
/// Both height maps are anchored at the area origin and cover it exactly.
#[derive(Clone, Debug, PartialEq)]
pub struct GrowthSite {
    pub area: BuildArea,
    /// First free Y above the ground, vegetation removed.
    pub baseline: HeightMap,
    /// First free Y above the ground or lake bed.
    pub ocean_floor: HeightMap,
}

impl GrowthSite {
    pub fn new(area: BuildArea, baseline: HeightMap, ocean_floor: HeightMap) -> Result<Self> {
        area.validate()?;
        let wanted = (area.size.x as usize, area.size.y as usize);
        for (label, map) in [("baseline", &baseline), ("ocean floor", &ocean_floor)] {
            if map.origin != area.origin || map.size() != wanted {
                return Err(Error::InvalidConfig(format!(
                    "{label} height map at {:?} of size {:?} does not match build area at {:?} of size {:?}",
                    map.origin,
                    map.size(),
                    area.origin,
                    area.size
                )));
            }
        }
        Ok(Self {
            area,
            baseline,
            ocean_floor,
        })
    }

    /// Level ground at `ground_y` everywhere.
    pub fn flat(area: BuildArea, ground_y: i32) -> Result<Self> {
        let mut baseline: HeightMap = area.grid();
        baseline.data.fill(ground_y);
        Self::new(area, baseline.clone(), baseline)
    }

    pub fn from_sampler(area: BuildArea, sampler: &dyn HeightSampler) -> Result<Self> {
        let heights = sampler.sample(&area)?;
        Self::new(area, heights.baseline, heights.ocean_floor)
    }

    /// An empty occupancy grid aligned with this site.
    pub fn occupancy_grid(&self) -> OccupancyGrid {
        self.area.grid()
    }

    pub fn baseline_at(&self, column: IVec2) -> Option<i32> {
        self.baseline.get_world(column).copied()
    }

    /// Most common baseline height, a good default Y for a first structure.
    pub fn most_frequent_height(&self) -> Option<i32> {
        self.baseline.most_frequent_height()
    }
}

/// Shared state for one growth run.
///
/// Every node reads and updates the same occupancy grid and budget, and draws from the
/// same random source, so updates made by a parent are visible to its children.
pub struct GrowthContext<'a> {
    pub(crate) site: &'a GrowthSite,
    pub(crate) occupancy: &'a mut OccupancyGrid,
    pub(crate) budget: &'a mut ConstructionBudget,
    pub(crate) registry: &'a mut PrototypeRegistry,
    pub(crate) rng: &'a mut dyn RngCore,
    pub(crate) writer: &'a mut dyn VoxelWriter,
    pub(crate) config: &'a RunConfig,
    pub(crate) terrain: Option<&'a dyn TerrainProbe>,
    pub(crate) sink: Option<&'a mut dyn EventSink>,
    pub(crate) placements: Vec<PlacedStructure>,
}

impl<'a> GrowthContext<'a> {
    pub fn new(
        site: &'a GrowthSite,
        occupancy: &'a mut OccupancyGrid,
        budget: &'a mut ConstructionBudget,
        registry: &'a mut PrototypeRegistry,
        rng: &'a mut dyn RngCore,
        writer: &'a mut dyn VoxelWriter,
        config: &'a RunConfig,
    ) -> Self {
        Self {
            site,
            occupancy,
            budget,
            registry,
            rng,
            writer,
            config,
            terrain: None,
            sink: None,
            placements: Vec::new(),
        }
    }

    pub fn with_terrain(mut self, terrain: &'a dyn TerrainProbe) -> Self {
        self.terrain = Some(terrain);
        self
    }

    pub fn with_sink(mut self, sink: &'a mut dyn EventSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn site(&self) -> &GrowthSite {
        self.site
    }

    pub fn occupancy(&self) -> &OccupancyGrid {
        self.occupancy
    }

    pub fn budget(&self) -> &ConstructionBudget {
        self.budget
    }

    /// Structures committed so far, in placement order.
    pub fn placements(&self) -> &[PlacedStructure] {
        &self.placements
    }

    pub fn into_placements(self) -> Vec<PlacedStructure> {
        self.placements
    }

    pub(crate) fn wants(&self, kind: GrowthEventKind) -> bool {
        self.sink.as_ref().is_some_and(|s| s.wants(kind))
    }

    pub(crate) fn emit(&mut self, event: GrowthEvent) {
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.send(event);
        }
    }

    pub(crate) fn warn(&mut self, context: &str, message: String) {
        warn!("{}: {}.", context, message);
        if self.wants(GrowthEventKind::Warning) {
            self.emit(GrowthEvent::Warning {
                context: context.to_owned(),
                message,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Grid2;

    #[test]
    fn site_rejects_misaligned_maps() {
        let area = BuildArea::new(0, 0, 4, 4);
        let good: HeightMap = Grid2::filled(IVec2::ZERO, 4, 4, 64);
        let shifted: HeightMap = Grid2::filled(IVec2::new(1, 0), 4, 4, 64);
        let small: HeightMap = Grid2::filled(IVec2::ZERO, 3, 4, 64);
        assert!(GrowthSite::new(area, good.clone(), good.clone()).is_ok());
        assert!(GrowthSite::new(area, shifted, good.clone()).is_err());
        assert!(GrowthSite::new(area, good, small).is_err());
    }

    #[test]
    fn flat_site_reports_its_height() {
        let site = GrowthSite::flat(BuildArea::new(-5, 3, 6, 2), 70).unwrap();
        assert_eq!(site.most_frequent_height(), Some(70));
        assert_eq!(site.baseline_at(IVec2::new(-5, 3)), Some(70));
        assert_eq!(site.baseline_at(IVec2::new(1, 3)), None);
        assert!(!site.occupancy_grid().any_occupied());
    }
}
