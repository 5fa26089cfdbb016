//! Filling decoration containers with materials found around the node.
use glam::{IVec2, IVec3};

use crate::geometry::HeightMap;
use crate::growth::GrowthContext;
use crate::prototype::materials::{container_grid, is_natural_sample, slot_index};
use crate::prototype::{BlockPayload, InventoryItem};
use crate::random::{choose, rand01, uniform_index, uniform_range};
use crate::structure::Structure;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct ContainerOptions {
    /// Surface columns probed for sample materials.
    pub sample_columns: usize,
    /// Probability of filling each slot.
    pub slot_chance: f64,
    pub max_stack: u8,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            sample_columns: 8,
            slot_chance: 0.3,
            max_stack: 16,
        }
    }
}

/// Populates every container voxel of `structure`.
///
/// Samples come from the surface block under random columns of `nearby`. Containers
/// that end up empty are suppressed. Returns the number of filled containers.
pub(crate) fn populate_containers(
    structure: &mut Structure,
    nearby: &HeightMap,
    ctx: &mut GrowthContext<'_>,
) -> usize {
    let containers: Vec<(usize, (u8, u8))> = structure
        .prototype()
        .voxels()
        .voxels
        .iter()
        .enumerate()
        .filter_map(|(index, voxel)| container_grid(structure.material_of(voxel)).map(|grid| (index, grid)))
        .collect();
    if containers.is_empty() {
        return 0;
    }

    let config = ctx.config;
    let options = &config.containers;
    let samples = sample_surface(nearby, ctx);
    let mut filled = 0;
    for (index, (columns, rows)) in containers {
        let mut items = Vec::new();
        if !samples.is_empty() {
            for row in 0..rows {
                for column in 0..columns {
                    if rand01(&mut *ctx.rng) >= options.slot_chance {
                        continue;
                    }
                    let Some(id) = choose(&mut *ctx.rng, &samples) else {
                        continue;
                    };
                    let count = uniform_range(&mut *ctx.rng, 1, options.max_stack.max(1) as i32) as u8;
                    items.push(InventoryItem::new(slot_index((columns, rows), column, row), count, id.clone()));
                }
            }
        }
        if items.is_empty() {
            structure.suppress_voxel(index);
        } else {
            structure.set_payload(index, BlockPayload::Inventory(items));
            filled += 1;
        }
    }
    filled
}

fn sample_surface(nearby: &HeightMap, ctx: &mut GrowthContext<'_>) -> Vec<String> {
    let Some(terrain) = ctx.terrain else {
        return Vec::new();
    };
    if nearby.is_empty() {
        return Vec::new();
    }
    let mut samples = Vec::new();
    for _ in 0..ctx.config.containers.sample_columns {
        let i = uniform_index(&mut *ctx.rng, nearby.data.len());
        let column = nearby.origin + IVec2::new((i % nearby.width) as i32, (i / nearby.width) as i32);
        let surface = IVec3::new(column.x, nearby.data[i] - 1, column.y);
        if let Some(material) = terrain.block_at(surface.into()) {
            if is_natural_sample(&material) {
                samples.push(material);
            }
        }
    }
    samples
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::geometry::{BuildArea, Rotation};
    use crate::growth::{ConstructionBudget, GrowthSite, RunConfig};
    use crate::prototype::{InMemorySource, PrototypeRegistry, StructurePrototype, Voxel, VoxelData};
    use crate::world::{RecordingWriter, TerrainProbe};

    struct SandyGround;

    impl TerrainProbe for SandyGround {
        fn block_at(&self, position: mint::Vector3<i32>) -> Option<String> {
            (position.y == 59).then(|| "minecraft:sand".to_owned())
        }
    }

    fn crate_structure() -> Structure {
        let voxels = VoxelData::new(IVec3::new(2, 1, 1))
            .with_voxel(Voxel::new(IVec3::ZERO, "minecraft:chest"))
            .with_voxel(Voxel::new(IVec3::X, "minecraft:oak_planks"));
        let proto = StructurePrototype::bare("crate", voxels).unwrap();
        Structure::new(Arc::new(proto), IVec3::new(1, 60, 1), Rotation::NORTH)
    }

    fn run(config: RunConfig, terrain: Option<&dyn TerrainProbe>) -> (Structure, usize) {
        let site = GrowthSite::flat(BuildArea::new(0, 0, 4, 4), 60).unwrap();
        let mut occupancy = site.occupancy_grid();
        let mut budget = ConstructionBudget::new(10.0);
        let mut registry = PrototypeRegistry::new(InMemorySource::new());
        let mut rng = StdRng::seed_from_u64(11);
        let mut writer = RecordingWriter::new();
        let mut ctx = GrowthContext::new(
            &site,
            &mut occupancy,
            &mut budget,
            &mut registry,
            &mut rng,
            &mut writer,
            &config,
        );
        if let Some(terrain) = terrain {
            ctx = ctx.with_terrain(terrain);
        }
        let mut structure = crate_structure();
        let filled = populate_containers(&mut structure, &site.baseline, &mut ctx);
        (structure, filled)
    }

    #[test]
    fn containers_receive_surface_samples() {
        let mut config = RunConfig::default();
        config.containers.slot_chance = 1.0;
        config.containers.max_stack = 4;
        let (structure, filled) = run(config, Some(&SandyGround));
        assert_eq!(filled, 1);
        let Some(BlockPayload::Inventory(items)) = structure.payload_of(0) else {
            panic!("chest has no inventory");
        };
        assert_eq!(items.len(), 27);
        let mut slots = HashMap::new();
        for item in items {
            assert_eq!(item.id, "minecraft:sand");
            assert!((1..=4).contains(&item.count));
            *slots.entry(item.slot).or_insert(0) += 1;
        }
        assert_eq!(slots.len(), 27);
        assert!(structure.payload_of(1).is_none());
    }

    #[test]
    fn empty_containers_are_suppressed() {
        let (structure, filled) = run(RunConfig::default(), None);
        assert_eq!(filled, 0);
        assert!(structure.is_suppressed(0));
        assert!(!structure.is_suppressed(1));
    }
}
