//! Template kits shared by the example binaries.
use std::path::Path;

use anyhow::Context;
use glam::IVec3;
use structure_growth::prelude::*;

fn v(x: i32, y: i32, z: i32) -> IVec3 {
    IVec3::new(x, y, z)
}

/// Hollow box with a floor, four walls and a flat roof.
fn hut_shell(size: IVec3, floor: &str, walls: &str, roof: &str) -> VoxelData {
    let far = size - IVec3::ONE;
    VoxelData::new(size)
        .with_box(v(0, 0, 0), v(far.x, 0, far.z), floor)
        .with_box(v(0, 1, 0), v(far.x, far.y - 1, 0), walls)
        .with_box(v(0, 1, far.z), v(far.x, far.y - 1, far.z), walls)
        .with_box(v(0, 1, 1), v(0, far.y - 1, far.z - 1), walls)
        .with_box(v(far.x, 1, 1), v(far.x, far.y - 1, far.z - 1), walls)
        .with_box(v(1, 1, 1), v(far.x - 1, far.y - 1, far.z - 1), "minecraft:air")
        .with_box(v(0, far.y, 0), far, roof)
}

fn storage(name: &str, origin: IVec3) -> DecorationSpec {
    DecorationSpec::new(name)
        .with_origin(origin)
        .with_containers(true)
}

/// A small hamlet: a well square, gravel lanes, stilted cottages and market stalls.
///
/// Lanes branch in three directions and come back through a gate; cottages and stalls are
/// dead ends that connect back to the lane through a door.
pub fn hamlet_kit() -> InMemorySource {
    let square = CustomProperties::default()
        .with_ground_clearance(1)
        .with_connector(ConnectorSpec::new(Rotation::NORTH).with_next(["lane"]).with_transition("gate"))
        .with_connector(ConnectorSpec::new(Rotation::EAST).with_next(["lane"]).with_transition("gate"))
        .with_connector(ConnectorSpec::new(Rotation::SOUTH).with_next(["lane"]).with_transition("gate"))
        .with_connector(ConnectorSpec::new(Rotation::WEST).with_next(["lane"]).with_transition("gate"));
    let square_voxels = VoxelData::new(v(7, 2, 7))
        .with_box(v(0, 0, 0), v(6, 0, 6), "minecraft:cobblestone")
        .with_box(v(2, 1, 2), v(4, 1, 4), "minecraft:stone_bricks")
        .with_box(v(3, 1, 3), v(3, 1, 3), "minecraft:water");

    let lane = CustomProperties::default()
        .with_ground_clearance(1)
        .with_connector(ConnectorSpec::new(Rotation::SOUTH).with_transition("gate"))
        .with_connector(ConnectorSpec::new(Rotation::NORTH).with_next(["lane", "cottage", "stall"]))
        .with_connector(ConnectorSpec::new(Rotation::EAST).with_next(["cottage", "stall"]).with_transition("door"))
        .with_connector(ConnectorSpec::new(Rotation::WEST).with_next(["cottage"]).with_transition("door"))
        .with_step(PostProcessingStep::Pillars(vec![
            PillarSpec::new(0, 0, "minecraft:cobblestone"),
            PillarSpec::new(5, 2, "minecraft:cobblestone"),
        ]));
    let lane_voxels = VoxelData::solid(v(6, 1, 3), "minecraft:gravel");

    let cottage = CustomProperties::default()
        .with_ground_clearance(2)
        .with_connector(ConnectorSpec::new(Rotation::SOUTH).with_transition("door"))
        .with_step(PostProcessingStep::Pillars(vec![
            PillarSpec::new(0, 0, "minecraft:oak_log").with_ladder(Rotation::WEST),
            PillarSpec::new(4, 0, "minecraft:oak_log"),
            PillarSpec::new(0, 4, "minecraft:oak_log"),
            PillarSpec::new(4, 4, "minecraft:oak_log"),
        ]))
        .with_step(PostProcessingStep::Decorations(vec![
            Some(storage("chest", v(2, 1, 2))),
            Some(storage("barrel", v(1, 1, 3)).with_facings([Rotation::NORTH, Rotation::SOUTH])),
            None,
        ]));
    let cottage_voxels = hut_shell(
        v(5, 4, 5),
        "minecraft:spruce_planks",
        "minecraft:oak_planks",
        "minecraft:dark_oak_slab",
    );

    let stall = CustomProperties::default()
        .with_ground_clearance(1)
        .with_connector(ConnectorSpec::new(Rotation::SOUTH))
        .with_step(PostProcessingStep::Decorations(vec![Some(storage("barrel", v(1, 1, 1)))]))
        .with_step(PostProcessingStep::Decorations(vec![Some(storage("barrel", v(2, 1, 1))), None]));
    let stall_voxels = VoxelData::new(v(4, 3, 3))
        .with_box(v(0, 0, 0), v(3, 0, 2), "minecraft:oak_planks")
        .with_box(v(0, 1, 0), v(0, 1, 0), "minecraft:oak_fence")
        .with_box(v(3, 1, 0), v(3, 1, 0), "minecraft:oak_fence")
        .with_box(v(0, 2, 0), v(3, 2, 2), "minecraft:white_wool");

    InMemorySource::new()
        .with_template("square", square_voxels, square)
        .with_template("lane", lane_voxels, lane)
        .with_template("cottage", cottage_voxels, cottage)
        .with_template("stall", stall_voxels, stall)
        .with_bare_template(
            "gate",
            VoxelData::new(v(1, 2, 1))
                .with_voxel(Voxel::new(v(0, 0, 0), "minecraft:oak_fence_gate").with_property("open", "true"))
                .with_box(v(0, 1, 0), v(0, 1, 0), "minecraft:lantern"),
        )
        .with_bare_template(
            "door",
            VoxelData::new(v(1, 2, 1))
                .with_voxel(Voxel::new(v(0, 0, 0), "minecraft:oak_door").with_property("half", "lower"))
                .with_voxel(Voxel::new(v(0, 1, 0), "minecraft:oak_door").with_property("half", "upper")),
        )
        .with_bare_template("chest", VoxelData::solid(IVec3::ONE, "minecraft:chest"))
        .with_bare_template("barrel", VoxelData::solid(IVec3::ONE, "minecraft:barrel"))
}

/// Writes every template of `source` as a `.voxels.json` plus `.json` sidecar pair under `dir`.
///
/// Returns the number of templates written.
pub fn write_kit_to_dir(source: &dyn TemplateSource, dir: &Path) -> anyhow::Result<usize> {
    let names = source.names()?;
    for name in &names {
        let voxels = source
            .voxel_data(name)?
            .with_context(|| format!("template '{name}' listed but has no voxel data"))?;
        let voxel_path = dir.join(format!("{name}{}", DirectorySource::VOXEL_SUFFIX));
        if let Some(parent) = voxel_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&voxel_path, serde_json::to_vec(&voxels)?)
            .with_context(|| format!("writing {}", voxel_path.display()))?;

        if let Some(properties) = source.properties(name)? {
            let sidecar = dir.join(format!("{name}{}", DirectorySource::SIDECAR_SUFFIX));
            std::fs::write(&sidecar, serde_json::to_vec_pretty(&properties)?)
                .with_context(|| format!("writing {}", sidecar.display()))?;
        }
    }
    Ok(names.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kit_loads_without_cycles() {
        let mut registry = PrototypeRegistry::new(hamlet_kit());
        assert_eq!(registry.preload_all().unwrap(), 8);
        let cottage = registry.get("cottage").unwrap();
        assert!(cottage.decoration("chest").is_some());
        assert!(cottage.transition("door").is_some());
        assert_eq!(cottage.connectors().len(), 1);
    }

    #[test]
    fn kit_round_trips_through_a_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let written = write_kit_to_dir(&hamlet_kit(), dir.path()).unwrap();
        assert_eq!(written, 8);
        let mut registry = PrototypeRegistry::new(DirectorySource::new(dir.path()));
        assert_eq!(registry.preload_all().unwrap(), written);
        assert!(!dir.path().join("gate.json").exists());
    }
}
