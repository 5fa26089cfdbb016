#![allow(dead_code)]

use std::time::Duration;

use criterion::{Criterion, Throughput};
use glam::IVec3;
use structure_growth::prelude::*;

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// A corridor network: a 5x5 hub with corridors on all sides, corridors continuing
/// straight or ending in a 3x3 room.
pub fn corridor_source() -> InMemorySource {
    let floor = "minecraft:cobblestone";
    let hub = CustomProperties::default()
        .with_connector(ConnectorSpec::new(Rotation::NORTH).with_next(["corridor"]))
        .with_connector(ConnectorSpec::new(Rotation::EAST).with_next(["corridor"]))
        .with_connector(ConnectorSpec::new(Rotation::SOUTH).with_next(["corridor"]))
        .with_connector(ConnectorSpec::new(Rotation::WEST).with_next(["corridor"]));
    let corridor = CustomProperties::default()
        .with_connector(ConnectorSpec::new(Rotation::SOUTH).with_next(["corridor"]))
        .with_connector(ConnectorSpec::new(Rotation::NORTH).with_next(["corridor", "room"]));
    InMemorySource::new()
        .with_template("hub", VoxelData::solid(IVec3::new(5, 1, 5), floor), hub)
        .with_template("corridor", VoxelData::solid(IVec3::new(3, 1, 3), floor), corridor)
        .with_bare_template("room", VoxelData::solid(IVec3::new(3, 2, 3), "minecraft:oak_planks"))
}

pub fn flat_site(extent: i32) -> GrowthSite {
    GrowthSite::flat(BuildArea::new(0, 0, extent, extent), 64).expect("valid site")
}
