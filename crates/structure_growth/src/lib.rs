#![forbid(unsafe_code)]
//! structure_growth: budget-constrained procedural growth of connected prefab structures.
//!
//! Modules:
//! - geometry: rotations, voxel boxes, adjacency and world-anchored 2D grids
//! - prototype: voxel templates, sidecar directives, template sources and the registry
//! - structure: positioned and rotated template instances
//! - world: voxel writers, batched transport and terrain sampling
//! - growth: nodes, selection, budget, post-processing, runner and events
//!
//! For examples and docs, see README and docs.rs.
pub mod error;
pub mod geometry;
pub mod growth;
pub mod prototype;
pub mod random;
pub mod structure;
pub mod world;

/// Convenient re-exports for common types. Import with `use structure_growth::prelude::*;`.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{
        get_next_position, rotate_point_around_origin, BlockBox, BuildArea, Grid2, HeightMap,
        OccupancyGrid, Rotation,
    };
    pub use crate::growth::events::{
        EventSink, FnSink, GrowthEvent, GrowthEventKind, MultiSink, VecSink,
    };
    pub use crate::growth::node::{Anchor, ConnectorOutcome, Node, NodeState, Placability, Rejection};
    pub use crate::growth::runner::{GrowthResult, GrowthRunner, PlacedStructure, RunConfig, Start};
    pub use crate::growth::selection::{pick_cheapest, pick_inverse_cost, SelectionStrategy};
    pub use crate::growth::{ConstructionBudget, ContainerOptions, GrowthContext, GrowthSite};
    #[cfg(feature = "serde")]
    pub use crate::prototype::DirectorySource;
    pub use crate::prototype::{
        BlockPayload, ConnectorSpec, CustomProperties, DecorationSpec, EffectiveSpace,
        InMemorySource, InventoryItem, PillarSpec, PostProcessingStep, PrototypeRegistry,
        StructurePrototype, TemplateSource, Voxel, VoxelData,
    };
    pub use crate::structure::Structure;
    pub use crate::world::{
        BatchedWriter, BlockTransport, HeightSampler, RawHeightSampler, RecordingWriter,
        SiteHeights, TerrainProbe, VoxelWrite, VoxelWriter,
    };
}
