//! Templates and their loading.
//!
//! - [`StructurePrototype`]: an immutable template (voxels, sidecar directives, cost).
//! - [`PrototypeRegistry`]: loads templates by name and caches them.
//! - [`TemplateSource`]: where the registry reads voxel data and sidecars from.
//! - [`properties`]: the sidecar directive types.
//! - [`materials`]: material classes used for costs, terrain and containers.
pub mod materials;
pub mod properties;
pub mod registry;
pub mod source;
pub mod structure_prototype;
pub mod voxel;

pub use properties::{
    ConnectorSpec, CustomProperties, DecorationSpec, EffectiveSpace, PillarSpec, PostProcessingStep,
};
pub use registry::PrototypeRegistry;
#[cfg(feature = "serde")]
pub use source::DirectorySource;
pub use source::{InMemorySource, TemplateSource};
pub use structure_prototype::{StructurePrototype, DEFAULT_GROUND_CLEARANCE};
pub use voxel::{BlockPayload, InventoryItem, Voxel, VoxelData};
