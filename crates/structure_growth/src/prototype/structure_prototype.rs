use std::collections::HashMap;
use std::sync::Arc;

use glam::IVec3;

use crate::error::{Error, Result};
use crate::prototype::properties::{ConnectorSpec, CustomProperties, EffectiveSpace, PostProcessingStep};
use crate::prototype::voxel::VoxelData;

/// Clearance above the baseline used when a sidecar does not state one.
pub const DEFAULT_GROUND_CLEARANCE: i32 = 1;

/// An immutable template shared by every structure instantiated from it.
///
/// Transition and decoration templates referenced by the sidecar are resolved when the
/// prototype is built and held here by name.
#[derive(Debug)]
pub struct StructurePrototype {
    name: String,
    voxels: VoxelData,
    properties: CustomProperties,
    ground_clearance: i32,
    cost: f64,
    transitions: HashMap<String, Arc<StructurePrototype>>,
    decorations: HashMap<String, Arc<StructurePrototype>>,
}

impl StructurePrototype {
    /// Builds a prototype from decoded parts.
    ///
    /// Every transition and decoration name referenced by `properties` must be present in
    /// the matching map.
    pub fn new(
        name: impl Into<String>,
        voxels: VoxelData,
        properties: CustomProperties,
        transitions: HashMap<String, Arc<StructurePrototype>>,
        decorations: HashMap<String, Arc<StructurePrototype>>,
    ) -> Result<Self> {
        let name = name.into();
        properties.validate(&name)?;
        if voxels.size.cmple(IVec3::ZERO).any() {
            return Err(Error::invalid_template(&name, "template size must be > 0 on every axis"));
        }
        if let Some(missing) = properties.transition_names().find(|t| !transitions.contains_key(*t)) {
            return Err(Error::invalid_template(
                &name,
                format!("unknown transition structure '{missing}'"),
            ));
        }
        if let Some(missing) = properties.decoration_names().find(|d| !decorations.contains_key(*d)) {
            return Err(Error::invalid_template(
                &name,
                format!("unknown decoration structure '{missing}'"),
            ));
        }

        let ground_clearance = properties.ground_clearance.unwrap_or(DEFAULT_GROUND_CLEARANCE);
        let cost = voxels.histogram_cost();

        Ok(Self {
            name,
            voxels,
            properties,
            ground_clearance,
            cost,
            transitions,
            decorations,
        })
    }

    /// A prototype without sidecar directives.
    pub fn bare(name: impl Into<String>, voxels: VoxelData) -> Result<Self> {
        Self::new(
            name,
            voxels,
            CustomProperties::default(),
            HashMap::new(),
            HashMap::new(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Template size before any effective-space override.
    pub fn footprint(&self) -> IVec3 {
        self.voxels.size
    }

    pub fn voxels(&self) -> &VoxelData {
        &self.voxels
    }

    pub fn properties(&self) -> &CustomProperties {
        &self.properties
    }

    pub fn connectors(&self) -> &[ConnectorSpec] {
        &self.properties.connectors
    }

    pub fn post_processing(&self) -> &[PostProcessingStep] {
        &self.properties.post_processing
    }

    pub fn effective_space(&self) -> Option<EffectiveSpace> {
        self.properties.effective_space
    }

    pub fn offset(&self) -> IVec3 {
        self.properties.offset.map(IVec3::from_array).unwrap_or(IVec3::ZERO)
    }

    pub fn ground_clearance(&self) -> i32 {
        self.ground_clearance
    }

    /// Material-histogram cost, computed once at construction.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn transition(&self, name: &str) -> Option<&Arc<StructurePrototype>> {
        self.transitions.get(name)
    }

    pub fn decoration(&self, name: &str) -> Option<&Arc<StructurePrototype>> {
        self.decorations.get(name)
    }

    pub fn shortest_horizontal_side(&self) -> i32 {
        self.voxels.size.x.abs().min(self.voxels.size.z.abs())
    }

    pub fn longest_horizontal_side(&self) -> i32 {
        self.voxels.size.x.abs().max(self.voxels.size.z.abs())
    }

    pub fn material_list(&self) -> Vec<&str> {
        self.voxels.material_list()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rotation;
    use crate::prototype::properties::DecorationSpec;
    use crate::prototype::voxel::Voxel;

    #[test]
    fn cost_and_clearance_defaults() {
        let voxels = VoxelData::new(IVec3::new(3, 1, 2))
            .with_box(IVec3::ZERO, IVec3::new(2, 0, 0), "minecraft:cobblestone")
            .with_voxel(Voxel::new(IVec3::new(0, 0, 1), "minecraft:oak_stairs"))
            .with_voxel(Voxel::new(IVec3::new(1, 0, 1), "minecraft:air"))
            .with_voxel(Voxel::new(IVec3::new(2, 0, 1), "minecraft:jukebox"));
        let proto = StructurePrototype::bare("hut", voxels).unwrap();
        assert_eq!(proto.cost(), 7.5);
        assert_eq!(proto.ground_clearance(), DEFAULT_GROUND_CLEARANCE);
        assert_eq!(proto.shortest_horizontal_side(), 2);
        assert_eq!(proto.longest_horizontal_side(), 3);
        assert!(proto.connectors().is_empty());
    }

    #[test]
    fn missing_sub_prototype_is_rejected() {
        let props = CustomProperties::default()
            .with_connector(ConnectorSpec::new(Rotation::NORTH).with_transition("door"));
        let err = StructurePrototype::new(
            "hall",
            VoxelData::solid(IVec3::ONE, "minecraft:stone"),
            props,
            HashMap::new(),
            HashMap::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("door"));

        let props = CustomProperties::default().with_step(PostProcessingStep::Decorations(vec![Some(
            DecorationSpec::new("vase"),
        )]));
        let err = StructurePrototype::new(
            "hall",
            VoxelData::solid(IVec3::ONE, "minecraft:stone"),
            props,
            HashMap::new(),
            HashMap::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("vase"));
    }

    #[test]
    fn empty_template_is_rejected() {
        assert!(StructurePrototype::bare("void", VoxelData::new(IVec3::new(0, 1, 1))).is_err());
    }
}
