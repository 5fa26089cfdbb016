//! Decoded voxel content of a template.
//!
//! Binary template formats are decoded elsewhere; this is the neutral shape every
//! [`crate::prototype::TemplateSource`] hands to the registry.
use std::collections::BTreeMap;
use std::fmt;

use glam::IVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::prototype::materials;

/// Template size and voxel list. Positions are local, `0..size` on every axis.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VoxelData {
    pub size: IVec3,
    #[cfg_attr(feature = "serde", serde(default))]
    pub voxels: Vec<Voxel>,
}

impl VoxelData {
    pub fn new(size: IVec3) -> Self {
        Self {
            size,
            voxels: Vec::new(),
        }
    }

    pub fn with_voxel(mut self, voxel: Voxel) -> Self {
        self.voxels.push(voxel);
        self
    }

    /// Fills the box `[from, to]` (inclusive) with `material`.
    pub fn with_box(mut self, from: IVec3, to: IVec3, material: &str) -> Self {
        let lo = from.min(to);
        let hi = from.max(to);
        for y in lo.y..=hi.y {
            for z in lo.z..=hi.z {
                for x in lo.x..=hi.x {
                    self.voxels.push(Voxel::new(IVec3::new(x, y, z), material));
                }
            }
        }
        self
    }

    /// A solid block of `material` filling the whole template.
    pub fn solid(size: IVec3, material: &str) -> Self {
        Self::new(size).with_box(IVec3::ZERO, size - IVec3::ONE, material)
    }

    pub fn voxel_at(&self, pos: IVec3) -> Option<&Voxel> {
        self.voxels.iter().find(|v| v.pos == pos)
    }

    /// Distinct materials in first-seen order.
    pub fn material_list(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for voxel in &self.voxels {
            if !seen.contains(&voxel.material.as_str()) {
                seen.push(&voxel.material);
            }
        }
        seen
    }

    /// Summed material cost over all voxels.
    pub fn histogram_cost(&self) -> f64 {
        self.voxels
            .iter()
            .map(|v| materials::material_cost(&v.material))
            .sum()
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Voxel {
    pub pos: IVec3,
    pub material: String,
    /// Block state such as `facing` or `axis`.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "BTreeMap::is_empty"))]
    pub properties: BTreeMap<String, String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub payload: Option<BlockPayload>,
}

impl Voxel {
    pub fn new(pos: IVec3, material: impl Into<String>) -> Self {
        Self {
            pos,
            material: material.into(),
            properties: BTreeMap::new(),
            payload: None,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_payload(mut self, payload: BlockPayload) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Extra block data written alongside a voxel.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq)]
pub enum BlockPayload {
    /// Container contents.
    Inventory(Vec<InventoryItem>),
    /// Opaque block data passed through verbatim.
    Data(String),
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InventoryItem {
    pub slot: u8,
    pub count: u8,
    pub id: String,
}

impl InventoryItem {
    pub fn new(slot: u8, count: u8, id: impl Into<String>) -> Self {
        Self {
            slot,
            count,
            id: id.into(),
        }
    }

    /// Item placed at a grid position of `container`; `None` if it is not a container.
    pub fn at(container: &str, column: u8, row: u8, count: u8, id: impl Into<String>) -> Option<Self> {
        let grid = materials::container_grid(container)?;
        Some(Self::new(materials::slot_index(grid, column, row), count, id))
    }
}

impl fmt::Display for BlockPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockPayload::Inventory(items) => {
                f.write_str("{Items:[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(
                        f,
                        "{{Slot:{}b,Count:{}b,id:\"{}\"}}",
                        item.slot, item.count, item.id
                    )?;
                }
                f.write_str("]}")
            }
            BlockPayload::Data(data) => f.write_str(data),
        }
    }
}
