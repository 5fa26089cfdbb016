//! Sidecar directives attached to a template.
//!
//! A template may come with a JSON sidecar describing how it connects to other templates
//! and what happens after it is placed:
//!
//! ```json
//! {
//!   "groundClearance": 2,
//!   "effectiveSpace": [1, 0, 1, 7, 6, 7],
//!   "connectors": [
//!     { "facing": 0, "nextStructure": ["corridor", "tower"], "transitionStructure": "door" },
//!     { "facing": 2, "transitionStructure": "door", "height": 1 }
//!   ],
//!   "postProcessing": [
//!     { "pillars": [ { "pos": [0, 0], "material": "minecraft:oak_log", "ladder": 1 } ] },
//!     { "decorations": [ null, { "decorationStructure": "table", "facing": [0, 2] } ] }
//!   ]
//! }
//! ```
//!
//! All types validate once at load through [`CustomProperties::validate`].
use glam::IVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::Rotation;

fn rotation_index(facing: u8, name: &str, what: &str) -> Result<Rotation> {
    Rotation::new(facing)
        .ok_or_else(|| Error::invalid_template(name, format!("{what} facing {facing} is outside 0..=3")))
}

/// Parsed sidecar configuration. Every key is optional.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CustomProperties {
    pub connectors: Vec<ConnectorSpec>,
    pub post_processing: Vec<PostProcessingStep>,
    pub ground_clearance: Option<i32>,
    pub effective_space: Option<EffectiveSpace>,
    pub offset: Option<[i32; 3]>,
}

impl CustomProperties {
    pub fn with_connector(mut self, connector: ConnectorSpec) -> Self {
        self.connectors.push(connector);
        self
    }

    pub fn with_step(mut self, step: PostProcessingStep) -> Self {
        self.post_processing.push(step);
        self
    }

    pub fn with_ground_clearance(mut self, clearance: i32) -> Self {
        self.ground_clearance = Some(clearance);
        self
    }

    pub fn with_effective_space(mut self, space: EffectiveSpace) -> Self {
        self.effective_space = Some(space);
        self
    }

    pub fn with_offset(mut self, offset: IVec3) -> Self {
        self.offset = Some(offset.to_array());
        self
    }

    /// Names of transition templates referenced by connectors, in declaration order.
    pub fn transition_names(&self) -> impl Iterator<Item = &str> {
        self.connectors
            .iter()
            .filter_map(|c| c.transition_structure.as_deref())
    }

    /// Names of decoration templates referenced by post-processing, in declaration order.
    pub fn decoration_names(&self) -> impl Iterator<Item = &str> {
        self.post_processing
            .iter()
            .filter_map(|step| match step {
                PostProcessingStep::Decorations(group) => Some(group),
                PostProcessingStep::Pillars(_) => None,
            })
            .flatten()
            .flatten()
            .map(|d| d.decoration_structure.as_str())
    }

    pub fn validate(&self, name: &str) -> Result<()> {
        for connector in &self.connectors {
            rotation_index(connector.facing, name, "connector")?;
            if connector.next_structure.iter().any(|n| n.is_empty()) {
                return Err(Error::invalid_template(name, "connector lists an empty next structure"));
            }
        }
        for step in &self.post_processing {
            match step {
                PostProcessingStep::Pillars(pillars) => {
                    for pillar in pillars {
                        pillar.validate(name)?;
                    }
                }
                PostProcessingStep::Decorations(group) => {
                    for decoration in group.iter().flatten() {
                        decoration.validate(name)?;
                    }
                }
            }
        }
        if let Some(clearance) = self.ground_clearance {
            if clearance < 0 {
                return Err(Error::invalid_template(name, "groundClearance must be >= 0"));
            }
        }
        if let Some(space) = &self.effective_space {
            if space.size.cmple(IVec3::ZERO).any() {
                return Err(Error::invalid_template(
                    name,
                    "effectiveSpace size must be > 0 on every axis",
                ));
            }
        }
        Ok(())
    }
}

/// An attachment point on one side of a template.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectorSpec {
    /// Side relative to the template's own rotation, `0..=3`.
    pub facing: u8,
    /// Candidate templates to grow on this side.
    #[cfg_attr(feature = "serde", serde(default))]
    pub next_structure: Vec<String>,
    /// Template stamped into this one when the connection is used.
    #[cfg_attr(feature = "serde", serde(default))]
    pub transition_structure: Option<String>,
    /// Vertical offset of the next template.
    #[cfg_attr(feature = "serde", serde(default))]
    pub height: Option<i32>,
}

impl ConnectorSpec {
    pub fn new(facing: Rotation) -> Self {
        Self {
            facing: facing.index(),
            next_structure: Vec::new(),
            transition_structure: None,
            height: None,
        }
    }

    pub fn with_next(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.next_structure.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_transition(mut self, name: impl Into<String>) -> Self {
        self.transition_structure = Some(name.into());
        self
    }

    pub fn with_height(mut self, height: i32) -> Self {
        self.height = Some(height);
        self
    }

    /// Facing as a rotation. Only meaningful after validation.
    pub fn rotation(&self) -> Rotation {
        Rotation::wrapping(self.facing as i64)
    }

    pub fn height_offset(&self) -> i32 {
        self.height.unwrap_or(0)
    }
}

/// One post-processing directive, applied in declaration order after the template is placed.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq)]
pub enum PostProcessingStep {
    /// Solid columns from the ground up to the template's base.
    Pillars(Vec<PillarSpec>),
    /// Mutually exclusive choices; exactly one entry is picked, `None` meaning "nothing".
    Decorations(Vec<Option<DecorationSpec>>),
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq)]
pub struct PillarSpec {
    /// Local `(x, z)` position inside the template.
    pub pos: [i32; 2],
    pub material: String,
    /// Side of the pillar carrying a ladder, relative to the template rotation.
    #[cfg_attr(feature = "serde", serde(default))]
    pub ladder: Option<u8>,
}

impl PillarSpec {
    pub fn new(x: i32, z: i32, material: impl Into<String>) -> Self {
        Self {
            pos: [x, z],
            material: material.into(),
            ladder: None,
        }
    }

    pub fn with_ladder(mut self, side: Rotation) -> Self {
        self.ladder = Some(side.index());
        self
    }

    pub fn ladder_side(&self) -> Option<Rotation> {
        self.ladder.map(|l| Rotation::wrapping(l as i64))
    }

    fn validate(&self, name: &str) -> Result<()> {
        if self.material.is_empty() {
            return Err(Error::invalid_template(name, "pillar without material"));
        }
        if let Some(ladder) = self.ladder {
            rotation_index(ladder, name, "ladder")?;
        }
        Ok(())
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq)]
pub struct DecorationSpec {
    pub decoration_structure: String,
    /// Allowed facings relative to the host; any facing when absent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub facing: Option<Vec<u8>>,
    /// Offset of the decoration from the host position.
    #[cfg_attr(feature = "serde", serde(default))]
    pub origin: Option<[i32; 3]>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub populate_containers: bool,
    /// Pillars laid out in the decoration's own rotation.
    #[cfg_attr(feature = "serde", serde(default))]
    pub pillars: Vec<PillarSpec>,
}

impl DecorationSpec {
    pub fn new(decoration_structure: impl Into<String>) -> Self {
        Self {
            decoration_structure: decoration_structure.into(),
            facing: None,
            origin: None,
            populate_containers: false,
            pillars: Vec::new(),
        }
    }

    pub fn with_facings(mut self, facings: impl IntoIterator<Item = Rotation>) -> Self {
        self.facing = Some(facings.into_iter().map(Rotation::index).collect());
        self
    }

    pub fn with_origin(mut self, origin: IVec3) -> Self {
        self.origin = Some(origin.to_array());
        self
    }

    pub fn with_containers(mut self, populate: bool) -> Self {
        self.populate_containers = populate;
        self
    }

    pub fn with_pillar(mut self, pillar: PillarSpec) -> Self {
        self.pillars.push(pillar);
        self
    }

    pub fn origin_offset(&self) -> IVec3 {
        self.origin.map(IVec3::from_array).unwrap_or(IVec3::ZERO)
    }

    /// Allowed facings, or `None` when any facing is allowed.
    pub fn allowed_facings(&self) -> Option<Vec<Rotation>> {
        self.facing
            .as_ref()
            .filter(|f| !f.is_empty())
            .map(|f| f.iter().map(|i| Rotation::wrapping(*i as i64)).collect())
    }

    fn validate(&self, name: &str) -> Result<()> {
        if self.decoration_structure.is_empty() {
            return Err(Error::invalid_template(name, "decoration without decorationStructure"));
        }
        for facing in self.facing.iter().flatten() {
            rotation_index(*facing, name, "decoration")?;
        }
        for pillar in &self.pillars {
            pillar.validate(name)?;
        }
        Ok(())
    }
}

/// Collision box override: local origin and size, serialized as `[ox, oy, oz, sx, sy, sz]`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "[i32; 6]", into = "[i32; 6]"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectiveSpace {
    pub origin: IVec3,
    pub size: IVec3,
}

impl EffectiveSpace {
    pub fn new(origin: IVec3, size: IVec3) -> Self {
        Self { origin, size }
    }
}

impl From<[i32; 6]> for EffectiveSpace {
    fn from(v: [i32; 6]) -> Self {
        Self {
            origin: IVec3::new(v[0], v[1], v[2]),
            size: IVec3::new(v[3], v[4], v[5]),
        }
    }
}

impl From<EffectiveSpace> for [i32; 6] {
    fn from(s: EffectiveSpace) -> Self {
        [s.origin.x, s.origin.y, s.origin.z, s.size.x, s.size.y, s.size.z]
    }
}
