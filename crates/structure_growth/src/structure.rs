//! Positioned, rotated instances of a [`StructurePrototype`].
//!
//! A [`Structure`] never mutates its prototype. Material substitutions, suppressed voxels
//! and attached payloads are per instance.
//!
//! Rotation happens about the vertical axis through the horizontal center of the
//! effective box. When exactly one horizontal side has even length the center would sit
//! half a voxel off the lattice on one axis only; it is floored on both axes instead so
//! every voxel still maps onto a voxel.
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use glam::{DVec3, IVec3};

use crate::geometry::{rotate_point_around_origin, BlockBox, Rotation};
use crate::prototype::materials;
use crate::prototype::{BlockPayload, StructurePrototype, Voxel};
use crate::world::{VoxelWrite, VoxelWriter};

#[derive(Clone, Debug, PartialEq)]
enum VoxelOverride {
    Suppressed,
    Payload(BlockPayload),
}

#[derive(Clone, Debug)]
pub struct Structure {
    prototype: Arc<StructurePrototype>,
    position: IVec3,
    rotation: Rotation,
    origin: IVec3,
    size: IVec3,
    replacements: HashMap<String, String>,
    overrides: HashMap<usize, VoxelOverride>,
}

impl Structure {
    /// Instantiates `prototype` at `position`.
    ///
    /// The prototype's `effectiveSpace` replaces the local origin and size, and its
    /// `offset` shifts the position.
    pub fn new(prototype: Arc<StructurePrototype>, position: IVec3, rotation: Rotation) -> Self {
        let (origin, size) = match prototype.effective_space() {
            Some(space) => (space.origin, space.size),
            None => (IVec3::ZERO, prototype.footprint()),
        };
        let position = position + prototype.offset();
        Self {
            prototype,
            position,
            rotation,
            origin,
            size,
            replacements: HashMap::new(),
            overrides: HashMap::new(),
        }
    }

    pub fn prototype(&self) -> &Arc<StructurePrototype> {
        &self.prototype
    }

    pub fn name(&self) -> &str {
        self.prototype.name()
    }

    pub fn position(&self) -> IVec3 {
        self.position
    }

    pub fn set_position(&mut self, position: IVec3) {
        self.position = position;
    }

    pub fn translate(&mut self, delta: IVec3) {
        self.position += delta;
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Local origin of the effective box.
    pub fn local_origin(&self) -> IVec3 {
        self.origin
    }

    /// Size of the effective box before rotation.
    pub fn size(&self) -> IVec3 {
        self.size
    }

    pub fn set_origin(&mut self, origin: IVec3) {
        self.origin = origin;
    }

    pub fn set_size(&mut self, size: IVec3) {
        self.size = size;
    }

    /// Writes `replacement` wherever the template has `existing`.
    pub fn replace_material(&mut self, existing: impl Into<String>, replacement: impl Into<String>) {
        self.replacements.insert(existing.into(), replacement.into());
    }

    pub fn replace_materials<'m>(&mut self, table: impl IntoIterator<Item = (&'m String, &'m String)>) {
        for (existing, replacement) in table {
            self.replace_material(existing.clone(), replacement.clone());
        }
    }

    /// Material written for `voxel` after substitutions.
    pub fn material_of<'a>(&'a self, voxel: &'a Voxel) -> &'a str {
        self.replacements
            .get(&voxel.material)
            .map(String::as_str)
            .unwrap_or(&voxel.material)
    }

    /// Skips the voxel at `index` (into the prototype's voxel list) on placement.
    pub fn suppress_voxel(&mut self, index: usize) {
        self.overrides.insert(index, VoxelOverride::Suppressed);
    }

    pub fn is_suppressed(&self, index: usize) -> bool {
        matches!(self.overrides.get(&index), Some(VoxelOverride::Suppressed))
    }

    /// Attaches a payload to the voxel at `index`, replacing the template's own.
    pub fn set_payload(&mut self, index: usize, payload: BlockPayload) {
        self.overrides.insert(index, VoxelOverride::Payload(payload));
    }

    pub fn payload_of(&self, index: usize) -> Option<&BlockPayload> {
        match self.overrides.get(&index) {
            Some(VoxelOverride::Payload(p)) => Some(p),
            Some(VoxelOverride::Suppressed) => None,
            None => self
                .prototype
                .voxels()
                .voxels
                .get(index)
                .and_then(|v| v.payload.as_ref()),
        }
    }

    /// Rotation pivot in local coordinates.
    pub fn horizontal_center(&self) -> DVec3 {
        let half = (self.size - IVec3::ONE).as_dvec3() * 0.5;
        let mut center = self.origin.as_dvec3() + half;
        if (center.x.fract() != 0.0) != (center.z.fract() != 0.0) {
            center.x = center.x.floor();
            center.z = center.z.floor();
        }
        DVec3::new(center.x, self.origin.y as f64, center.z)
    }

    /// Maps a local voxel position to world space.
    pub fn local_to_world(&self, local: IVec3) -> IVec3 {
        rotate_point_around_origin(self.horizontal_center(), local, self.rotation) + self.position
    }

    /// World-space effective box after rotation.
    pub fn world_box(&self) -> BlockBox {
        let pivot = self.horizontal_center();
        let a = rotate_point_around_origin(pivot, self.origin, self.rotation);
        let b = rotate_point_around_origin(pivot, self.origin + self.size - IVec3::ONE, self.rotation);
        let lo = a.min(b);
        let hi = a.max(b);
        BlockBox::new(lo + self.position, hi - lo + IVec3::ONE)
    }

    pub fn world_origin(&self) -> IVec3 {
        self.world_box().min
    }

    /// Exclusive far corner of [`Structure::world_box`].
    pub fn world_far_corner(&self) -> IVec3 {
        self.world_box().max()
    }

    /// Moves the structure so its world box starts at `min`.
    pub fn move_box_to(&mut self, min: IVec3) {
        let delta = min - self.world_origin();
        self.translate(delta);
    }

    /// Block state adjusted for this instance's rotation.
    pub fn rotate_properties(&self, properties: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        let mut out = properties.clone();
        if self.rotation == Rotation::NORTH {
            return out;
        }
        if let Some(facing) = out.get_mut("facing") {
            if let Some(r) = Rotation::from_compass(facing) {
                *facing = r.then(self.rotation).compass_name().to_owned();
            }
        }
        if self.rotation.swaps_axes() {
            if let Some(axis) = out.get_mut("axis") {
                match axis.as_str() {
                    "x" => *axis = "z".to_owned(),
                    "z" => *axis = "x".to_owned(),
                    _ => {}
                }
            }
        }
        out
    }

    /// World writes for this instance, in template order.
    ///
    /// Structure-void and suppressed voxels are skipped, air too unless `include_air`.
    pub fn voxel_writes(&self, include_air: bool) -> Vec<VoxelWrite> {
        let pivot = self.horizontal_center();
        let mut writes = Vec::with_capacity(self.prototype.voxels().voxels.len());
        for (index, voxel) in self.prototype.voxels().voxels.iter().enumerate() {
            if self.is_suppressed(index) {
                continue;
            }
            let material = self.material_of(voxel);
            if materials::is_structure_void(material) {
                continue;
            }
            if !include_air && materials::is_air(material) {
                continue;
            }
            writes.push(VoxelWrite {
                position: rotate_point_around_origin(pivot, voxel.pos, self.rotation) + self.position,
                material: material.to_owned(),
                properties: self.rotate_properties(&voxel.properties),
                payload: self.payload_of(index).cloned(),
            });
        }
        writes
    }

    /// Queues this instance's voxels on `writer`, returning how many were written.
    ///
    /// Flushing is left to the writer's owner.
    pub fn place(&self, writer: &mut dyn VoxelWriter, include_air: bool) -> usize {
        let writes = self.voxel_writes(include_air);
        let count = writes.len();
        for write in writes {
            writer.write_voxel(write);
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prototype::{CustomProperties, EffectiveSpace, InventoryItem, VoxelData};
    use crate::world::RecordingWriter;

    fn proto(voxels: VoxelData, props: CustomProperties) -> Arc<StructurePrototype> {
        Arc::new(
            StructurePrototype::new("t", voxels, props, Default::default(), Default::default()).unwrap(),
        )
    }

    fn bar() -> Arc<StructurePrototype> {
        // 3 x 1 x 1 bar along +X with a marker at the far end.
        let voxels = VoxelData::new(IVec3::new(3, 1, 1))
            .with_voxel(Voxel::new(IVec3::new(0, 0, 0), "minecraft:stone"))
            .with_voxel(Voxel::new(IVec3::new(1, 0, 0), "minecraft:stone"))
            .with_voxel(
                Voxel::new(IVec3::new(2, 0, 0), "minecraft:oak_log").with_property("axis", "x"),
            );
        proto(voxels, CustomProperties::default())
    }

    #[test]
    fn unrotated_box_is_position_plus_size() {
        let s = Structure::new(bar(), IVec3::new(10, 64, -3), Rotation::NORTH);
        assert_eq!(s.world_box(), BlockBox::new(IVec3::new(10, 64, -3), IVec3::new(3, 1, 1)));
        assert_eq!(s.world_far_corner(), IVec3::new(13, 65, -2));
    }

    #[test]
    fn odd_rotation_swaps_footprint() {
        let s = Structure::new(bar(), IVec3::ZERO, Rotation::EAST);
        let b = s.world_box();
        assert_eq!(b.size, IVec3::new(1, 1, 3));
        let writes = s.voxel_writes(false);
        assert_eq!(writes.len(), 3);
        for w in &writes {
            assert!(b.min.x <= w.position.x && w.position.x < b.max().x);
            assert!(b.min.z <= w.position.z && w.position.z < b.max().z);
        }
        let log = writes.iter().find(|w| w.material == "minecraft:oak_log").unwrap();
        assert_eq!(log.properties.get("axis").map(String::as_str), Some("z"));
    }

    #[test]
    fn square_box_is_rotation_invariant() {
        let p = proto(VoxelData::solid(IVec3::new(4, 2, 4), "minecraft:stone"), CustomProperties::default());
        let boxes: Vec<_> = Rotation::ALL
            .iter()
            .map(|r| Structure::new(p.clone(), IVec3::new(5, 0, 5), *r).world_box())
            .collect();
        assert!(boxes.iter().all(|b| *b == boxes[0]));
    }

    #[test]
    fn mixed_parity_box_keeps_voxels_inside() {
        let p = proto(VoxelData::solid(IVec3::new(4, 1, 3), "minecraft:stone"), CustomProperties::default());
        for r in Rotation::ALL {
            let s = Structure::new(p.clone(), IVec3::ZERO, r);
            let b = s.world_box();
            assert_eq!(b.horizontal_area(), 12);
            let mut seen = std::collections::HashSet::new();
            for w in s.voxel_writes(false) {
                assert!(b.min.x <= w.position.x && w.position.x < b.max().x, "{r:?}");
                assert!(b.min.z <= w.position.z && w.position.z < b.max().z, "{r:?}");
                assert!(seen.insert(w.position.to_array()), "{r:?} maps two voxels together");
            }
        }
    }

    #[test]
    fn facing_advances_through_compass() {
        let s = Structure::new(bar(), IVec3::ZERO, Rotation::SOUTH);
        let props: BTreeMap<_, _> = [("facing".to_owned(), "west".to_owned())].into();
        assert_eq!(s.rotate_properties(&props)["facing"], "east");
        let up: BTreeMap<_, _> = [("facing".to_owned(), "up".to_owned())].into();
        assert_eq!(s.rotate_properties(&up)["facing"], "up");
        // Even rotations leave axes alone.
        let axis: BTreeMap<_, _> = [("axis".to_owned(), "x".to_owned())].into();
        assert_eq!(s.rotate_properties(&axis)["axis"], "x");
    }

    #[test]
    fn void_and_air_are_skipped_unless_requested() {
        let voxels = VoxelData::new(IVec3::new(3, 1, 1))
            .with_voxel(Voxel::new(IVec3::new(0, 0, 0), "minecraft:stone"))
            .with_voxel(Voxel::new(IVec3::new(1, 0, 0), "minecraft:air"))
            .with_voxel(Voxel::new(IVec3::new(2, 0, 0), "minecraft:structure_void"));
        let s = Structure::new(proto(voxels, CustomProperties::default()), IVec3::ZERO, Rotation::NORTH);
        assert_eq!(s.voxel_writes(false).len(), 1);
        assert_eq!(s.voxel_writes(true).len(), 2);

        let mut writer = RecordingWriter::new();
        assert_eq!(s.place(&mut writer, true), 2);
        assert_eq!(writer.len(), 2);
        assert_eq!(writer.flush_count(), 0);
    }

    #[test]
    fn instance_changes_leave_prototype_untouched() {
        let p = bar();
        let mut s = Structure::new(p.clone(), IVec3::ZERO, Rotation::NORTH);
        s.replace_material("minecraft:stone", "minecraft:gold_block");
        s.suppress_voxel(2);
        let writes = s.voxel_writes(false);
        assert_eq!(writes.len(), 2);
        assert!(writes.iter().all(|w| w.material == "minecraft:gold_block"));
        assert_eq!(p.voxels().voxels[0].material, "minecraft:stone");

        let other = Structure::new(p, IVec3::ZERO, Rotation::NORTH);
        assert_eq!(other.voxel_writes(false).len(), 3);
    }

    #[test]
    fn payload_override_is_written() {
        let voxels = VoxelData::new(IVec3::ONE).with_voxel(Voxel::new(IVec3::ZERO, "minecraft:barrel"));
        let mut s = Structure::new(proto(voxels, CustomProperties::default()), IVec3::ZERO, Rotation::NORTH);
        let payload = BlockPayload::Inventory(vec![InventoryItem::new(0, 1, "minecraft:dirt")]);
        s.set_payload(0, payload.clone());
        assert_eq!(s.voxel_writes(false)[0].payload, Some(payload));
    }

    #[test]
    fn effective_space_and_offset_apply() {
        let props = CustomProperties::default()
            .with_effective_space(EffectiveSpace::new(IVec3::new(1, 0, 1), IVec3::new(3, 2, 3)))
            .with_offset(IVec3::new(0, -1, 0));
        let p = proto(VoxelData::solid(IVec3::new(5, 2, 5), "minecraft:stone"), props);
        let s = Structure::new(p, IVec3::new(10, 70, 10), Rotation::WEST);
        assert_eq!(s.position(), IVec3::new(10, 69, 10));
        assert_eq!(s.world_box(), BlockBox::new(IVec3::new(11, 69, 11), IVec3::new(3, 2, 3)));
    }

    #[test]
    fn move_box_to_aligns_world_origin() {
        let mut s = Structure::new(bar(), IVec3::ZERO, Rotation::EAST);
        s.move_box_to(IVec3::new(7, 3, -2));
        assert_eq!(s.world_origin(), IVec3::new(7, 3, -2));
    }
}
