//! The voxel world as seen by the growth engine.
//!
//! Writes go out through a [`VoxelWriter`]; terrain reads come in through
//! [`terrain::TerrainProbe`] and [`terrain::HeightSampler`]. Neither side knows how the
//! world is actually stored or reached.
use std::collections::BTreeMap;
use std::fmt;

use glam::IVec3;

use crate::error::Result;
use crate::prototype::BlockPayload;

pub mod batch;
pub mod terrain;

pub use batch::{BatchedWriter, BlockTransport, DEFAULT_BATCH_LIMIT, DEFAULT_SEND_RETRIES};
pub use terrain::{derive_height_maps, HeightSampler, RawHeightSampler, SiteHeights, TerrainProbe};

/// A single voxel to set in world space.
#[derive(Clone, Debug, PartialEq)]
pub struct VoxelWrite {
    pub position: IVec3,
    pub material: String,
    pub properties: BTreeMap<String, String>,
    pub payload: Option<BlockPayload>,
}

impl VoxelWrite {
    pub fn new(position: IVec3, material: impl Into<String>) -> Self {
        Self {
            position,
            material: material.into(),
            properties: BTreeMap::new(),
            payload: None,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Renders as `x y z material[key=value,...]{data}`.
impl fmt::Display for VoxelWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.position.x, self.position.y, self.position.z, self.material
        )?;
        if !self.properties.is_empty() {
            f.write_str("[")?;
            for (i, (k, v)) in self.properties.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{k}={v}")?;
            }
            f.write_str("]")?;
        }
        if let Some(payload) = &self.payload {
            write!(f, "{payload}")?;
        }
        Ok(())
    }
}

/// Accepts voxel writes. Implementations decide when queued writes actually go out.
pub trait VoxelWriter {
    /// Queues one write. Delivery failures surface from [`VoxelWriter::flush`].
    fn write_voxel(&mut self, write: VoxelWrite);

    /// Queues a solid box `[from, to]` (inclusive on both ends).
    fn fill(&mut self, from: IVec3, to: IVec3, material: &str) {
        let lo = from.min(to);
        let hi = from.max(to);
        for y in lo.y..=hi.y {
            for z in lo.z..=hi.z {
                for x in lo.x..=hi.x {
                    self.write_voxel(VoxelWrite::new(IVec3::new(x, y, z), material));
                }
            }
        }
    }

    /// Forces every queued write out.
    fn flush(&mut self) -> Result<()>;
}

/// Discards everything.
impl VoxelWriter for () {
    #[inline]
    fn write_voxel(&mut self, _write: VoxelWrite) {}

    #[inline]
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<W: VoxelWriter + ?Sized> VoxelWriter for &mut W {
    fn write_voxel(&mut self, write: VoxelWrite) {
        (**self).write_voxel(write);
    }

    fn fill(&mut self, from: IVec3, to: IVec3, material: &str) {
        (**self).fill(from, to, material);
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Keeps every write in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingWriter {
    writes: Vec<VoxelWrite>,
    flushes: usize,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> &[VoxelWrite] {
        &self.writes
    }

    pub fn into_writes(self) -> Vec<VoxelWrite> {
        self.writes
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    /// Last write at `position`.
    pub fn block_at(&self, position: IVec3) -> Option<&VoxelWrite> {
        self.writes.iter().rev().find(|w| w.position == position)
    }

    /// Final material per position after all writes.
    pub fn final_blocks(&self) -> BTreeMap<[i32; 3], &str> {
        let mut blocks = BTreeMap::new();
        for w in &self.writes {
            blocks.insert(w.position.to_array(), w.material.as_str());
        }
        blocks
    }

    pub fn clear(&mut self) {
        self.writes.clear();
        self.flushes = 0;
    }
}

impl VoxelWriter for RecordingWriter {
    fn write_voxel(&mut self, write: VoxelWrite) {
        self.writes.push(write);
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}
