//! Where template data comes from.
//!
//! The registry only needs two lookups per template name: voxel data (mandatory) and the
//! sidecar directives (optional). [`InMemorySource`] serves prebuilt templates;
//! [`DirectorySource`] reads JSON files from disk.
use std::collections::BTreeMap;
#[cfg(feature = "serde")]
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::prototype::properties::CustomProperties;
use crate::prototype::voxel::VoxelData;

/// Supplies decoded templates by name.
pub trait TemplateSource {
    /// Voxel data, or `None` when the template does not exist.
    fn voxel_data(&self, name: &str) -> Result<Option<VoxelData>>;

    /// Sidecar directives, or `None` when the template has none.
    fn properties(&self, name: &str) -> Result<Option<CustomProperties>>;

    /// Every template name this source can serve, if enumerable.
    fn names(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Templates held in memory, keyed by name.
#[derive(Clone, Debug, Default)]
pub struct InMemorySource {
    templates: BTreeMap<String, (VoxelData, Option<CustomProperties>)>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, voxels: VoxelData, properties: Option<CustomProperties>) {
        self.templates.insert(name.into(), (voxels, properties));
    }

    pub fn with_template(mut self, name: impl Into<String>, voxels: VoxelData, properties: CustomProperties) -> Self {
        self.insert(name, voxels, Some(properties));
        self
    }

    pub fn with_bare_template(mut self, name: impl Into<String>, voxels: VoxelData) -> Self {
        self.insert(name, voxels, None);
        self
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl TemplateSource for InMemorySource {
    fn voxel_data(&self, name: &str) -> Result<Option<VoxelData>> {
        Ok(self.templates.get(name).map(|(v, _)| v.clone()))
    }

    fn properties(&self, name: &str) -> Result<Option<CustomProperties>> {
        Ok(self.templates.get(name).and_then(|(_, p)| p.clone()))
    }

    fn names(&self) -> Result<Vec<String>> {
        Ok(self.templates.keys().cloned().collect())
    }
}

/// Templates stored as `<root>/<name>.voxels.json` with an optional `<root>/<name>.json` sidecar.
///
/// Names may contain `/` to address templates in subdirectories.
#[cfg(feature = "serde")]
#[derive(Clone, Debug)]
pub struct DirectorySource {
    root: PathBuf,
}

#[cfg(feature = "serde")]
impl DirectorySource {
    pub const VOXEL_SUFFIX: &'static str = ".voxels.json";
    pub const SIDECAR_SUFFIX: &'static str = ".json";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str, suffix: &str) -> PathBuf {
        self.root.join(format!("{name}{suffix}"))
    }

    fn collect_names(&self, dir: &Path, prefix: &str, out: &mut Vec<String>) -> Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|f| f.to_str()) else {
                continue;
            };
            if path.is_dir() {
                let nested = format!("{prefix}{file_name}/");
                self.collect_names(&path, &nested, out)?;
            } else if let Some(stem) = file_name.strip_suffix(Self::VOXEL_SUFFIX) {
                out.push(format!("{prefix}{stem}"));
            }
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl TemplateSource for DirectorySource {
    fn voxel_data(&self, name: &str) -> Result<Option<VoxelData>> {
        let path = self.path_for(name, Self::VOXEL_SUFFIX);
        if !path.is_file() {
            return Ok(None);
        }
        let bytes = std::fs::read(&path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn properties(&self, name: &str) -> Result<Option<CustomProperties>> {
        let path = self.path_for(name, Self::SIDECAR_SUFFIX);
        if !path.is_file() {
            return Ok(None);
        }
        let bytes = std::fs::read(&path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        self.collect_names(&self.root, "", &mut names)?;
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use glam::IVec3;

    use super::*;

    #[test]
    fn in_memory_source_serves_inserted_templates() {
        let source = InMemorySource::new()
            .with_bare_template("crate", VoxelData::solid(IVec3::ONE, "minecraft:barrel"))
            .with_template(
                "hut",
                VoxelData::solid(IVec3::new(3, 2, 3), "minecraft:oak_planks"),
                CustomProperties::default().with_ground_clearance(0),
            );

        assert_eq!(source.len(), 2);
        assert!(source.voxel_data("crate").unwrap().is_some());
        assert!(source.properties("crate").unwrap().is_none());
        assert_eq!(
            source.properties("hut").unwrap().unwrap().ground_clearance,
            Some(0)
        );
        assert!(source.voxel_data("missing").unwrap().is_none());
        assert_eq!(source.names().unwrap(), vec!["crate", "hut"]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn directory_source_reads_json_pairs() {
        let dir = tempfile::TempDir::new().expect("failed to create temp dir");
        let root = dir.path();
        std::fs::create_dir_all(root.join("lab")).unwrap();

        let voxels = VoxelData::solid(IVec3::new(2, 1, 2), "minecraft:stone");
        std::fs::write(
            root.join("lab/hub.voxels.json"),
            serde_json::to_vec(&voxels).unwrap(),
        )
        .unwrap();
        std::fs::write(root.join("lab/hub.json"), br#"{ "groundClearance": 3 }"#).unwrap();
        std::fs::write(
            root.join("post.voxels.json"),
            serde_json::to_vec(&VoxelData::solid(IVec3::ONE, "minecraft:oak_log")).unwrap(),
        )
        .unwrap();

        let source = DirectorySource::new(root);
        assert_eq!(source.voxel_data("lab/hub").unwrap(), Some(voxels));
        assert_eq!(
            source.properties("lab/hub").unwrap().unwrap().ground_clearance,
            Some(3)
        );
        assert!(source.properties("post").unwrap().is_none());
        assert!(source.voxel_data("nope").unwrap().is_none());
        assert_eq!(source.names().unwrap(), vec!["lab/hub", "post"]);
    }
}
