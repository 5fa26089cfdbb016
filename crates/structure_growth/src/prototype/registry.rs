//! Name-keyed cache of loaded prototypes.
//!
//! This module provides [`PrototypeRegistry`], which loads templates from a
//! [`TemplateSource`] on first use and hands out shared [`StructurePrototype`]s afterwards.
//!
//! Typical usage:
//! - Look up a prototype with [`PrototypeRegistry::load`] by name.
//! - Warm the cache for a whole template set with [`PrototypeRegistry::preload`] or
//!   [`PrototypeRegistry::preload_all`].
//!
//! Transition and decoration templates are loaded transitively and cached under their own
//! names. A template that (directly or indirectly) references itself that way is rejected.
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::prototype::source::TemplateSource;
use crate::prototype::structure_prototype::StructurePrototype;

pub struct PrototypeRegistry {
    source: Box<dyn TemplateSource>,
    entries: HashMap<String, Arc<StructurePrototype>>,
}

impl PrototypeRegistry {
    pub fn new(source: impl TemplateSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            entries: HashMap::new(),
        }
    }

    /// Gets a cached prototype without touching the source.
    pub fn get(&self, name: &str) -> Option<Arc<StructurePrototype>> {
        self.entries.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Inserts an already built prototype under its own name, replacing any previous entry.
    pub fn insert(&mut self, prototype: StructurePrototype) -> Arc<StructurePrototype> {
        let prototype = Arc::new(prototype);
        self.entries
            .insert(prototype.name().to_owned(), prototype.clone());
        prototype
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<StructurePrototype>> {
        self.entries.remove(name)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of every cached prototype, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Gets the prototype for `name`, loading and caching it if necessary.
    ///
    /// Repeated calls return the same shared instance.
    pub fn load(&mut self, name: &str) -> Result<Arc<StructurePrototype>> {
        let mut loading = Vec::new();
        self.load_inner(name, &mut loading)
    }

    /// Loads every named template.
    pub fn preload<'n>(&mut self, names: impl IntoIterator<Item = &'n str>) -> Result<()> {
        for name in names {
            self.load(name)?;
        }
        Ok(())
    }

    /// Loads every template the source can enumerate, returning how many were loaded.
    pub fn preload_all(&mut self) -> Result<usize> {
        let names = self.source.names()?;
        for name in &names {
            self.load(name)?;
        }
        Ok(names.len())
    }

    fn load_inner(&mut self, name: &str, loading: &mut Vec<String>) -> Result<Arc<StructurePrototype>> {
        if let Some(entry) = self.entries.get(name) {
            return Ok(entry.clone());
        }
        if loading.iter().any(|n| n == name) {
            let mut chain = loading.clone();
            chain.push(name.to_owned());
            return Err(Error::TemplateCycle { chain });
        }

        let voxels = self
            .source
            .voxel_data(name)?
            .ok_or_else(|| Error::TemplateNotFound { name: name.to_owned() })?;
        let properties = self.source.properties(name)?.unwrap_or_default();
        properties.validate(name)?;

        loading.push(name.to_owned());
        let mut transitions = HashMap::new();
        for sub in properties.transition_names() {
            if !transitions.contains_key(sub) {
                let proto = self.load_inner(sub, loading)?;
                transitions.insert(sub.to_owned(), proto);
            }
        }
        let mut decorations = HashMap::new();
        for sub in properties.decoration_names() {
            if !decorations.contains_key(sub) {
                let proto = self.load_inner(sub, loading)?;
                decorations.insert(sub.to_owned(), proto);
            }
        }
        loading.pop();

        let prototype = StructurePrototype::new(name, voxels, properties, transitions, decorations)?;
        debug!(
            "Loaded template '{}' (cost {:.1}, {} connectors).",
            name,
            prototype.cost(),
            prototype.connectors().len()
        );
        Ok(self.insert(prototype))
    }
}

impl std::fmt::Debug for PrototypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrototypeRegistry")
            .field("entries", &self.names())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use glam::IVec3;

    use super::*;
    use crate::geometry::Rotation;
    use crate::prototype::properties::{
        ConnectorSpec, CustomProperties, DecorationSpec, PostProcessingStep,
    };
    use crate::prototype::source::InMemorySource;
    use crate::prototype::voxel::VoxelData;

    fn stone(size: i32) -> VoxelData {
        VoxelData::solid(IVec3::splat(size), "minecraft:stone")
    }

    fn door_to(next: &str) -> CustomProperties {
        CustomProperties::default()
            .with_connector(ConnectorSpec::new(Rotation::NORTH).with_transition(next))
    }

    #[test]
    fn loads_transitively_and_caches_by_name() {
        let source = InMemorySource::new()
            .with_template("hall", stone(3), door_to("door").with_step(
                PostProcessingStep::Decorations(vec![None, Some(DecorationSpec::new("lamp"))]),
            ))
            .with_bare_template("door", stone(1))
            .with_bare_template("lamp", stone(1));
        let mut registry = PrototypeRegistry::new(source);

        let hall = registry.load("hall").expect("hall loads");
        assert_eq!(registry.names(), vec!["door", "hall", "lamp"]);
        assert!(hall.transition("door").is_some());
        assert!(hall.decoration("lamp").is_some());

        // Sub-prototypes are the cached instances, not copies.
        let door = registry.get("door").expect("door cached");
        assert!(Arc::ptr_eq(&door, hall.transition("door").unwrap()));

        let again = registry.load("hall").unwrap();
        assert!(Arc::ptr_eq(&hall, &again));
    }

    #[test]
    fn missing_voxel_data_is_fatal() {
        let source = InMemorySource::new().with_template("hall", stone(3), door_to("door"));
        let mut registry = PrototypeRegistry::new(source);
        let err = registry.load("hall").unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound { ref name } if name == "door"));
        assert!(registry.is_empty());
    }

    #[test]
    fn reference_cycles_are_rejected() {
        let source = InMemorySource::new()
            .with_template("a", stone(1), door_to("b"))
            .with_template("b", stone(1), door_to("c"))
            .with_template("c", stone(1), door_to("a"));
        let mut registry = PrototypeRegistry::new(source);
        let err = registry.load("a").unwrap_err();
        match err {
            Error::TemplateCycle { chain } => assert_eq!(chain, vec!["a", "b", "c", "a"]),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn next_structure_references_may_loop() {
        let hub = CustomProperties::default()
            .with_connector(ConnectorSpec::new(Rotation::NORTH).with_next(["corridor"]));
        let corridor = CustomProperties::default()
            .with_connector(ConnectorSpec::new(Rotation::NORTH).with_next(["hub"]));
        let source = InMemorySource::new()
            .with_template("hub", stone(4), hub)
            .with_template("corridor", stone(2), corridor);
        let mut registry = PrototypeRegistry::new(source);
        assert_eq!(registry.preload_all().unwrap(), 2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn clear_and_remove_drop_entries() {
        let source = InMemorySource::new().with_bare_template("post", stone(1));
        let mut registry = PrototypeRegistry::new(source);
        registry.preload(["post"]).unwrap();
        assert!(registry.contains("post"));
        assert!(registry.remove("post").is_some());
        assert!(!registry.contains("post"));
        registry.load("post").unwrap();
        registry.clear();
        assert!(registry.is_empty());
    }
}
