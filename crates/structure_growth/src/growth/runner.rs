//! High-level runner for growing a layout from a starting template.
use std::collections::BTreeMap;

use glam::IVec3;
use rand::RngCore;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::geometry::{BlockBox, OccupancyGrid, Rotation};
use crate::growth::containers::ContainerOptions;
use crate::growth::node::{Anchor, Node};
use crate::growth::selection::SelectionStrategy;
use crate::growth::{ConstructionBudget, EventSink, GrowthContext, GrowthEvent, GrowthEventKind, GrowthSite};
use crate::prototype::PrototypeRegistry;
use crate::world::{TerrainProbe, VoxelWriter};

/// Configuration for a growth run.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Construction budget available to the whole run.
    pub budget: f64,
    /// How many starting positions to try before giving up.
    pub start_attempts: usize,
    /// How one continuation is chosen among admissible candidates.
    pub selection: SelectionStrategy,
    /// Material substitutions applied to every placed template.
    pub material_replacements: BTreeMap<String, String>,
    pub containers: ContainerOptions,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            budget: 1000.0,
            start_attempts: 10,
            selection: SelectionStrategy::default(),
            material_replacements: BTreeMap::new(),
            containers: ContainerOptions::default(),
        }
    }
}

impl RunConfig {
    pub fn new(budget: f64) -> Self {
        Self {
            budget,
            ..Default::default()
        }
    }

    pub fn with_budget(mut self, budget: f64) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_start_attempts(mut self, attempts: usize) -> Self {
        self.start_attempts = attempts;
        self
    }

    pub fn with_selection_strategy(mut self, selection: SelectionStrategy) -> Self {
        self.selection = selection;
        self
    }

    /// Replaces `existing` with `replacement` in every template placed by the run.
    pub fn with_material_replacement(
        mut self,
        existing: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        self.material_replacements
            .insert(existing.into(), replacement.into());
        self
    }

    pub fn with_container_options(mut self, containers: ContainerOptions) -> Self {
        self.containers = containers;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if !self.budget.is_finite() || self.budget < 0.0 {
            return Err(Error::InvalidConfig("budget must be finite and >= 0".into()));
        }
        if self.start_attempts == 0 {
            return Err(Error::InvalidConfig("start_attempts must be > 0".into()));
        }
        if !(0.0..=1.0).contains(&self.containers.slot_chance) {
            return Err(Error::InvalidConfig(
                "containers.slot_chance must be within [0, 1]".into(),
            ));
        }
        if self.containers.max_stack == 0 {
            return Err(Error::InvalidConfig("containers.max_stack must be > 0".into()));
        }
        if let Some((from, _)) = self
            .material_replacements
            .iter()
            .find(|(from, to)| from.is_empty() || to.is_empty())
        {
            return Err(Error::InvalidConfig(format!(
                "material replacement for '{from}' has an empty side"
            )));
        }
        Ok(())
    }
}

/// Starting template and where to try it.
#[derive(Debug, Clone, PartialEq)]
pub struct Start {
    pub prototype: String,
    pub position: IVec3,
    pub rotation: Rotation,
}

impl Start {
    pub fn new(prototype: impl Into<String>, position: IVec3) -> Self {
        Self {
            prototype: prototype.into(),
            position,
            rotation: Rotation::NORTH,
        }
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }
}

/// A committed structure.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedStructure {
    /// Position in placement order.
    pub index: usize,
    /// Index of the node whose connector grew this one; `None` for the root.
    pub parent: Option<usize>,
    pub depth: usize,
    pub prototype: String,
    pub position: IVec3,
    pub rotation: Rotation,
    /// Effective box in world space.
    pub world_box: BlockBox,
    pub cost: f64,
}

/// Result of a growth run.
#[non_exhaustive]
#[derive(Debug, Clone, Default)]
pub struct GrowthResult {
    /// Committed structures in placement order.
    pub placements: Vec<PlacedStructure>,
    /// Budget spent by this run.
    pub spent: f64,
    /// Budget left afterwards.
    pub remaining: f64,
    /// Starting positions tried.
    pub start_attempts: usize,
    /// The start that was placed, if any.
    pub start: Option<Start>,
}

impl GrowthResult {
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn root(&self) -> Option<&PlacedStructure> {
        self.placements.first()
    }

    pub fn children_of(&self, index: usize) -> impl Iterator<Item = &PlacedStructure> + '_ {
        self.placements
            .iter()
            .filter(move |p| p.parent == Some(index))
    }

    pub fn max_depth(&self) -> usize {
        self.placements.iter().map(|p| p.depth).max().unwrap_or(0)
    }

    pub fn total_cost(&self) -> f64 {
        self.placements.iter().map(|p| p.cost).sum()
    }
}

/// Grows layouts on one site.
///
/// Occupancy and budget persist across runs of the same runner, so a second run grows
/// around what the first one built. Use [`GrowthRunner::reset`] to start over.
pub struct GrowthRunner<'a> {
    /// Run configuration applied to this runner.
    pub config: RunConfig,
    site: &'a GrowthSite,
    registry: &'a mut PrototypeRegistry,
    terrain: Option<&'a dyn TerrainProbe>,
    occupancy: OccupancyGrid,
    budget: ConstructionBudget,
}

impl<'a> GrowthRunner<'a> {
    pub fn try_new(
        config: RunConfig,
        site: &'a GrowthSite,
        registry: &'a mut PrototypeRegistry,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            budget: ConstructionBudget::new(config.budget),
            occupancy: site.occupancy_grid(),
            config,
            site,
            registry,
            terrain: None,
        })
    }

    /// Probe used to sample surface materials for container population.
    pub fn with_terrain(mut self, terrain: &'a dyn TerrainProbe) -> Self {
        self.terrain = Some(terrain);
        self
    }

    pub fn site(&self) -> &GrowthSite {
        self.site
    }

    pub fn occupancy(&self) -> &OccupancyGrid {
        &self.occupancy
    }

    pub fn budget(&self) -> &ConstructionBudget {
        &self.budget
    }

    /// Clears occupancy and restores the configured budget.
    pub fn reset(&mut self) {
        self.occupancy = self.site.occupancy_grid();
        self.budget = ConstructionBudget::new(self.config.budget);
    }

    /// Grows from a single start.
    pub fn run(
        &mut self,
        start: &Start,
        writer: &mut dyn VoxelWriter,
        rng: &mut impl RngCore,
    ) -> Result<GrowthResult> {
        self.grow(std::slice::from_ref(start), writer, rng, None)
    }

    pub fn run_with_events(
        &mut self,
        start: &Start,
        writer: &mut dyn VoxelWriter,
        rng: &mut impl RngCore,
        sink: &mut dyn EventSink,
    ) -> Result<GrowthResult> {
        self.grow(std::slice::from_ref(start), writer, rng, Some(sink))
    }

    /// Tries `starts` in order until one is placable, at most
    /// [`RunConfig::start_attempts`] of them.
    pub fn run_with_retries(
        &mut self,
        starts: &[Start],
        writer: &mut dyn VoxelWriter,
        rng: &mut impl RngCore,
    ) -> Result<GrowthResult> {
        self.grow(starts, writer, rng, None)
    }

    pub fn run_with_retries_and_events(
        &mut self,
        starts: &[Start],
        writer: &mut dyn VoxelWriter,
        rng: &mut impl RngCore,
        sink: &mut dyn EventSink,
    ) -> Result<GrowthResult> {
        self.grow(starts, writer, rng, Some(sink))
    }

    fn grow(
        &mut self,
        starts: &[Start],
        writer: &mut dyn VoxelWriter,
        rng: &mut dyn RngCore,
        sink: Option<&mut dyn EventSink>,
    ) -> Result<GrowthResult> {
        let Some(first) = starts.first() else {
            return Err(Error::InvalidConfig("no starting position given".into()));
        };
        let spent_before = self.budget.spent();

        let mut ctx = GrowthContext::new(
            self.site,
            &mut self.occupancy,
            &mut self.budget,
            &mut *self.registry,
            rng,
            writer,
            &self.config,
        );
        ctx.terrain = self.terrain;
        if let Some(sink) = sink {
            ctx = ctx.with_sink(sink);
        }

        info!(
            "Growing from '{}' at {:?} with budget {:.1}.",
            first.prototype,
            first.position,
            ctx.budget.remaining()
        );
        if ctx.wants(GrowthEventKind::RunStarted) {
            ctx.emit(GrowthEvent::RunStarted {
                config: ctx.config.clone(),
                prototype: first.prototype.clone(),
                position: first.position,
            });
        }

        let mut attempts = 0;
        let mut placed_start = None;
        for start in starts.iter().take(ctx.config.start_attempts) {
            attempts += 1;
            let prototype = ctx.registry.load(&start.prototype)?;
            let anchor = Anchor::At {
                position: start.position,
                rotation: start.rotation,
            };
            let mut root = Node::new(prototype, anchor, &mut ctx);
            if root.place(&mut ctx, true)?.is_some() {
                placed_start = Some(start.clone());
                break;
            }
            debug!(
                "Start '{}' at {:?} is not placable: {:?}.",
                start.prototype,
                start.position,
                root.placability()
            );
        }
        ctx.writer.flush()?;

        let spent = ctx.budget.spent() - spent_before;
        let remaining = ctx.budget.remaining();
        if placed_start.is_none() {
            warn!(
                "No start was placable after {} attempt(s); nothing was grown.",
                attempts
            );
        }
        info!(
            "Growth finished: {} structures placed, {:.1} spent, {:.1} left.",
            ctx.placements().len(),
            spent,
            remaining
        );
        if ctx.wants(GrowthEventKind::RunFinished) {
            ctx.emit(GrowthEvent::RunFinished {
                placed: ctx.placements().len(),
                spent,
                remaining,
            });
        }

        Ok(GrowthResult {
            placements: ctx.into_placements(),
            spent,
            remaining,
            start_attempts: attempts,
            start: placed_start,
        })
    }
}
