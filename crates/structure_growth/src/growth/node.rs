//! The placement decision engine.
//!
//! A [`Node`] is a candidate placement of one template. It is built, evaluated against the
//! shared occupancy grid and budget, and either committed or dropped. Committing a node
//! writes it into the world, runs its post-processing and then grows every connector
//! recursively, children seeing the occupancy and budget left by their parents.
//!
//! Building and evaluating a node has no side effects besides random draws.
use std::sync::Arc;

use glam::IVec3;
use tracing::{debug, trace};

use crate::error::Result;
use crate::geometry::grid::horizontal;
use crate::geometry::{get_next_position, HeightMap, Rotation};
use crate::growth::postprocess::{apply_step, resolve_steps, ResolvedStep};
use crate::growth::selection::select;
use crate::growth::{GrowthContext, GrowthEvent, GrowthEventKind, PlacedStructure};
use crate::prototype::{ConnectorSpec, StructurePrototype};
use crate::random::shuffle;
use crate::structure::Structure;

/// Where a new node goes.
#[derive(Clone, Copy, Debug)]
pub enum Anchor<'p> {
    /// Explicit position and rotation, used for the starting structure.
    At { position: IVec3, rotation: Rotation },
    /// Flush against `parent` on the `facing` side, with the node at height `y`.
    Adjoining {
        parent: &'p Structure,
        facing: Rotation,
        y: i32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeState {
    Constructed,
    Evaluated,
    Committed,
    Discarded,
}

/// Result of evaluating a node.
#[derive(Clone, Debug, PartialEq)]
pub enum Placability {
    Placable { cost: f64 },
    Inadmissible(Rejection),
}

impl Placability {
    pub fn is_placable(&self) -> bool {
        matches!(self, Placability::Placable { .. })
    }

    pub fn cost(&self) -> Option<f64> {
        match self {
            Placability::Placable { cost } => Some(*cost),
            Placability::Inadmissible(_) => None,
        }
    }
}

/// Why a node cannot be placed.
#[derive(Clone, Debug, PartialEq)]
pub enum Rejection {
    /// The footprint is not fully inside the build area.
    OutOfBounds,
    /// The node would sit lower than its ground clearance allows.
    Buried { max_baseline: i32, clearance: i32, y: i32 },
    /// The footprint overlaps already occupied columns.
    Occupied { cells: usize },
    OverBudget { cost: f64, remaining: f64 },
}

/// How a connector of a committed node was resolved.
#[derive(Clone, Debug, PartialEq)]
pub enum ConnectorOutcome {
    /// The connector points back to the parent; nothing grows there.
    WayBack { transition_placed: bool },
    /// A child was committed.
    Grew { prototype: String, cost: f64, index: usize },
    /// None of the evaluated candidates could be placed.
    NoCandidate { evaluated: usize },
}

#[derive(Debug)]
pub struct Node {
    structure: Structure,
    local_baseline: HeightMap,
    local_ocean_floor: HeightMap,
    steps: Vec<ResolvedStep>,
    state: NodeState,
    placability: Option<Placability>,
}

impl Node {
    /// Builds a node for `prototype`.
    ///
    /// Global material replacements are applied, the site height maps are cropped to the
    /// node's footprint and decoration choices are drawn from the shared random source.
    pub fn new(prototype: Arc<StructurePrototype>, anchor: Anchor<'_>, ctx: &mut GrowthContext<'_>) -> Self {
        let mut structure = match anchor {
            Anchor::At { position, rotation } => Structure::new(prototype, position, rotation),
            Anchor::Adjoining { parent, facing, y } => {
                let mut structure = Structure::new(prototype, IVec3::new(0, y, 0), facing);
                let min = get_next_position(facing, &parent.world_box(), &structure.world_box());
                structure.move_box_to(min);
                structure
            }
        };
        structure.replace_materials(&ctx.config.material_replacements);

        let bounds = structure.world_box();
        let (lo, hi) = (horizontal(bounds.min), horizontal(bounds.max()));
        let local_baseline = ctx.site.baseline.crop(lo, hi);
        let local_ocean_floor = ctx.site.ocean_floor.crop(lo, hi);
        let steps = resolve_steps(&structure, ctx);

        Self {
            structure,
            local_baseline,
            local_ocean_floor,
            steps,
            state: NodeState::Constructed,
            placability: None,
        }
    }

    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    pub fn name(&self) -> &str {
        self.structure.name()
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Outcome of the last evaluation, if any.
    pub fn placability(&self) -> Option<&Placability> {
        self.placability.as_ref()
    }

    pub fn local_baseline(&self) -> &HeightMap {
        &self.local_baseline
    }

    pub fn local_ocean_floor(&self) -> &HeightMap {
        &self.local_ocean_floor
    }

    /// Summed cost of the decorations chosen for this node.
    pub fn decoration_cost(&self) -> f64 {
        self.steps.iter().map(ResolvedStep::cost).sum()
    }

    /// Computes whether and at what cost this node could be committed now.
    ///
    /// Checks run in order: footprint inside the site, ground clearance, free columns,
    /// then affordability. Reads the context only.
    pub fn placement_cost(&self, ctx: &GrowthContext<'_>) -> Placability {
        let bounds = self.structure.world_box();
        let wanted = (bounds.size.x as usize, bounds.size.z as usize);
        if self.local_baseline.size() != wanted || self.local_ocean_floor.size() != wanted {
            return Placability::Inadmissible(Rejection::OutOfBounds);
        }

        let y = self.structure.position().y;
        let clearance = self.structure.prototype().ground_clearance();
        let max_baseline = self.local_baseline.max_height().unwrap_or(i32::MIN);
        if max_baseline.saturating_add(clearance) > y {
            return Placability::Inadmissible(Rejection::Buried {
                max_baseline,
                clearance,
                y,
            });
        }

        let occupied = ctx
            .occupancy
            .crop(horizontal(bounds.min), horizontal(bounds.max()));
        if occupied.size() != wanted {
            return Placability::Inadmissible(Rejection::OutOfBounds);
        }
        if occupied.any_occupied() {
            return Placability::Inadmissible(Rejection::Occupied {
                cells: occupied.occupied_count(),
            });
        }

        let elevation = self
            .local_ocean_floor
            .mean_height()
            .map_or(0.0, |floor| y as f64 - floor);
        let cost = (self.structure.prototype().cost() + elevation.powi(3) + self.decoration_cost()).max(0.0);
        if !ctx.budget.can_afford(cost) {
            return Placability::Inadmissible(Rejection::OverBudget {
                cost,
                remaining: ctx.budget.remaining(),
            });
        }
        Placability::Placable { cost }
    }

    /// Evaluates the node and remembers the outcome.
    pub fn evaluate(&mut self, ctx: &GrowthContext<'_>) -> Placability {
        let placability = self.placement_cost(ctx);
        self.state = NodeState::Evaluated;
        self.placability = Some(placability.clone());
        placability
    }

    /// Drops the node without writing anything.
    pub fn discard(&mut self) {
        self.state = NodeState::Discarded;
    }

    /// Commits the node and grows its connectors.
    ///
    /// `is_starting` marks the root of a layout, whose connectors all grow outward.
    /// Returns the placement index, or `None` if the node was not placable. Errors are
    /// fatal to the run; anything written before them stays in the world.
    pub fn place(&mut self, ctx: &mut GrowthContext<'_>, is_starting: bool) -> Result<Option<usize>> {
        self.place_linked(ctx, is_starting, None, 0)
    }

    fn place_linked(
        &mut self,
        ctx: &mut GrowthContext<'_>,
        is_starting: bool,
        parent: Option<usize>,
        depth: usize,
    ) -> Result<Option<usize>> {
        let Placability::Placable { cost } = self.evaluate(ctx) else {
            self.discard();
            return Ok(None);
        };
        if !ctx.budget.try_spend(cost) {
            self.discard();
            return Ok(None);
        }

        self.structure.place(&mut *ctx.writer, false);
        let bounds = self.structure.world_box();
        ctx.occupancy
            .mark_occupied(horizontal(bounds.min), horizontal(bounds.max()));
        self.state = NodeState::Committed;

        let index = ctx.placements.len();
        let placement = PlacedStructure {
            index,
            parent,
            depth,
            prototype: self.name().to_owned(),
            position: self.structure.position(),
            rotation: self.structure.rotation(),
            world_box: bounds,
            cost,
        };
        debug!(
            "Placed '{}' at {:?} facing {} (cost {:.2}, {:.2} left).",
            placement.prototype,
            placement.position,
            placement.rotation.compass_name(),
            cost,
            ctx.budget.remaining()
        );
        if ctx.wants(GrowthEventKind::NodeCommitted) {
            ctx.emit(GrowthEvent::NodeCommitted {
                placement: placement.clone(),
            });
        }
        ctx.placements.push(placement);

        for step in &mut self.steps {
            apply_step(
                step,
                &self.structure,
                &self.local_ocean_floor,
                &self.local_baseline,
                ctx,
            );
        }

        let prototype = self.structure.prototype().clone();
        for (connector_index, connector) in prototype.connectors().iter().enumerate() {
            let outcome = self.grow_connector(connector, ctx, is_starting, index, depth)?;
            trace!(
                "Connector {} of '{}' resolved: {:?}.",
                connector_index,
                prototype.name(),
                outcome
            );
            if ctx.wants(GrowthEventKind::ConnectorResolved) {
                ctx.emit(GrowthEvent::ConnectorResolved {
                    prototype: prototype.name().to_owned(),
                    connector: connector_index,
                    outcome,
                });
            }
        }
        Ok(Some(index))
    }

    fn grow_connector(
        &self,
        connector: &ConnectorSpec,
        ctx: &mut GrowthContext<'_>,
        is_starting: bool,
        index: usize,
        depth: usize,
    ) -> Result<ConnectorOutcome> {
        let way_back = !is_starting && connector.rotation() == Rotation::SOUTH;
        let connection = connector.rotation().then(self.structure.rotation());

        let mut evaluated = 0;
        let mut chosen = None;
        if !way_back {
            let mut names = connector.next_structure.clone();
            shuffle(&mut *ctx.rng, &mut names);
            let y = self.structure.position().y + connector.height_offset();
            let mut admissible: Vec<(Node, f64)> = Vec::new();
            for name in &names {
                let prototype = ctx.registry.load(name)?;
                let anchor = Anchor::Adjoining {
                    parent: &self.structure,
                    facing: connection,
                    y,
                };
                let mut candidate = Node::new(prototype, anchor, ctx);
                let placability = candidate.evaluate(ctx);
                evaluated += 1;
                trace!(
                    "Candidate '{}' at {:?}: {:?}.",
                    name,
                    candidate.structure.position(),
                    placability
                );
                if ctx.wants(GrowthEventKind::CandidateEvaluated) {
                    ctx.emit(GrowthEvent::CandidateEvaluated {
                        prototype: name.clone(),
                        position: candidate.structure.position(),
                        rotation: candidate.structure.rotation(),
                        placability: placability.clone(),
                    });
                }
                match placability {
                    Placability::Placable { cost } => admissible.push((candidate, cost)),
                    Placability::Inadmissible(_) => candidate.discard(),
                }
            }
            let costs: Vec<f64> = admissible.iter().map(|(_, cost)| *cost).collect();
            if let Some(pick) = select(ctx.config.selection, &costs, &mut *ctx.rng) {
                chosen = Some(admissible.swap_remove(pick).0);
            }
        }

        let mut transition_placed = false;
        if let Some(transition) = &connector.transition_structure {
            if way_back || chosen.is_some() {
                transition_placed = self.place_transition(transition, connection, ctx);
            }
        }

        if way_back {
            return Ok(ConnectorOutcome::WayBack { transition_placed });
        }
        let Some(mut child) = chosen else {
            return Ok(ConnectorOutcome::NoCandidate { evaluated });
        };
        match child.place_linked(ctx, false, Some(index), depth + 1)? {
            Some(child_index) => Ok(ConnectorOutcome::Grew {
                prototype: child.name().to_owned(),
                cost: ctx.placements[child_index].cost,
                index: child_index,
            }),
            None => Ok(ConnectorOutcome::NoCandidate { evaluated }),
        }
    }

    fn place_transition(&self, name: &str, rotation: Rotation, ctx: &mut GrowthContext<'_>) -> bool {
        let Some(prototype) = self.structure.prototype().transition(name).cloned() else {
            ctx.warn(self.name(), format!("transition '{}' is not loaded", name));
            return false;
        };
        let mut transition = Structure::new(prototype, self.structure.position(), rotation);
        transition.replace_materials(&ctx.config.material_replacements);
        transition.place(&mut *ctx.writer, true);
        if ctx.wants(GrowthEventKind::TransitionPlaced) {
            ctx.emit(GrowthEvent::TransitionPlaced {
                prototype: name.to_owned(),
                position: transition.position(),
                rotation,
            });
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use glam::IVec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::geometry::BuildArea;
    use crate::growth::{ConstructionBudget, GrowthSite, RunConfig};
    use crate::prototype::{CustomProperties, InMemorySource, PrototypeRegistry, VoxelData};
    use crate::world::RecordingWriter;

    fn block(size: i32) -> VoxelData {
        VoxelData::solid(IVec3::new(size, 1, size), "minecraft:stone")
    }

    struct Fixture {
        site: GrowthSite,
        occupancy: crate::geometry::OccupancyGrid,
        budget: ConstructionBudget,
        registry: PrototypeRegistry,
        rng: StdRng,
        writer: RecordingWriter,
        config: RunConfig,
    }

    impl Fixture {
        fn new(source: InMemorySource, budget: f64) -> Self {
            let site = GrowthSite::flat(BuildArea::new(0, 0, 10, 10), 64).unwrap();
            Self {
                occupancy: site.occupancy_grid(),
                site,
                budget: ConstructionBudget::new(budget),
                registry: PrototypeRegistry::new(source),
                rng: StdRng::seed_from_u64(7),
                writer: RecordingWriter::new(),
                config: RunConfig::default(),
            }
        }

        fn ctx(&mut self) -> GrowthContext<'_> {
            GrowthContext::new(
                &self.site,
                &mut self.occupancy,
                &mut self.budget,
                &mut self.registry,
                &mut self.rng,
                &mut self.writer,
                &self.config,
            )
        }
    }

    fn at(x: i32, y: i32, z: i32) -> Anchor<'static> {
        Anchor::At {
            position: IVec3::new(x, y, z),
            rotation: Rotation::NORTH,
        }
    }

    #[test]
    fn clearance_boundary() {
        let mut fixture = Fixture::new(InMemorySource::new().with_bare_template("b", block(4)), 1e9);
        let mut ctx = fixture.ctx();
        let proto = ctx.registry.load("b").unwrap();
        let on_ground = Node::new(proto.clone(), at(2, 65, 2), &mut ctx);
        assert!(on_ground.placement_cost(&ctx).is_placable());
        let sunk = Node::new(proto, at(2, 64, 2), &mut ctx);
        assert_eq!(
            sunk.placement_cost(&ctx),
            Placability::Inadmissible(Rejection::Buried {
                max_baseline: 64,
                clearance: 1,
                y: 64
            })
        );
    }

    #[test]
    fn footprint_must_lie_inside_the_site() {
        let mut fixture = Fixture::new(InMemorySource::new().with_bare_template("b", block(4)), 1e9);
        let mut ctx = fixture.ctx();
        let proto = ctx.registry.load("b").unwrap();
        let edge = Node::new(proto.clone(), at(6, 65, 6), &mut ctx);
        assert!(edge.placement_cost(&ctx).is_placable());
        let outside = Node::new(proto, at(7, 65, 6), &mut ctx);
        assert_eq!(
            outside.placement_cost(&ctx),
            Placability::Inadmissible(Rejection::OutOfBounds)
        );
    }

    #[test]
    fn cost_grows_with_elevation_and_respects_budget() {
        let mut fixture = Fixture::new(InMemorySource::new().with_bare_template("b", block(2)), 20.0);
        let mut ctx = fixture.ctx();
        let proto = ctx.registry.load("b").unwrap();
        let low = Node::new(proto.clone(), at(0, 65, 0), &mut ctx);
        // 4 stone voxels plus 1^3.
        assert_eq!(low.placement_cost(&ctx), Placability::Placable { cost: 5.0 });
        let high = Node::new(proto, at(0, 67, 0), &mut ctx);
        assert!(matches!(
            high.placement_cost(&ctx),
            Placability::Inadmissible(Rejection::OverBudget { cost, .. }) if cost == 31.0
        ));
    }

    #[test]
    fn evaluation_has_no_side_effects() {
        let mut fixture = Fixture::new(InMemorySource::new().with_bare_template("b", block(4)), 100.0);
        {
            let mut ctx = fixture.ctx();
            let proto = ctx.registry.load("b").unwrap();
            let mut node = Node::new(proto, at(2, 65, 2), &mut ctx);
            assert!(node.evaluate(&ctx).is_placable());
            assert_eq!(node.state(), NodeState::Evaluated);
            node.discard();
            assert_eq!(node.state(), NodeState::Discarded);
        }
        assert!(!fixture.occupancy.any_occupied());
        assert_eq!(fixture.budget.remaining(), 100.0);
        assert!(fixture.writer.is_empty());
    }

    #[test]
    fn committing_marks_exactly_the_footprint() {
        let mut fixture = Fixture::new(InMemorySource::new().with_bare_template("b", block(4)), 100.0);
        {
            let mut ctx = fixture.ctx();
            let proto = ctx.registry.load("b").unwrap();
            let mut node = Node::new(proto, at(2, 65, 2), &mut ctx);
            assert_eq!(node.place(&mut ctx, true).unwrap(), Some(0));
            assert_eq!(node.state(), NodeState::Committed);
            assert_eq!(ctx.placements().len(), 1);
        }
        assert_eq!(fixture.occupancy.occupied_count(), 16);
        for z in 0..10 {
            for x in 0..10 {
                let inside = (2..6).contains(&x) && (2..6).contains(&z);
                let marked = fixture.occupancy.get_world(IVec2::new(x, z)) == Some(&1);
                assert_eq!(marked, inside, "cell ({x}, {z})");
            }
        }
        assert_eq!(fixture.budget.remaining(), 100.0 - 17.0);
        assert_eq!(fixture.writer.len(), 16);
    }

    #[test]
    fn occupied_columns_reject_overlapping_nodes() {
        let mut fixture = Fixture::new(InMemorySource::new().with_bare_template("b", block(4)), 100.0);
        let mut ctx = fixture.ctx();
        let proto = ctx.registry.load("b").unwrap();
        let mut first = Node::new(proto.clone(), at(2, 65, 2), &mut ctx);
        first.place(&mut ctx, true).unwrap();
        let overlapping = Node::new(proto, at(4, 65, 4), &mut ctx);
        assert_eq!(
            overlapping.placement_cost(&ctx),
            Placability::Inadmissible(Rejection::Occupied { cells: 4 })
        );
    }

    #[test]
    fn way_back_connector_only_places_its_transition() {
        let door = VoxelData::solid(IVec3::ONE, "minecraft:oak_door");
        let props = CustomProperties::default()
            .with_connector(
                ConnectorSpec::new(Rotation::SOUTH)
                    .with_next(["b"])
                    .with_transition("door"),
            );
        let source = InMemorySource::new()
            .with_template("b", block(2), props)
            .with_bare_template("door", door);
        let mut fixture = Fixture::new(source, 1e9);
        {
            let mut ctx = fixture.ctx();
            let proto = ctx.registry.load("b").unwrap();
            let mut child = Node::new(proto, at(4, 65, 4), &mut ctx);
            assert_eq!(child.place_linked(&mut ctx, false, None, 1).unwrap(), Some(0));
            assert_eq!(ctx.placements().len(), 1);
        }
        assert_eq!(fixture.occupancy.occupied_count(), 4);
        assert!(fixture
            .writer
            .writes()
            .iter()
            .any(|w| w.material == "minecraft:oak_door"));
    }

    #[test]
    fn starting_node_grows_through_every_connector() {
        let props = CustomProperties::default()
            .with_connector(ConnectorSpec::new(Rotation::NORTH).with_next(["leaf"]))
            .with_connector(ConnectorSpec::new(Rotation::SOUTH).with_next(["leaf"]));
        let source = InMemorySource::new()
            .with_template("hub", block(2), props)
            .with_bare_template("leaf", block(2));
        let mut fixture = Fixture::new(source, 1e9);
        let mut ctx = fixture.ctx();
        let proto = ctx.registry.load("hub").unwrap();
        let mut root = Node::new(proto, at(4, 65, 4), &mut ctx);
        root.place(&mut ctx, true).unwrap();
        let placed: Vec<_> = ctx.placements().iter().map(|p| (p.prototype.as_str(), p.world_box.min)).collect();
        assert_eq!(
            placed,
            vec![
                ("hub", IVec3::new(4, 65, 4)),
                ("leaf", IVec3::new(6, 65, 4)),
                ("leaf", IVec3::new(2, 65, 4)),
            ]
        );
        assert_eq!(ctx.placements()[1].parent, Some(0));
        assert_eq!(ctx.placements()[2].depth, 1);
    }

    #[test]
    fn missing_candidate_template_is_fatal() {
        let props = CustomProperties::default()
            .with_connector(ConnectorSpec::new(Rotation::NORTH).with_next(["ghost"]));
        let source = InMemorySource::new().with_template("hub", block(2), props);
        let mut fixture = Fixture::new(source, 1e9);
        let mut ctx = fixture.ctx();
        let proto = ctx.registry.load("hub").unwrap();
        let mut root = Node::new(proto, at(4, 65, 4), &mut ctx);
        let err = root.place(&mut ctx, true).unwrap_err();
        assert!(matches!(err, crate::error::Error::TemplateNotFound { .. }));
        assert_eq!(ctx.placements().len(), 1);
    }
}
