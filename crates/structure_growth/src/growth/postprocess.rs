//! Post-processing of committed nodes: support pillars, ladders and decorations.
//!
//! Random choices are made once when a node is constructed ([`resolve_steps`]) so that
//! evaluation can account for the chosen decorations. Writes only happen on commit.
use glam::IVec3;
use tracing::debug;

use crate::geometry::grid::horizontal;
use crate::geometry::{rotate_point_around_origin, HeightMap, Rotation};
use crate::growth::containers::populate_containers;
use crate::growth::{GrowthContext, GrowthEvent, GrowthEventKind};
use crate::prototype::materials::LADDER;
use crate::prototype::{DecorationSpec, PillarSpec, PostProcessingStep};
use crate::random::{choose, uniform_index};
use crate::structure::Structure;
use crate::world::VoxelWrite;

/// A post-processing step with its random choices already made.
#[derive(Clone, Debug)]
pub(crate) enum ResolvedStep {
    Pillars(Vec<PillarSpec>),
    /// `None` when the group drew its empty entry.
    Decoration(Option<ResolvedDecoration>),
}

#[derive(Clone, Debug)]
pub(crate) struct ResolvedDecoration {
    pub spec: DecorationSpec,
    pub structure: Structure,
}

impl ResolvedStep {
    /// Cost contributed to the owning node's evaluation.
    pub fn cost(&self) -> f64 {
        match self {
            ResolvedStep::Decoration(Some(d)) => d.structure.prototype().cost(),
            _ => 0.0,
        }
    }
}

pub(crate) fn resolve_steps(host: &Structure, ctx: &mut GrowthContext<'_>) -> Vec<ResolvedStep> {
    let prototype = host.prototype().clone();
    let mut steps = Vec::with_capacity(prototype.post_processing().len());
    for step in prototype.post_processing() {
        match step {
            PostProcessingStep::Pillars(pillars) => steps.push(ResolvedStep::Pillars(pillars.clone())),
            PostProcessingStep::Decorations(group) => {
                let picked = choose(&mut *ctx.rng, group).and_then(|entry| entry.as_ref());
                let resolved = picked.and_then(|spec| resolve_decoration(host, spec, ctx));
                steps.push(ResolvedStep::Decoration(resolved));
            }
        }
    }
    steps
}

fn resolve_decoration(
    host: &Structure,
    spec: &DecorationSpec,
    ctx: &mut GrowthContext<'_>,
) -> Option<ResolvedDecoration> {
    let facing = match spec.allowed_facings() {
        Some(allowed) => *choose(&mut *ctx.rng, &allowed)?,
        None => Rotation::wrapping(uniform_index(&mut *ctx.rng, 4) as i64),
    };
    let Some(prototype) = host.prototype().decoration(&spec.decoration_structure).cloned() else {
        ctx.warn(
            host.name(),
            format!("decoration '{}' is not loaded", spec.decoration_structure),
        );
        return None;
    };
    let mut structure = Structure::new(
        prototype,
        host.position() + spec.origin_offset(),
        facing.then(host.rotation()),
    );
    structure.replace_materials(&ctx.config.material_replacements);
    Some(ResolvedDecoration {
        spec: spec.clone(),
        structure,
    })
}

/// Applies a resolved step for a node that was just committed.
pub(crate) fn apply_step(
    step: &mut ResolvedStep,
    host: &Structure,
    ground: &HeightMap,
    nearby: &HeightMap,
    ctx: &mut GrowthContext<'_>,
) {
    match step {
        ResolvedStep::Pillars(pillars) => {
            place_pillars(host, pillars, ground, ctx);
        }
        ResolvedStep::Decoration(None) => {}
        ResolvedStep::Decoration(Some(decoration)) => {
            place_pillars(&decoration.structure, &decoration.spec.pillars, ground, ctx);
            let containers_filled = if decoration.spec.populate_containers {
                populate_containers(&mut decoration.structure, nearby, ctx)
            } else {
                0
            };
            decoration.structure.place(&mut *ctx.writer, true);
            debug!(
                "Decorated '{}' with '{}' ({} containers filled).",
                host.name(),
                decoration.structure.name(),
                containers_filled
            );
            if ctx.wants(GrowthEventKind::DecorationPlaced) {
                ctx.emit(GrowthEvent::DecorationPlaced {
                    prototype: decoration.structure.name().to_owned(),
                    position: decoration.structure.position(),
                    rotation: decoration.structure.rotation(),
                    containers_filled,
                });
            }
        }
    }
}

/// Fills columns from the ground up to just below `owner`, with optional ladders.
///
/// Pillars whose column lies outside `ground` are skipped with a warning.
pub(crate) fn place_pillars(
    owner: &Structure,
    pillars: &[PillarSpec],
    ground: &HeightMap,
    ctx: &mut GrowthContext<'_>,
) -> usize {
    let mut placed = 0;
    for pillar in pillars {
        let top = owner.local_to_world(IVec3::new(pillar.pos[0], -1, pillar.pos[1]));
        let Some(&ground_y) = ground.get_world(horizontal(top)) else {
            ctx.warn(
                owner.name(),
                format!("pillar at {:?} lies outside the local height map", top),
            );
            continue;
        };
        if ground_y <= top.y {
            ctx.writer
                .fill(IVec3::new(top.x, ground_y, top.z), top, &pillar.material);
        }
        if let Some(side) = pillar.ladder_side() {
            let ladder_rotation = owner.rotation().then(side);
            let ladder = rotate_point_around_origin(top.as_dvec3(), top + IVec3::NEG_Z, ladder_rotation);
            for y in ground_y..=top.y {
                ctx.writer.write_voxel(
                    VoxelWrite::new(IVec3::new(ladder.x, y, ladder.z), LADDER)
                        .with_property("facing", ladder_rotation.compass_name()),
                );
            }
        }
        placed += 1;
    }
    placed
}
