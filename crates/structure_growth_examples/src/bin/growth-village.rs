use glam::{IVec2, IVec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use structure_growth::prelude::*;
use structure_growth_examples::{
    hamlet_kit, init_tracing, render_layout_to_png, RenderConfig, RollingHills,
};
use tracing::info;

const SQUARE: IVec2 = IVec2::new(7, 7);

fn main() -> anyhow::Result<()> {
    init_tracing();
    // Terrain and build area
    let hills = RollingHills::new(2024);
    let area = BuildArea::new(-48, -48, 96, 96);
    let site = hills.site(area)?;

    // Candidate starts spiral outwards from the center, each resting on its footprint.
    let starts = start_candidates(&site, 12);

    let mut registry = PrototypeRegistry::new(hamlet_kit());
    let config = RunConfig::new(2500.0)
        .with_start_attempts(starts.len())
        .with_material_replacement("minecraft:oak_planks", "minecraft:birch_planks");
    let mut runner =
        GrowthRunner::try_new(config, &site, &mut registry)?.with_terrain(&hills);

    let mut writer = RecordingWriter::new();
    let mut sink = VecSink::only([
        GrowthEventKind::CandidateEvaluated,
        GrowthEventKind::DecorationPlaced,
        GrowthEventKind::Warning,
    ]);
    let mut rng = StdRng::seed_from_u64(2024);
    let result =
        runner.run_with_retries_and_events(&starts, &mut writer, &mut rng, &mut sink)?;

    summarize(&result, &sink, &writer);
    render(&site, &result)?;
    Ok(())
}

fn start_candidates(site: &GrowthSite, count: i32) -> Vec<Start> {
    let center = site.area.origin + site.area.size / 2 - SQUARE / 2;
    (0..count)
        .filter_map(|i| {
            let angle = i as f32 * 2.4;
            let radius = 3.0 * i as f32;
            let corner = center
                + IVec2::new(
                    (radius * angle.cos()).round() as i32,
                    (radius * angle.sin()).round() as i32,
                );
            let top = site.baseline.crop(corner, corner + SQUARE).max_height()?;
            Some(Start::new("square", IVec3::new(corner.x, top + 1, corner.y)))
        })
        .collect()
}

fn summarize(result: &GrowthResult, sink: &VecSink, writer: &RecordingWriter) {
    let mut per_prototype = std::collections::BTreeMap::<&str, usize>::new();
    for placed in &result.placements {
        *per_prototype.entry(placed.prototype.as_str()).or_default() += 1;
    }
    info!(
        "Placed {} structures after {} start attempts, depth {}, spent {:.1}, {:.1} left.",
        result.len(),
        result.start_attempts,
        result.max_depth(),
        result.spent,
        result.remaining
    );
    for (prototype, count) in per_prototype {
        info!("  {prototype}: {count}");
    }
    info!(
        "{} candidates evaluated, {} decorations, {} warnings, {} voxel writes.",
        sink.count(GrowthEventKind::CandidateEvaluated),
        sink.count(GrowthEventKind::DecorationPlaced),
        sink.count(GrowthEventKind::Warning),
        writer.len()
    );
}

fn render(site: &GrowthSite, result: &GrowthResult) -> anyhow::Result<()> {
    let config = RenderConfig::new(8)
        .with_height_range(58, 74)
        .with_color("square", [150, 150, 160])
        .with_color("lane", [190, 170, 120])
        .with_color("cottage", [170, 110, 60])
        .with_color("stall", [230, 230, 240]);
    render_layout_to_png(site, result, &config, "growth-village.png")
}
