use glam::{IVec2, IVec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use structure_growth::prelude::*;
use structure_growth_examples::{
    hamlet_kit, init_tracing, render_layout_to_png, RenderConfig, RollingHills,
};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();
    // Steeper hills make the cost term matter.
    let hills = RollingHills::new(5).with_amplitude(9.0);
    let area = BuildArea::new(0, 0, 80, 80);
    let site = hills.site(area)?;
    let corner = IVec2::new(36, 36);
    let top = site
        .baseline
        .crop(corner, corner + IVec2::splat(7))
        .max_height()
        .unwrap_or(64);
    let start = Start::new("square", IVec3::new(corner.x, top + 1, corner.y));

    for (label, strategy) in [
        ("inverse-cost", SelectionStrategy::InverseCostWeighted),
        ("cheapest", SelectionStrategy::Cheapest),
    ] {
        let mut registry = PrototypeRegistry::new(hamlet_kit());
        let config = RunConfig::new(1500.0).with_selection_strategy(strategy);
        let mut runner =
            GrowthRunner::try_new(config, &site, &mut registry)?.with_terrain(&hills);
        let mut rng = StdRng::seed_from_u64(5);
        let result = runner.run(&start, &mut (), &mut rng)?;

        let mean = if result.is_empty() {
            0.0
        } else {
            result.total_cost() / result.len() as f64
        };
        info!(
            "{label}: {} structures, depth {}, mean cost {mean:.1}, {:.1} budget left.",
            result.len(),
            result.max_depth(),
            result.remaining
        );
        let out = format!("growth-selection-{label}.png");
        let render = RenderConfig::new(6).with_height_range(55, 77);
        render_layout_to_png(&site, &result, &render, out)?;
    }
    Ok(())
}
