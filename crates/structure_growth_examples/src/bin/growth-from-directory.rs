use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use glam::{IVec2, IVec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use structure_growth::prelude::*;
use structure_growth_examples::{hamlet_kit, init_tracing, write_kit_to_dir, RollingHills};
use tracing::info;

/// Streams batches of voxel writes as text lines, one command per voxel.
struct CommandLog {
    out: BufWriter<File>,
    batches: usize,
}

impl BlockTransport for CommandLog {
    fn send(&mut self, batch: &[VoxelWrite]) -> Result<()> {
        for write in batch {
            writeln!(self.out, "setblock {write}")?;
        }
        self.batches += 1;
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    // Templates live on disk; the first argument picks the directory.
    let root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("structure-growth-hamlet"));
    let written = write_kit_to_dir(&hamlet_kit(), &root)?;
    info!("Wrote {written} templates to {}.", root.display());

    let mut registry = PrototypeRegistry::new(DirectorySource::new(&root));
    let loaded = registry.preload_all()?;
    info!("Loaded {loaded} templates: {}.", registry.names().join(", "));

    let hills = RollingHills::new(99).with_amplitude(2.0);
    let site = hills.site(BuildArea::new(0, 0, 64, 64))?;
    let corner = IVec2::new(29, 29);
    let start_y = site
        .baseline
        .crop(corner, corner + IVec2::splat(7))
        .max_height()
        .unwrap_or(64)
        + 1;

    let mut runner =
        GrowthRunner::try_new(RunConfig::new(800.0), &site, &mut registry)?.with_terrain(&hills);
    let log = CommandLog {
        out: BufWriter::new(File::create("growth-commands.txt")?),
        batches: 0,
    };
    let mut writer = BatchedWriter::new(log).with_limit(64);
    let mut rng = StdRng::seed_from_u64(99);
    let start = Start::new("square", IVec3::new(corner.x, start_y, corner.y));
    let result = runner.run(&start, &mut writer, &mut rng)?;

    let sent = writer.sent();
    let mut log = writer.into_transport();
    log.out.flush()?;
    info!(
        "Placed {} structures; {sent} voxel writes in {} batches went to growth-commands.txt.",
        result.len(),
        log.batches
    );
    Ok(())
}
