#![forbid(unsafe_code)]

mod kits;
mod rendering;
mod terrain;

pub use kits::{hamlet_kit, write_kit_to_dir};
pub use rendering::{init_tracing, render_layout_to_png, RenderConfig};
pub use terrain::RollingHills;
