//! Material classification used for cost estimation, terrain probing and containers.
//!
//! Material names are namespaced ids such as `minecraft:oak_planks`; every predicate here
//! also accepts the bare name.

pub const STRUCTURE_VOID: &str = "minecraft:structure_void";
pub const AIR: &str = "minecraft:air";
pub const LADDER: &str = "minecraft:ladder";

const AIR_BLOCKS: &[&str] = &["air", "cave_air", "void_air"];

const LIQUIDS: &[&str] = &["water", "lava", "bubble_column"];

const PLANTS: &[&str] = &[
    "grass",
    "short_grass",
    "tall_grass",
    "fern",
    "large_fern",
    "dead_bush",
    "dandelion",
    "poppy",
    "blue_orchid",
    "allium",
    "azure_bluet",
    "red_tulip",
    "orange_tulip",
    "white_tulip",
    "pink_tulip",
    "oxeye_daisy",
    "cornflower",
    "lily_of_the_valley",
    "sunflower",
    "lilac",
    "rose_bush",
    "peony",
    "sweet_berry_bush",
    "sugar_cane",
    "bamboo",
    "cactus",
    "vine",
    "lily_pad",
    "seagrass",
    "tall_seagrass",
    "kelp",
    "kelp_plant",
    "brown_mushroom",
    "red_mushroom",
    "snow",
    "moss_carpet",
    "glow_lichen",
];

const TREE_SUFFIXES: &[&str] = &["_log", "_wood", "_leaves", "_stem", "_hyphae"];
const TREE_BLOCKS: &[&str] = &[
    "brown_mushroom_block",
    "red_mushroom_block",
    "mushroom_stem",
    "nether_wart_block",
    "warped_wart_block",
    "shroomlight",
    "bee_nest",
];

/// Processed or crafted blocks that are cheap to "build" compared with raw materials.
const ARTIFICIAL_SUFFIXES: &[&str] = &[
    "_planks",
    "_bricks",
    "_concrete",
    "_concrete_powder",
    "_terracotta",
    "_glazed_terracotta",
    "_wool",
    "_carpet",
    "_glass",
    "_glass_pane",
    "_fence",
    "_fence_gate",
    "_door",
    "_trapdoor",
    "_wall",
    "_button",
    "_pressure_plate",
    "_sign",
    "_wall_sign",
    "_banner",
    "_bed",
];
const ARTIFICIAL_PREFIXES: &[&str] = &["polished_", "smooth_", "cut_", "chiseled_", "stripped_"];
const ARTIFICIAL_BLOCKS: &[&str] = &[
    "glass",
    "glass_pane",
    "bricks",
    "terracotta",
    "bookshelf",
    "crafting_table",
    "iron_bars",
    "chain",
    "lantern",
    "torch",
    "wall_torch",
    "ladder",
    "scaffolding",
];

/// Blocks charged well above a regular solid block.
const RARE_BLOCKS: &[&str] = &["ender_chest", "jukebox"];

/// Ground blocks that may end up in populated containers.
const NATURAL_SAMPLES: &[&str] = &[
    "dirt",
    "coarse_dirt",
    "rooted_dirt",
    "grass_block",
    "podzol",
    "mycelium",
    "sand",
    "red_sand",
    "gravel",
    "clay",
    "stone",
    "cobblestone",
    "andesite",
    "diorite",
    "granite",
    "sandstone",
    "red_sandstone",
    "snow_block",
    "moss_block",
    "mud",
];

/// Inventory grids as `(columns, rows)`.
const CONTAINERS: &[(&str, (u8, u8))] = &[
    ("chest", (9, 3)),
    ("trapped_chest", (9, 3)),
    ("barrel", (9, 3)),
    ("dispenser", (3, 3)),
    ("dropper", (3, 3)),
    ("hopper", (5, 1)),
];

/// Drops a `namespace:` prefix if present.
pub fn strip_namespace(material: &str) -> &str {
    material.split_once(':').map_or(material, |(_, name)| name)
}

pub fn is_air(material: &str) -> bool {
    AIR_BLOCKS.contains(&strip_namespace(material))
}

pub fn is_structure_void(material: &str) -> bool {
    strip_namespace(material) == "structure_void"
}

pub fn is_liquid(material: &str) -> bool {
    LIQUIDS.contains(&strip_namespace(material))
}

pub fn is_plant(material: &str) -> bool {
    let name = strip_namespace(material);
    PLANTS.contains(&name) || name.ends_with("_sapling") || name.ends_with("_flower")
}

pub fn is_tree(material: &str) -> bool {
    let name = strip_namespace(material);
    TREE_BLOCKS.contains(&name) || TREE_SUFFIXES.iter().any(|s| name.ends_with(s))
}

pub fn is_stair_or_slab(material: &str) -> bool {
    let name = strip_namespace(material);
    name.ends_with("_stairs") || name.ends_with("_slab")
}

pub fn is_artificial(material: &str) -> bool {
    let name = strip_namespace(material);
    ARTIFICIAL_BLOCKS.contains(&name)
        || ARTIFICIAL_SUFFIXES.iter().any(|s| name.ends_with(s))
        || ARTIFICIAL_PREFIXES.iter().any(|p| name.starts_with(p))
}

pub fn is_rare(material: &str) -> bool {
    RARE_BLOCKS.contains(&strip_namespace(material))
}

/// Blocks a terrain walk steps through when looking for solid ground.
pub fn is_ground_cover(material: &str) -> bool {
    is_air(material) || is_plant(material) || is_tree(material)
}

pub fn is_natural_sample(material: &str) -> bool {
    NATURAL_SAMPLES.contains(&strip_namespace(material))
}

/// Construction cost of a single voxel of `material`.
pub fn material_cost(material: &str) -> f64 {
    if is_air(material)
        || is_structure_void(material)
        || is_liquid(material)
        || is_plant(material)
        || is_tree(material)
    {
        0.0
    } else if is_stair_or_slab(material) {
        0.5
    } else if is_rare(material) {
        4.0
    } else if is_artificial(material) {
        0.1
    } else {
        1.0
    }
}

/// Inventory grid `(columns, rows)` of a container material.
pub fn container_grid(material: &str) -> Option<(u8, u8)> {
    let name = strip_namespace(material);
    if name == "shulker_box" || name.ends_with("_shulker_box") {
        return Some((9, 3));
    }
    CONTAINERS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, grid)| *grid)
}

/// Slot index for a grid position; out-of-range positions clamp to the last row/column.
pub fn slot_index(grid: (u8, u8), column: u8, row: u8) -> u8 {
    let (columns, rows) = grid;
    let column = column.min(columns.saturating_sub(1));
    let row = row.min(rows.saturating_sub(1));
    row * columns + column
}
