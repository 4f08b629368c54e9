// src/rules/mod.rs
//! Per-block placement rules: work out the state a block takes when a player
//! places it (facing, half, shape, connections), and how it reacts when a
//! neighbour changes.

use bevy::math::{IVec3, Vec3};

use crate::cell::{Cell, Direction};
use crate::world::WorldView;

mod connect;
mod multi;
mod rail;
mod registry;
mod signs;
mod simple;
mod stairs;
mod support;

pub use connect::{FenceGateRule, FenceRule, GlassPaneRule, WallRule};
pub use multi::{BedRule, ChestRule, DoorRule, TallPlantRule};
pub use rail::RailRule;
pub use registry::{refresh_shapes, RuleRegistry};
pub use signs::{BannerRule, CeilingHangingSignRule, StandingSignRule, WallHangingSignRule, WallSignRule};
pub use simple::{AxisRule, ButtonRule, DummyRule, HorizontalFacingRule, SlabRule, TrapdoorRule};
pub use stairs::StairRule;
pub use support::{CactusRule, CropRule, MushroomRule, SugarCaneRule};

// ---------- Contexts ----------

/// A player placing `cell` at `position`.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaceContext {
    pub cell: Cell,
    pub position: IVec3,
    /// Face of the clicked block (`Up` = clicked the top face).
    pub face: Option<Direction>,
    /// Hit point inside the clicked block, 0..1 on each axis.
    pub cursor: Option<Vec3>,
    /// Player yaw in degrees; 0 looks south.
    pub player_yaw: Option<f32>,
    /// Sneaking players place chests without pairing them.
    pub sneaking: bool,
}

impl PlaceContext {
    pub fn new(cell: Cell, position: IVec3) -> Self {
        Self { cell, position, face: None, cursor: None, player_yaw: None, sneaking: false }
    }

    pub fn on_face(mut self, face: Direction) -> Self {
        self.face = Some(face);
        self
    }

    pub fn at_cursor(mut self, cursor: Vec3) -> Self {
        self.cursor = Some(cursor);
        self
    }

    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.player_yaw = Some(yaw);
        self
    }

    pub fn sneaking(mut self) -> Self {
        self.sneaking = true;
        self
    }

    pub(crate) fn cursor_y(&self) -> f32 {
        self.cursor.map_or(0.0, |c| c.y)
    }

    /// Direction the player looks towards; south without a yaw.
    pub(crate) fn look_direction(&self) -> Direction {
        Direction::from_yaw(self.player_yaw.unwrap_or(0.0))
    }
}

/// A block re-evaluating itself after something near it changed.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateContext {
    pub current: Cell,
    pub position: IVec3,
}

// ---------- Trait ----------

pub trait PlacementRule: Send + Sync + 'static {
    /// Final state for a placement, or `None` to refuse it.
    fn place(&self, ctx: &PlaceContext, world: &dyn WorldView) -> Option<Cell>;

    /// Extra cells written next to an accepted placement (the upper half of
    /// a door, the head of a bed). `placed` is what `place` returned.
    fn companions(&self, ctx: &PlaceContext, placed: &Cell) -> Vec<(IVec3, Cell)> {
        let _ = (ctx, placed);
        Vec::new()
    }

    /// New state after a neighbour update. Unchanged by default.
    fn update(&self, ctx: &UpdateContext, world: &dyn WorldView) -> Cell {
        let _ = world;
        ctx.current.clone()
    }

    /// How far (in blocks) a change here can ripple.
    fn max_update_distance(&self) -> u32 {
        10
    }
}

// ---------- Block heuristics ----------

/// Blocks whose faces never count as full, by name suffix.
const PARTIAL_SUFFIXES: &[&str] = &[
    "_slab", "_stairs", "_fence", "_fence_gate", "_pane", "_wall", "_door", "_trapdoor",
    "_sign", "_button", "_pressure_plate", "_carpet", "_torch", "_sapling", "_rail", "_bars",
    "_banner", "_bed", "_candle", "_head", "_skull",
];

const NON_SOLID: &[&str] = &[
    "water", "lava", "short_grass", "tall_grass", "fern", "large_fern", "dead_bush", "vine",
    "ladder", "snow", "rail", "redstone_wire", "lever", "torch", "glass_pane", "iron_bars",
    "chest", "trapped_chest", "ender_chest", "farmland", "dirt_path", "wheat", "carrots",
    "potatoes", "beetroots", "sugar_cane", "cactus", "cobweb", "scaffolding",
];

const REPLACEABLE: &[&str] = &[
    "short_grass", "tall_grass", "fern", "large_fern", "dead_bush", "vine", "water", "lava",
    "snow", "seagrass",
];

/// Blocks that refuse fence/pane connections even though they are full cubes.
const NEVER_CONNECT: &[&str] = &["barrier", "carved_pumpkin", "jack_o_lantern", "melon", "pumpkin"];

/// Full, solid cube on every face.
pub fn is_sturdy(cell: &Cell) -> bool {
    let name = cell.name();
    !cell.is_air() && !NON_SOLID.contains(&name) && !PARTIAL_SUFFIXES.iter().any(|s| name.ends_with(s))
}

pub fn is_replaceable(cell: &Cell) -> bool {
    cell.is_air() || REPLACEABLE.contains(&cell.name())
}

pub(crate) fn never_connects(cell: &Cell) -> bool {
    let name = cell.name();
    name.ends_with("_leaves") || name.ends_with("shulker_box") || NEVER_CONNECT.contains(&name)
}

pub(crate) fn horizontal_facing(cell: &Cell) -> Option<Direction> {
    cell.property("facing").and_then(Direction::from_name).filter(|d| d.is_horizontal())
}

/// Placing into `position` is allowed: nothing there, or something a placement washes away.
pub(crate) fn free_at(world: &dyn WorldView, position: IVec3) -> bool {
    world.cell_at(position).is_none_or(|c| is_replaceable(&c))
}

/// Same cell with another id, keeping its data blob.
pub(crate) fn renamed(cell: &Cell, id: &str) -> Cell {
    match cell.data() {
        Some(data) => Cell::new(id).with_data(data.to_vec()),
        None => Cell::new(id),
    }
}
