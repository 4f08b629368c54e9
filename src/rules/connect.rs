// src/rules/connect.rs
//! Fences, panes, walls and gates: per-side connections recomputed on every
//! neighbour update.

use bevy::math::IVec3;

use crate::cell::{Cell, Direction};
use crate::world::WorldView;

use super::{horizontal_facing, is_sturdy, never_connects, PlaceContext, PlacementRule, UpdateContext};

/// Sets `north/east/south/west` from `attaches(neighbor, side of neighbor facing us)`.
fn with_connections(
    cell: Cell,
    world: &dyn WorldView,
    position: IVec3,
    waterlogged: &str,
    attaches: impl Fn(&Cell, Direction) -> bool,
) -> Cell {
    let mut out = cell;
    for dir in Direction::HORIZONTAL {
        let connected = world
            .cell_at(position + dir.offset())
            .is_some_and(|n| attaches(&n, dir.opposite()));
        out = out.with_property(dir.name(), if connected { "true" } else { "false" });
    }
    out.with_property("waterlogged", waterlogged)
}

fn waterlogged_or_false(cell: &Cell) -> String {
    cell.property("waterlogged").unwrap_or("false").to_string()
}

/// A gate only lines up when it runs across the connection. `side` is the
/// gate's side facing the connecting block.
fn gate_runs_across(gate: &Cell, side: Direction) -> bool {
    if !gate.name().ends_with("_fence_gate") {
        return false;
    }
    let Some(gate_axis) = horizontal_facing(gate).and_then(Direction::axis) else {
        return false;
    };
    side.clockwise().axis() == Some(gate_axis)
}

fn is_wall(cell: &Cell) -> bool {
    cell.name().ends_with("_wall")
}

// ---------- Fences ----------

#[derive(Clone, Copy, Debug, Default)]
pub struct FenceRule;

impl FenceRule {
    fn same_family(this: &Cell, other: &Cell) -> bool {
        let (a, b) = (this.name(), other.name());
        a.ends_with("_fence") && b.ends_with("_fence") && (a == "nether_brick_fence") == (b == "nether_brick_fence")
    }

    fn can_connect(this: &Cell, neighbor: &Cell, side: Direction) -> bool {
        (!never_connects(neighbor) && is_sturdy(neighbor))
            || Self::same_family(this, neighbor)
            || gate_runs_across(neighbor, side)
    }
}

impl PlacementRule for FenceRule {
    fn place(&self, ctx: &PlaceContext, world: &dyn WorldView) -> Option<Cell> {
        let this = &ctx.cell;
        Some(with_connections(this.clone(), world, ctx.position, "false", |n, side| {
            Self::can_connect(this, n, side)
        }))
    }

    fn update(&self, ctx: &UpdateContext, world: &dyn WorldView) -> Cell {
        let this = &ctx.current;
        with_connections(this.clone(), world, ctx.position, &waterlogged_or_false(this), |n, side| {
            Self::can_connect(this, n, side)
        })
    }
}

// ---------- Panes / bars ----------

#[derive(Clone, Copy, Debug, Default)]
pub struct GlassPaneRule;

impl GlassPaneRule {
    fn is_pane_like(cell: &Cell) -> bool {
        matches!(cell.name(), "iron_bars" | "glass_pane") || cell.name().ends_with("_stained_glass_pane")
    }

    fn attaches_to(neighbor: &Cell) -> bool {
        (!never_connects(neighbor) && is_sturdy(neighbor))
            || Self::is_pane_like(neighbor)
            || is_wall(neighbor)
    }
}

impl PlacementRule for GlassPaneRule {
    fn place(&self, ctx: &PlaceContext, world: &dyn WorldView) -> Option<Cell> {
        Some(with_connections(ctx.cell.clone(), world, ctx.position, "false", |n, _| Self::attaches_to(n)))
    }

    fn update(&self, ctx: &UpdateContext, world: &dyn WorldView) -> Cell {
        let waterlogged = waterlogged_or_false(&ctx.current);
        with_connections(ctx.current.clone(), world, ctx.position, &waterlogged, |n, _| Self::attaches_to(n))
    }
}

// ---------- Walls ----------

/// Walls: each side is `none`, `low` or `tall`, plus a centre post (`up`).
#[derive(Clone, Copy, Debug, Default)]
pub struct WallRule;

impl WallRule {
    fn attaches_to(neighbor: &Cell, side: Direction) -> bool {
        is_wall(neighbor)
            || gate_runs_across(neighbor, side)
            || neighbor.name() == "iron_bars"
            || (!never_connects(neighbor) && is_sturdy(neighbor))
    }

    /// Side heights, then the post. A connected side grows tall under a full
    /// block or under a wall that connects the same way.
    fn shaped(cell: Cell, world: &dyn WorldView, position: IVec3, waterlogged: &str) -> Cell {
        let above = world.cell_at(position + IVec3::Y);
        let heights = Direction::HORIZONTAL.map(|dir| {
            let connected = world
                .cell_at(position + dir.offset())
                .is_some_and(|n| Self::attaches_to(&n, dir.opposite()));
            let covered = above.as_ref().is_some_and(|a| {
                is_sturdy(a) || (is_wall(a) && a.property(dir.name()).is_some_and(|h| h != "none"))
            });
            match (connected, covered) {
                (false, _) => "none",
                (true, false) => "low",
                (true, true) => "tall",
            }
        });

        let mut out = cell;
        for (dir, height) in Direction::HORIZONTAL.into_iter().zip(heights) {
            out = out.with_property(dir.name(), height);
        }
        let post = above.as_ref().is_some_and(|a| is_wall(a) && a.property("up") == Some("true"))
            || Self::needs_post(heights);
        out.with_property("waterlogged", waterlogged).with_property("up", post.to_string())
    }

    /// Sides in north, east, south, west order.
    fn needs_post([north, east, south, west]: [&str; 4]) -> bool {
        let none = |h: &str| h == "none";
        let all_none = none(north) && none(east) && none(south) && none(west);
        let uneven = none(north) != none(south) || none(east) != none(west);
        if all_none || uneven {
            return true;
        }
        let straight_tall = (north == "tall" && south == "tall") || (east == "tall" && west == "tall");
        !straight_tall
    }
}

impl PlacementRule for WallRule {
    fn place(&self, ctx: &PlaceContext, world: &dyn WorldView) -> Option<Cell> {
        Some(Self::shaped(ctx.cell.clone(), world, ctx.position, "false"))
    }

    fn update(&self, ctx: &UpdateContext, world: &dyn WorldView) -> Cell {
        let waterlogged = waterlogged_or_false(&ctx.current);
        Self::shaped(ctx.current.clone(), world, ctx.position, &waterlogged)
    }
}

// ---------- Fence gates ----------

/// Gates face the way the player looks and drop into a wall (`in_wall`)
/// when a wall flanks them.
#[derive(Clone, Copy, Debug, Default)]
pub struct FenceGateRule;

impl FenceGateRule {
    fn in_wall(world: &dyn WorldView, position: IVec3, facing: Direction) -> bool {
        [facing.clockwise(), facing.counter_clockwise()]
            .into_iter()
            .any(|side| world.cell_at(position + side.offset()).is_some_and(|n| is_wall(&n)))
    }
}

impl PlacementRule for FenceGateRule {
    fn place(&self, ctx: &PlaceContext, world: &dyn WorldView) -> Option<Cell> {
        let facing = ctx.look_direction();
        let in_wall = Self::in_wall(world, ctx.position, facing);
        Some(ctx.cell.clone().with_properties([
            ("facing", facing.name()),
            ("open", "false"),
            ("powered", "false"),
            ("in_wall", if in_wall { "true" } else { "false" }),
        ]))
    }

    fn update(&self, ctx: &UpdateContext, world: &dyn WorldView) -> Cell {
        let facing = horizontal_facing(&ctx.current).unwrap_or(Direction::North);
        let in_wall = Self::in_wall(world, ctx.position, facing);
        ctx.current.clone().with_property("in_wall", in_wall.to_string())
    }
}
