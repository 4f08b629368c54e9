// src/rules/multi.rs
//! Blocks made of two cells: doors, beds, tall plants and paired chests.
//! A half that loses its partner turns to air (chests fall back to single).

use bevy::math::{IVec3, Vec3};

use crate::cell::{Cell, Direction};
use crate::world::WorldView;

use super::support::PLANT_SOIL;
use super::{free_at, horizontal_facing, is_sturdy, PlaceContext, PlacementRule, UpdateContext};

fn sturdy_at(world: &dyn WorldView, position: IVec3) -> bool {
    world.cell_at(position).is_some_and(|c| is_sturdy(&c))
}

fn other_half(half: &str) -> &'static str {
    if half == "lower" {
        "upper"
    } else {
        "lower"
    }
}

/// `current` while the vertical partner half is in place, air otherwise.
fn keep_with_partner(ctx: &UpdateContext, world: &dyn WorldView, partner: impl Fn(&Cell) -> bool) -> Cell {
    let Some(half) = ctx.current.property("half") else {
        return ctx.current.clone();
    };
    let dy = if half == "lower" { IVec3::Y } else { IVec3::NEG_Y };
    let wanted = other_half(half);
    let paired = world
        .cell_at(ctx.position + dy)
        .is_some_and(|c| partner(&c) && c.property("half") == Some(wanted));
    if paired {
        ctx.current.clone()
    } else {
        Cell::air()
    }
}

// ---------- Doors ----------

#[derive(Clone, Copy, Debug, Default)]
pub struct DoorRule;

impl DoorRule {
    fn is_door(cell: &Cell) -> bool {
        let name = cell.name();
        name.ends_with("_door") && !name.ends_with("_trapdoor")
    }

    fn is_lower_door(cell: &Option<Cell>) -> bool {
        cell.as_ref().is_some_and(|c| Self::is_door(c) && c.property("half") == Some("lower"))
    }

    /// Hinge side: next to solid blocks, away from a neighbouring door,
    /// otherwise on the side of the door the player clicked.
    fn hinge(ctx: &PlaceContext, world: &dyn WorldView, facing: Direction) -> &'static str {
        let (left, right) = (facing.counter_clockwise(), facing.clockwise());
        let at = |d: Direction, dy: i32| ctx.position + d.offset() + IVec3::new(0, dy, 0);
        let solid = |d: Direction, dy: i32| i32::from(sturdy_at(world, at(d, dy)));
        let score = solid(right, 0) + solid(right, 1) - solid(left, 0) - solid(left, 1);
        let left_door = Self::is_lower_door(&world.cell_at(at(left, 0)));
        let right_door = Self::is_lower_door(&world.cell_at(at(right, 0)));

        if (left_door && !right_door) || score > 0 {
            return "right";
        }
        if (right_door && !left_door) || score < 0 {
            return "left";
        }

        // cursor relative to the placed block
        let cursor = ctx.cursor.unwrap_or(Vec3::splat(0.5));
        let shift = ctx.face.map_or(IVec3::ZERO, Direction::offset);
        let (x, z) = (cursor.x - shift.x as f32, cursor.z - shift.z as f32);
        let step = facing.offset();
        let clicked_right = (step.x < 0 && z < 0.5)
            || (step.x > 0 && z > 0.5)
            || (step.z < 0 && x > 0.5)
            || (step.z > 0 && x < 0.5);
        if clicked_right {
            "right"
        } else {
            "left"
        }
    }
}

impl PlacementRule for DoorRule {
    fn place(&self, ctx: &PlaceContext, world: &dyn WorldView) -> Option<Cell> {
        let upper = ctx.position + IVec3::Y;
        if !world.is_in_bounds(upper) || !world.is_in_bounds(ctx.position - IVec3::Y) {
            return None;
        }
        if !free_at(world, ctx.position) || !free_at(world, upper) || !sturdy_at(world, ctx.position - IVec3::Y) {
            return None;
        }
        let facing = ctx.look_direction();
        Some(ctx.cell.clone().with_properties([
            ("facing", facing.name()),
            ("open", "false"),
            ("hinge", Self::hinge(ctx, world, facing)),
            ("powered", "false"),
            ("half", "lower"),
        ]))
    }

    fn companions(&self, ctx: &PlaceContext, placed: &Cell) -> Vec<(IVec3, Cell)> {
        vec![(ctx.position + IVec3::Y, placed.clone().with_property("half", "upper"))]
    }

    fn update(&self, ctx: &UpdateContext, world: &dyn WorldView) -> Cell {
        keep_with_partner(ctx, world, Self::is_door)
    }

    fn max_update_distance(&self) -> u32 {
        1
    }
}

// ---------- Tall plants ----------

/// Sunflowers, lilacs, tall grass: rooted lower half plus an upper half.
#[derive(Clone, Copy, Debug, Default)]
pub struct TallPlantRule;

impl TallPlantRule {
    fn rooted(world: &dyn WorldView, position: IVec3) -> bool {
        world
            .cell_at(position - IVec3::Y)
            .is_some_and(|c| PLANT_SOIL.contains(&c.name()) || c.name() == "farmland")
    }
}

impl PlacementRule for TallPlantRule {
    fn place(&self, ctx: &PlaceContext, world: &dyn WorldView) -> Option<Cell> {
        let ok = free_at(world, ctx.position)
            && free_at(world, ctx.position + IVec3::Y)
            && Self::rooted(world, ctx.position);
        ok.then(|| ctx.cell.clone().with_property("half", "lower"))
    }

    fn companions(&self, ctx: &PlaceContext, placed: &Cell) -> Vec<(IVec3, Cell)> {
        vec![(ctx.position + IVec3::Y, placed.clone().with_property("half", "upper"))]
    }

    fn update(&self, ctx: &UpdateContext, world: &dyn WorldView) -> Cell {
        match ctx.current.property("half") {
            None => Cell::air(),
            Some("lower") if !Self::rooted(world, ctx.position) => Cell::air(),
            Some(_) => keep_with_partner(ctx, world, |c| c.same_type(&ctx.current)),
        }
    }

    fn max_update_distance(&self) -> u32 {
        1
    }
}

// ---------- Beds ----------

/// Foot where the player clicked, head one block further along their view.
#[derive(Clone, Copy, Debug, Default)]
pub struct BedRule;

impl PlacementRule for BedRule {
    fn place(&self, ctx: &PlaceContext, world: &dyn WorldView) -> Option<Cell> {
        let facing = ctx.look_direction();
        let head = ctx.position + facing.offset();
        if !world.is_in_bounds(ctx.position) || !free_at(world, head) {
            return None;
        }
        Some(ctx.cell.clone().with_properties([
            ("facing", facing.name()),
            ("occupied", "false"),
            ("part", "foot"),
        ]))
    }

    fn companions(&self, ctx: &PlaceContext, placed: &Cell) -> Vec<(IVec3, Cell)> {
        let Some(facing) = horizontal_facing(placed) else {
            return Vec::new();
        };
        vec![(ctx.position + facing.offset(), placed.clone().with_property("part", "head"))]
    }

    /// Drops the half whose partner is gone; otherwise mirrors the partner's `occupied`.
    fn update(&self, ctx: &UpdateContext, world: &dyn WorldView) -> Cell {
        let current = &ctx.current;
        let (Some(part), Some(facing)) = (current.property("part"), horizontal_facing(current)) else {
            return current.clone();
        };
        let (toward, wanted) = if part == "foot" { (facing, "head") } else { (facing.opposite(), "foot") };
        let Some(partner) = world.cell_at(ctx.position + toward.offset()) else {
            return Cell::air();
        };
        if partner.property("part") != Some(wanted) || horizontal_facing(&partner) != Some(facing) {
            return Cell::air();
        }
        match partner.property("occupied") {
            Some(occupied) => current.clone().with_property("occupied", occupied),
            None => current.clone(),
        }
    }

    fn max_update_distance(&self) -> u32 {
        1
    }
}

// ---------- Chests ----------

/// Chests face the player and pair with a single chest of the same kind
/// beside them facing the same way. `left` pairs clockwise of the facing,
/// `right` counter-clockwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChestRule;

impl ChestRule {
    fn partner_side(facing: Direction, kind: &str) -> Option<Direction> {
        match kind {
            "left" => Some(facing.clockwise()),
            "right" => Some(facing.counter_clockwise()),
            _ => None,
        }
    }

    fn chest_beside(world: &dyn WorldView, this: &Cell, position: IVec3, side: Direction) -> Option<(Direction, String)> {
        let neighbor = world.cell_at(position + side.offset())?;
        if !neighbor.same_type(this) {
            return None;
        }
        Some((horizontal_facing(&neighbor)?, neighbor.property("type").unwrap_or("single").to_string()))
    }

    fn kind_for(world: &dyn WorldView, this: &Cell, position: IVec3, facing: Direction) -> &'static str {
        let single_facing_same = |side| {
            Self::chest_beside(world, this, position, side).is_some_and(|(f, kind)| f == facing && kind == "single")
        };
        if single_facing_same(facing.clockwise()) {
            "left"
        } else if single_facing_same(facing.counter_clockwise()) {
            "right"
        } else {
            "single"
        }
    }
}

impl PlacementRule for ChestRule {
    fn place(&self, ctx: &PlaceContext, world: &dyn WorldView) -> Option<Cell> {
        let facing = ctx.look_direction().opposite();
        let kind = if ctx.sneaking { "single" } else { Self::kind_for(world, &ctx.cell, ctx.position, facing) };
        Some(ctx.cell.clone().with_properties([
            ("facing", facing.name()),
            ("type", kind),
            ("waterlogged", "false"),
        ]))
    }

    /// A single chest joins a neighbour that already points at it; a paired
    /// chest whose partner no longer points back becomes single.
    fn update(&self, ctx: &UpdateContext, world: &dyn WorldView) -> Cell {
        let current = &ctx.current;
        let Some(facing) = horizontal_facing(current) else {
            return current.clone();
        };
        let kind = current.property("type").unwrap_or("single");

        if let Some(side) = Self::partner_side(facing, kind) {
            let held = Self::chest_beside(world, current, ctx.position, side).is_some_and(|(f, other)| {
                f == facing && Self::partner_side(f, &other) == Some(side.opposite())
            });
            return if held { current.clone() } else { current.clone().with_property("type", "single") };
        }

        for side in Direction::HORIZONTAL {
            let Some((f, other)) = Self::chest_beside(world, current, ctx.position, side) else {
                continue;
            };
            if f == facing && Self::partner_side(f, &other) == Some(side.opposite()) {
                let joined = if other == "left" { "right" } else { "left" };
                return current.clone().with_property("type", joined);
            }
        }
        current.clone()
    }

    fn max_update_distance(&self) -> u32 {
        1
    }
}
