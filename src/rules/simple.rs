// src/rules/simple.rs
//! Rules that only look at the click itself (face, cursor, yaw).

use crate::cell::{Cell, Direction};
use crate::world::WorldView;

use super::{PlaceContext, PlacementRule};

/// Places the block as-is.
#[derive(Clone, Copy, Debug, Default)]
pub struct DummyRule;

impl PlacementRule for DummyRule {
    fn place(&self, ctx: &PlaceContext, _world: &dyn WorldView) -> Option<Cell> {
        Some(ctx.cell.clone())
    }
}

/// Logs, pillars: axis follows the clicked face.
#[derive(Clone, Copy, Debug, Default)]
pub struct AxisRule;

impl PlacementRule for AxisRule {
    fn place(&self, ctx: &PlaceContext, _world: &dyn WorldView) -> Option<Cell> {
        let axis = match ctx.face.unwrap_or(Direction::Up) {
            Direction::West | Direction::East => "x",
            Direction::North | Direction::South => "z",
            Direction::Up | Direction::Down => "y",
        };
        Some(ctx.cell.clone().with_property("axis", axis))
    }
}

/// Furnaces, glazed terracotta and friends face back at the player.
#[derive(Clone, Copy, Debug, Default)]
pub struct HorizontalFacingRule;

impl PlacementRule for HorizontalFacingRule {
    fn place(&self, ctx: &PlaceContext, _world: &dyn WorldView) -> Option<Cell> {
        let facing = ctx
            .player_yaw
            .map_or(Direction::North, |yaw| Direction::from_yaw(yaw).opposite());
        Some(ctx.cell.clone().with_property("facing", facing.name()))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ButtonRule;

impl PlacementRule for ButtonRule {
    fn place(&self, ctx: &PlaceContext, _world: &dyn WorldView) -> Option<Cell> {
        let face = ctx.face?;
        let (attach, facing) = match face {
            Direction::Up => ("floor", ctx.look_direction()),
            Direction::Down => ("ceiling", ctx.look_direction()),
            side => ("wall", side),
        };
        Some(ctx.cell.clone().with_properties([
            ("face", attach),
            ("facing", facing.name()),
            ("powered", "false"),
        ]))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TrapdoorRule;

impl PlacementRule for TrapdoorRule {
    fn place(&self, ctx: &PlaceContext, _world: &dyn WorldView) -> Option<Cell> {
        let face = ctx.face.unwrap_or(Direction::Up);
        let (facing, half) = if face.is_horizontal() {
            (face, if ctx.cursor_y() > 0.5 { "top" } else { "bottom" })
        } else {
            let half = if face == Direction::Up { "bottom" } else { "top" };
            (ctx.look_direction().opposite(), half)
        };
        Some(ctx.cell.clone().with_properties([
            ("facing", facing.name()),
            ("half", half),
            ("open", "false"),
            ("powered", "false"),
            ("waterlogged", "false"),
        ]))
    }
}

/// Top/bottom from the click; a second slab into a half slab makes a double.
#[derive(Clone, Copy, Debug, Default)]
pub struct SlabRule;

impl PlacementRule for SlabRule {
    fn place(&self, ctx: &PlaceContext, world: &dyn WorldView) -> Option<Cell> {
        if let Some(existing) = world.cell_at(ctx.position) {
            if existing.same_type(&ctx.cell) && existing.property("type").is_some_and(|t| t != "double") {
                return Some(ctx.cell.clone().with_property("type", "double"));
            }
        }

        let face = ctx.face.unwrap_or(Direction::Up);
        let bottom = face != Direction::Down && (face == Direction::Up || ctx.cursor_y() <= 0.5);
        Some(ctx.cell.clone().with_property("type", if bottom { "bottom" } else { "top" }))
    }
}
