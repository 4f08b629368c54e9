// src/rules/stairs.rs
//! Stairs: facing and half come from the click, shape from the neighbours.

use bevy::math::IVec3;

use crate::cell::{Cell, Direction};
use crate::world::WorldView;

use super::{horizontal_facing, PlaceContext, PlacementRule, UpdateContext};

/// Indexed by `parse_shape`; layout matches the vanilla side encoding.
const SHAPES: [&str; 36] = [
    "straight", "straight", "inner_right", "inner_left", "inner_right", "straight",
    "straight", "straight", "straight", "inner_left", "straight", "straight",
    "outer_left", "outer_left", "outer_left", "outer_left", "outer_left", "outer_left",
    "straight", "straight", "straight", "inner_left", "straight", "straight",
    "outer_right", "straight", "outer_right", "outer_right", "inner_right", "straight",
    "outer_right", "straight", "outer_right", "outer_right", "straight", "straight",
];

/// `sides` runs clockwise from the stair's own facing.
/// 0: no connection, 1: connects (right), 2: connects (left).
fn parse_shape(sides: [usize; 4]) -> &'static str {
    let third = if sides[2] == 0 { 0 } else { sides[2] + sides[3] + 1 };
    SHAPES[sides[0] * 12 + sides[1] * 6 + third + sides[3]]
}

fn is_stairs(cell: &Cell) -> bool {
    cell.name().ends_with("_stairs")
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StairRule;

impl StairRule {
    fn with_shape(&self, world: &dyn WorldView, cell: Cell, position: IVec3) -> Cell {
        let Some(facing) = horizontal_facing(&cell) else {
            return cell;
        };

        let mut ordered = [facing; 4];
        for i in 1..4 {
            ordered[i] = ordered[i - 1].clockwise();
        }

        let mut sides = [0usize; 4];
        for (i, face) in ordered.iter().copied().enumerate() {
            let Some(neighbor) = world.cell_at(position + face.offset()) else {
                continue;
            };
            if !is_stairs(&neighbor) || neighbor.property("half") != cell.property("half") {
                continue;
            }
            let Some(neighbor_facing) = horizontal_facing(&neighbor) else {
                continue;
            };

            if face.axis() == facing.axis() {
                // front/back: only perpendicular stairs connect
                if neighbor_facing.axis() != facing.axis() {
                    sides[i] = if ordered[(i + 1) % 4] == neighbor_facing { 2 } else { 1 };
                }
            } else {
                let outer = matches!(cell.property("shape"), Some("outer_left" | "outer_right"));
                let connects = (neighbor_facing == facing || neighbor_facing == face)
                    && !(outer && neighbor_facing != facing);
                if connects {
                    sides[i] = 1;
                }
            }
        }

        cell.with_property("shape", parse_shape(sides))
    }
}

impl PlacementRule for StairRule {
    fn place(&self, ctx: &PlaceContext, world: &dyn WorldView) -> Option<Cell> {
        let bottom = ctx.face == Some(Direction::Up)
            || (ctx.face != Some(Direction::Down) && ctx.cursor_y() < 0.5);
        let base = ctx.cell.clone().with_properties([
            ("half", if bottom { "bottom" } else { "top" }),
            ("facing", ctx.look_direction().name()),
        ]);
        Some(self.with_shape(world, base, ctx.position))
    }

    fn update(&self, ctx: &UpdateContext, world: &dyn WorldView) -> Cell {
        self.with_shape(world, ctx.current.clone(), ctx.position)
    }

    fn max_update_distance(&self) -> u32 {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryWorld;

    fn stair(facing: &str) -> Cell {
        Cell::new("minecraft:oak_stairs")
            .with_property("facing", facing)
            .with_property("half", "bottom")
            .with_property("shape", "straight")
    }

    fn shape_at(world: &MemoryWorld, pos: IVec3) -> String {
        let current = world.get(pos).cloned().unwrap();
        StairRule
            .update(&UpdateContext { current, position: pos }, world)
            .property("shape")
            .unwrap()
            .to_string()
    }

    #[test]
    fn lone_stair_is_straight() {
        let world = MemoryWorld::new();
        let placed = StairRule
            .place(&PlaceContext::new(Cell::new("minecraft:oak_stairs"), IVec3::ZERO).on_face(Direction::Up).with_yaw(180.0), &world)
            .unwrap();
        assert_eq!(placed.property("facing"), Some("north"));
        assert_eq!(placed.property("half"), Some("bottom"));
        assert_eq!(placed.property("shape"), Some("straight"));
    }

    #[test]
    fn perpendicular_stair_in_front_makes_outer_corner() {
        let mut world = MemoryWorld::new();
        let pos = IVec3::ZERO;
        world.insert(pos, stair("north"));
        // in front (north) of it, a stair facing east
        world.insert(pos + Direction::North.offset(), stair("east"));
        assert_eq!(shape_at(&world, pos), "outer_right");
    }

    #[test]
    fn perpendicular_stair_behind_makes_inner_corner() {
        let mut world = MemoryWorld::new();
        let pos = IVec3::ZERO;
        world.insert(pos, stair("north"));
        world.insert(pos + Direction::South.offset(), stair("west"));
        assert_eq!(shape_at(&world, pos), "inner_left");
    }

    #[test]
    fn different_halves_never_connect() {
        let mut world = MemoryWorld::new();
        let pos = IVec3::ZERO;
        world.insert(pos, stair("north"));
        world.insert(pos + Direction::North.offset(), stair("east").with_property("half", "top"));
        assert_eq!(shape_at(&world, pos), "straight");
    }
}
