// src/rules/rail.rs
//! Rails pick their shape from the rails around them: straight, curved
//! (plain rails only) or sloping up towards a rail one block higher.

use bevy::math::IVec3;

use crate::cell::{Cell, Direction, HorizontalAxis};
use crate::world::WorldView;

use super::{is_sturdy, PlaceContext, PlacementRule, UpdateContext};

const RAILS: &[&str] = &["rail", "powered_rail", "detector_rail", "activator_rail"];

#[derive(Clone, Copy, Debug, Default)]
pub struct RailRule;

impl RailRule {
    fn is_rail(cell: &Cell) -> bool {
        RAILS.contains(&cell.name())
    }

    /// Powered, detector and activator rails never curve.
    fn straight_only(cell: &Cell) -> bool {
        cell.name() != "rail"
    }

    fn rail_at(world: &dyn WorldView, position: IVec3) -> bool {
        world.cell_at(position).is_some_and(|c| Self::is_rail(&c))
    }

    /// A rail beside `position` at the same height, one up or one down.
    fn linked(world: &dyn WorldView, position: IVec3, dir: Direction) -> bool {
        let beside = position + dir.offset();
        [IVec3::ZERO, IVec3::Y, IVec3::NEG_Y].into_iter().any(|dy| Self::rail_at(world, beside + dy))
    }

    fn supported(world: &dyn WorldView, position: IVec3) -> bool {
        world.cell_at(position - IVec3::Y).is_some_and(|c| is_sturdy(&c))
    }

    fn shape(world: &dyn WorldView, position: IVec3, straight_only: bool, current: &str) -> String {
        let [north, east, south, west] = Direction::HORIZONTAL.map(|d| Self::linked(world, position, d));
        let along_z = north || south;
        let along_x = east || west;

        let mut shape = match (along_z, along_x) {
            (true, false) => Some("north_south"),
            (false, true) => Some("east_west"),
            _ => None,
        };
        if !straight_only {
            let curve = match (north, east, south, west) {
                (false, true, true, false) => Some("south_east"),
                (false, false, true, true) => Some("south_west"),
                (true, false, false, true) => Some("north_west"),
                (true, true, false, false) => Some("north_east"),
                _ => None,
            };
            shape = curve.or(shape);
        }
        let mut shape = shape.unwrap_or(current).to_string();

        // slope up towards a raised neighbour; the later check wins
        let up = |d: Direction| Self::rail_at(world, position + d.offset() + IVec3::Y);
        let slopes: &[Direction] = match shape.as_str() {
            "north_south" => &[Direction::North, Direction::South],
            "east_west" => &[Direction::East, Direction::West],
            _ => &[],
        };
        for &d in slopes {
            if up(d) {
                shape = format!("ascending_{}", d.name());
            }
        }
        shape
    }

    fn slope_held(world: &dyn WorldView, position: IVec3, shape: &str) -> bool {
        match shape.strip_prefix("ascending_").and_then(Direction::from_name) {
            Some(d) => world.cell_at(position + d.offset()).is_some_and(|c| is_sturdy(&c)),
            None => true,
        }
    }
}

impl PlacementRule for RailRule {
    fn place(&self, ctx: &PlaceContext, world: &dyn WorldView) -> Option<Cell> {
        if !Self::supported(world, ctx.position) {
            return None;
        }
        let initial = match ctx.look_direction().axis() {
            Some(HorizontalAxis::X) => "east_west",
            _ => "north_south",
        };
        let straight_only = Self::straight_only(&ctx.cell);
        let shape = Self::shape(world, ctx.position, straight_only, initial);
        let waterlogged = world.cell_at(ctx.position).is_some_and(|c| c.name() == "water");

        let placed = ctx
            .cell
            .clone()
            .with_property("shape", shape)
            .with_property("waterlogged", waterlogged.to_string());
        Some(if straight_only { placed.with_property("powered", "false") } else { placed })
    }

    fn update(&self, ctx: &UpdateContext, world: &dyn WorldView) -> Cell {
        let current = &ctx.current;
        let shape = current.property("shape").unwrap_or("north_south");
        if !Self::supported(world, ctx.position) || !Self::slope_held(world, ctx.position, shape) {
            return Cell::air();
        }
        let next = Self::shape(world, ctx.position, Self::straight_only(current), shape);
        current.clone().with_property("shape", next)
    }

    fn max_update_distance(&self) -> u32 {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryWorld;

    fn bedded(positions: &[IVec3]) -> MemoryWorld {
        let mut world = MemoryWorld::new();
        for &p in positions {
            world.insert(p - IVec3::Y, Cell::new("minecraft:stone"));
        }
        world
    }

    #[test]
    fn lone_rail_follows_the_view() {
        let pos = IVec3::new(0, 64, 0);
        let world = bedded(&[pos]);
        let rail = |yaw| PlaceContext::new(Cell::new("minecraft:rail"), pos).with_yaw(yaw);
        assert_eq!(RailRule.place(&rail(0.0), &world).unwrap().property("shape"), Some("north_south"));
        assert_eq!(RailRule.place(&rail(90.0), &world).unwrap().property("shape"), Some("east_west"));
        assert!(RailRule.place(&rail(0.0), &MemoryWorld::new()).is_none());
    }

    #[test]
    fn plain_rails_curve_powered_rails_do_not() {
        let pos = IVec3::new(0, 64, 0);
        let mut world = bedded(&[pos]);
        world.insert(pos + IVec3::Z, Cell::new("minecraft:rail"));
        world.insert(pos + IVec3::X, Cell::new("minecraft:rail"));

        let plain = RailRule.place(&PlaceContext::new(Cell::new("minecraft:rail"), pos), &world).unwrap();
        assert_eq!(plain.property("shape"), Some("south_east"));
        assert_eq!(plain.property("powered"), None);

        // both axes linked and no curve: keeps the view's shape
        let powered = RailRule
            .place(&PlaceContext::new(Cell::new("minecraft:powered_rail"), pos).with_yaw(90.0), &world)
            .unwrap();
        assert_eq!(powered.property("shape"), Some("east_west"));
        assert_eq!(powered.property("powered"), Some("false"));
    }

    #[test]
    fn rail_slopes_towards_a_raised_neighbour() {
        let pos = IVec3::new(0, 64, 0);
        let mut world = bedded(&[pos]);
        world.insert(pos + IVec3::NEG_Z, Cell::new("minecraft:stone"));
        world.insert(pos + IVec3::NEG_Z + IVec3::Y, Cell::new("minecraft:rail"));

        let placed = RailRule.place(&PlaceContext::new(Cell::new("minecraft:rail"), pos), &world).unwrap();
        assert_eq!(placed.property("shape"), Some("ascending_north"));

        // the slope loses its footing
        world.insert(pos + IVec3::NEG_Z, Cell::air());
        let ctx = UpdateContext { current: placed, position: pos };
        assert!(RailRule.update(&ctx, &world).is_air());
    }
}
