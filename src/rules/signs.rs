// src/rules/signs.rs
//! Signs and banners: standing ones take a 16-step rotation from the
//! player's yaw, wall ones hang off the block behind them.

use bevy::math::IVec3;

use crate::cell::{Cell, Direction, HorizontalAxis};
use crate::world::WorldView;

use super::{horizontal_facing, is_replaceable, is_sturdy, renamed, PlaceContext, PlacementRule, UpdateContext};

/// 16-step rotation facing back at the player; 0 without a yaw.
fn rotation_from_yaw(yaw: Option<f32>) -> u8 {
    match yaw {
        Some(yaw) => ((((yaw + 180.0) * 16.0 / 360.0) + 0.5).floor() as i32 & 15) as u8,
        None => 0,
    }
}

/// Rotation of a block facing `facing` (0 = south, 4 = west).
fn rotation_of(facing: Direction) -> u8 {
    match facing {
        Direction::West => 4,
        Direction::North => 8,
        Direction::East => 12,
        _ => 0,
    }
}

fn facing_of_rotation(rotation: u8) -> Option<Direction> {
    match rotation {
        0 => Some(Direction::South),
        4 => Some(Direction::West),
        8 => Some(Direction::North),
        12 => Some(Direction::East),
        _ => None,
    }
}

fn sturdy_at(world: &dyn WorldView, position: IVec3) -> bool {
    world.cell_at(position).is_some_and(|c| is_sturdy(&c))
}

/// Sturdy block behind a wall-mounted block facing `facing`.
fn wall_backed(world: &dyn WorldView, position: IVec3, facing: Direction) -> bool {
    sturdy_at(world, position + facing.opposite().offset())
}

fn kept_if(survives: bool, current: &Cell) -> Cell {
    if survives {
        current.clone()
    } else {
        Cell::air()
    }
}

// ---------- Signs ----------

/// Standing signs: 16-step rotation facing the player, solid ground below.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandingSignRule;

impl StandingSignRule {
    fn grounded(world: &dyn WorldView, position: IVec3) -> bool {
        sturdy_at(world, position - IVec3::Y)
    }
}

impl PlacementRule for StandingSignRule {
    fn place(&self, ctx: &PlaceContext, world: &dyn WorldView) -> Option<Cell> {
        if !Self::grounded(world, ctx.position) {
            return None;
        }
        let rotation = rotation_from_yaw(ctx.player_yaw);
        Some(ctx.cell.clone().with_property("rotation", rotation.to_string()))
    }

    fn update(&self, ctx: &UpdateContext, world: &dyn WorldView) -> Cell {
        kept_if(Self::grounded(world, ctx.position), &ctx.current)
    }

    fn max_update_distance(&self) -> u32 {
        1
    }
}

/// Wall signs face away from the clicked side of a solid block.
#[derive(Clone, Copy, Debug, Default)]
pub struct WallSignRule;

impl PlacementRule for WallSignRule {
    fn place(&self, ctx: &PlaceContext, world: &dyn WorldView) -> Option<Cell> {
        let facing = ctx.face.filter(|f| f.is_horizontal())?;
        wall_backed(world, ctx.position, facing)
            .then(|| ctx.cell.clone().with_property("facing", facing.name()))
    }

    fn update(&self, ctx: &UpdateContext, world: &dyn WorldView) -> Cell {
        let backed = horizontal_facing(&ctx.current).is_some_and(|f| wall_backed(world, ctx.position, f));
        kept_if(backed, &ctx.current)
    }

    fn max_update_distance(&self) -> u32 {
        1
    }
}

/// Wall hanging signs hang from a neighbour on either side of their facing.
#[derive(Clone, Copy, Debug, Default)]
pub struct WallHangingSignRule;

impl WallHangingSignRule {
    /// Along-the-wall facing for a click on `face`, picked by which way the player turns.
    fn facing_for(face: Direction, yaw: Option<f32>) -> Option<Direction> {
        let yaw = yaw.map(|y| y.rem_euclid(360.0));
        match face.axis()? {
            HorizontalAxis::Z => Some(match yaw {
                Some(y) if (45.0..135.0).contains(&y) || (225.0..315.0).contains(&y) => Direction::West,
                _ => Direction::East,
            }),
            HorizontalAxis::X => Some(match yaw {
                Some(y) if (135.0..315.0).contains(&y) => Direction::North,
                _ => Direction::South,
            }),
        }
    }

    fn holds(world: &dyn WorldView, position: IVec3, facing: Direction, side: Direction) -> bool {
        let Some(neighbor) = world.cell_at(position + side.offset()) else {
            return false;
        };
        if neighbor.name().ends_with("_wall_hanging_sign") {
            if let Some(other) = horizontal_facing(&neighbor) {
                return other.axis() == facing.axis();
            }
        }
        is_sturdy(&neighbor)
    }

    fn supported(world: &dyn WorldView, position: IVec3, facing: Direction) -> bool {
        Self::holds(world, position, facing, facing.clockwise())
            || Self::holds(world, position, facing, facing.counter_clockwise())
    }
}

impl PlacementRule for WallHangingSignRule {
    fn place(&self, ctx: &PlaceContext, world: &dyn WorldView) -> Option<Cell> {
        let facing = Self::facing_for(ctx.face?, ctx.player_yaw)?;
        Self::supported(world, ctx.position, facing)
            .then(|| ctx.cell.clone().with_property("facing", facing.name()))
    }

    fn update(&self, ctx: &UpdateContext, world: &dyn WorldView) -> Cell {
        let held = horizontal_facing(&ctx.current).is_some_and(|f| Self::supported(world, ctx.position, f));
        kept_if(held, &ctx.current)
    }

    fn max_update_distance(&self) -> u32 {
        1
    }
}

/// Ceiling hanging signs: hang under a sturdy block or another hanging sign.
/// `attached` signs (one chain) turn in 16 steps; two-chain signs snap to
/// the four sides.
#[derive(Clone, Copy, Debug, Default)]
pub struct CeilingHangingSignRule;

impl CeilingHangingSignRule {
    fn hanging_sign_facing(cell: &Cell) -> Option<Direction> {
        let name = cell.name();
        if name.ends_with("_wall_hanging_sign") {
            horizontal_facing(cell)
        } else if name.ends_with("_hanging_sign") {
            cell.property("rotation").and_then(|r| r.parse().ok()).and_then(facing_of_rotation)
        } else {
            None
        }
    }

    fn supported(world: &dyn WorldView, position: IVec3) -> bool {
        world
            .cell_at(position + IVec3::Y)
            .is_some_and(|above| is_sturdy(&above) || above.name().ends_with("_hanging_sign"))
    }
}

impl PlacementRule for CeilingHangingSignRule {
    fn place(&self, ctx: &PlaceContext, world: &dyn WorldView) -> Option<Cell> {
        let above = world.cell_at(ctx.position + IVec3::Y)?;
        if !Self::supported(world, ctx.position) {
            return None;
        }
        let look = ctx.look_direction();
        // two chains need a full face above, or a sign above running the same way
        let attached = ctx.sneaking
            || match Self::hanging_sign_facing(&above) {
                Some(other) => other.axis() != look.axis(),
                None => !is_sturdy(&above),
            };
        let rotation = if attached { rotation_from_yaw(ctx.player_yaw) } else { rotation_of(look.opposite()) };
        Some(ctx.cell.clone().with_properties([
            ("rotation", rotation.to_string()),
            ("attached", attached.to_string()),
        ]))
    }

    fn update(&self, ctx: &UpdateContext, world: &dyn WorldView) -> Cell {
        kept_if(Self::supported(world, ctx.position), &ctx.current)
    }

    fn max_update_distance(&self) -> u32 {
        1
    }
}

// ---------- Banners ----------

/// Banners switch between the standing and the wall variant depending on
/// where they fit first, trying the clicked side before the player's view.
#[derive(Clone, Copy, Debug, Default)]
pub struct BannerRule;

impl BannerRule {
    fn variants(cell: &Cell) -> (String, String) {
        let id = cell.id();
        let base = id
            .strip_suffix("_wall_banner")
            .or_else(|| id.strip_suffix("_banner"))
            .unwrap_or(id);
        (format!("{base}_banner"), format!("{base}_wall_banner"))
    }

    /// Candidate attachment directions, nearest first. `Down` means standing.
    fn candidates(ctx: &PlaceContext, world: &dyn WorldView) -> Vec<Direction> {
        let look = ctx.look_direction();
        let mut order = Vec::with_capacity(6);
        let replacing = world.cell_at(ctx.position).is_some_and(|c| !c.is_air() && is_replaceable(&c));
        if let Some(face) = ctx.face.filter(|_| !replacing) {
            order.push(face.opposite());
        }
        for d in [look, Direction::Down, look.clockwise(), look.counter_clockwise(), look.opposite()] {
            if !order.contains(&d) {
                order.push(d);
            }
        }
        order
    }

    fn is_wall(cell: &Cell) -> bool {
        cell.name().ends_with("_wall_banner")
    }
}

impl PlacementRule for BannerRule {
    fn place(&self, ctx: &PlaceContext, world: &dyn WorldView) -> Option<Cell> {
        let (standing, wall) = Self::variants(&ctx.cell);
        Self::candidates(ctx, world).into_iter().find_map(|d| match d {
            Direction::Up => None,
            Direction::Down => sturdy_at(world, ctx.position - IVec3::Y).then(|| {
                renamed(&ctx.cell, &standing).with_property("rotation", rotation_from_yaw(ctx.player_yaw).to_string())
            }),
            side => {
                let facing = side.opposite();
                wall_backed(world, ctx.position, facing)
                    .then(|| renamed(&ctx.cell, &wall).with_property("facing", facing.name()))
            }
        })
    }

    fn update(&self, ctx: &UpdateContext, world: &dyn WorldView) -> Cell {
        let survives = if Self::is_wall(&ctx.current) {
            horizontal_facing(&ctx.current).is_some_and(|f| wall_backed(world, ctx.position, f))
        } else {
            sturdy_at(world, ctx.position - IVec3::Y)
        };
        kept_if(survives, &ctx.current)
    }

    fn max_update_distance(&self) -> u32 {
        1
    }
}
