// src/rules/support.rs
//! Blocks that need something underneath them and pop off when it goes away.

use bevy::math::IVec3;

use crate::cell::{Cell, Direction};
use crate::world::WorldView;

use super::{free_at, is_sturdy, PlaceContext, PlacementRule, UpdateContext};

/// Dirt-like ground that flowers and tall plants root in.
pub(crate) const PLANT_SOIL: &[&str] = &[
    "dirt", "grass_block", "podzol", "coarse_dirt", "mycelium", "rooted_dirt", "moss_block",
    "pale_moss_block", "mud", "muddy_mangrove_roots",
];

fn below(world: &dyn WorldView, position: IVec3) -> Option<Cell> {
    world.cell_at(position - IVec3::Y)
}

fn name_is(cell: &Option<Cell>, names: &[&str]) -> bool {
    cell.as_ref().is_some_and(|c| names.contains(&c.name()))
}

/// `current` while `survives`, air once it does not.
fn kept_if(survives: bool, current: &Cell) -> Cell {
    if survives {
        current.clone()
    } else {
        Cell::air()
    }
}

/// Wheat, carrots and the like: farmland only.
#[derive(Clone, Copy, Debug, Default)]
pub struct CropRule;

impl CropRule {
    fn on_farmland(world: &dyn WorldView, position: IVec3) -> bool {
        below(world, position).is_some_and(|c| c.name() == "farmland")
    }
}

impl PlacementRule for CropRule {
    fn place(&self, ctx: &PlaceContext, world: &dyn WorldView) -> Option<Cell> {
        if !free_at(world, ctx.position) {
            return None;
        }
        Self::on_farmland(world, ctx.position).then(|| ctx.cell.clone())
    }

    fn update(&self, ctx: &UpdateContext, world: &dyn WorldView) -> Cell {
        kept_if(Self::on_farmland(world, ctx.position), &ctx.current)
    }

    fn max_update_distance(&self) -> u32 {
        1
    }
}

/// Sand or another cactus below, nothing solid or molten beside it.
#[derive(Clone, Copy, Debug, Default)]
pub struct CactusRule;

impl CactusRule {
    fn survives(world: &dyn WorldView, position: IVec3) -> bool {
        let crowded = Direction::HORIZONTAL.into_iter().any(|d| {
            world
                .cell_at(position + d.offset())
                .is_some_and(|n| is_sturdy(&n) || n.name() == "lava")
        });
        let flooded = name_is(&world.cell_at(position + IVec3::Y), &["water", "lava"]);
        !crowded && !flooded && name_is(&below(world, position), &["cactus", "sand", "red_sand"])
    }
}

impl PlacementRule for CactusRule {
    fn place(&self, ctx: &PlaceContext, world: &dyn WorldView) -> Option<Cell> {
        (free_at(world, ctx.position) && Self::survives(world, ctx.position)).then(|| ctx.cell.clone())
    }

    fn update(&self, ctx: &UpdateContext, world: &dyn WorldView) -> Cell {
        kept_if(Self::survives(world, ctx.position), &ctx.current)
    }

    fn max_update_distance(&self) -> u32 {
        1
    }
}

/// Stacks on itself, or roots in soil or sand that touches water.
#[derive(Clone, Copy, Debug, Default)]
pub struct SugarCaneRule;

impl SugarCaneRule {
    fn survives(world: &dyn WorldView, position: IVec3) -> bool {
        let ground = below(world, position);
        if name_is(&ground, &["sugar_cane"]) {
            return true;
        }
        let soil = name_is(&ground, PLANT_SOIL) || name_is(&ground, &["sand", "red_sand"]);
        let ground_pos = position - IVec3::Y;
        soil && Direction::HORIZONTAL
            .into_iter()
            .any(|d| name_is(&world.cell_at(ground_pos + d.offset()), &["water", "frosted_ice"]))
    }
}

impl PlacementRule for SugarCaneRule {
    fn place(&self, ctx: &PlaceContext, world: &dyn WorldView) -> Option<Cell> {
        (free_at(world, ctx.position) && Self::survives(world, ctx.position)).then(|| ctx.cell.clone())
    }

    fn update(&self, ctx: &UpdateContext, world: &dyn WorldView) -> Cell {
        kept_if(Self::survives(world, ctx.position), &ctx.current)
    }

    fn max_update_distance(&self) -> u32 {
        1
    }
}

/// Mushrooms: fungal ground or anything solid.
#[derive(Clone, Copy, Debug, Default)]
pub struct MushroomRule;

impl MushroomRule {
    fn survives(world: &dyn WorldView, position: IVec3) -> bool {
        below(world, position).is_some_and(|c| {
            matches!(c.name(), "mycelium" | "podzol" | "crimson_nylium" | "warped_nylium") || is_sturdy(&c)
        })
    }
}

impl PlacementRule for MushroomRule {
    fn place(&self, ctx: &PlaceContext, world: &dyn WorldView) -> Option<Cell> {
        (free_at(world, ctx.position) && Self::survives(world, ctx.position)).then(|| ctx.cell.clone())
    }

    fn update(&self, ctx: &UpdateContext, world: &dyn WorldView) -> Cell {
        kept_if(Self::survives(world, ctx.position), &ctx.current)
    }

    fn max_update_distance(&self) -> u32 {
        1
    }
}
