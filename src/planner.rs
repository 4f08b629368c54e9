// src/planner.rs
//! Turns a structure + transform into an ordered write plan and a conflict
//! report. Planning never writes and never fails on world state, so a plan
//! doubles as a dry run.

use bevy::log::debug;
use bevy::math::IVec3;
use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::structure::Structure;
use crate::transform::Transform;
use crate::world::{BlockBox, WorldView};

// ---------- Policy ----------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementPolicy {
    /// Replace non-air world cells instead of flagging them.
    pub overwrite_existing: bool,
    /// Air source cells produce no operation.
    pub skip_air: bool,
    /// Flag coordinates outside the host's world range; when off they are dropped silently.
    pub bounds_check: bool,
    /// Rotate/mirror block states together with their coordinates.
    pub transform_states: bool,
}

impl Default for PlacementPolicy {
    fn default() -> Self {
        Self { overwrite_existing: false, skip_air: true, bounds_check: true, transform_states: true }
    }
}

// ---------- Plan ----------

/// One planned write. Air cells act as clears.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedWrite {
    pub world: IVec3,
    pub local: IVec3,
    pub cell: Cell,
}

impl PlannedWrite {
    pub fn is_clear(&self) -> bool {
        self.cell.is_air()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConflictKind {
    /// Outside the host's valid world range.
    OutOfWorld,
    /// A non-air cell is already there and overwriting is off.
    Occupied { existing: Cell },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conflict {
    pub world: IVec3,
    pub local: IVec3,
    pub kind: ConflictKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacementPlan {
    operations: Vec<PlannedWrite>,
    conflicts: Vec<Conflict>,
    dropped: usize,
    bounds: BlockBox,
    policy: PlacementPolicy,
}

impl PlacementPlan {
    pub fn operations(&self) -> &[PlannedWrite] {
        &self.operations
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// Out-of-world cells skipped without a conflict (`bounds_check` off).
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// World-space box of the transformed structure.
    pub fn bounds(&self) -> BlockBox {
        self.bounds
    }

    pub fn policy(&self) -> PlacementPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    pub fn out_of_world_conflicts(&self) -> usize {
        self.conflicts.iter().filter(|c| c.kind == ConflictKind::OutOfWorld).count()
    }

    pub fn occupied_conflicts(&self) -> usize {
        self.conflicts.len() - self.out_of_world_conflicts()
    }
}

// ---------- Planning ----------

/// Plan placing `structure` under `transform`. The transform is fitted to the
/// structure first, so an unpivoted transform puts the origin on its translation.
pub fn plan<V: WorldView + ?Sized>(
    structure: &Structure,
    transform: &Transform,
    world: &V,
    policy: PlacementPolicy,
) -> PlacementPlan {
    let transform = transform.fitted_to(structure);
    let mut operations = Vec::with_capacity(structure.count_present());
    let mut conflicts = Vec::new();
    let mut dropped = 0usize;

    for (local, cell) in structure.present_cells() {
        if policy.skip_air && cell.is_air() {
            continue;
        }

        // a coordinate past the i32 range is outside any world
        let checked = transform.apply_checked(local);
        let world_pos = checked.unwrap_or_else(|| transform.apply(local));

        if checked.is_none() || !world.is_in_bounds(world_pos) {
            if policy.bounds_check {
                conflicts.push(Conflict { world: world_pos, local, kind: ConflictKind::OutOfWorld });
            } else {
                dropped += 1;
            }
            continue;
        }

        if !policy.overwrite_existing {
            if let Some(existing) = world.cell_at(world_pos).filter(|c| !c.is_air()) {
                conflicts.push(Conflict { world: world_pos, local, kind: ConflictKind::Occupied { existing } });
                continue;
            }
        }

        let cell = if policy.transform_states { cell.transformed(&transform) } else { cell.clone() };
        operations.push(PlannedWrite { world: world_pos, local, cell });
    }

    let bounds = transform.world_bounds(structure.size());

    debug!(
        "Placement plan at {} (rot {}°, mirror {:?}): {} ops, {} conflicts, {} dropped",
        transform.translation(),
        transform.rotation().degrees(),
        transform.mirror(),
        operations.len(),
        conflicts.len(),
        dropped
    );

    PlacementPlan { operations, conflicts, dropped, bounds, policy }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryWorld;
    use crate::transform::{Mirror, Rotation};
    use bevy::math::UVec3;

    fn column() -> Structure {
        Structure::builder(UVec3::new(1, 3, 1))
            .cell(IVec3::new(0, 0, 0), Cell::new("minecraft:stone"))
            .cell(IVec3::new(0, 1, 0), Cell::air())
            .cell(IVec3::new(0, 2, 0), Cell::new("minecraft:oak_log").with_property("axis", "x"))
            .build()
            .unwrap()
    }

    #[test]
    fn air_is_skipped_by_default_and_planned_as_clear_otherwise() {
        let world = MemoryWorld::new();
        let t = Transform::translation_only(IVec3::new(0, 64, 0));
        let default_plan = plan(&column(), &t, &world, PlacementPolicy::default());
        assert_eq!(default_plan.len(), 2);

        let policy = PlacementPolicy { skip_air: false, ..Default::default() };
        let with_air = plan(&column(), &t, &world, policy);
        assert_eq!(with_air.len(), 3);
        assert!(with_air.operations()[1].is_clear());
        assert_eq!(with_air.operations()[1].world, IVec3::new(0, 65, 0));
    }

    #[test]
    fn air_in_the_world_is_not_a_conflict() {
        let mut world = MemoryWorld::new();
        world.insert(IVec3::new(0, 64, 0), Cell::new("minecraft:cave_air"));
        let p = plan(&column(), &Transform::translation_only(IVec3::new(0, 64, 0)), &world, PlacementPolicy::default());
        assert!(!p.has_conflicts());
    }

    #[test]
    fn disabled_bounds_check_drops_silently() {
        let world = MemoryWorld::new().with_bounds(BlockBox::new(IVec3::new(-8, 0, -8), IVec3::new(8, 65, 8)));
        let t = Transform::translation_only(IVec3::new(0, 64, 0));

        let checked = plan(&column(), &t, &world, PlacementPolicy::default());
        assert_eq!(checked.len(), 1);
        assert_eq!(checked.out_of_world_conflicts(), 1);

        let policy = PlacementPolicy { bounds_check: false, ..Default::default() };
        let unchecked = plan(&column(), &t, &world, policy);
        assert_eq!(unchecked.len(), 1);
        assert!(!unchecked.has_conflicts());
        assert_eq!(unchecked.dropped(), 1);
    }

    #[test]
    fn coordinates_past_i32_are_out_of_world() {
        let row = Structure::builder(UVec3::new(2, 1, 1))
            .fill(IVec3::ZERO, IVec3::X, Cell::new("minecraft:stone"))
            .build()
            .unwrap();
        let edge = Transform::translation_only(IVec3::new(i32::MAX, 0, 0));

        let open = plan(&row, &edge, &MemoryWorld::new(), PlacementPolicy::default());
        assert_eq!(open.len(), 1);
        assert_eq!(open.operations()[0].world, IVec3::new(i32::MAX, 0, 0));
        assert_eq!(open.out_of_world_conflicts(), 1);

        let bounded = MemoryWorld::new().with_bounds(BlockBox::new(IVec3::splat(-64), IVec3::splat(64)));
        let all_out = plan(&row, &edge, &bounded, PlacementPolicy::default());
        assert!(all_out.is_empty());
        assert_eq!(all_out.out_of_world_conflicts(), 2);

        let lenient = PlacementPolicy { bounds_check: false, ..Default::default() };
        assert_eq!(plan(&row, &edge, &MemoryWorld::new(), lenient).dropped(), 1);

        // mirroring i32::MIN must not overflow either
        let flipped = Transform::new(Rotation::Clockwise90, Mirror::X, IVec3::new(i32::MIN, 0, i32::MIN));
        let p = plan(&row, &flipped, &bounded, PlacementPolicy::default());
        assert_eq!(p.out_of_world_conflicts(), 2);
    }

    #[test]
    fn states_rotate_with_coordinates_unless_disabled() {
        let world = MemoryWorld::new();
        let t = Transform::compute(90, Mirror::None, IVec3::ZERO).unwrap();
        let p = plan(&column(), &t, &world, PlacementPolicy::default());
        assert_eq!(p.operations()[1].cell.property("axis"), Some("z"));

        let raw = PlacementPolicy { transform_states: false, ..Default::default() };
        let p = plan(&column(), &t, &world, raw);
        assert_eq!(p.operations()[1].cell.property("axis"), Some("x"));
    }

    #[test]
    fn operations_stay_inside_plan_bounds() {
        let s = Structure::builder(UVec3::new(3, 2, 4))
            .origin(IVec3::new(1, 0, 2))
            .fill(IVec3::ZERO, IVec3::new(2, 1, 3), Cell::new("minecraft:stone"))
            .build()
            .unwrap();
        let world = MemoryWorld::new();
        for deg in [0, 90, 180, 270] {
            for mirror in Mirror::ALL {
                let t = Transform::compute(deg, mirror, IVec3::new(-5, 10, 7)).unwrap();
                let p = plan(&s, &t, &world, PlacementPolicy::default());
                assert_eq!(p.len(), 24);
                assert!(p.operations().iter().all(|op| p.bounds().contains(op.world)));
                assert_eq!(p.bounds().size().x * p.bounds().size().z, 12);
            }
        }
    }

    #[test]
    fn named_anchor_lands_on_translation() {
        let s = Structure::builder(UVec3::new(4, 1, 4))
            .anchor("door", IVec3::new(3, 0, 1))
            .cell(IVec3::new(3, 0, 1), Cell::new("minecraft:oak_door"))
            .build()
            .unwrap();
        let target = IVec3::new(100, 70, -20);
        let t = Transform::compute(270, Mirror::Z, target).unwrap().anchored_at(&s, "door").unwrap();
        let p = plan(&s, &t, &MemoryWorld::new(), PlacementPolicy::default());
        assert_eq!(p.operations()[0].world, target);
    }
}
