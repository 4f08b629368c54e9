// tests/scenarios.rs
//! End-to-end plan + execute runs against the in-memory world.

use bevy::math::{IVec3, UVec3};
use std::sync::atomic::AtomicBool;

use placement::{
    execute, plan, refresh_shapes, BlockBox, Cell, ConflictKind, ExecutionMode, Executor, Mirror,
    MemoryWorld, OutcomeStatus, PlacementPolicy, Rotation, RuleRegistry, Structure, Transform,
    WorldView,
};

fn stone() -> Cell {
    Cell::new("minecraft:stone")
}

fn wood() -> Cell {
    Cell::new("minecraft:oak_planks")
}

/// 2×1×2 with two opposite corners filled.
fn corner_pair() -> Structure {
    Structure::builder(UVec3::new(2, 1, 2))
        .anchor("base", IVec3::ZERO)
        .cell(IVec3::new(0, 0, 0), stone())
        .cell(IVec3::new(1, 0, 1), wood())
        .build()
        .unwrap()
}

fn hut() -> Structure {
    Structure::builder(UVec3::new(3, 2, 4))
        .fill(IVec3::ZERO, IVec3::new(2, 0, 3), Cell::new("minecraft:cobblestone"))
        .cell(IVec3::new(1, 1, 1), Cell::air())
        .cell(IVec3::new(0, 1, 3), Cell::new("minecraft:torch"))
        .build()
        .unwrap()
}

#[test]
fn pure_translation_writes_every_present_cell() {
    let world = MemoryWorld::new();
    let policy = PlacementPolicy { skip_air: false, ..Default::default() };
    for structure in [corner_pair(), hut()] {
        for t in [IVec3::ZERO, IVec3::new(-40, 12, 7), IVec3::new(1000, -64, -1000)] {
            let p = plan(&structure, &Transform::translation_only(t), &world, policy);
            assert_eq!(p.len(), structure.count_present());
            assert!(!p.has_conflicts());
        }
    }
}

#[test]
fn complementary_rotations_round_trip() {
    let points = [IVec3::ZERO, IVec3::new(3, 1, -2), IVec3::new(-7, 0, 5)];
    for r in Rotation::ALL {
        let there = Transform::new(r, Mirror::None, IVec3::ZERO);
        let back = Transform::new(r.inverse(), Mirror::None, IVec3::ZERO);
        assert_eq!(r.then(r.inverse()), Rotation::None);
        for p in points {
            assert_eq!(back.apply(there.apply(p)), p, "rotation {r:?}");
            assert_eq!(there.then(&back).apply(p), p);
        }
    }
}

#[test]
fn rotated_corner_pair_lands_on_rotated_coordinates() {
    let mut world = MemoryWorld::new();
    let transform = Transform::compute(90, Mirror::None, IVec3::new(10, 5, 10)).unwrap();

    let p = plan(&corner_pair(), &transform, &world, PlacementPolicy::default());
    assert_eq!(p.len(), 2);
    assert!(p.conflicts().is_empty());
    let targets: Vec<_> = p.operations().iter().map(|op| (op.world, op.cell.clone())).collect();
    assert_eq!(targets, vec![(IVec3::new(10, 5, 10), stone()), (IVec3::new(9, 5, 11), wood())]);

    let out = execute(&p, &mut world, ExecutionMode::BestEffort);
    assert_eq!(out.status(), OutcomeStatus::Success);
    assert_eq!(out.written(), 2);
    assert_eq!(world.cell_at(IVec3::new(9, 5, 11)), Some(wood()));
}

#[test]
fn second_placement_reports_occupancy_and_writes_nothing() {
    let mut world = MemoryWorld::new();
    let transform = Transform::compute(90, Mirror::None, IVec3::new(10, 5, 10)).unwrap();
    let first = plan(&corner_pair(), &transform, &world, PlacementPolicy::default());
    assert!(execute(&first, &mut world, ExecutionMode::BestEffort).is_success());
    let writes_before = world.write_count();

    let second = plan(&corner_pair(), &transform, &world, PlacementPolicy::default());
    assert_eq!(second.len(), 0);
    assert_eq!(second.occupied_conflicts(), 2);
    assert!(second
        .conflicts()
        .iter()
        .all(|c| matches!(&c.kind, ConflictKind::Occupied { existing } if *existing == stone() || *existing == wood())));

    let out = execute(&second, &mut world, ExecutionMode::BestEffort);
    assert_eq!(out.status(), OutcomeStatus::Success);
    assert_eq!(out.written(), 0);
    assert_eq!(world.write_count(), writes_before);
}

#[test]
fn all_or_nothing_is_idempotent_when_overwriting() {
    let mut world = MemoryWorld::new();
    let policy = PlacementPolicy { overwrite_existing: true, ..Default::default() };
    let p = plan(&hut(), &Transform::translation_only(IVec3::new(0, 64, 0)), &world, policy);

    let first = execute(&p, &mut world, ExecutionMode::AllOrNothing);
    let snapshot: Vec<_> = {
        let mut cells: Vec<_> = world.iter().map(|(k, v)| (k.to_array(), v.clone())).collect();
        cells.sort_by_key(|(k, _)| *k);
        cells
    };
    let second = execute(&p, &mut world, ExecutionMode::AllOrNothing);

    assert!(first.is_success() && second.is_success());
    assert_eq!(first, second);
    let mut after: Vec<_> = world.iter().map(|(k, v)| (k.to_array(), v.clone())).collect();
    after.sort_by_key(|(k, _)| *k);
    assert_eq!(snapshot, after);
}

#[test]
fn all_or_nothing_rerun_without_overwrite_conflicts_everywhere() {
    let mut world = MemoryWorld::new();
    let at = Transform::translation_only(IVec3::new(0, 64, 0));
    let p = plan(&hut(), &at, &world, PlacementPolicy::default());

    assert!(execute(&p, &mut world, ExecutionMode::AllOrNothing).is_success());
    let again = execute(&p, &mut world, ExecutionMode::AllOrNothing);
    assert_eq!(again.status(), OutcomeStatus::Failed);
    assert_eq!(again.failed().len(), p.len());
    assert_eq!(again.written(), 0);

    let replanned = plan(&hut(), &at, &world, PlacementPolicy::default());
    assert!(replanned.is_empty());
    assert_eq!(replanned.occupied_conflicts(), p.len());
}

#[test]
fn structure_outside_the_world_is_all_conflicts() {
    let world = MemoryWorld::new().with_bounds(BlockBox::new(IVec3::new(-512, -64, -512), IVec3::new(511, 319, 511)));
    let p = plan(&hut(), &Transform::translation_only(IVec3::new(0, 400, 0)), &world, PlacementPolicy::default());

    assert!(p.is_empty());
    assert_eq!(p.out_of_world_conflicts(), hut().count_present() - 1);
    assert_eq!(p.conflicts().len(), p.out_of_world_conflicts());

    let lenient = PlacementPolicy { bounds_check: false, ..Default::default() };
    let dropped = plan(&hut(), &Transform::translation_only(IVec3::new(0, 400, 0)), &world, lenient);
    assert!(dropped.is_empty() && !dropped.has_conflicts());
    assert_eq!(dropped.dropped(), hut().count_present() - 1);
}

#[test]
fn best_effort_records_the_one_failure() {
    let mut world = MemoryWorld::new();
    let row = Structure::builder(UVec3::new(3, 1, 1))
        .fill(IVec3::ZERO, IVec3::new(2, 0, 0), stone())
        .build()
        .unwrap();
    let p = plan(&row, &Transform::translation_only(IVec3::new(0, 70, 0)), &world, PlacementPolicy::default());
    world.break_writes_at(IVec3::new(1, 70, 0));

    let out = execute(&p, &mut world, ExecutionMode::BestEffort);
    assert_eq!(out.status(), OutcomeStatus::Partial);
    assert_eq!(out.written(), 2);
    assert_eq!(out.failed(), &[IVec3::new(1, 70, 0)]);
    assert_eq!(out.skipped(), 0);
}

#[test]
fn pre_cancelled_run_touches_nothing() {
    let mut world = MemoryWorld::new();
    let p = plan(&hut(), &Transform::IDENTITY, &world, PlacementPolicy::default());
    let out = Executor::new(ExecutionMode::BestEffort).run(&p, &mut world, &AtomicBool::new(true));
    assert!(out.cancelled());
    assert_eq!(out.skipped(), p.len());
    assert!(world.is_empty());
}

#[test]
fn anchored_placement_puts_anchor_on_translation() {
    let structure = hut().with_anchor("door", IVec3::new(1, 0, 3)).unwrap();
    let target = IVec3::new(50, 64, 50);
    for r in Rotation::ALL {
        let t = Transform::new(r, Mirror::X, target).anchored_at(&structure, "door").unwrap();
        assert_eq!(t.apply(IVec3::new(1, 0, 3)), target);
        let p = plan(&structure, &t, &MemoryWorld::new(), PlacementPolicy::default());
        assert!(p.bounds().contains(target));
    }
}

#[test]
fn block_states_follow_the_structure() {
    let stairs = Structure::builder(UVec3::ONE)
        .cell(IVec3::ZERO, Cell::new("minecraft:oak_stairs").with_property("facing", "north").with_property("shape", "inner_left"))
        .build()
        .unwrap();
    let world = MemoryWorld::new();

    let turned = plan(&stairs, &Transform::compute(90, Mirror::None, IVec3::ZERO).unwrap(), &world, PlacementPolicy::default());
    assert_eq!(turned.operations()[0].cell.property("facing"), Some("east"));
    assert_eq!(turned.operations()[0].cell.property("shape"), Some("inner_left"));

    let mirrored = plan(&stairs, &Transform::new(Rotation::None, Mirror::Z, IVec3::ZERO), &world, PlacementPolicy::default());
    assert_eq!(mirrored.operations()[0].cell.property("facing"), Some("south"));
    assert_eq!(mirrored.operations()[0].cell.property("shape"), Some("inner_right"));

    let raw = PlacementPolicy { transform_states: false, ..Default::default() };
    let untouched = plan(&stairs, &Transform::compute(90, Mirror::None, IVec3::ZERO).unwrap(), &world, raw);
    assert_eq!(untouched.operations()[0].cell.property("facing"), Some("north"));
}

#[test]
fn placed_fences_connect_after_refresh() {
    let fence_row = Structure::builder(UVec3::new(3, 1, 1))
        .fill(IVec3::ZERO, IVec3::new(2, 0, 0), Cell::new("minecraft:oak_fence"))
        .build()
        .unwrap();
    let mut world = MemoryWorld::new();
    let p = plan(&fence_row, &Transform::compute(270, Mirror::None, IVec3::new(0, 64, 0)).unwrap(), &world, PlacementPolicy::default());
    let out = execute(&p, &mut world, ExecutionMode::AllOrNothing);
    assert!(out.is_success());

    let changed = refresh_shapes(&mut world, &RuleRegistry::vanilla(), out.applied());
    assert_eq!(changed, 3);
    // 270° turns the +x row into a -z (northward) row
    let middle = world.cell_at(IVec3::new(0, 64, -1)).unwrap();
    assert_eq!(middle.property("north"), Some("true"));
    assert_eq!(middle.property("south"), Some("true"));
    assert_eq!(middle.property("east"), Some("false"));
}
