// src/executor.rs
//! Applies a plan to the host world in batches, best-effort or all-or-nothing.

use bevy::log::{debug, warn};
use bevy::math::IVec3;
use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::planner::PlacementPlan;
use crate::world::{CancellationCheck, NeverCancel, WorldWriter};

/// Operations applied between two cancellation polls.
pub const DEFAULT_BATCH_SIZE: usize = 4096;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// Apply what can be applied, record the rest.
    #[default]
    BestEffort,
    /// Re-validate everything first; roll back if a write still fails.
    AllOrNothing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutcomeStatus {
    Success,
    Partial,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacementOutcome {
    status: OutcomeStatus,
    applied: Vec<IVec3>,
    skipped: usize,
    failed: Vec<IVec3>,
    rollback_failed: Vec<IVec3>,
    cancelled: bool,
    rolled_back: bool,
}

impl PlacementOutcome {
    pub fn status(&self) -> OutcomeStatus {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }

    /// Number of cells written and left in place.
    pub fn written(&self) -> usize {
        self.applied.len()
    }

    /// Coordinates written and left in place, in plan order.
    pub fn applied(&self) -> &[IVec3] {
        &self.applied
    }

    /// Operations never attempted, or undone by a rollback.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Operations the host refused. A refused rollback write is not listed
    /// here; see [`PlacementOutcome::rollback_failed`].
    pub fn failed(&self) -> &[IVec3] {
        &self.failed
    }

    /// Coordinates a rollback could not restore. They are still written and
    /// also appear in `applied`.
    pub fn rollback_failed(&self) -> &[IVec3] {
        &self.rollback_failed
    }

    pub fn cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn rolled_back(&self) -> bool {
        self.rolled_back
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Executor {
    mode: ExecutionMode,
    batch_size: usize,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(ExecutionMode::default())
    }
}

impl Executor {
    pub fn new(mode: ExecutionMode) -> Self {
        Self { mode, batch_size: DEFAULT_BATCH_SIZE }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn run<W: WorldWriter + ?Sized>(
        &self,
        plan: &PlacementPlan,
        writer: &mut W,
        cancel: &dyn CancellationCheck,
    ) -> PlacementOutcome {
        let outcome = match self.mode {
            ExecutionMode::BestEffort => self.run_best_effort(plan, writer, cancel),
            ExecutionMode::AllOrNothing => self.run_all_or_nothing(plan, writer, cancel),
        };
        debug!(
            "Placement executed ({:?}): {:?}, {} written, {} skipped, {} failed{}",
            self.mode,
            outcome.status,
            outcome.written(),
            outcome.skipped,
            outcome.failed.len(),
            if outcome.cancelled { ", cancelled" } else { "" }
        );
        outcome
    }

    fn run_best_effort<W: WorldWriter + ?Sized>(
        &self,
        plan: &PlacementPlan,
        writer: &mut W,
        cancel: &dyn CancellationCheck,
    ) -> PlacementOutcome {
        let ops = plan.operations();
        let mut applied = Vec::with_capacity(ops.len());
        let mut failed = Vec::new();
        let mut attempted = 0usize;
        let mut cancelled = false;

        for batch in ops.chunks(self.batch_size) {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            for op in batch {
                attempted += 1;
                match writer.set_cell(op.world, &op.cell) {
                    Ok(()) => applied.push(op.world),
                    Err(e) => {
                        warn!("Placement: {e}");
                        failed.push(op.world);
                    }
                }
            }
        }

        let status = if failed.is_empty() && !cancelled { OutcomeStatus::Success } else { OutcomeStatus::Partial };
        PlacementOutcome {
            status,
            applied,
            skipped: ops.len() - attempted,
            failed,
            rollback_failed: Vec::new(),
            cancelled,
            rolled_back: false,
        }
    }

    fn run_all_or_nothing<W: WorldWriter + ?Sized>(
        &self,
        plan: &PlacementPlan,
        writer: &mut W,
        cancel: &dyn CancellationCheck,
    ) -> PlacementOutcome {
        let ops = plan.operations();
        let overwrite = plan.policy().overwrite_existing;

        // Verify against the world as it is now, not as it was when planned.
        let mut offending = Vec::new();
        let mut previous = Vec::with_capacity(ops.len());
        for op in ops {
            let existing = writer.cell_at(op.world);
            let occupied = existing.as_ref().is_some_and(|c| !c.is_air());
            if !writer.can_write(op.world) || (!overwrite && occupied) {
                offending.push(op.world);
            }
            previous.push(existing);
        }
        if !offending.is_empty() {
            warn!("Placement: {} of {} coordinates failed re-validation", offending.len(), ops.len());
            return PlacementOutcome {
                status: OutcomeStatus::Failed,
                applied: Vec::new(),
                skipped: ops.len() - offending.len(),
                failed: offending,
                rollback_failed: Vec::new(),
                cancelled: false,
                rolled_back: false,
            };
        }

        let mut applied: Vec<IVec3> = Vec::with_capacity(ops.len());
        let mut abort: Option<(Vec<IVec3>, bool)> = None;

        'batches: for batch in ops.chunks(self.batch_size) {
            if cancel.is_cancelled() {
                abort = Some((Vec::new(), true));
                break;
            }
            for op in batch {
                if let Err(e) = writer.set_cell(op.world, &op.cell) {
                    warn!("Placement: {e}; rolling back {} writes", applied.len());
                    abort = Some((vec![op.world], false));
                    break 'batches;
                }
                applied.push(op.world);
            }
        }

        let Some((failed, cancelled)) = abort else {
            return PlacementOutcome {
                status: OutcomeStatus::Success,
                applied,
                skipped: 0,
                failed: Vec::new(),
                rollback_failed: Vec::new(),
                cancelled: false,
                rolled_back: false,
            };
        };

        let rolled_back = !applied.is_empty();
        let done = applied.len();
        let mut stuck = Vec::new();
        for (op, prior) in ops[..done].iter().zip(&previous[..done]).rev() {
            let restore = prior.clone().unwrap_or_else(Cell::air);
            if let Err(e) = writer.set_cell(op.world, &restore) {
                warn!("Placement: rollback failed: {e}");
                stuck.push(op.world);
            }
        }
        // still written, back in plan order
        stuck.reverse();

        PlacementOutcome {
            status: OutcomeStatus::Failed,
            skipped: ops.len() - stuck.len() - failed.len(),
            applied: stuck.clone(),
            failed,
            rollback_failed: stuck,
            cancelled,
            rolled_back,
        }
    }
}

/// One-shot execution with the default batch size and no cancellation.
pub fn execute<W: WorldWriter + ?Sized>(plan: &PlacementPlan, writer: &mut W, mode: ExecutionMode) -> PlacementOutcome {
    Executor::new(mode).run(plan, writer, &NeverCancel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryWorld;
    use crate::planner::{plan, PlacementPolicy};
    use crate::structure::Structure;
    use crate::transform::Transform;
    use crate::error::WriteRejected;
    use crate::world::{PollBudget, WorldView};
    use bevy::math::UVec3;

    fn row(n: u32) -> Structure {
        Structure::builder(UVec3::new(n, 1, 1))
            .fill(IVec3::ZERO, IVec3::new(n as i32 - 1, 0, 0), Cell::new("minecraft:stone"))
            .build()
            .unwrap()
    }

    #[test]
    fn empty_plan_is_a_successful_no_op() {
        let mut world = MemoryWorld::new();
        world.insert(IVec3::ZERO, Cell::new("minecraft:dirt"));
        let p = plan(&row(1), &Transform::IDENTITY, &world, PlacementPolicy::default());
        assert!(p.is_empty());
        let out = execute(&p, &mut world, ExecutionMode::AllOrNothing);
        assert!(out.is_success());
        assert_eq!(out.written(), 0);
        assert_eq!(world.write_count(), 0);
    }

    #[test]
    fn all_or_nothing_rejects_before_writing() {
        let mut world = MemoryWorld::new();
        let p = plan(&row(3), &Transform::IDENTITY, &world, PlacementPolicy::default());
        world.lock(IVec3::new(2, 0, 0));

        let out = execute(&p, &mut world, ExecutionMode::AllOrNothing);
        assert_eq!(out.status(), OutcomeStatus::Failed);
        assert_eq!(out.failed(), &[IVec3::new(2, 0, 0)]);
        assert_eq!(out.skipped(), 2);
        assert_eq!(world.write_count(), 0);
        assert!(!out.rolled_back());
    }

    #[test]
    fn all_or_nothing_sees_concurrent_changes() {
        let mut world = MemoryWorld::new();
        let p = plan(&row(3), &Transform::IDENTITY, &world, PlacementPolicy::default());
        // another actor builds in the footprint between plan and execute
        world.insert(IVec3::new(1, 0, 0), Cell::new("minecraft:dirt"));

        let out = execute(&p, &mut world, ExecutionMode::AllOrNothing);
        assert_eq!(out.status(), OutcomeStatus::Failed);
        assert_eq!(out.failed(), &[IVec3::new(1, 0, 0)]);
        assert_eq!(world.get(IVec3::ZERO), None);
    }

    #[test]
    fn all_or_nothing_rolls_back_a_late_write_failure() {
        let mut world = MemoryWorld::new();
        world.insert(IVec3::new(0, 0, 0), Cell::new("minecraft:grass_block"));
        let policy = PlacementPolicy { overwrite_existing: true, ..Default::default() };
        let p = plan(&row(3), &Transform::IDENTITY, &world, policy);
        world.break_writes_at(IVec3::new(2, 0, 0));

        let out = execute(&p, &mut world, ExecutionMode::AllOrNothing);
        assert_eq!(out.status(), OutcomeStatus::Failed);
        assert!(out.rolled_back());
        assert_eq!(out.written(), 0);
        assert_eq!(out.failed(), &[IVec3::new(2, 0, 0)]);
        assert_eq!(world.get(IVec3::new(0, 0, 0)), Some(&Cell::new("minecraft:grass_block")));
        assert_eq!(world.get(IVec3::new(1, 0, 0)), None);
    }

    /// Accepts the first write to `sticky`, refuses every later one.
    struct StickyWorld {
        inner: MemoryWorld,
        sticky: IVec3,
        touched: bool,
    }

    impl WorldView for StickyWorld {
        fn cell_at(&self, coord: IVec3) -> Option<Cell> {
            self.inner.cell_at(coord)
        }
    }

    impl WorldWriter for StickyWorld {
        fn set_cell(&mut self, coord: IVec3, cell: &Cell) -> Result<(), WriteRejected> {
            if coord == self.sticky {
                if self.touched {
                    return Err(WriteRejected::new(coord, "sticky"));
                }
                self.touched = true;
            }
            self.inner.set_cell(coord, cell)
        }
    }

    #[test]
    fn failed_rollback_leaves_cell_reported_as_written() {
        let mut inner = MemoryWorld::new();
        inner.break_writes_at(IVec3::new(2, 0, 0));
        let mut world = StickyWorld { inner, sticky: IVec3::ZERO, touched: false };
        let p = plan(&row(3), &Transform::IDENTITY, &world, PlacementPolicy::default());

        let out = execute(&p, &mut world, ExecutionMode::AllOrNothing);
        assert_eq!(out.status(), OutcomeStatus::Failed);
        assert!(out.rolled_back());
        assert_eq!(out.failed(), &[IVec3::new(2, 0, 0)]);
        assert_eq!(out.rollback_failed(), &[IVec3::ZERO]);
        assert_eq!(out.applied(), &[IVec3::ZERO]);
        assert_eq!(out.written(), 1);
        // only (1,0,0) was cleanly undone
        assert_eq!(out.skipped(), 1);
        assert_eq!(world.cell_at(IVec3::ZERO), Some(Cell::new("minecraft:stone")));
        assert_eq!(world.cell_at(IVec3::X), None);
    }

    #[test]
    fn best_effort_cancellation_after_a_failure_reports_both() {
        let mut world = MemoryWorld::new();
        let p = plan(&row(6), &Transform::IDENTITY, &world, PlacementPolicy::default());
        world.break_writes_at(IVec3::new(1, 0, 0));

        let out = Executor::new(ExecutionMode::BestEffort)
            .with_batch_size(2)
            .run(&p, &mut world, &PollBudget::new(2));
        assert_eq!(out.status(), OutcomeStatus::Partial);
        assert!(out.cancelled());
        assert_eq!(out.failed(), &[IVec3::new(1, 0, 0)]);
        assert_eq!(out.applied(), &[IVec3::new(0, 0, 0), IVec3::new(2, 0, 0), IVec3::new(3, 0, 0)]);
        assert_eq!(out.skipped(), 2);
        assert!(out.rollback_failed().is_empty());
    }

    #[test]
    fn best_effort_cancellation_keeps_applied_writes() {
        let mut world = MemoryWorld::new();
        let p = plan(&row(5), &Transform::IDENTITY, &world, PlacementPolicy::default());
        let out = Executor::new(ExecutionMode::BestEffort)
            .with_batch_size(2)
            .run(&p, &mut world, &PollBudget::new(1));

        assert_eq!(out.status(), OutcomeStatus::Partial);
        assert!(out.cancelled());
        assert_eq!(out.written(), 2);
        assert_eq!(out.skipped(), 3);
        assert_eq!(world.len(), 2);
    }

    #[test]
    fn all_or_nothing_cancellation_undoes_everything() {
        let mut world = MemoryWorld::new();
        let p = plan(&row(5), &Transform::IDENTITY, &world, PlacementPolicy::default());
        let out = Executor::new(ExecutionMode::AllOrNothing)
            .with_batch_size(2)
            .run(&p, &mut world, &PollBudget::new(2));

        assert_eq!(out.status(), OutcomeStatus::Failed);
        assert!(out.cancelled());
        assert!(out.rolled_back());
        assert_eq!(out.skipped(), 5);
        assert!(world.is_empty());
    }
}
