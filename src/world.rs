// src/world.rs
//! Host capabilities. The library never holds on to a world: every call
//! receives these per call and sees whatever the host holds at that moment.

use bevy::math::IVec3;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::cell::Cell;
use crate::error::WriteRejected;

// ---------- Bounds ----------

/// Inclusive axis-aligned block box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockBox {
    pub min: IVec3,
    pub max: IVec3,
}

impl BlockBox {
    /// Box spanning both corners, in any order.
    pub fn new(a: IVec3, b: IVec3) -> Self {
        Self { min: a.min(b), max: a.max(b) }
    }

    pub fn contains(&self, p: IVec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    pub fn size(&self) -> IVec3 {
        self.max - self.min + IVec3::ONE
    }

    pub fn union(&self, p: IVec3) -> Self {
        Self { min: self.min.min(p), max: self.max.max(p) }
    }
}

// ---------- Capabilities ----------

/// Read-only view of the target world.
pub trait WorldView {
    /// Cell currently at `coord`; `None` when nothing is stored there.
    fn cell_at(&self, coord: IVec3) -> Option<Cell>;

    /// Whether `coord` lies inside the host's valid world range.
    fn is_in_bounds(&self, coord: IVec3) -> bool {
        let _ = coord;
        true
    }

    /// Present and not air.
    fn is_occupied(&self, coord: IVec3) -> bool {
        self.cell_at(coord).is_some_and(|c| !c.is_air())
    }
}

/// Write access. Writing the same cell twice must be harmless.
pub trait WorldWriter: WorldView {
    fn set_cell(&mut self, coord: IVec3, cell: &Cell) -> Result<(), WriteRejected>;

    /// Whether a write at `coord` would currently be accepted.
    fn can_write(&self, coord: IVec3) -> bool {
        self.is_in_bounds(coord)
    }
}

/// Host-supplied cancellation flag, polled between batches.
pub trait CancellationCheck {
    fn is_cancelled(&self) -> bool;
}

/// Never cancels.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverCancel;

impl CancellationCheck for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl<F: Fn() -> bool> CancellationCheck for F {
    fn is_cancelled(&self) -> bool {
        self()
    }
}

impl CancellationCheck for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Acquire)
    }
}

/// Cancels once `limit` polls have happened. Handy for bounding work per tick.
#[derive(Debug)]
pub struct PollBudget {
    remaining: std::cell::Cell<usize>,
}

impl PollBudget {
    pub fn new(limit: usize) -> Self {
        Self { remaining: std::cell::Cell::new(limit) }
    }
}

impl CancellationCheck for PollBudget {
    fn is_cancelled(&self) -> bool {
        let left = self.remaining.get();
        if left == 0 {
            return true;
        }
        self.remaining.set(left - 1);
        false
    }
}
