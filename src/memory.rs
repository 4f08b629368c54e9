// src/memory.rs
//! In-memory reference host. Useful for tests, previews and tools that want
//! to run a placement without a live server.

use bevy::math::IVec3;
use std::collections::{HashMap, HashSet};

use crate::cell::Cell;
use crate::error::WriteRejected;
use crate::world::{BlockBox, WorldView, WorldWriter};

/// Sparse block storage. Writing air removes the entry.
#[derive(Clone, Debug, Default)]
pub struct MemoryWorld {
    cells: HashMap<IVec3, Cell>,
    bounds: Option<BlockBox>,
    /// `can_write` reports false and writes fail.
    locked: HashSet<IVec3>,
    /// `can_write` reports true but writes still fail.
    broken: HashSet<IVec3>,
    writes: usize,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bounds(mut self, bounds: BlockBox) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Store a cell directly, bypassing write accounting.
    pub fn insert(&mut self, coord: IVec3, cell: Cell) {
        if cell.is_air() {
            self.cells.remove(&coord);
        } else {
            self.cells.insert(coord, cell);
        }
    }

    pub fn get(&self, coord: IVec3) -> Option<&Cell> {
        self.cells.get(&coord)
    }

    pub fn lock(&mut self, coord: IVec3) {
        self.locked.insert(coord);
    }

    pub fn break_writes_at(&mut self, coord: IVec3) {
        self.broken.insert(coord);
    }

    pub fn unlock(&mut self, coord: IVec3) {
        self.locked.remove(&coord);
        self.broken.remove(&coord);
    }

    /// Accepted `set_cell` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (IVec3, &Cell)> {
        self.cells.iter().map(|(k, v)| (*k, v))
    }
}

impl WorldView for MemoryWorld {
    fn cell_at(&self, coord: IVec3) -> Option<Cell> {
        self.cells.get(&coord).cloned()
    }

    fn is_in_bounds(&self, coord: IVec3) -> bool {
        self.bounds.map_or(true, |b| b.contains(coord))
    }
}

impl WorldWriter for MemoryWorld {
    fn set_cell(&mut self, coord: IVec3, cell: &Cell) -> Result<(), WriteRejected> {
        if !self.is_in_bounds(coord) {
            return Err(WriteRejected::new(coord, "outside world bounds"));
        }
        if self.locked.contains(&coord) || self.broken.contains(&coord) {
            return Err(WriteRejected::new(coord, "position is locked"));
        }
        self.insert(coord, cell.clone());
        self.writes += 1;
        Ok(())
    }

    fn can_write(&self, coord: IVec3) -> bool {
        self.is_in_bounds(coord) && !self.locked.contains(&coord)
    }
}
