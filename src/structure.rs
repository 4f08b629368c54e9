// src/structure.rs
//! Immutable structure model: a dense grid of optional cells plus origin and
//! named anchors. `None` means "leave the world alone", which is not the same
//! thing as an air cell.

use bevy::math::{IVec3, UVec3};
use std::collections::BTreeMap;

use crate::cell::Cell;
use crate::error::PlacementError;
use crate::transform::in_size;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Structure {
    size: UVec3,
    origin: IVec3,
    /// Row-major: index = (y * depth + z) * width + x.
    cells: Vec<Option<Cell>>,
    anchors: BTreeMap<String, IVec3>,
}

impl Structure {
    pub fn builder(size: UVec3) -> StructureBuilder {
        StructureBuilder::new(size)
    }

    pub fn dimensions(&self) -> (u32, u32, u32) {
        (self.size.x, self.size.y, self.size.z)
    }

    pub fn size(&self) -> UVec3 {
        self.size
    }

    pub fn origin(&self) -> IVec3 {
        self.origin
    }

    pub fn contains(&self, local: IVec3) -> bool {
        in_size(local, self.size)
    }

    pub fn cell_at(&self, local: IVec3) -> Result<Option<&Cell>, PlacementError> {
        let index = self.index_of(local)?;
        Ok(self.cells[index].as_ref())
    }

    pub fn anchor(&self, name: &str) -> Option<IVec3> {
        self.anchors.get(name).copied()
    }

    pub fn anchors(&self) -> impl Iterator<Item = (&str, IVec3)> {
        self.anchors.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Present cells in scan order: y, then z, then x, each increasing.
    pub fn present_cells(&self) -> impl Iterator<Item = (IVec3, &Cell)> {
        let (w, d) = (self.size.x as usize, self.size.z as usize);
        self.cells.iter().enumerate().filter_map(move |(i, slot)| {
            slot.as_ref().map(|cell| {
                let x = i % w;
                let z = (i / w) % d;
                let y = i / (w * d);
                (IVec3::new(x as i32, y as i32, z as i32), cell)
            })
        })
    }

    pub fn count_present(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// New structure with one slot replaced.
    pub fn with_cell(&self, local: IVec3, cell: Option<Cell>) -> Result<Structure, PlacementError> {
        let index = self.index_of(local)?;
        let mut next = self.clone();
        next.cells[index] = cell;
        Ok(next)
    }

    /// New structure with an extra (or moved) anchor.
    pub fn with_anchor(&self, name: impl Into<String>, local: IVec3) -> Result<Structure, PlacementError> {
        let name = name.into();
        if !self.contains(local) {
            return Err(PlacementError::AnchorOutOfBounds { name, coord: local, size: self.size });
        }
        let mut next = self.clone();
        next.anchors.insert(name, local);
        Ok(next)
    }

    fn index_of(&self, local: IVec3) -> Result<usize, PlacementError> {
        if !self.contains(local) {
            return Err(PlacementError::OutOfBounds { coord: local, size: self.size });
        }
        let (w, d) = (self.size.x as usize, self.size.z as usize);
        Ok((local.y as usize * d + local.z as usize) * w + local.x as usize)
    }
}

// ---------- Builder ----------

/// Collects cells and metadata; everything is validated in `build`.
#[derive(Clone, Debug)]
pub struct StructureBuilder {
    size: UVec3,
    origin: IVec3,
    cells: Vec<(IVec3, Option<Cell>)>,
    anchors: BTreeMap<String, IVec3>,
}

impl StructureBuilder {
    pub fn new(size: UVec3) -> Self {
        Self { size, origin: IVec3::ZERO, cells: Vec::new(), anchors: BTreeMap::new() }
    }

    pub fn origin(mut self, origin: IVec3) -> Self {
        self.origin = origin;
        self
    }

    pub fn anchor(mut self, name: impl Into<String>, local: IVec3) -> Self {
        self.anchors.insert(name.into(), local);
        self
    }

    /// Later writes to the same slot win.
    pub fn cell(mut self, local: IVec3, cell: Cell) -> Self {
        self.cells.push((local, Some(cell)));
        self
    }

    /// Resets a slot back to absent.
    pub fn clear(mut self, local: IVec3) -> Self {
        self.cells.push((local, None));
        self
    }

    /// Fills the inclusive box between two corners.
    pub fn fill(mut self, a: IVec3, b: IVec3, cell: Cell) -> Self {
        let (min, max) = (a.min(b), a.max(b));
        for y in min.y..=max.y {
            for z in min.z..=max.z {
                for x in min.x..=max.x {
                    self.cells.push((IVec3::new(x, y, z), Some(cell.clone())));
                }
            }
        }
        self
    }

    pub fn build(self) -> Result<Structure, PlacementError> {
        if self.size.cmpeq(UVec3::ZERO).any() {
            return Err(PlacementError::InvalidDimensions(self.size));
        }
        if !in_size(self.origin, self.size) {
            return Err(PlacementError::OriginOutOfBounds { origin: self.origin, size: self.size });
        }
        for (name, coord) in &self.anchors {
            if !in_size(*coord, self.size) {
                return Err(PlacementError::AnchorOutOfBounds {
                    name: name.clone(),
                    coord: *coord,
                    size: self.size,
                });
            }
        }

        let volume = self.size.x as usize * self.size.y as usize * self.size.z as usize;
        let mut structure = Structure {
            size: self.size,
            origin: self.origin,
            cells: vec![None; volume],
            anchors: self.anchors,
        };
        for (local, cell) in self.cells {
            let index = structure.index_of(local)?;
            structure.cells[index] = cell;
        }
        Ok(structure)
    }
}
