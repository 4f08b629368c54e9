// src/block_state.rs
//! Rotating and mirroring orientation-bearing block properties so a placed
//! structure keeps stairs, logs, fences and rails pointing the right way.

use std::collections::BTreeMap;

use crate::cell::{Cell, Direction, HorizontalAxis};
use crate::transform::{Mirror, Rotation, Transform};

fn rotate_direction(d: Direction, rotation: Rotation) -> Direction {
    (0..rotation.quarter_turns()).fold(d, |d, _| d.clockwise())
}

fn mirror_direction(d: Direction, mirror: Mirror) -> Direction {
    match (mirror, d.axis()) {
        (Mirror::X, Some(HorizontalAxis::X)) | (Mirror::Z, Some(HorizontalAxis::Z)) => d.opposite(),
        _ => d,
    }
}

fn swap_handedness(value: &str) -> Option<String> {
    if let Some(stem) = value.strip_suffix("left") {
        Some(format!("{stem}right"))
    } else {
        value.strip_suffix("right").map(|stem| format!("{stem}left"))
    }
}

/// Rail shapes are built from direction names; remap them and normalize back
/// to the names the game uses (`north_south`, `south_east`, `ascending_west`, ...).
fn remap_rail_shape(value: &str, map: impl Fn(Direction) -> Direction) -> Option<String> {
    if let Some(rest) = value.strip_prefix("ascending_") {
        let d = Direction::from_name(rest)?;
        return Some(format!("ascending_{}", map(d)));
    }
    let (a, b) = value.split_once('_')?;
    let (a, b) = (map(Direction::from_name(a)?), map(Direction::from_name(b)?));
    let shape = match (a.axis()?, b.axis()?) {
        (HorizontalAxis::Z, HorizontalAxis::Z) => "north_south".to_string(),
        (HorizontalAxis::X, HorizontalAxis::X) => "east_west".to_string(),
        (HorizontalAxis::Z, HorizontalAxis::X) => format!("{a}_{b}"),
        (HorizontalAxis::X, HorizontalAxis::Z) => format!("{b}_{a}"),
    };
    Some(shape)
}

/// Shared walk over properties; `dir` remaps directions, `rotation16` remaps
/// the 16-step sign rotation, `mirrored` turns on handedness swaps.
fn remap_properties(
    cell: &Cell,
    dir: impl Fn(Direction) -> Direction,
    rotation16: impl Fn(u8) -> u8,
    swap_axis: bool,
    mirrored: bool,
) -> Cell {
    let mut out = BTreeMap::new();
    for (key, value) in cell.properties() {
        let mut key = key.clone();
        let mut value = value.clone();

        // connection flags keyed by direction (fences, panes, walls, redstone)
        if let Some(d) = Direction::from_name(&key).filter(|d| d.is_horizontal()) {
            key = dir(d).name().to_string();
        }

        match key.as_str() {
            "facing" => {
                if let Some(d) = Direction::from_name(&value) {
                    value = dir(d).name().to_string();
                }
            }
            "axis" if swap_axis => {
                if value == "x" {
                    value = "z".to_string();
                } else if value == "z" {
                    value = "x".to_string();
                }
            }
            "rotation" => {
                if let Ok(r) = value.parse::<u8>() {
                    value = rotation16(r & 15).to_string();
                }
            }
            "shape" => {
                if let Some(rail) = remap_rail_shape(&value, &dir) {
                    value = rail;
                } else if mirrored {
                    value = swap_handedness(&value).unwrap_or(value);
                }
            }
            "hinge" | "type" if mirrored => {
                value = swap_handedness(&value).unwrap_or(value);
            }
            _ => {}
        }
        out.insert(key, value);
    }
    cell.clone().with_property_map(out)
}

impl Cell {
    pub fn rotated(&self, rotation: Rotation) -> Cell {
        if rotation == Rotation::None || self.properties().is_empty() {
            return self.clone();
        }
        let q = rotation.quarter_turns() as u8;
        remap_properties(
            self,
            |d| rotate_direction(d, rotation),
            |r| (r + 4 * q) & 15,
            q % 2 == 1,
            false,
        )
    }

    pub fn mirrored(&self, mirror: Mirror) -> Cell {
        if mirror == Mirror::None || self.properties().is_empty() {
            return self.clone();
        }
        let rotation16 = move |r: u8| match mirror {
            Mirror::X => (16 - r) & 15,
            Mirror::Z => (24 - r) & 15,
            Mirror::None => r,
        };
        remap_properties(self, |d| mirror_direction(d, mirror), rotation16, false, true)
    }

    /// Mirror, then rotate, matching how coordinates are mapped.
    pub fn transformed(&self, transform: &Transform) -> Cell {
        self.mirrored(transform.mirror()).rotated(transform.rotation())
    }
}
