// src/cell.rs
//! Cells (block states) and the six block faces.
//! Keep this file dependency-light; everything else builds on it.

use bevy::math::IVec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------- Directions ----------

/// One of the six block faces. North is -Z, east is +X.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Down,
    Up,
    North,
    South,
    West,
    East,
}

/// Horizontal axis a direction runs along (`None` for up/down).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HorizontalAxis {
    X,
    Z,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Down,
        Direction::Up,
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Clockwise order seen from above, starting at north.
    pub const HORIZONTAL: [Direction; 4] =
        [Direction::North, Direction::East, Direction::South, Direction::West];

    pub const fn offset(self) -> IVec3 {
        match self {
            Direction::Down => IVec3::new(0, -1, 0),
            Direction::Up => IVec3::new(0, 1, 0),
            Direction::North => IVec3::new(0, 0, -1),
            Direction::South => IVec3::new(0, 0, 1),
            Direction::West => IVec3::new(-1, 0, 0),
            Direction::East => IVec3::new(1, 0, 0),
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
        }
    }

    pub const fn is_horizontal(self) -> bool {
        !matches!(self, Direction::Down | Direction::Up)
    }

    pub const fn axis(self) -> Option<HorizontalAxis> {
        match self {
            Direction::North | Direction::South => Some(HorizontalAxis::Z),
            Direction::West | Direction::East => Some(HorizontalAxis::X),
            Direction::Down | Direction::Up => None,
        }
    }

    /// Quarter turn clockwise seen from above; up/down are fixed.
    pub const fn clockwise(self) -> Direction {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
            other => other,
        }
    }

    pub const fn counter_clockwise(self) -> Direction {
        match self {
            Direction::North => Direction::West,
            Direction::West => Direction::South,
            Direction::South => Direction::East,
            Direction::East => Direction::North,
            other => other,
        }
    }

    /// Horizontal direction a player with this yaw is looking towards.
    /// Yaw 0 looks south, 90 looks west.
    pub fn from_yaw(yaw: f32) -> Direction {
        let quarter = ((yaw / 90.0) + 0.5).floor() as i32 & 3;
        match quarter {
            0 => Direction::South,
            1 => Direction::West,
            2 => Direction::North,
            _ => Direction::East,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Direction::Down => "down",
            Direction::Up => "up",
            Direction::North => "north",
            Direction::South => "south",
            Direction::West => "west",
            Direction::East => "east",
        }
    }

    pub fn from_name(name: &str) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| d.name() == name)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------- Cells ----------

const AIR_IDS: [&str; 3] = ["air", "cave_air", "void_air"];

/// Smallest placeable unit: a namespaced type id, a property map and an
/// optional opaque data blob. Immutable; every `with_*` returns a new cell.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    id: String,
    #[serde(default)]
    properties: BTreeMap<String, String>,
    #[serde(default)]
    data: Option<Box<[u8]>>,
}

impl Cell {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), properties: BTreeMap::new(), data: None }
    }

    pub fn air() -> Self {
        Self::new("minecraft:air")
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_properties<K, V>(mut self, properties: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in properties {
            self.properties.insert(k.into(), v.into());
        }
        self
    }

    pub fn without_property(mut self, key: &str) -> Self {
        self.properties.remove(key);
        self
    }

    pub fn with_data(mut self, data: impl Into<Box<[u8]>>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub(crate) fn with_property_map(mut self, properties: BTreeMap<String, String>) -> Self {
        self.properties = properties;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Id without its namespace (`minecraft:oak_stairs` -> `oak_stairs`).
    pub fn name(&self) -> &str {
        self.id.split_once(':').map_or(self.id.as_str(), |(_, path)| path)
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    pub fn is_air(&self) -> bool {
        AIR_IDS.contains(&self.name())
    }

    /// Same block type, ignoring properties and data.
    pub fn same_type(&self, other: &Cell) -> bool {
        self.id == other.id
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)?;
        if !self.properties.is_empty() {
            f.write_str("[")?;
            for (i, (k, v)) in self.properties.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{k}={v}")?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}
