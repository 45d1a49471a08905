use std::fmt;
use std::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Serialize};

/// Integer block coordinate.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Block containing a continuous position.
    pub fn containing(p: Vec3) -> Self {
        Self::new(p.x.floor() as i32, p.y.floor() as i32, p.z.floor() as i32)
    }

    pub fn manhattan(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) + self.z.abs_diff(other.z)
    }

    pub fn manhattan_to(self, p: Vec3) -> f64 {
        (self.x as f64 - p.x).abs() + (self.y as f64 - p.y).abs() + (self.z as f64 - p.z).abs()
    }

    /// Component-wise clamp into the box `[min, max]`. Where `min` exceeds
    /// `max` on an axis, `max` wins.
    pub fn clamp(self, min: Position, max: Position) -> Self {
        Self::new(
            self.x.max(min.x).min(max.x),
            self.y.max(min.y).min(max.y),
            self.z.max(min.z).min(max.z),
        )
    }

    /// Lowest and highest corners of the box spanned by `a` and `b`.
    pub fn corners(a: Position, b: Position) -> (Position, Position) {
        (
            Self::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            Self::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        )
    }

    /// Inclusive on both corners.
    pub fn within(self, min: Position, max: Position) -> bool {
        (min.x..=max.x).contains(&self.x)
            && (min.y..=max.y).contains(&self.y)
            && (min.z..=max.z).contains(&self.z)
    }

    /// The six axis-aligned neighbours, each paired with the face of that
    /// neighbour which touches `self`.
    pub fn neighbours(self) -> impl Iterator<Item = (Position, Face)> {
        NEIGHBOURS
            .into_iter()
            .map(move |(offset, face)| (self + offset, face))
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Position {
    fn add_assign(&mut self, rhs: Position) {
        *self = *self + rhs;
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Continuous entity position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl From<Position> for Vec3 {
    fn from(p: Position) -> Self {
        Vec3::new(p.x as f64, p.y as f64, p.z as f64)
    }
}

/// Block face used when digging or placing against a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Face {
    Bottom,
    Top,
    North,
    South,
    West,
    East,
}

/// Axis offsets in a fixed order, with the face of the neighbour that looks
/// back at the origin cell.
pub const NEIGHBOURS: [(Position, Face); 6] = [
    (Position::new(0, 1, 0), Face::Bottom),
    (Position::new(0, -1, 0), Face::Top),
    (Position::new(0, 0, 1), Face::North),
    (Position::new(0, 0, -1), Face::South),
    (Position::new(1, 0, 0), Face::West),
    (Position::new(-1, 0, 0), Face::East),
];

impl Face {
    /// Offset from a block to the cell this face looks at.
    pub fn normal(self) -> Position {
        match self {
            Face::Bottom => Position::new(0, -1, 0),
            Face::Top => Position::new(0, 1, 0),
            Face::North => Position::new(0, 0, -1),
            Face::South => Position::new(0, 0, 1),
            Face::West => Position::new(-1, 0, 0),
            Face::East => Position::new(1, 0, 0),
        }
    }

    pub fn opposite(self) -> Face {
        match self {
            Face::Bottom => Face::Top,
            Face::Top => Face::Bottom,
            Face::North => Face::South,
            Face::South => Face::North,
            Face::West => Face::East,
            Face::East => Face::West,
        }
    }
}
