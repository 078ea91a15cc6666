//! Beam directions, mirror facings, and the reflection table.

use serde::{Deserialize, Serialize};

/// Direction a beam travels across the grid. `North` increases the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    West,
    South,
    East,
}

impl Direction {
    /// Offset of one step in this direction as `(dx, dy)`.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::West => (-1, 0),
            Direction::South => (0, -1),
            Direction::East => (1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::West => Direction::East,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
        }
    }

    /// One quarter turn clockwise.
    pub fn rotated_right(self) -> Self {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    /// One quarter turn counterclockwise.
    pub fn rotated_left(self) -> Self {
        match self {
            Direction::North => Direction::West,
            Direction::West => Direction::South,
            Direction::South => Direction::East,
            Direction::East => Direction::North,
        }
    }
}

/// Orientation of a mirror surface, named for the corner a vector tangent
/// to the reflective face points toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MirrorFacing {
    Northwest,
    Northeast,
    Southeast,
    Southwest,
}

impl MirrorFacing {
    /// The facing of the diagonal surface opposite this one.
    pub fn opposite(self) -> Self {
        match self {
            MirrorFacing::Northwest => MirrorFacing::Southeast,
            MirrorFacing::Northeast => MirrorFacing::Southwest,
            MirrorFacing::Southeast => MirrorFacing::Northwest,
            MirrorFacing::Southwest => MirrorFacing::Northeast,
        }
    }

    /// One quarter turn clockwise.
    pub fn rotated_right(self) -> Self {
        match self {
            MirrorFacing::Northwest => MirrorFacing::Northeast,
            MirrorFacing::Northeast => MirrorFacing::Southeast,
            MirrorFacing::Southeast => MirrorFacing::Southwest,
            MirrorFacing::Southwest => MirrorFacing::Northwest,
        }
    }

    /// One quarter turn counterclockwise.
    pub fn rotated_left(self) -> Self {
        match self {
            MirrorFacing::Northwest => MirrorFacing::Southwest,
            MirrorFacing::Southwest => MirrorFacing::Southeast,
            MirrorFacing::Southeast => MirrorFacing::Northeast,
            MirrorFacing::Northeast => MirrorFacing::Northwest,
        }
    }
}

/// Resultant direction of a beam bouncing off a mirror face, or `None`
/// when the beam strikes the unreflective back of the surface.
///
/// A beam direction of `South` means the beam entered from the north.
pub fn reflect(mirror: MirrorFacing, beam: Direction) -> Option<Direction> {
    use Direction::*;
    match (mirror, beam) {
        (MirrorFacing::Northwest, South) => Some(West),
        (MirrorFacing::Northwest, East) => Some(North),
        (MirrorFacing::Northeast, South) => Some(East),
        (MirrorFacing::Northeast, West) => Some(North),
        (MirrorFacing::Southeast, North) => Some(East),
        (MirrorFacing::Southeast, West) => Some(South),
        (MirrorFacing::Southwest, North) => Some(West),
        (MirrorFacing::Southwest, East) => Some(South),
        _ => None,
    }
}

/// Grid coordinate, origin at the lower-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub x: u8,
    pub y: u8,
}

impl Pos {
    pub fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// The cell one step over in `dir`, or `None` if that leaves the
    /// non-negative quadrant. Upper bounds are the board's concern.
    pub fn step(self, dir: Direction) -> Option<Pos> {
        let (dx, dy) = dir.offset();
        let x = self.x as i32 + dx;
        let y = self.y as i32 + dy;
        if x < 0 || y < 0 || x > u8::MAX as i32 || y > u8::MAX as i32 {
            None
        } else {
            Some(Pos::new(x as u8, y as u8))
        }
    }
}
