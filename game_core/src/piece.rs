//! Game pieces and their beam-interaction contract.

use serde::{Deserialize, Serialize};

use crate::direction::{reflect, Direction, MirrorFacing, Pos};

/// Player color. White owns the first turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Index into per-color arrays.
    pub fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    /// The direction a source piece of this color fires when at home.
    pub fn home_direction(self) -> Direction {
        match self {
            Color::White => Direction::North,
            Color::Black => Direction::South,
        }
    }
}

/// Variant tag for the five piece families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PieceKind {
    King,
    BeamSource,
    Guardian,
    SingleMirror,
    DoubleMirror,
}

/// Orientation of a piece. Axis-aligned pieces face a cardinal direction,
/// mirror pieces face a diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Axis(Direction),
    Mirror(MirrorFacing),
}

impl Facing {
    pub fn rotated_right(self) -> Self {
        match self {
            Facing::Axis(d) => Facing::Axis(d.rotated_right()),
            Facing::Mirror(m) => Facing::Mirror(m.rotated_right()),
        }
    }

    pub fn rotated_left(self) -> Self {
        match self {
            Facing::Axis(d) => Facing::Axis(d.rotated_left()),
            Facing::Mirror(m) => Facing::Mirror(m.rotated_left()),
        }
    }
}

/// The ways a move can reshape the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveKind {
    Relocate,
    RotateLeft,
    RotateRight,
}

/// What a beam does when it strikes a piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeamAction {
    /// The piece is destroyed and the beam ends.
    Destroyed,
    /// The beam is absorbed harmlessly.
    Blocked,
    /// The beam continues along each of these directions.
    Redirect(Vec<Direction>),
}

/// A piece on the board. Its stored position always matches the slot it
/// occupies in the board's piece array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
    pub pos: Pos,
    pub facing: Facing,
}

impl Piece {
    pub fn new(kind: PieceKind, color: Color, pos: Pos, facing: Facing) -> Self {
        Self {
            kind,
            color,
            pos,
            facing,
        }
    }

    pub fn rotate_right(&mut self) {
        self.facing = self.facing.rotated_right();
    }

    pub fn rotate_left(&mut self) {
        self.facing = self.facing.rotated_left();
    }

    /// Resolve an incoming beam against this piece.
    ///
    /// Total over every (piece, direction) combination:
    /// - King: always destroyed.
    /// - BeamSource: the beam passes straight through.
    /// - Guardian: shields only with its front face (incoming exactly
    ///   opposite its facing); any other hit destroys it.
    /// - SingleMirror: one reflected direction, or destroyed when the beam
    ///   strikes the unreflective back.
    /// - DoubleMirror: the reflection off whichever face the beam strikes,
    ///   plus the beam always re-emitted along its incoming direction.
    pub fn accept_beam(&self, beam: Direction) -> BeamAction {
        match (self.kind, self.facing) {
            (PieceKind::King, _) => BeamAction::Destroyed,
            (PieceKind::BeamSource, _) => BeamAction::Redirect(vec![beam]),
            (PieceKind::Guardian, Facing::Axis(front)) => {
                if beam == front.opposite() {
                    BeamAction::Blocked
                } else {
                    BeamAction::Destroyed
                }
            }
            (PieceKind::SingleMirror, Facing::Mirror(m)) => match reflect(m, beam) {
                Some(out) => BeamAction::Redirect(vec![out]),
                None => BeamAction::Destroyed,
            },
            (PieceKind::DoubleMirror, Facing::Mirror(m)) => {
                let mut out = Vec::with_capacity(2);
                if let Some(d) = reflect(m, beam).or_else(|| reflect(m.opposite(), beam)) {
                    out.push(d);
                }
                out.push(beam);
                BeamAction::Redirect(out)
            }
            // A piece whose facing space does not match its family cannot be
            // built through the board API; resolve it as a plain hit.
            (_, _) => BeamAction::Destroyed,
        }
    }

    /// For a beam source: the rotation that swings it back toward the home
    /// direction for its color, or away when already home.
    pub fn source_toggle(&self) -> MoveKind {
        if self.facing == Facing::Axis(self.color.home_direction()) {
            MoveKind::RotateLeft
        } else {
            MoveKind::RotateRight
        }
    }
}
