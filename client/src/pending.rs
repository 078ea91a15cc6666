//! Two-phase local move staging. A staged move mutates the mirror board
//! immediately so the player sees the result, and keeps the inverse around
//! so backing out restores the exact prior position.

use game_core::{Board, Color, Move, Pos};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveStage {
    #[default]
    Idle,
    /// A piece is selected but no move has been tried yet.
    PiecePicked { origin: Pos },
    /// A move is applied to the mirror board, awaiting confirm or revert.
    MovePending { mv: Move, inverse: Move },
}

impl MoveStage {
    pub fn is_idle(&self) -> bool {
        matches!(self, MoveStage::Idle)
    }

    pub fn picked_origin(&self) -> Option<Pos> {
        match self {
            MoveStage::PiecePicked { origin } => Some(*origin),
            _ => None,
        }
    }

    /// Select one of `color`'s pieces. Fails on empty cells, enemy pieces,
    /// or while a move is already pending.
    pub fn pick_up(&mut self, board: &Board, origin: Pos, color: Color) -> bool {
        if !matches!(self, MoveStage::Idle | MoveStage::PiecePicked { .. }) {
            return false;
        }
        match board.piece_at(origin) {
            Some(piece) if piece.color == color => {
                *self = MoveStage::PiecePicked { origin };
                true
            }
            _ => false,
        }
    }

    /// Apply `mv` to the mirror board and hold its inverse. Requires a
    /// picked piece at the move's origin.
    pub fn stage(&mut self, board: &mut Board, mv: Move) -> bool {
        let origin = match self {
            MoveStage::PiecePicked { origin } => *origin,
            _ => return false,
        };
        if origin != mv.origin {
            return false;
        }
        match board.apply_move(&mv) {
            Some(inverse) => {
                *self = MoveStage::MovePending { mv, inverse };
                true
            }
            None => false,
        }
    }

    /// Undo a pending move and drop any selection.
    pub fn revert(&mut self, board: &mut Board) -> bool {
        match *self {
            MoveStage::MovePending { inverse, .. } => {
                board.apply_move(&inverse);
                *self = MoveStage::Idle;
                true
            }
            MoveStage::PiecePicked { .. } => {
                *self = MoveStage::Idle;
                true
            }
            MoveStage::Idle => false,
        }
    }

    /// Commit the pending move, leaving its effect on the board in place.
    pub fn confirm(&mut self) -> Option<Move> {
        match *self {
            MoveStage::MovePending { mv, .. } => {
                *self = MoveStage::Idle;
                Some(mv)
            }
            _ => None,
        }
    }
}
