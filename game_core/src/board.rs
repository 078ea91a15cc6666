//! The board and rule engine: tile grid, piece array, move legality, and
//! worklist beam propagation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::direction::{Direction, MirrorFacing, Pos};
use crate::piece::{BeamAction, Color, Facing, MoveKind, Piece, PieceKind};

pub const STANDARD_WIDTH: u8 = 10;
pub const STANDARD_HEIGHT: u8 = 8;

/// Fixed tile classification, decided once at board construction.
/// Occupancy lives in the piece array, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    Corner,
    Edge,
    Center,
    BeamEmitter,
    Blank,
}

/// One move submitted by a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub origin: Pos,
    pub kind: MoveKind,
    pub dest: Option<Pos>,
}

impl Move {
    pub fn relocate(origin: Pos, dest: Pos) -> Self {
        Self {
            origin,
            kind: MoveKind::Relocate,
            dest: Some(dest),
        }
    }

    pub fn rotate_left(origin: Pos) -> Self {
        Self {
            origin,
            kind: MoveKind::RotateLeft,
            dest: None,
        }
    }

    pub fn rotate_right(origin: Pos) -> Self {
        Self {
            origin,
            kind: MoveKind::RotateRight,
            dest: None,
        }
    }

    /// The move that exactly undoes this one.
    pub fn inverse(&self) -> Move {
        match self.kind {
            MoveKind::Relocate => {
                // A relocation always carries a destination.
                let dest = self.dest.unwrap_or(self.origin);
                Move::relocate(dest, self.origin)
            }
            MoveKind::RotateLeft => Move::rotate_right(self.origin),
            MoveKind::RotateRight => Move::rotate_left(self.origin),
        }
    }
}

/// Result of the game, derived purely from King presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    WhiteWins,
    BlackWins,
    NoWinner,
}

/// One visible beam segment: the cell it starts in and its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeamSegment {
    pub pos: Pos,
    pub dir: Direction,
}

/// Everything a fired beam did, for rendering and game-over detection.
/// A branching beam can claim more than one piece in a single firing.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamReport {
    pub segments: Vec<BeamSegment>,
    pub destroyed: Vec<Piece>,
    pub outcome: Outcome,
}

/// The playing field. The piece array is authoritative for occupancy;
/// index = `y * width + x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    width: u8,
    height: u8,
    tiles: Vec<TileKind>,
    pieces: Vec<Option<Piece>>,
    turn: Color,
    kings: [Option<Pos>; 2],
    sources: [Pos; 2],
}

impl Board {
    /// An empty board with edge/corner tile typing and no pieces. Sources
    /// default to the two emitter corners until pieces are placed.
    pub fn empty(width: u8, height: u8) -> Self {
        let mut tiles = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                tiles.push(tile_kind_for(x, y, width, height));
            }
        }
        Self {
            width,
            height,
            tiles,
            pieces: vec![None; width as usize * height as usize],
            turn: Color::White,
            kings: [None, None],
            sources: [Pos::new(width - 1, 0), Pos::new(0, height - 1)],
        }
    }

    /// The standard 10x8 starting position.
    pub fn standard() -> Self {
        let mut board = Board::empty(STANDARD_WIDTH, STANDARD_HEIGHT);
        for &(kind, color, x, y, facing) in STANDARD_LAYOUT {
            board.place(Piece::new(kind, color, Pos::new(x, y), facing));
        }
        board
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn tiles(&self) -> &[TileKind] {
        &self.tiles
    }

    pub fn pieces(&self) -> &[Option<Piece>] {
        &self.pieces
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: Pos) -> usize {
        pos.y as usize * self.width as usize + pos.x as usize
    }

    pub fn tile_at(&self, pos: Pos) -> Option<TileKind> {
        if self.in_bounds(pos) {
            Some(self.tiles[self.index(pos)])
        } else {
            None
        }
    }

    pub fn piece_at(&self, pos: Pos) -> Option<&Piece> {
        if self.in_bounds(pos) {
            self.pieces[self.index(pos)].as_ref()
        } else {
            None
        }
    }

    /// Put a piece on the board, tracking kings and sources. Replaces
    /// whatever occupied the cell.
    pub fn place(&mut self, piece: Piece) {
        let idx = self.index(piece.pos);
        match piece.kind {
            PieceKind::King => self.kings[piece.color.index()] = Some(piece.pos),
            PieceKind::BeamSource => self.sources[piece.color.index()] = piece.pos,
            _ => {}
        }
        self.pieces[idx] = Some(piece);
    }

    pub fn king_pos(&self, color: Color) -> Option<Pos> {
        self.kings[color.index()]
    }

    pub fn source_pos(&self, color: Color) -> Pos {
        self.sources[color.index()]
    }

    /// Empty, in-bounds cells in the 8-neighborhood of `origin`.
    pub fn legal_destinations(&self, origin: Pos) -> Vec<Pos> {
        let mut out = Vec::new();
        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let x = origin.x as i32 + dx;
                let y = origin.y as i32 + dy;
                if x < 0 || y < 0 {
                    continue;
                }
                let pos = Pos::new(x as u8, y as u8);
                if self.in_bounds(pos) && self.piece_at(pos).is_none() {
                    out.push(pos);
                }
            }
        }
        out
    }

    /// Whether `color` may make this move. Total: never errors, only judges.
    pub fn is_legal_move(&self, color: Color, mv: &Move) -> bool {
        let piece = match self.piece_at(mv.origin) {
            Some(p) => p,
            None => return false,
        };
        if piece.color != color {
            return false;
        }
        match mv.kind {
            MoveKind::RotateLeft | MoveKind::RotateRight => true,
            MoveKind::Relocate => match mv.dest {
                Some(dest) => self.legal_destinations(mv.origin).contains(&dest),
                None => false,
            },
        }
    }

    /// Mutate the board by one move and return its inverse for reversion.
    /// Returns `None` when there is no piece at the origin (or a relocation
    /// has no usable destination), leaving the board untouched.
    pub fn apply_move(&mut self, mv: &Move) -> Option<Move> {
        match mv.kind {
            MoveKind::RotateLeft | MoveKind::RotateRight => {
                let idx = self.index(mv.origin);
                let piece = self.pieces.get_mut(idx)?.as_mut()?;
                if mv.kind == MoveKind::RotateLeft {
                    piece.rotate_left();
                } else {
                    piece.rotate_right();
                }
                Some(mv.inverse())
            }
            MoveKind::Relocate => {
                let dest = mv.dest?;
                if !self.in_bounds(dest) || self.piece_at(dest).is_some() {
                    return None;
                }
                let origin_idx = self.index(mv.origin);
                let mut piece = self.pieces.get_mut(origin_idx)?.take()?;
                piece.pos = dest;
                let dest_idx = self.index(dest);
                match piece.kind {
                    PieceKind::King => self.kings[piece.color.index()] = Some(dest),
                    PieceKind::BeamSource => self.sources[piece.color.index()] = dest,
                    _ => {}
                }
                self.pieces[dest_idx] = Some(piece);
                Some(mv.inverse())
            }
        }
    }

    /// Fire a beam into `origin` traveling `dir` and propagate it until every
    /// branch is absorbed or exits the board. Removes each piece a branch
    /// destroys, then flips the turn flag.
    ///
    /// Propagation is an explicit worklist over (cell, direction) pairs with
    /// a visited set, so reflector cycles terminate after at most
    /// `width * height * 4` steps.
    pub fn fire_beam(&mut self, origin: Pos, dir: Direction) -> BeamReport {
        let mut segments = Vec::new();
        let mut destroyed = Vec::new();
        let mut visited: HashSet<(Pos, Direction)> = HashSet::new();
        let mut work = vec![(origin, dir)];

        while let Some((pos, dir)) = work.pop() {
            if !self.in_bounds(pos) || !visited.insert((pos, dir)) {
                continue;
            }
            match self.piece_at(pos) {
                None => {
                    segments.push(BeamSegment { pos, dir });
                    if let Some(next) = pos.step(dir) {
                        work.push((next, dir));
                    }
                }
                Some(piece) => match piece.accept_beam(dir) {
                    BeamAction::Blocked => {}
                    BeamAction::Destroyed => {
                        let idx = self.index(pos);
                        if let Some(dead) = self.pieces[idx].take() {
                            if dead.kind == PieceKind::King {
                                self.kings[dead.color.index()] = None;
                            }
                            destroyed.push(dead);
                        }
                    }
                    BeamAction::Redirect(dirs) => {
                        for out in dirs {
                            segments.push(BeamSegment { pos, dir: out });
                            if let Some(next) = pos.step(out) {
                                work.push((next, out));
                            }
                        }
                    }
                },
            }
        }

        self.turn = self.turn.opponent();
        BeamReport {
            segments,
            destroyed,
            outcome: self.outcome(),
        }
    }

    /// Fire the active color's beam from its source piece, along the
    /// source's current facing. The turn-ending action of every move.
    pub fn fire_active_beam(&mut self) -> BeamReport {
        let origin = self.sources[self.turn.index()];
        let dir = match self.piece_at(origin).map(|p| p.facing) {
            Some(Facing::Axis(d)) => d,
            // A source always has an axis facing; fall back to home.
            _ => self.turn.home_direction(),
        };
        self.fire_beam(origin, dir)
    }

    /// Game result from King presence alone.
    pub fn outcome(&self) -> Outcome {
        if self.kings[Color::Black.index()].is_none() {
            Outcome::WhiteWins
        } else if self.kings[Color::White.index()].is_none() {
            Outcome::BlackWins
        } else {
            Outcome::NoWinner
        }
    }
}

fn tile_kind_for(x: u8, y: u8, width: u8, height: u8) -> TileKind {
    let left = x == 0;
    let right = x == width - 1;
    let bottom = y == 0;
    let top = y == height - 1;
    // The two emitter tiles sit in the upper-left and lower-right corners.
    if (left && top) || (right && bottom) {
        TileKind::BeamEmitter
    } else if (left || right) && (top || bottom) {
        TileKind::Corner
    } else if left || right || top || bottom {
        TileKind::Edge
    } else {
        TileKind::Center
    }
}

/// The standard starting layout: (kind, color, x, y, facing).
const STANDARD_LAYOUT: &[(PieceKind, Color, u8, u8, Facing)] = {
    use Color::*;
    use Direction::{North, South};
    use MirrorFacing::*;
    use PieceKind::*;
    &[
        // White single mirrors
        (SingleMirror, White, 2, 0, Facing::Mirror(Northwest)),
        (SingleMirror, White, 2, 3, Facing::Mirror(Northwest)),
        (SingleMirror, White, 3, 5, Facing::Mirror(Northwest)),
        (SingleMirror, White, 9, 4, Facing::Mirror(Northwest)),
        (SingleMirror, White, 7, 1, Facing::Mirror(Northeast)),
        (SingleMirror, White, 2, 4, Facing::Mirror(Southwest)),
        (SingleMirror, White, 9, 3, Facing::Mirror(Southwest)),
        // Black single mirrors
        (SingleMirror, Black, 0, 3, Facing::Mirror(Southeast)),
        (SingleMirror, Black, 6, 2, Facing::Mirror(Southeast)),
        (SingleMirror, Black, 7, 4, Facing::Mirror(Southeast)),
        (SingleMirror, Black, 7, 7, Facing::Mirror(Southeast)),
        (SingleMirror, Black, 0, 4, Facing::Mirror(Northeast)),
        (SingleMirror, Black, 7, 3, Facing::Mirror(Northeast)),
        (SingleMirror, Black, 2, 6, Facing::Mirror(Southwest)),
        // Double mirrors
        (DoubleMirror, White, 4, 3, Facing::Mirror(Northwest)),
        (DoubleMirror, White, 5, 3, Facing::Mirror(Northeast)),
        (DoubleMirror, Black, 4, 4, Facing::Mirror(Northeast)),
        (DoubleMirror, Black, 5, 4, Facing::Mirror(Northwest)),
        // Guardians
        (Guardian, White, 3, 0, Facing::Axis(North)),
        (Guardian, White, 5, 0, Facing::Axis(North)),
        (Guardian, Black, 4, 7, Facing::Axis(South)),
        (Guardian, Black, 6, 7, Facing::Axis(South)),
        // Kings
        (King, White, 4, 0, Facing::Axis(North)),
        (King, Black, 5, 7, Facing::Axis(South)),
        // Beam sources
        (BeamSource, White, 9, 0, Facing::Axis(North)),
        (BeamSource, Black, 0, 7, Facing::Axis(South)),
    ]
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_board_shape() {
        let board = Board::standard();
        assert_eq!(board.width(), 10);
        assert_eq!(board.height(), 8);
        assert_eq!(board.turn(), Color::White);
        assert_eq!(board.king_pos(Color::White), Some(Pos::new(4, 0)));
        assert_eq!(board.king_pos(Color::Black), Some(Pos::new(5, 7)));
        assert_eq!(board.source_pos(Color::White), Pos::new(9, 0));
        assert_eq!(board.source_pos(Color::Black), Pos::new(0, 7));
        assert_eq!(board.outcome(), Outcome::NoWinner);
    }

    #[test]
    fn every_piece_matches_its_slot() {
        let board = Board::standard();
        for (idx, slot) in board.pieces().iter().enumerate() {
            if let Some(piece) = slot {
                let expected =
                    piece.pos.y as usize * board.width() as usize + piece.pos.x as usize;
                assert_eq!(idx, expected);
            }
        }
    }

    #[test]
    fn emitter_tiles_sit_under_the_sources() {
        let board = Board::standard();
        assert_eq!(board.tile_at(Pos::new(0, 7)), Some(TileKind::BeamEmitter));
        assert_eq!(board.tile_at(Pos::new(9, 0)), Some(TileKind::BeamEmitter));
        assert_eq!(board.tile_at(Pos::new(0, 0)), Some(TileKind::Corner));
        assert_eq!(board.tile_at(Pos::new(9, 7)), Some(TileKind::Corner));
        assert_eq!(board.tile_at(Pos::new(4, 0)), Some(TileKind::Edge));
        assert_eq!(board.tile_at(Pos::new(4, 4)), Some(TileKind::Center));
    }

    #[test]
    fn legal_destinations_exclude_occupied_and_out_of_bounds() {
        let board = Board::standard();
        // White king at (4,0): (3,0) and (5,0) hold guardians, row -1 is off
        // the board.
        let dests = board.legal_destinations(Pos::new(4, 0));
        assert!(dests.contains(&Pos::new(4, 1)));
        assert!(dests.contains(&Pos::new(3, 1)));
        assert!(dests.contains(&Pos::new(5, 1)));
        assert!(!dests.contains(&Pos::new(3, 0)));
        assert!(!dests.contains(&Pos::new(5, 0)));
        assert!(!dests.contains(&Pos::new(4, 0)));
        assert_eq!(dests.len(), 3);
    }

    #[test]
    fn relocation_legality() {
        let board = Board::standard();
        let mv = Move::relocate(Pos::new(2, 0), Pos::new(1, 1));
        assert!(board.is_legal_move(Color::White, &mv));
        // Not black's piece.
        assert!(!board.is_legal_move(Color::Black, &mv));
        // No piece at origin.
        let empty = Move::relocate(Pos::new(1, 1), Pos::new(1, 2));
        assert!(!board.is_legal_move(Color::White, &empty));
        // Destination occupied.
        let blocked = Move::relocate(Pos::new(4, 0), Pos::new(3, 0));
        assert!(!board.is_legal_move(Color::White, &blocked));
    }

    #[test]
    fn apply_move_returns_a_working_inverse() {
        let mut board = Board::standard();
        let before = board.clone();

        let mv = Move::relocate(Pos::new(2, 0), Pos::new(1, 1));
        let inverse = board.apply_move(&mv).expect("legal move applies");
        assert!(board.piece_at(Pos::new(2, 0)).is_none());
        assert_eq!(board.piece_at(Pos::new(1, 1)).map(|p| p.pos), Some(Pos::new(1, 1)));
        board.apply_move(&inverse).expect("inverse applies");
        assert_eq!(board, before);

        let rot = Move::rotate_left(Pos::new(2, 0));
        let inverse = board.apply_move(&rot).expect("rotation applies");
        board.apply_move(&inverse).expect("inverse applies");
        assert_eq!(board, before);
    }

    #[test]
    fn relocating_a_source_moves_the_emitter() {
        let mut board = Board::empty(5, 5);
        board.place(Piece::new(
            PieceKind::BeamSource,
            Color::White,
            Pos::new(4, 0),
            Facing::Axis(Direction::North),
        ));
        let mv = Move::relocate(Pos::new(4, 0), Pos::new(3, 1));
        board.apply_move(&mv).expect("legal move applies");
        assert_eq!(board.source_pos(Color::White), Pos::new(3, 1));
    }

    #[test]
    fn beam_down_an_empty_lane_exits_and_flips_the_turn() {
        let mut board = Board::empty(5, 5);
        board.place(Piece::new(
            PieceKind::BeamSource,
            Color::White,
            Pos::new(2, 0),
            Facing::Axis(Direction::North),
        ));
        // Both kings sit outside the beam lane.
        board.place(Piece::new(
            PieceKind::King,
            Color::White,
            Pos::new(4, 0),
            Facing::Axis(Direction::North),
        ));
        board.place(Piece::new(
            PieceKind::King,
            Color::Black,
            Pos::new(0, 4),
            Facing::Axis(Direction::South),
        ));
        let report = board.fire_active_beam();
        assert!(report.destroyed.is_empty());
        assert_eq!(report.outcome, Outcome::NoWinner);
        // One segment through the source plus one per empty cell above it.
        assert_eq!(report.segments.len(), 5);
        assert_eq!(board.turn(), Color::Black);
    }

    #[test]
    fn beam_destroys_a_king_and_ends_the_game() {
        let mut board = Board::empty(5, 5);
        board.place(Piece::new(
            PieceKind::BeamSource,
            Color::White,
            Pos::new(0, 0),
            Facing::Axis(Direction::North),
        ));
        board.place(Piece::new(
            PieceKind::King,
            Color::Black,
            Pos::new(0, 3),
            Facing::Axis(Direction::South),
        ));
        board.place(Piece::new(
            PieceKind::King,
            Color::White,
            Pos::new(4, 0),
            Facing::Axis(Direction::North),
        ));
        let report = board.fire_active_beam();
        assert_eq!(
            report.destroyed.first().map(|p| p.kind),
            Some(PieceKind::King)
        );
        assert_eq!(report.outcome, Outcome::WhiteWins);
        assert_eq!(board.king_pos(Color::Black), None);
        assert!(board.piece_at(Pos::new(0, 3)).is_none());
    }

    #[test]
    fn guardian_front_stops_the_beam_harmlessly() {
        let mut board = Board::empty(5, 5);
        board.place(Piece::new(
            PieceKind::BeamSource,
            Color::White,
            Pos::new(1, 0),
            Facing::Axis(Direction::North),
        ));
        board.place(Piece::new(
            PieceKind::Guardian,
            Color::Black,
            Pos::new(1, 3),
            Facing::Axis(Direction::South),
        ));
        let report = board.fire_active_beam();
        assert!(report.destroyed.is_empty());
        assert!(board.piece_at(Pos::new(1, 3)).is_some());
    }

    #[test]
    fn mirror_cycle_terminates() {
        // Four single mirrors arranged so the beam orbits the square
        // (1,1) -> (3,1) -> (3,3) -> (1,3) forever without the visited bound.
        let mut board = Board::empty(5, 5);
        let corners = [
            (1, 1, MirrorFacing::Northeast),
            (3, 1, MirrorFacing::Northwest),
            (3, 3, MirrorFacing::Southwest),
            (1, 3, MirrorFacing::Southeast),
        ];
        for (x, y, facing) in corners {
            board.place(Piece::new(
                PieceKind::SingleMirror,
                Color::Black,
                Pos::new(x, y),
                Facing::Mirror(facing),
            ));
        }
        // The source sits on the cycle path and the beam passes through it.
        board.place(Piece::new(
            PieceKind::BeamSource,
            Color::White,
            Pos::new(2, 1),
            Facing::Axis(Direction::East),
        ));
        let report = board.fire_active_beam();
        assert!(report.destroyed.is_empty());
        // Bounded by cells * directions even though the path is cyclic.
        assert!(report.segments.len() <= 5 * 5 * 4);
    }

    #[test]
    fn standard_opening_beam_is_harmless() {
        // From the starting position the white beam bounces off its own
        // mirrors and exits the board without destroying anything.
        let mut board = Board::standard();
        let report = board.fire_active_beam();
        assert!(report.destroyed.is_empty());
        assert_eq!(report.outcome, Outcome::NoWinner);
        assert_eq!(board.turn(), Color::Black);
    }
}
