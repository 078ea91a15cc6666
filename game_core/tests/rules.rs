//! End-to-end rule scenarios exercising the board, pieces, and beam
//! propagation together.

use game_core::{
    Board, Color, Direction, Facing, MirrorFacing, Move, Outcome, Piece, PieceKind, Pos,
};

fn source(color: Color, x: u8, y: u8, dir: Direction) -> Piece {
    Piece::new(PieceKind::BeamSource, color, Pos::new(x, y), Facing::Axis(dir))
}

#[test]
fn turns_alternate_with_every_fired_beam() {
    let mut board = Board::empty(4, 4);
    board.place(source(Color::White, 3, 0, Direction::North));
    board.place(source(Color::Black, 0, 3, Direction::South));

    assert_eq!(board.turn(), Color::White);
    board.fire_active_beam();
    assert_eq!(board.turn(), Color::Black);
    board.fire_active_beam();
    assert_eq!(board.turn(), Color::White);
}

#[test]
fn double_mirror_rear_branch_still_carries_the_beam() {
    // The pass-through branch travels on past the mirror and can destroy a
    // piece standing directly behind it.
    let mut board = Board::empty(3, 6);
    board.place(source(Color::White, 0, 0, Direction::North));
    board.place(Piece::new(
        PieceKind::DoubleMirror,
        Color::Black,
        Pos::new(0, 2),
        Facing::Mirror(MirrorFacing::Northwest),
    ));
    board.place(Piece::new(
        PieceKind::King,
        Color::Black,
        Pos::new(0, 4),
        Facing::Axis(Direction::South),
    ));

    let report = board.fire_active_beam();
    assert_eq!(
        report.destroyed.first().map(|p| p.kind),
        Some(PieceKind::King)
    );
    assert_eq!(report.outcome, Outcome::WhiteWins);
    // The mirror itself survives the rear hit.
    assert!(board.piece_at(Pos::new(0, 2)).is_some());
}

#[test]
fn branching_beam_reports_every_casualty() {
    // Both double-mirror branches strike an exposed guardian; the report
    // carries both kills from the single firing.
    let mut board = Board::empty(5, 5);
    board.place(source(Color::White, 0, 0, Direction::North));
    board.place(Piece::new(
        PieceKind::DoubleMirror,
        Color::Black,
        Pos::new(0, 2),
        Facing::Mirror(MirrorFacing::Northwest),
    ));
    board.place(Piece::new(
        PieceKind::Guardian,
        Color::Black,
        Pos::new(2, 2),
        Facing::Axis(Direction::South),
    ));
    board.place(Piece::new(
        PieceKind::Guardian,
        Color::Black,
        Pos::new(0, 4),
        Facing::Axis(Direction::East),
    ));
    board.place(Piece::new(
        PieceKind::King,
        Color::White,
        Pos::new(4, 0),
        Facing::Axis(Direction::North),
    ));
    board.place(Piece::new(
        PieceKind::King,
        Color::Black,
        Pos::new(4, 4),
        Facing::Axis(Direction::South),
    ));

    let report = board.fire_active_beam();
    assert_eq!(report.destroyed.len(), 2);
    let mut hit: Vec<Pos> = report.destroyed.iter().map(|p| p.pos).collect();
    hit.sort_by_key(|p| (p.x, p.y));
    assert_eq!(hit, vec![Pos::new(0, 4), Pos::new(2, 2)]);
    assert_eq!(report.outcome, Outcome::NoWinner);
    assert!(board.piece_at(Pos::new(2, 2)).is_none());
    assert!(board.piece_at(Pos::new(0, 4)).is_none());
}

#[test]
fn single_mirror_back_is_vulnerable() {
    let mut board = Board::empty(3, 4);
    board.place(source(Color::White, 0, 0, Direction::North));
    // Northwest face reflects South and East beams; a beam heading north
    // strikes the unreflective back.
    board.place(Piece::new(
        PieceKind::SingleMirror,
        Color::Black,
        Pos::new(0, 2),
        Facing::Mirror(MirrorFacing::Northwest),
    ));

    let report = board.fire_active_beam();
    assert_eq!(
        report.destroyed.first().map(|p| p.kind),
        Some(PieceKind::SingleMirror)
    );
    assert_eq!(report.outcome, Outcome::NoWinner);
    assert!(board.piece_at(Pos::new(0, 2)).is_none());
}

#[test]
fn reflected_beam_reaches_around_a_corner() {
    // Source fires north, a friendly mirror turns the beam east into the
    // enemy king.
    let mut board = Board::empty(5, 5);
    board.place(source(Color::White, 0, 0, Direction::North));
    board.place(Piece::new(
        PieceKind::SingleMirror,
        Color::White,
        Pos::new(0, 3),
        Facing::Mirror(MirrorFacing::Southeast),
    ));
    board.place(Piece::new(
        PieceKind::King,
        Color::Black,
        Pos::new(3, 3),
        Facing::Axis(Direction::South),
    ));

    let report = board.fire_active_beam();
    assert_eq!(report.destroyed.first().map(|p| p.pos), Some(Pos::new(3, 3)));
    assert_eq!(report.outcome, Outcome::WhiteWins);
}

#[test]
fn a_move_sequence_can_be_unwound() {
    let mut board = Board::standard();
    let start = board.clone();

    let moves = [
        Move::relocate(Pos::new(2, 0), Pos::new(1, 1)),
        Move::rotate_left(Pos::new(4, 3)),
        Move::relocate(Pos::new(1, 1), Pos::new(1, 2)),
        Move::rotate_right(Pos::new(7, 1)),
    ];
    let mut inverses = Vec::new();
    for mv in &moves {
        inverses.push(board.apply_move(mv).expect("scripted move applies"));
    }
    for inverse in inverses.iter().rev() {
        board.apply_move(inverse).expect("inverse applies");
    }
    assert_eq!(board, start);
}

#[test]
fn destinations_shrink_at_the_rim() {
    let board = Board::empty(5, 5);
    assert_eq!(board.legal_destinations(Pos::new(2, 2)).len(), 8);
    assert_eq!(board.legal_destinations(Pos::new(0, 2)).len(), 5);
    assert_eq!(board.legal_destinations(Pos::new(0, 0)).len(), 3);
    assert_eq!(board.legal_destinations(Pos::new(4, 4)).len(), 3);
}

#[test]
fn standard_layout_is_color_balanced() {
    let board = Board::standard();
    let mut counts = [0usize; 2];
    for piece in board.pieces().iter().flatten() {
        counts[piece.color.index()] += 1;
    }
    assert_eq!(counts[0], counts[1]);
    assert_eq!(counts[0] + counts[1], 26);
}

#[test]
fn scripted_game_ends_in_a_king_capture() {
    // White walks a mirror into position, then bounces its beam into the
    // black king two moves later.
    let mut board = Board::empty(5, 5);
    board.place(source(Color::White, 0, 0, Direction::North));
    board.place(source(Color::Black, 4, 4, Direction::South));
    board.place(Piece::new(
        PieceKind::King,
        Color::Black,
        Pos::new(3, 3),
        Facing::Axis(Direction::South),
    ));
    board.place(Piece::new(
        PieceKind::King,
        Color::White,
        Pos::new(4, 0),
        Facing::Axis(Direction::North),
    ));
    board.place(Piece::new(
        PieceKind::SingleMirror,
        Color::White,
        Pos::new(1, 3),
        Facing::Mirror(MirrorFacing::Southeast),
    ));

    // White: slide the mirror into the beam lane.
    let mv = Move::relocate(Pos::new(1, 3), Pos::new(0, 3));
    assert!(board.is_legal_move(Color::White, &mv));
    board.apply_move(&mv).unwrap();
    let report = board.fire_active_beam();
    assert_eq!(
        report.destroyed.first().map(|p| p.kind),
        Some(PieceKind::King)
    );
    assert_eq!(report.outcome, Outcome::WhiteWins);
    assert_eq!(board.outcome(), Outcome::WhiteWins);
}
