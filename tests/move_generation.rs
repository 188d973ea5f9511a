use caissa::chess::core::Move;
use caissa::chess::movegen::generate_legal_moves;
use caissa::chess::position::Position;
use itertools::Itertools;
use pretty_assertions::assert_eq;

fn setup(fen: &str) -> Position {
    Position::from_fen(fen).unwrap_or_else(|_| panic!("parsing legal position: {fen}"))
}

fn get_moves(position: &Position) -> Vec<String> {
    generate_legal_moves(position).iter().map(|mv| Move::to_string(mv)).sorted().collect::<Vec<_>>()
}

fn sorted_moves(moves: &[&str]) -> Vec<String> {
    moves.iter().map(|m| (*m).to_string()).sorted().collect::<Vec<_>>()
}

#[test]
fn starting_moves() {
    assert_eq!(
        get_moves(&Position::starting()),
        sorted_moves(&[
            "a2a3", "a2a4", "b1a3", "b1c3", "b2b3", "b2b4", "c2c3", "c2c4", "d2d3", "d2d4", "e2e3",
            "e2e4", "f2f3", "f2f4", "g1f3", "g1h3", "g2g3", "g2g4", "h2h3", "h2h4"
        ])
    );
}

#[test]
fn basic_moves() {
    assert_eq!(
        get_moves(&setup("2n4k/1PP5/6K1/3Pp1Q1/3N4/3P4/P3R3/8 w - e6 0 1")),
        sorted_moves(&[
            "a2a3", "a2a4", "d5d6", "d5e6", "b7b8q", "b7b8r", "b7b8b", "b7b8n", "b7c8q", "b7c8r",
            "b7c8b", "b7c8n", "e2e1", "e2e3", "e2e4", "e2e5", "e2b2", "e2c2", "e2d2", "e2f2",
            "e2g2", "e2h2", "d4b3", "d4c2", "d4f3", "d4b5", "d4c6", "d4e6", "d4f5", "g5c1", "g5d2",
            "g5e3", "g5f4", "g5g4", "g5g3", "g5g2", "g5g1", "g5h4", "g5e5", "g5f5", "g5h5", "g5h6",
            "g5f6", "g5e7", "g5d8", "g6f5", "g6h5", "g6f6", "g6h6", "g6f7",
        ])
    );
}

#[test]
fn double_check_evasions() {
    assert_eq!(get_moves(&setup("3kn3/R2p1N2/8/8/7B/6K1/3R4/8 b - - 0 1")), sorted_moves(&["d8c8"]));
    assert_eq!(
        get_moves(&setup("8/5Nk1/7p/4Bp2/3q4/8/8/5KR1 b - - 0 1")),
        sorted_moves(&["g7f8", "g7f7", "g7h7"])
    );
    assert_eq!(
        get_moves(&setup("8/5Pk1/7p/4Bp2/3q4/8/8/5KR1 b - - 0 1")),
        sorted_moves(&["g7f8", "g7f7", "g7h7"])
    );
}

#[test]
fn check_evasions() {
    assert_eq!(
        get_moves(&setup("3kn3/R2p4/8/6B1/8/6K1/3R4/8 b - - 0 1")),
        sorted_moves(&["e8f6", "d8c8"])
    );
    assert_eq!(get_moves(&setup("2R5/8/6k1/8/8/8/PPn5/KR6 w - - 0 1")), sorted_moves(&["c8c2"]));
}

#[test]
fn pins() {
    // The pawn is pinned but can capture en passant.
    assert_eq!(
        get_moves(&setup("6qk/8/8/3Pp3/8/8/K7/8 w - e6 0 1")),
        sorted_moves(&["a2a1", "a2a3", "a2b1", "a2b2", "a2b3", "d5e6"])
    );
    // The pawn is pinned but there is no en passant: it can't move.
    assert_eq!(
        get_moves(&setup("6qk/8/8/3Pp3/8/8/K7/8 w - - 0 1")),
        sorted_moves(&["a2a1", "a2a3", "a2b1", "a2b2", "a2b3"])
    );
    // The pawn is pinned and can't move.
    assert_eq!(get_moves(&setup("k7/1p6/8/8/8/8/8/4K2B b - - 0 1")), sorted_moves(&["a8a7", "a8b8"]));
}

#[test]
fn castle() {
    // Can castle both sides.
    assert_eq!(
        get_moves(&setup("r3k2r/8/8/8/8/8/6N1/4K3 b kq - 0 1")),
        sorted_moves(&[
            "a8a7", "a8a6", "a8a5", "a8a4", "a8a3", "a8a2", "a8a1", "a8b8", "a8c8", "a8d8", "h8f8",
            "h8g8", "h8h7", "h8h6", "h8h5", "h8h4", "h8h3", "h8h2", "h8h1", "e8e7", "e8d8", "e8d7",
            "e8f8", "e8f7", "e8c8", "e8g8"
        ])
    );
    // Castling short blocked by a check.
    assert_eq!(
        get_moves(&setup("r3k2r/8/8/8/8/8/6R1/4K3 b kq - 0 1")),
        sorted_moves(&[
            "a8a7", "a8a6", "a8a5", "a8a4", "a8a3", "a8a2", "a8a1", "a8b8", "a8c8", "a8d8", "h8f8",
            "h8g8", "h8h7", "h8h6", "h8h5", "h8h4", "h8h3", "h8h2", "h8h1", "e8e7", "e8d8", "e8d7",
            "e8f8", "e8f7", "e8c8"
        ])
    );
    // Castling short blocked by our piece, castling long is not available.
    assert_eq!(
        get_moves(&setup("r3k2r/8/8/8/8/8/6R1/4K3 b k - 0 1")),
        sorted_moves(&[
            "a8a7", "a8a6", "a8a5", "a8a4", "a8a3", "a8a2", "a8a1", "a8b8", "a8c8", "a8d8", "h8f8",
            "h8g8", "h8h7", "h8h6", "h8h5", "h8h4", "h8h3", "h8h2", "h8h1", "e8e7", "e8d8", "e8d7",
            "e8f8", "e8f7"
        ])
    );
    // Castling long is not blocked: the attacked square is not the one king will
    // walk through.
    assert_eq!(
        get_moves(&setup("r3k2r/8/8/8/8/8/1R6/4K3 b q - 0 1")),
        sorted_moves(&[
            "a8a7", "a8a6", "a8a5", "a8a4", "a8a3", "a8a2", "a8a1", "a8b8", "a8c8", "a8d8", "h8f8",
            "h8g8", "h8h7", "h8h6", "h8h5", "h8h4", "h8h3", "h8h2", "h8h1", "e8e7", "e8d8", "e8d7",
            "e8f8", "e8f7", "e8c8"
        ])
    );
    // Castling long is blocked by an attack and the king is cut off.
    assert_eq!(
        get_moves(&setup("r3k2r/8/8/8/8/8/3R4/4K3 b kq - 0 1")),
        sorted_moves(&[
            "a8a7", "a8a6", "a8a5", "a8a4", "a8a3", "a8a2", "a8a1", "a8b8", "a8c8", "a8d8", "h8f8",
            "h8g8", "h8h7", "h8h6", "h8h5", "h8h4", "h8h3", "h8h2", "h8h1", "e8e7", "e8f8", "e8f7",
            "e8g8"
        ])
    );
}

#[test]
fn chess_programming_wiki_perft_positions() {
    // Positions from https://www.chessprogramming.org/Perft_Results with
    // depth=1. Position 1 is the starting position, covered above.
    assert_eq!(
        get_moves(&setup("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")).len(),
        48
    );
    assert_eq!(get_moves(&setup("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1")).len(), 14);
    assert_eq!(
        get_moves(&setup("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1")).len(),
        6
    );
    assert_eq!(
        get_moves(&setup("r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1")).len(),
        6
    );
    assert_eq!(
        get_moves(&setup("rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8")).len(),
        44
    );
    assert_eq!(
        get_moves(&setup("r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10")).len(),
        46
    );
}
