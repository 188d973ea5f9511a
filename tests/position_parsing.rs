use caissa::chess::position::Position;
use pretty_assertions::assert_eq;

const WELL_FORMED_FENS: &[&str] = &[
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5Q2/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
    "4k3/8/8/8/8/8/8/4K2R w K - 0 1",
    "8/8/8/3k4/8/8/8/R3K3 w Q - 0 1",
    "3k4/8/8/8/8/8/8/R3K2R w KQ - 0 1",
];

#[test]
fn fen_roundtrip() {
    for fen in WELL_FORMED_FENS {
        let position =
            Position::from_fen(fen).unwrap_or_else(|_| panic!("parsing well-formed FEN: {fen}"));
        assert_eq!(&position.to_fen(), fen);
    }
}

#[test]
fn starting_position_roundtrip() {
    let position = Position::starting();
    assert_eq!(position.to_fen(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
}

#[test]
fn rejects_malformed_fens() {
    let malformed = [
        "",
        "not a fen at all",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1",
        "rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "rnbqkxnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    ];
    for fen in malformed {
        assert!(Position::from_fen(fen).is_err(), "expected {fen} to be rejected");
    }
}
