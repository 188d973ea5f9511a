//! Move generation: pseudo-legal enumeration followed by a legality filter,
//! per `spec.md` §4.2.

use arrayvec::ArrayVec;

use crate::chess::attacks;
use crate::chess::bitboard::Bitboard;
use crate::chess::core::{CastlingRights, Color, Direction, Move, MoveFlag, PieceKind, Rank, Square};
use crate::chess::position::Position;

/// Stack-allocated move list; 256 is a safe upper bound on legal moves from
/// any reachable chess position.
pub type MoveList = ArrayVec<Move, 256>;

fn promotion_rank(color: Color) -> Rank {
    match color {
        Color::White => Rank::Eight,
        Color::Black => Rank::One,
    }
}

fn start_rank(color: Color) -> Rank {
    match color {
        Color::White => Rank::Two,
        Color::Black => Rank::Seven,
    }
}

fn forward(color: Color) -> Direction {
    match color {
        Color::White => Direction::North,
        Color::Black => Direction::South,
    }
}

const PROMOTION_KINDS: [PieceKind; 4] =
    [PieceKind::Queen, PieceKind::Rook, PieceKind::Bishop, PieceKind::Knight];

fn push_pawn_move(moves: &mut MoveList, color: Color, from: Square, to: Square, flag: MoveFlag) {
    if to.rank() == promotion_rank(color) {
        for &kind in &PROMOTION_KINDS {
            moves.push(Move { from, to, promote: Some(kind), flag });
        }
    } else {
        moves.push(Move { from, to, promote: None, flag });
    }
}

fn generate_pawn_moves(position: &Position, moves: &mut MoveList) {
    let us = position.us();
    let own = position.board().pieces(us).pawns;
    let occupancy = position.board().occupancy();
    let enemy = position.board().pieces(us.opposite()).all();

    for from in own.squares() {
        if let Some(single) = from.shift(forward(us)) {
            if !occupancy.is_set(single) {
                push_pawn_move(moves, us, from, single, MoveFlag::Normal);
                if from.rank() == start_rank(us) {
                    if let Some(double) = single.shift(forward(us)) {
                        if !occupancy.is_set(double) {
                            push_pawn_move(moves, us, from, double, MoveFlag::DoublePush);
                        }
                    }
                }
            }
        }
        for to in attacks::pawn_attacks(from, us).squares() {
            if enemy.is_set(to) {
                push_pawn_move(moves, us, from, to, MoveFlag::Normal);
            } else if position.ep_target() == Some(to) {
                push_pawn_move(moves, us, from, to, MoveFlag::EnPassant);
            }
        }
    }
}

fn generate_knight_moves(position: &Position, moves: &mut MoveList) {
    let us = position.us();
    let own_occupancy = position.board().pieces(us).all();
    for from in position.board().pieces(us).knights.squares() {
        for to in (attacks::knight_attacks(from) & !own_occupancy).squares() {
            moves.push(Move::quiet(from, to));
        }
    }
}

fn generate_king_moves(position: &Position, moves: &mut MoveList) {
    let us = position.us();
    let own_occupancy = position.board().pieces(us).all();
    let from = position.king_square(us);
    for to in (attacks::king_attacks(from) & !own_occupancy).squares() {
        moves.push(Move::quiet(from, to));
    }
    generate_castling_moves(position, moves);
}

fn generate_castling_moves(position: &Position, moves: &mut MoveList) {
    let us = position.us();
    let them = us.opposite();
    let rank = match us {
        Color::White => Rank::One,
        Color::Black => Rank::Eight,
    };
    let king_from = Square::new(crate::chess::core::File::E, rank);
    let occupancy = position.board().occupancy();

    let (short_right, long_right) = match us {
        Color::White => (CastlingRights::WHITE_SHORT, CastlingRights::WHITE_LONG),
        Color::Black => (CastlingRights::BLACK_SHORT, CastlingRights::BLACK_LONG),
    };

    if position.castling_rights().contains(short_right) {
        let f = Square::new(crate::chess::core::File::F, rank);
        let g = Square::new(crate::chess::core::File::G, rank);
        if !occupancy.is_set(f)
            && !occupancy.is_set(g)
            && !position.is_attacked(king_from, them)
            && !position.is_attacked(f, them)
            && !position.is_attacked(g, them)
        {
            moves.push(Move { from: king_from, to: g, promote: None, flag: MoveFlag::CastleShort });
        }
    }
    if position.castling_rights().contains(long_right) {
        let d = Square::new(crate::chess::core::File::D, rank);
        let c = Square::new(crate::chess::core::File::C, rank);
        let b = Square::new(crate::chess::core::File::B, rank);
        if !occupancy.is_set(d)
            && !occupancy.is_set(c)
            && !occupancy.is_set(b)
            && !position.is_attacked(king_from, them)
            && !position.is_attacked(d, them)
            && !position.is_attacked(c, them)
        {
            moves.push(Move { from: king_from, to: c, promote: None, flag: MoveFlag::CastleLong });
        }
    }
}

fn generate_sliding_moves(
    position: &Position,
    moves: &mut MoveList,
    pieces: Bitboard,
    attack_fn: impl Fn(Square, Bitboard) -> Bitboard,
) {
    let us = position.us();
    let own_occupancy = position.board().pieces(us).all();
    let occupancy = position.board().occupancy();
    for from in pieces.squares() {
        for to in (attack_fn(from, occupancy) & !own_occupancy).squares() {
            moves.push(Move::quiet(from, to));
        }
    }
}

/// Enumerates all pseudo-legal moves: legal ignoring whether the mover's own
/// king ends up attacked.
#[must_use]
pub fn generate_pseudo_legal_moves(position: &Position) -> MoveList {
    let mut moves = MoveList::new();
    generate_pawn_moves(position, &mut moves);
    generate_knight_moves(position, &mut moves);
    generate_king_moves(position, &mut moves);
    let us = position.us();
    generate_sliding_moves(
        position,
        &mut moves,
        position.board().pieces(us).bishops,
        attacks::bishop_attacks,
    );
    generate_sliding_moves(
        position,
        &mut moves,
        position.board().pieces(us).rooks,
        attacks::rook_attacks,
    );
    generate_sliding_moves(
        position,
        &mut moves,
        position.board().pieces(us).queen,
        attacks::queen_attacks,
    );
    moves
}

/// Enumerates all legal moves: pseudo-legal moves filtered by whether they
/// leave the mover's own king in check.
#[must_use]
pub fn generate_legal_moves(position: &Position) -> MoveList {
    let mover = position.us();
    generate_pseudo_legal_moves(position)
        .into_iter()
        .filter(|mv| {
            let mut after = position.clone();
            after.make_move(mv);
            !after.is_attacked(after.king_square(mover), mover.opposite())
        })
        .collect()
}

/// Counts leaf nodes of the move tree rooted at `position` at `depth`, the
/// canonical move-generator correctness test (`spec.md` §8 invariant 5).
#[must_use]
pub fn perft(position: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = generate_legal_moves(position);
    if depth == 1 {
        return moves.len() as u64;
    }
    moves
        .iter()
        .map(|mv| {
            let mut next = position.clone();
            next.make_move(mv);
            perft(&next, depth - 1)
        })
        .sum()
}

/// Captures, promotions, and en-passant captures only; used by quiescence
/// search per `spec.md` §4.6.
#[must_use]
pub fn generate_tactical_moves(position: &Position) -> MoveList {
    generate_legal_moves(position)
        .into_iter()
        .filter(|mv| {
            mv.promote.is_some()
                || mv.flag == MoveFlag::EnPassant
                || position.at(mv.to).is_some()
        })
        .collect()
}
