//! Mappings of occupied squares to the attacked squares for each piece.
//!
//! Knight, king and pawn attacks depend only on the attacker's square, so they
//! are precomputed into lookup tables at compile time via `const fn`. Sliding
//! piece (bishop/rook/queen) attacks additionally depend on board occupancy
//! (they stop at the first blocker), so they are computed with a runtime
//! ray-scan, exactly per `spec.md` §4.1 ("stop at first occupant").

use crate::chess::bitboard::Bitboard;
use crate::chess::core::{Color, Square, BOARD_SIZE};

const fn knight_attacks_from(square: u8) -> u64 {
    let file = (square % 8) as i8;
    let rank = (square / 8) as i8;
    const OFFSETS: [(i8, i8); 8] =
        [(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)];
    let mut result = 0u64;
    let mut i = 0;
    while i < OFFSETS.len() {
        let (df, dr) = OFFSETS[i];
        let (target_file, target_rank) = (file + df, rank + dr);
        if target_file >= 0 && target_file < 8 && target_rank >= 0 && target_rank < 8 {
            result |= 1u64 << (target_rank * 8 + target_file);
        }
        i += 1;
    }
    result
}

const fn king_attacks_from(square: u8) -> u64 {
    let file = (square % 8) as i8;
    let rank = (square / 8) as i8;
    const OFFSETS: [(i8, i8); 8] =
        [(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)];
    let mut result = 0u64;
    let mut i = 0;
    while i < OFFSETS.len() {
        let (df, dr) = OFFSETS[i];
        let (target_file, target_rank) = (file + df, rank + dr);
        if target_file >= 0 && target_file < 8 && target_rank >= 0 && target_rank < 8 {
            result |= 1u64 << (target_rank * 8 + target_file);
        }
        i += 1;
    }
    result
}

const fn pawn_attacks_from(square: u8, white: bool) -> u64 {
    let file = (square % 8) as i8;
    let rank = (square / 8) as i8;
    let forward: i8 = if white { 1 } else { -1 };
    let mut result = 0u64;
    let mut df = -1;
    while df <= 1 {
        if df != 0 {
            let (target_file, target_rank) = (file + df, rank + forward);
            if target_file >= 0 && target_file < 8 && target_rank >= 0 && target_rank < 8 {
                result |= 1u64 << (target_rank * 8 + target_file);
            }
        }
        df += 1;
    }
    result
}

const fn build_knight_table() -> [u64; BOARD_SIZE as usize] {
    let mut table = [0u64; BOARD_SIZE as usize];
    let mut square = 0u8;
    while (square as usize) < table.len() {
        table[square as usize] = knight_attacks_from(square);
        square += 1;
    }
    table
}

const fn build_king_table() -> [u64; BOARD_SIZE as usize] {
    let mut table = [0u64; BOARD_SIZE as usize];
    let mut square = 0u8;
    while (square as usize) < table.len() {
        table[square as usize] = king_attacks_from(square);
        square += 1;
    }
    table
}

const fn build_pawn_table(white: bool) -> [u64; BOARD_SIZE as usize] {
    let mut table = [0u64; BOARD_SIZE as usize];
    let mut square = 0u8;
    while (square as usize) < table.len() {
        table[square as usize] = pawn_attacks_from(square, white);
        square += 1;
    }
    table
}

const KNIGHT_ATTACKS: [u64; BOARD_SIZE as usize] = build_knight_table();
const KING_ATTACKS: [u64; BOARD_SIZE as usize] = build_king_table();
const WHITE_PAWN_ATTACKS: [u64; BOARD_SIZE as usize] = build_pawn_table(true);
const BLACK_PAWN_ATTACKS: [u64; BOARD_SIZE as usize] = build_pawn_table(false);

/// Attacks of a knight standing on `square`.
#[must_use]
pub fn knight_attacks(square: Square) -> Bitboard {
    Bitboard::from(KNIGHT_ATTACKS[square as usize])
}

/// Attacks of a king standing on `square`.
#[must_use]
pub fn king_attacks(square: Square) -> Bitboard {
    Bitboard::from(KING_ATTACKS[square as usize])
}

/// Diagonal capture squares of a pawn of `color` standing on `square`
/// (regardless of whether a push is legal there).
#[must_use]
pub fn pawn_attacks(square: Square, color: Color) -> Bitboard {
    let table = match color {
        Color::White => &WHITE_PAWN_ATTACKS,
        Color::Black => &BLACK_PAWN_ATTACKS,
    };
    Bitboard::from(table[square as usize])
}

const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

fn ray_attacks(square: Square, occupancy: Bitboard, directions: &[(i8, i8)]) -> Bitboard {
    let mut result = Bitboard::empty();
    let (origin_file, origin_rank) = (square.file() as i8, square.rank() as i8);
    for &(df, dr) in directions {
        let mut file = origin_file + df;
        let mut rank = origin_rank + dr;
        while (0..8).contains(&file) && (0..8).contains(&rank) {
            let index = (rank * 8 + file) as u8;
            let target = Square::try_from(index).expect("index is within board bounds");
            result.set(target);
            if occupancy.is_set(target) {
                break;
            }
            file += df;
            rank += dr;
        }
    }
    result
}

/// Bishop attacks from `square` given the current board `occupancy`, stopping
/// at (and including) the first occupied square in each diagonal direction.
#[must_use]
pub fn bishop_attacks(square: Square, occupancy: Bitboard) -> Bitboard {
    ray_attacks(square, occupancy, &BISHOP_DIRECTIONS)
}

/// Rook attacks from `square` given the current board `occupancy`.
#[must_use]
pub fn rook_attacks(square: Square, occupancy: Bitboard) -> Bitboard {
    ray_attacks(square, occupancy, &ROOK_DIRECTIONS)
}

/// Queen attacks from `square`: the union of bishop and rook attacks.
#[must_use]
pub fn queen_attacks(square: Square, occupancy: Bitboard) -> Bitboard {
    bishop_attacks(square, occupancy) | rook_attacks(square, occupancy)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks};
    use crate::chess::bitboard::Bitboard;
    use crate::chess::core::{Color, Square};

    #[test]
    fn knight_from_corner() {
        let attacks = knight_attacks(Square::A1);
        assert_eq!(attacks.count(), 2);
        assert!(attacks.is_set(Square::B3));
        assert!(attacks.is_set(Square::C2));
    }

    #[test]
    fn knight_from_center() {
        assert_eq!(knight_attacks(Square::D4).count(), 8);
    }

    #[test]
    fn king_from_corner() {
        assert_eq!(king_attacks(Square::A1).count(), 3);
    }

    #[test]
    fn pawn_attacks_direction() {
        let white = pawn_attacks(Square::E4, Color::White);
        assert!(white.is_set(Square::D5));
        assert!(white.is_set(Square::F5));
        assert_eq!(white.count(), 2);

        let black = pawn_attacks(Square::E4, Color::Black);
        assert!(black.is_set(Square::D3));
        assert!(black.is_set(Square::F3));
    }

    #[test]
    fn rook_stops_at_blocker() {
        let occupancy = Bitboard::with_squares(&[Square::D6]);
        let attacks = rook_attacks(Square::D4, occupancy);
        assert!(attacks.is_set(Square::D5));
        assert!(attacks.is_set(Square::D6));
        assert!(!attacks.is_set(Square::D7));
        assert!(attacks.is_set(Square::A4));
        assert!(attacks.is_set(Square::H4));
    }

    #[test]
    fn bishop_on_empty_board() {
        let attacks = bishop_attacks(Square::D4, Bitboard::empty());
        assert!(attacks.is_set(Square::A1));
        assert!(attacks.is_set(Square::H8));
        assert!(attacks.is_set(Square::A7));
        assert!(attacks.is_set(Square::G1));
    }
}
