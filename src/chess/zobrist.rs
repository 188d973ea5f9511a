//! Implements [Zobrist hashing], underpinning both the transposition table
//! and repetition detection.
//!
//! Keys are generated at compile time by a deterministic splitmix64 stream
//! seeded from a single fixed constant, so that hashing is reproducible
//! within and across runs without relying on a build-time random source.
//!
//! [Zobrist hashing]: https://www.chessprogramming.org/Zobrist_Hashing

use crate::chess::core::{CastlingRights, Color, File, PieceKind, Square, BOARD_SIZE};

/// Zobrist key is a 64-bit integer.
pub type Key = u64;

const SEED: u64 = 0x9E37_79B9_7F4A_7C15;

const fn splitmix64(state: u64) -> (u64, u64) {
    let state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    (z ^ (z >> 31), state)
}

const PIECE_KIND_COUNT: usize = 6;
const COLOR_COUNT: usize = 2;

const fn build_piece_square_keys() -> [[[Key; BOARD_SIZE as usize]; PIECE_KIND_COUNT]; COLOR_COUNT]
{
    let mut table = [[[0u64; BOARD_SIZE as usize]; PIECE_KIND_COUNT]; COLOR_COUNT];
    let mut state = SEED;
    let mut color = 0;
    while color < COLOR_COUNT {
        let mut kind = 0;
        while kind < PIECE_KIND_COUNT {
            let mut square = 0;
            while square < BOARD_SIZE as usize {
                let (key, next_state) = splitmix64(state);
                table[color][kind][square] = key;
                state = next_state;
                square += 1;
            }
            kind += 1;
        }
        color += 1;
    }
    table
}

const fn build_castling_keys() -> [Key; 16] {
    let mut table = [0u64; 16];
    let mut state = SEED ^ 0xC001_D00D_C001_D00D;
    let mut i = 0;
    while i < table.len() {
        let (key, next_state) = splitmix64(state);
        table[i] = key;
        state = next_state;
        i += 1;
    }
    table
}

const fn build_en_passant_keys() -> [Key; 8] {
    let mut table = [0u64; 8];
    let mut state = SEED ^ 0xFEED_FACE_FEED_FACE;
    let mut i = 0;
    while i < table.len() {
        let (key, next_state) = splitmix64(state);
        table[i] = key;
        state = next_state;
        i += 1;
    }
    table
}

const PIECE_SQUARE_KEYS: [[[Key; BOARD_SIZE as usize]; PIECE_KIND_COUNT]; COLOR_COUNT] =
    build_piece_square_keys();
const CASTLING_KEYS: [Key; 16] = build_castling_keys();
const EN_PASSANT_KEYS: [Key; 8] = build_en_passant_keys();
const SIDE_TO_MOVE_KEY: Key = splitmix64(SEED ^ 0xABCD_EF01_2345_6789).0;

fn piece_index(kind: PieceKind) -> usize {
    match kind {
        PieceKind::Pawn => 0,
        PieceKind::Knight => 1,
        PieceKind::Bishop => 2,
        PieceKind::Rook => 3,
        PieceKind::Queen => 4,
        PieceKind::King => 5,
    }
}

/// Key contribution of a single `(color, kind)` piece standing on `square`.
#[must_use]
pub fn piece_square_key(color: Color, kind: PieceKind, square: Square) -> Key {
    PIECE_SQUARE_KEYS[color as usize][piece_index(kind)][square as usize]
}

/// Key contribution of the side to move being Black. XORed in only when it
/// is Black's turn, so the key differs between otherwise-identical positions
/// with different sides to move.
#[must_use]
pub fn side_to_move_key() -> Key {
    SIDE_TO_MOVE_KEY
}

/// Key contribution of the current castling-rights bitflags.
#[must_use]
pub fn castling_key(rights: CastlingRights) -> Key {
    CASTLING_KEYS[rights.bits() as usize]
}

/// Key contribution of an en-passant target on `file`, or `0` if there is no
/// en-passant target.
#[must_use]
pub fn en_passant_key(file: Option<File>) -> Key {
    match file {
        Some(file) => EN_PASSANT_KEYS[file as usize],
        None => 0,
    }
}
