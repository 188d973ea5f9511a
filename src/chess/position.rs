//! Provides the fully-specified [Chess Position] implementation: the board,
//! side to move, castling rights, en-passant target, and the bookkeeping
//! (halfmove clock, position history) needed for draw detection.
//!
//! [Chess Position]: https://www.chessprogramming.org/Chess_Position

use std::fmt;

use anyhow::{bail, Context};

use crate::chess::attacks;
use crate::chess::bitboard::Board;
use crate::chess::core::{
    CastlingRights, Color, File, Move, MoveFlag, Piece, PieceKind, Rank, Square, BOARD_WIDTH,
};
use crate::chess::zobrist::{self, Key};

/// Whether the last move just applied left both castling rights revoked for
/// that color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Castled {
    white: bool,
    black: bool,
}

/// The central aggregate: a board plus everything needed to generate moves
/// from it and to detect draws. See `spec.md` §3 for the invariants this type
/// must uphold.
#[derive(Clone, Debug)]
pub struct Position {
    board: Board,
    side_to_move: Color,
    castling_rights: CastlingRights,
    ep_target: Option<Square>,
    castled: Castled,
    halfmove_clock: u16,
    fullmove_number: u16,
    zobrist_key: Key,
    /// Zobrist keys of every position reached so far in the game (including
    /// the current one), used for threefold-repetition detection (C11).
    position_history: Vec<Key>,
}

impl Position {
    /// The standard chess starting position.
    #[must_use]
    pub fn starting() -> Self {
        Self::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
            .expect("starting FEN is well-formed")
    }

    #[must_use]
    pub fn us(&self) -> Color {
        self.side_to_move
    }

    #[must_use]
    pub fn them(&self) -> Color {
        self.side_to_move.opposite()
    }

    #[must_use]
    pub fn at(&self, square: Square) -> Option<Piece> {
        self.board.at(square)
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    #[must_use]
    pub fn ep_target(&self) -> Option<Square> {
        self.ep_target
    }

    #[must_use]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    #[must_use]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    #[must_use]
    pub fn zobrist_key(&self) -> Key {
        self.zobrist_key
    }

    /// True if `color` has already performed a castling move this game.
    #[must_use]
    pub fn has_castled(&self, color: Color) -> bool {
        match color {
            Color::White => self.castled.white,
            Color::Black => self.castled.black,
        }
    }

    #[must_use]
    pub fn king_square(&self, color: Color) -> Square {
        self.board
            .pieces(color)
            .king
            .squares()
            .next()
            .expect("position invariant: exactly one king per color")
    }

    /// Returns true iff any piece of `by_color` attacks `square` in the
    /// current position, ignoring pins. Per `spec.md` §4.1, tests in a fixed
    /// order and returns on the first positive witness.
    #[must_use]
    pub fn is_attacked(&self, square: Square, by_color: Color) -> bool {
        let attackers = self.board.pieces(by_color);
        if (attacks::pawn_attacks(square, by_color.opposite()) & attackers.pawns).data() != 0 {
            return true;
        }
        if (attacks::knight_attacks(square) & attackers.knights).data() != 0 {
            return true;
        }
        let occupancy = self.board.occupancy();
        let diagonal_attackers = attackers.bishops | attackers.queen;
        if (attacks::bishop_attacks(square, occupancy) & diagonal_attackers).data() != 0 {
            return true;
        }
        let orthogonal_attackers = attackers.rooks | attackers.queen;
        if (attacks::rook_attacks(square, occupancy) & orthogonal_attackers).data() != 0 {
            return true;
        }
        if (attacks::king_attacks(square) & attackers.king).data() != 0 {
            return true;
        }
        false
    }

    #[must_use]
    pub fn is_in_check(&self) -> bool {
        self.is_attacked(self.king_square(self.side_to_move), self.them())
    }

    /// True once the current position has occurred three times in this game.
    #[must_use]
    pub fn is_threefold_repetition(&self) -> bool {
        self.position_history.iter().filter(|&&key| key == self.zobrist_key).count() >= 3
    }

    /// True once 50 full moves (100 plies) have passed without a pawn move or
    /// a capture.
    #[must_use]
    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    fn home_rank(color: Color) -> Rank {
        match color {
            Color::White => Rank::One,
            Color::Black => Rank::Eight,
        }
    }

    fn rook_home_square(color: Color, kingside: bool) -> Square {
        Square::new(if kingside { File::H } else { File::A }, Self::home_rank(color))
    }

    /// Applies `mv` in place. `mv` is assumed to be a legal move generated for
    /// this exact position (its `flag` is trusted); see `spec.md` §4.3 for the
    /// update algorithm.
    pub fn make_move(&mut self, mv: &Move) {
        let mover =
            self.board.at(mv.from).unwrap_or_else(|| panic!("no piece on {} for {mv}", mv.from));
        debug_assert_eq!(mover.owner, self.side_to_move, "move does not belong to side to move");

        let is_capture = self.board.at(mv.to).is_some() || mv.flag == MoveFlag::EnPassant;

        self.zobrist_key ^= zobrist::piece_square_key(mover.owner, mover.kind, mv.from);
        let _ = self.board.remove(mv.from);

        if mv.flag == MoveFlag::EnPassant {
            let captured_square = match mover.owner {
                Color::White => mv.to.shift(crate::chess::core::Direction::South),
                Color::Black => mv.to.shift(crate::chess::core::Direction::North),
            }
            .expect("en-passant capture square is always on-board");
            if let Some(captured) = self.board.remove(captured_square) {
                self.zobrist_key ^=
                    zobrist::piece_square_key(captured.owner, captured.kind, captured_square);
            }
        } else if let Some(captured) = self.board.at(mv.to) {
            self.zobrist_key ^= zobrist::piece_square_key(captured.owner, captured.kind, mv.to);
            let _ = self.board.remove(mv.to);
        }

        if matches!(mv.flag, MoveFlag::CastleShort | MoveFlag::CastleLong) {
            let kingside = mv.flag == MoveFlag::CastleShort;
            let rook_from = Self::rook_home_square(mover.owner, kingside);
            let rook_to = Square::new(
                if kingside { File::F } else { File::D },
                Self::home_rank(mover.owner),
            );
            let rook = self.board.remove(rook_from).expect("castling rook is on its home square");
            self.zobrist_key ^= zobrist::piece_square_key(rook.owner, rook.kind, rook_from);
            self.board.set(rook_to, rook);
            self.zobrist_key ^= zobrist::piece_square_key(rook.owner, rook.kind, rook_to);
            match mover.owner {
                Color::White => self.castled.white = true,
                Color::Black => self.castled.black = true,
            }
        }

        let placed_kind = mv.promote.unwrap_or(mover.kind);
        self.board.set(mv.to, Piece { owner: mover.owner, kind: placed_kind });
        self.zobrist_key ^= zobrist::piece_square_key(mover.owner, placed_kind, mv.to);

        self.zobrist_key ^= zobrist::castling_key(self.castling_rights);
        if mover.kind == PieceKind::King {
            self.castling_rights.remove(CastlingRights::both(mover.owner));
        }
        for (color, kingside) in [
            (Color::White, true),
            (Color::White, false),
            (Color::Black, true),
            (Color::Black, false),
        ] {
            let home = Self::rook_home_square(color, kingside);
            if mv.from == home || mv.to == home {
                let right = match (color, kingside) {
                    (Color::White, true) => CastlingRights::WHITE_SHORT,
                    (Color::White, false) => CastlingRights::WHITE_LONG,
                    (Color::Black, true) => CastlingRights::BLACK_SHORT,
                    (Color::Black, false) => CastlingRights::BLACK_LONG,
                };
                self.castling_rights.remove(right);
            }
        }
        self.zobrist_key ^= zobrist::castling_key(self.castling_rights);

        self.zobrist_key ^= zobrist::en_passant_key(self.ep_target.map(Square::file));
        self.ep_target = if mv.flag == MoveFlag::DoublePush {
            let direction = match mover.owner {
                Color::White => crate::chess::core::Direction::South,
                Color::Black => crate::chess::core::Direction::North,
            };
            mv.to.shift(direction)
        } else {
            None
        };
        self.zobrist_key ^= zobrist::en_passant_key(self.ep_target.map(Square::file));

        if mover.kind == PieceKind::Pawn || is_capture {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        if self.side_to_move == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = self.side_to_move.opposite();
        self.zobrist_key ^= zobrist::side_to_move_key();

        self.position_history.push(self.zobrist_key);
    }

    /// Parses a FEN string into a [`Position`].
    ///
    /// # Errors
    ///
    /// Returns an error if any of the six fields is malformed.
    pub fn from_fen(fen: &str) -> anyhow::Result<Self> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            bail!("malformed FEN: expected 6 fields, got {}: '{fen}'", fields.len());
        }
        let [board_field, side_field, castling_field, ep_field, halfmove_field, fullmove_field] =
            [fields[0], fields[1], fields[2], fields[3], fields[4], fields[5]];

        let mut board = Board::empty();
        let ranks: Vec<&str> = board_field.split('/').collect();
        if ranks.len() != BOARD_WIDTH as usize {
            bail!("malformed FEN board: expected 8 ranks, got {}", ranks.len());
        }
        for (rank_from_top, rank_text) in ranks.iter().enumerate() {
            let rank = Rank::try_from(BOARD_WIDTH - 1 - rank_from_top as u8)
                .context("malformed FEN: rank index out of range")?;
            let mut file_index = 0u8;
            for ch in rank_text.chars() {
                if let Some(skip) = ch.to_digit(10) {
                    file_index += skip as u8;
                    continue;
                }
                if file_index >= BOARD_WIDTH {
                    bail!("malformed FEN board: rank '{rank_text}' overflows the board width");
                }
                let file = File::try_from(file_index)?;
                board.set(Square::new(file, rank), Piece::try_from(ch)?);
                file_index += 1;
            }
            if file_index != BOARD_WIDTH {
                bail!("malformed FEN board: rank '{rank_text}' does not sum to 8 files");
            }
        }

        let side_to_move = Color::try_from(side_field)?;
        let castling_rights = CastlingRights::from_fen(castling_field)?;
        let ep_target = match ep_field {
            "-" => None,
            square => Some(Square::try_from(square)?),
        };
        let halfmove_clock: u16 =
            halfmove_field.parse().context("malformed FEN: halfmove clock is not a number")?;
        let fullmove_number: u16 =
            fullmove_field.parse().context("malformed FEN: fullmove number is not a number")?;

        let zobrist_key = Self::compute_hash(
            &board,
            side_to_move,
            castling_rights,
            ep_target,
        );

        Ok(Self {
            board,
            side_to_move,
            castling_rights,
            ep_target,
            castled: Castled::default(),
            halfmove_clock,
            fullmove_number,
            zobrist_key,
            position_history: vec![zobrist_key],
        })
    }

    fn compute_hash(
        board: &Board,
        side_to_move: Color,
        castling_rights: CastlingRights,
        ep_target: Option<Square>,
    ) -> Key {
        let mut key = 0;
        for square in Square::iter() {
            if let Some(piece) = board.at(square) {
                key ^= zobrist::piece_square_key(piece.owner, piece.kind, square);
            }
        }
        key ^= zobrist::castling_key(castling_rights);
        key ^= zobrist::en_passant_key(ep_target.map(Square::file));
        if side_to_move == Color::Black {
            key ^= zobrist::side_to_move_key();
        }
        key
    }

    /// Renders the position back to FEN; round-trips with [`Self::from_fen`]
    /// per `spec.md` §8 invariant 2.
    #[must_use]
    pub fn to_fen(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            self.board,
            self.side_to_move,
            self.castling_rights.fen(),
            self.ep_target.map_or_else(|| "-".to_string(), |square| square.to_string()),
            self.halfmove_clock,
            self.fullmove_number,
        )
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.zobrist_key == other.zobrist_key
            && self.board == other.board
            && self.side_to_move == other.side_to_move
            && self.castling_rights == other.castling_rights
            && self.ep_target == other.ep_target
    }
}

impl Eq for Position {}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}
