//! Implementation of chess environment, its rules and specifics.

pub mod attacks;
pub mod bitboard;
pub mod core;
pub mod movegen;
pub mod position;
pub mod zobrist;
