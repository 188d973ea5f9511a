//! Integer evaluation currency shared between static evaluation, the
//! transposition table and search.
//!
//! Per `spec.md` §9: an explicit signed-integer type with a defined `±INF`
//! and a `MATE = 30000` sentinel with headroom for mate-distance encoding,
//! never a floating-point "infinity" and never raw `i32::MIN`/`MAX`.

use std::fmt;
use std::ops::Neg;

/// Mate score at ply 0. Leaves headroom above it for `MATE - ply` encodings up
/// to [`MAX_PLY`] and for the `INFINITY` sentinel used as an unreachable
/// aspiration-window bound.
pub const MATE: i32 = 30_000;

/// Upper bound on search depth/ply the engine is ever asked to reach;
/// bounds how far `MATE - ply` can drift from `MATE` while still being
/// recognized as a mate score by [`Score::is_mate`].
pub const MAX_PLY: u16 = 128;

/// A sentinel strictly larger in magnitude than any real score, used as the
/// initial alpha-beta window and never stored in the transposition table.
const INFINITY: i32 = MATE + i32::from(MAX_PLY) + 1;

/// Centipawn evaluation or mate-in-N encoding, always from the side-to-move's
/// perspective once it leaves static evaluation (which is White-relative; see
/// `spec.md` §4.4).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(i32);

impl Score {
    pub const INFINITY: Self = Self(INFINITY);
    pub const NEG_INFINITY: Self = Self(-INFINITY);
    pub const ZERO: Self = Self(0);

    /// A centipawn evaluation. Not meant for mate scores; use
    /// [`Self::mate_in`] / [`Self::mated_in`] instead.
    #[must_use]
    pub fn cp(value: i32) -> Self {
        debug_assert!(value.abs() < MATE - i32::from(MAX_PLY), "use mate_in for mate scores");
        Self(value)
    }

    /// A winning-side mate score, `ply` plies (from whichever node is
    /// scoring) away from delivering mate.
    #[must_use]
    pub fn mate_in(ply: u16) -> Self {
        Self(MATE - i32::from(ply))
    }

    /// A losing-side (being mated) score, `ply` plies away from being mated.
    #[must_use]
    pub fn mated_in(ply: u16) -> Self {
        Self(-(MATE - i32::from(ply)))
    }

    #[must_use]
    pub fn raw(self) -> i32 {
        self.0
    }

    /// Shifts this score by `delta` centipawns; used to build the
    /// null-window probes (`alpha + 1`) that null-window/PVS re-searches
    /// need.
    #[must_use]
    pub fn offset(self, delta: i32) -> Self {
        Self(self.0 + delta)
    }

    /// True if this score encodes a forced mate rather than a centipawn
    /// evaluation.
    #[must_use]
    pub fn is_mate(self) -> bool {
        self.0.abs() >= MATE - i32::from(MAX_PLY)
    }

    /// Signed distance to mate in full moves, for UCI `info score mate N`.
    /// Positive if the side to move delivers mate, negative if it is mated.
    ///
    /// # Panics
    ///
    /// Panics if this is not a mate score.
    #[must_use]
    pub fn mate_distance_in_moves(self) -> i32 {
        assert!(self.is_mate(), "mate_distance_in_moves called on a non-mate score");
        let plies_to_mate = MATE - self.0.abs();
        let moves = (plies_to_mate + 1) / 2;
        if self.0 > 0 {
            moves
        } else {
            -moves
        }
    }

    /// Adjusts a score about to be stored in the transposition table: mate
    /// scores are rebased from "plies from this node" to "plies from root",
    /// so that a later probe at a different ply can be rebased back and
    /// still describe the correct mate distance. Per `spec.md` §4.5.
    #[must_use]
    pub fn to_tt(self, ply: u16) -> Self {
        if self.0 >= MATE - i32::from(MAX_PLY) {
            Self(self.0 + i32::from(ply))
        } else if self.0 <= -(MATE - i32::from(MAX_PLY)) {
            Self(self.0 - i32::from(ply))
        } else {
            self
        }
    }

    /// Inverse of [`Self::to_tt`], applied when reading a stored score back
    /// at the current node's ply.
    #[must_use]
    pub fn from_tt(self, ply: u16) -> Self {
        if self.0 >= MATE - i32::from(MAX_PLY) {
            Self(self.0 - i32::from(ply))
        } else if self.0 <= -(MATE - i32::from(MAX_PLY)) {
            Self(self.0 + i32::from(ply))
        } else {
            self
        }
    }
}

impl Neg for Score {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl fmt::Display for Score {
    /// Formats per UCI `info score` syntax.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_mate() {
            write!(f, "mate {}", self.mate_distance_in_moves())
        } else {
            write!(f, "cp {}", self.0)
        }
    }
}
