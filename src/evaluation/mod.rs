//! This module implements "static" [evaluation], i.e. predicting the relative
//! value/score of a given position without [`crate::search`].
//!
//! The result is a [`Score`], White-positive, blended from a tapered
//! middlegame/endgame pair per `spec.md` §4.4. The "terminal override" (mate
//! or stalemate when there are no legal moves) is not checked here: the
//! search already generates legal moves at every node (§4.6 step 3) before
//! ever calling into evaluation, so duplicating that check on this hot path
//! would be wasted work.
//!
//! [evaluation]: https://www.chessprogramming.org/Evaluation

mod pesto;
mod score;
mod terms;

use crate::chess::position::Position;
pub use score::{Score, MATE, MAX_PLY};

/// Maximum phase value (fully middlegame); see `spec.md` §4.4.
const MAX_PHASE: i32 = 24;

/// Evaluates `position` from White's perspective. Callers converting to
/// side-to-move perspective must negate for Black, per `spec.md` §4.4.
#[must_use]
pub fn evaluate(position: &Position) -> Score {
    let (mut mg, mut eg, phase) = pesto::evaluate(position);

    let terms = [
        terms::material(position),
        terms::bishop_pair(position),
        terms::pawn_structure(position),
        terms::rook_file(position),
        terms::knight_outpost(position),
        terms::tempo(position),
    ];
    for (term_mg, term_eg) in terms {
        mg += term_mg;
        eg += term_eg;
    }
    let (king_mg, king_eg) = terms::king_safety(position, |color| position.has_castled(color));
    mg += king_mg;
    eg += king_eg;

    let bound = score::MATE - i32::from(score::MAX_PLY) - 1;
    let blended = (mg * phase + eg * (MAX_PHASE - phase)) / MAX_PHASE;
    Score::cp(blended.clamp(-bound, bound))
}
