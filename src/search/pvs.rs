//! Principal-variation negamax: the main search routine invoked once per
//! root move per iterative-deepening depth. Per `spec.md` §4.6.

use crate::chess::core::Move;
use crate::chess::movegen;
use crate::chess::position::Position;
use crate::evaluation::Score;
use crate::search::ordering::{self, History, Killers};
use crate::search::quiescence;
use crate::search::{SearchControl, ThreadTables};
use crate::tt::{Bound, Probe, TranspositionTable};

const LMR_MIN_DEPTH: u8 = 3;
const LMR_MOVE_INDEX_1: usize = 3;
const LMR_MOVE_INDEX_2: usize = 8;

/// `true` if `mv` should never be late-move-reduced: captures, promotions,
/// checks, escaping check, or an existing killer at this ply.
fn exempt_from_reduction(
    position: &Position,
    mv: &Move,
    gives_check: bool,
    in_check: bool,
    killers: &Killers,
    ply: u16,
) -> bool {
    ordering::is_capture(position, mv)
        || mv.promote.is_some()
        || gives_check
        || in_check
        || killers.contains(ply, mv)
}

fn lmr_reduction(depth: u8, move_index: usize) -> u8 {
    if depth >= LMR_MIN_DEPTH && move_index > LMR_MOVE_INDEX_2 {
        2
    } else if depth >= LMR_MIN_DEPTH && move_index > LMR_MOVE_INDEX_1 {
        1
    } else {
        0
    }
}

/// Searches `position` to `depth` plies within window `[alpha, beta]`,
/// `ply` plies from the search root. Returns the score in the side to
/// move's favor.
#[allow(clippy::too_many_arguments)]
pub fn search(
    position: &Position,
    depth: u8,
    mut alpha: Score,
    beta: Score,
    ply: u16,
    control: &SearchControl,
    tt: &TranspositionTable,
    tables: &mut ThreadTables,
) -> Score {
    if depth == 0 {
        return quiescence::search(position, alpha, beta, ply, control);
    }

    control.count_node();
    if control.should_stop() {
        return Score::ZERO;
    }

    if ply > 0 && (position.is_threefold_repetition() || position.is_fifty_move_draw()) {
        return Score::ZERO;
    }

    let key = position.zobrist_key();
    let mut tt_move = None;
    match tt.probe(key, depth, ply, alpha, beta) {
        Probe::Hit(score) => return score,
        Probe::BestMove(best_move) => tt_move = best_move,
        Probe::Miss => {},
    }

    let mut moves = movegen::generate_legal_moves(position);
    let in_check = position.is_in_check();
    if moves.is_empty() {
        return if in_check { Score::mated_in(ply) } else { Score::ZERO };
    }

    ordering::sort_moves(position, &mut moves, tt_move, ply, &tables.killers, &tables.history);

    let original_alpha = alpha;
    let mut best_score = Score::NEG_INFINITY;
    let mut best_move = moves[0];

    for (index, mv) in moves.iter().enumerate() {
        let mut child = position.clone();
        child.make_move(mv);
        let gives_check = child.is_in_check();

        let score = if index == 0 {
            -search(&child, depth - 1, -beta, -alpha, ply + 1, control, tt, tables)
        } else {
            let reduction = if exempt_from_reduction(position, mv, gives_check, in_check, &tables.killers, ply) {
                0
            } else {
                lmr_reduction(depth, index)
            };
            let reduced_depth = depth.saturating_sub(1).saturating_sub(reduction);
            let mut score = -search(
                &child,
                reduced_depth,
                -alpha.offset(1),
                -alpha,
                ply + 1,
                control,
                tt,
                tables,
            );
            if score > alpha && reduction > 0 {
                score = -search(
                    &child,
                    depth - 1,
                    -alpha.offset(1),
                    -alpha,
                    ply + 1,
                    control,
                    tt,
                    tables,
                );
            }
            if score > alpha && score < beta {
                score = -search(&child, depth - 1, -beta, -alpha, ply + 1, control, tt, tables);
            }
            score
        };

        if control.should_stop() {
            return Score::ZERO;
        }

        if score > best_score {
            best_score = score;
            best_move = *mv;
        }
        if score > alpha {
            alpha = score;
        }
        if alpha >= beta {
            if !ordering::is_capture(position, mv) && mv.promote.is_none() {
                tables.killers.push(ply, *mv);
                tables.history.record(position.us(), mv, depth);
            }
            tt.store(key, depth, ply, best_score, Bound::Lower, Some(best_move));
            return best_score;
        }
    }

    let bound = if best_score <= original_alpha { Bound::Upper } else { Bound::Exact };
    tt.store(key, depth, ply, best_score, bound, Some(best_move));
    best_score
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::search;
    use crate::chess::movegen;
    use crate::evaluation::Score;
    use crate::chess::position::Position;
    use crate::search::{SearchControl, ThreadTables};
    use crate::tt::TranspositionTable;

    #[test]
    fn finds_mate_in_one() {
        // Fool's mate: Black to move delivers mate with Qh4#.
        let position =
            Position::from_fen("rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2")
                .unwrap();
        let tt = TranspositionTable::new(1);
        let control = SearchControl::unlimited();
        let mut tables = ThreadTables::new();
        let score =
            search(&position, 3, Score::NEG_INFINITY, Score::INFINITY, 0, &control, &tt, &mut tables);
        assert!(score.is_mate());
        assert!(score.raw() > 0);
    }

    #[test]
    fn prefers_capturing_a_hanging_queen() {
        let position = Position::from_fen("4k3/8/8/3q4/4R3/8/8/4K3 w - - 0 1").unwrap();
        let tt = TranspositionTable::new(1);
        let control = SearchControl::unlimited();
        let mut tables = ThreadTables::new();
        let score =
            search(&position, 2, Score::NEG_INFINITY, Score::INFINITY, 0, &control, &tt, &mut tables);
        assert!(score.raw() > 500);
        // Sanity: a legal capture of the queen exists in this position.
        assert!(movegen::generate_legal_moves(&position)
            .iter()
            .any(|mv| mv.to_uci() == "e4d4" || mv.to_uci() == "e4e5"));
    }
}
