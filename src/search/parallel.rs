//! Root-splitting parallel search: a fixed worker pool searches root moves
//! concurrently, feeding result slots a dispatcher thread waits on. Per
//! `spec.md` §4.7.

use std::sync::{Arc, Condvar, Mutex};

use crate::chess::core::Move;
use crate::chess::movegen;
use crate::chess::position::Position;
use crate::evaluation::Score;
use crate::search::{self, Depth, IterationReport, SearchControl, ThreadTables};
use crate::tt::TranspositionTable;

struct Slots {
    scores: Vec<Option<Score>>,
    remaining: usize,
}

/// Searches every root move for one depth across `threads` workers, each
/// pulling the next unclaimed move from a shared atomic cursor. Returns
/// `None` if the deadline fired before every slot was filled, per `spec.md`
/// §4.7 step 4.
fn search_depth_parallel(
    root: &Position,
    root_moves: &[Move],
    depth: Depth,
    alpha: Score,
    beta: Score,
    threads: usize,
    control: &SearchControl,
    tt: &TranspositionTable,
) -> Option<Vec<Score>> {
    let cursor = std::sync::atomic::AtomicUsize::new(0);
    let slots = Mutex::new(Slots { scores: vec![None; root_moves.len()], remaining: root_moves.len() });
    let done = Condvar::new();

    std::thread::scope(|scope| {
        for _ in 0..threads.max(1) {
            scope.spawn(|| {
                let mut tables = ThreadTables::new();
                loop {
                    if control.should_stop() {
                        return;
                    }
                    let index = cursor.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                    if index >= root_moves.len() {
                        return;
                    }
                    let score = search::search_move(
                        root,
                        &root_moves[index],
                        depth,
                        alpha,
                        beta,
                        control,
                        tt,
                        &mut tables,
                    );
                    let mut guard = slots.lock().expect("parallel search slot mutex poisoned");
                    guard.scores[index] = Some(score);
                    guard.remaining -= 1;
                    if guard.remaining == 0 {
                        done.notify_all();
                    }
                }
            });
        }

        let mut guard = slots.lock().expect("parallel search slot mutex poisoned");
        while guard.remaining > 0 && !control.should_stop() {
            let (next_guard, timeout) =
                done.wait_timeout(guard, std::time::Duration::from_millis(10)).expect("condvar wait");
            guard = next_guard;
            let _ = timeout;
        }
        if guard.remaining > 0 {
            None
        } else {
            Some(guard.scores.iter().map(|score| score.expect("every slot filled")).collect())
        }
    })
}

/// Iterative deepening over [`search_depth_parallel`]: the multi-threaded
/// counterpart of [`search::iterative_deepening`], with the same aspiration
/// and cancellation semantics but root moves fanned out across `threads`
/// workers per depth.
pub fn iterative_deepening(
    root: &Position,
    max_depth: Depth,
    threads: usize,
    control: &SearchControl,
    tt: &TranspositionTable,
    mut on_iteration: impl FnMut(&IterationReport),
) -> Option<(Move, Score)> {
    let root_moves = movegen::generate_legal_moves(root);
    if root_moves.is_empty() {
        return None;
    }
    if threads <= 1 {
        return search::iterative_deepening(root, max_depth, control, tt, on_iteration);
    }

    let start = std::time::Instant::now();
    // Seeded with the first legal move rather than `None`: if `control`
    // already demands a stop before depth 1 finishes, this is what gets
    // returned, matching the "return the first legal move" fallback.
    let mut best: Option<(Move, Score)> = Some((root_moves[0], Score::ZERO));
    let mut score_guess = Score::ZERO;
    let mut window = 50;

    for depth in 1..=max_depth {
        if control.should_stop() {
            break;
        }

        let (mut alpha, mut beta) = if depth <= 2 {
            (Score::NEG_INFINITY, Score::INFINITY)
        } else {
            (score_guess.offset(-window), score_guess.offset(window))
        };

        let result = loop {
            let Some(scores) =
                search_depth_parallel(root, &root_moves, depth, alpha, beta, threads, control, tt)
            else {
                break None;
            };

            let (best_index, &best_score) = scores
                .iter()
                .enumerate()
                .max_by_key(|(_, score)| **score)
                .expect("root_moves non-empty");
            let best_move = root_moves[best_index];

            let fail_low = best_score <= alpha && alpha > Score::NEG_INFINITY;
            let fail_high = best_score >= beta && beta < Score::INFINITY;
            if fail_low {
                window *= 2;
                alpha = score_guess.offset(-window);
                continue;
            }
            if fail_high {
                window *= 2;
                beta = score_guess.offset(window);
                continue;
            }
            break Some((best_move, best_score));
        };

        let Some((best_move, best_score)) = result else { break };
        best = Some((best_move, best_score));
        score_guess = best_score;
        window = (window / 2).max(10);
        on_iteration(&IterationReport {
            depth,
            score: best_score,
            best_move,
            nodes: control.nodes(),
            elapsed: start.elapsed(),
        });

        if best_score.is_mate() {
            break;
        }
    }
    best
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::iterative_deepening;
    use crate::chess::position::Position;
    use crate::search::SearchControl;
    use crate::tt::TranspositionTable;

    #[test]
    fn parallel_and_serial_agree_on_a_legal_move() {
        let position = Position::starting();
        let tt = TranspositionTable::new(1);
        let control = SearchControl::unlimited();
        let (mv, _) = iterative_deepening(&position, 3, 4, &control, &tt, |_| {})
            .expect("a legal move exists");
        assert!(crate::chess::movegen::generate_legal_moves(&position).contains(&mv));
    }

    #[test]
    fn single_thread_delegates_to_serial_search() {
        let position = Position::starting();
        let tt = TranspositionTable::new(1);
        let control = SearchControl::unlimited();
        assert!(iterative_deepening(&position, 2, 1, &control, &tt, |_| {}).is_some());
    }
}
