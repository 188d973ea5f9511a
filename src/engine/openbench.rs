//! Implementing a `bench` command is a [requirement for OpenBench], an
//! important tool for measuring engine performance and strength (C12).
//!
//! [requirement for OpenBench]: https://github.com/AndyGrant/OpenBench/wiki/Requirements-For-Public-Engines#basic-requirements

use crate::search::Depth;

/// Depth OpenBench expects `bench` to run at absent other configuration.
const DEFAULT_BENCH_DEPTH: Depth = 8;

/// Runs search on a small, fixed set of positions and reports the total node
/// count, for `cargo run -- bench` / the OpenBench harness.
///
/// # Errors
///
/// Propagates any error from parsing a bench position's FEN or writing to
/// `out`.
pub fn bench(out: &mut dyn std::io::Write) -> anyhow::Result<u64> {
    crate::search::bench(DEFAULT_BENCH_DEPTH, out)
}
