//! Retrieves information about the version of the engine from Git and the
//! build environment. This information is then written to a file in the
//! output directory and can be accessed at runtime by the engine.
//!
//! Zobrist keys and attack/evaluation tables are generated at compile time by
//! `const fn`s in `src/chess` and `src/evaluation` instead of here, so that
//! the engine's correctness does not depend on anything running outside the
//! compiler.

fn main() -> shadow_rs::SdResult<()> {
    shadow_rs::new()
}
