//! Modern and high-quality chess engine. For more information, see
//!
//! - [README] explaining about design and implementation goals
//! - [ARCHITECTURE] for introduction into the codebase and design choices.
//!
//! [README]: https://github.com/caissa-engine/caissa/blob/main/README.md
//! [ARCHITECTURE]: https://github.com/caissa-engine/caissa/wiki/ARCHITECTURE.md

// TODO: Gradually move most of warnings to deny.
#![warn(missing_docs, variant_size_differences)]
// Rustc lints.
#![warn(
    absolute_paths_not_starting_with_crate,
    keyword_idents,
    macro_use_extern_crate,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused_extern_crates,
    unused_import_braces,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]
// Rustdoc lints.
#![warn(
    rustdoc::missing_doc_code_examples,
    rustdoc::private_doc_tests,
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::invalid_codeblock_attributes,
    rustdoc::invalid_html_tags,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::bare_urls
)]
// Clippy lints.
#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
// Performance is extremely important.
#![deny(clippy::perf)]

// TODO: Re-export types for convenience.
pub mod chess;
pub mod engine;
pub mod evaluation;
pub mod search;
pub mod tt;

shadow_rs::shadow!(build);

/// Full version of the engine: crate version plus the short commit hash of
/// the build, produced by `build.rs` via `shadow-rs`.
#[must_use]
pub fn engine_version() -> String {
    format!("{}+{}", build::PKG_VERSION, build::SHORT_COMMIT)
}

/// Build type, target and toolchain the binary was compiled with.
#[must_use]
pub fn build_info() -> String {
    format!("{} built with {} for {}", build::BUILD_RUST_CHANNEL, build::RUST_VERSION, build::BUILD_TARGET)
}

/// Prints the engine's version and build info, the way a UCI engine
/// typically greets its GUI/terminal before reading any commands.
pub fn print_system_info() {
    println!("{} ({})", engine_version(), build_info());
}
