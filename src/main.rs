//! Entry point: runs the UCI command loop over stdio, or the `bench` command
//! used by OpenBench (C12) when invoked as `caissa bench`.

use caissa::engine::Engine;

fn main() -> anyhow::Result<()> {
    caissa::print_system_info();

    if std::env::args().nth(1).as_deref() == Some("bench") {
        return caissa::engine::openbench::bench(&mut std::io::stdout()).map(|_| ());
    }

    // `Engine::uci_loop` moves its input reader onto a dedicated thread so
    // `stop` can interrupt a running search; `StdinLock` can't cross threads
    // (its guard is tied to the locking thread), so an owned `Stdin` wrapped
    // in a `BufReader` is used instead.
    let engine = Engine::new(std::io::BufReader::new(std::io::stdin()), std::io::stdout());
    engine.uci_loop()
}
