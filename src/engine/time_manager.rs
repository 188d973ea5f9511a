//! Converts UCI clock parameters into a hard search deadline. Per `spec.md`
//! §6.1.

use std::time::Duration;

/// Floor on any computed allocation, so a near-flagged clock still gets a
/// move out before losing on time.
const MIN_ALLOCATION: Duration = Duration::from_millis(50);

/// Parameters carried by a UCI `go` command that bound on clock, as opposed
/// to a fixed depth/node/movetime search.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClockLimits {
    pub time_left: Duration,
    pub increment: Duration,
    pub moves_to_go: Option<u32>,
}

/// Assumed moves remaining in the game when the GUI doesn't send
/// `movestogo`, i.e. under a pure increment or sudden-death clock.
const DEFAULT_MOVES_TO_GO: u32 = 30;

/// Computes how long to spend on the current move: `time_left /
/// max(movestogo, 30) + increment`, clamped to `[50ms, time_left / 2]`.
#[must_use]
pub fn allocate(limits: ClockLimits) -> Duration {
    let divisor = limits.moves_to_go.unwrap_or(DEFAULT_MOVES_TO_GO).max(1);
    let share = limits.time_left / divisor;
    let allocation = share + limits.increment;
    let ceiling = limits.time_left / 2;
    allocation.clamp(MIN_ALLOCATION, ceiling.max(MIN_ALLOCATION))
}
