//! The engine puts all pieces together and manages resources effectively. It
//! implements the [Universal Chess Interface] (UCI) for communication with the
//! client (e.g. tournament runner with other engines or GUI/Lichess endpoint).
//!
//! [`Engine::uci_loop`] is the "main loop" of the engine which communicates
//! with the environment and executes commands from the input stream. Search
//! runs on a background thread so that `stop` sent while a `go` is in flight
//! actually reaches it; see [`Engine::go`].
//!
//! [Universal Chess Interface]: https://www.chessprogramming.org/UCI

pub mod openbench;
mod time_manager;
mod uci;

use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};

use crate::chess::core::{Color, Move};
use crate::chess::movegen;
use crate::chess::position::Position;
use crate::evaluation::Score;
use crate::search::{self, Depth, IterationReport, SearchControl};
use crate::tt::TranspositionTable;
use time_manager::ClockLimits;
use uci::{Command, EngineOption, OptionValue};

/// Default transposition table size until `setoption name Hash` changes it.
const DEFAULT_HASH_MB: usize = 16;
/// Search depth used when a `go` carries no depth/time/node bound at all.
const UNBOUNDED_SEARCH_DEPTH: Depth = 64;

/// Progress relayed from the search thread to the command loop so `info`
/// lines can be printed between reading further commands.
enum SearchEvent {
    Progress(IterationReport),
    Done(Option<(Move, Score)>),
}

/// Clock/depth/node limits carried by one `go` command.
struct GoLimits {
    depth: Option<Depth>,
    wtime: Option<Duration>,
    btime: Option<Duration>,
    winc: Option<Duration>,
    binc: Option<Duration>,
    movestogo: Option<u32>,
    nodes: Option<u64>,
    movetime: Option<Duration>,
    infinite: bool,
}

/// The Engine connects everything together and handles commands sent by a
/// UCI server. It is created when the program starts and implements the
/// "main loop" via [`Engine::uci_loop`]. `R`/`W` are generic so tests can
/// drive it over in-memory buffers instead of real stdio.
pub struct Engine<R, W> {
    /// Next search will start from this position.
    position: Position,
    debug: bool,
    input: R,
    out: W,
    tt: TranspositionTable,
    threads: usize,
    /// Set while a `go` is in flight; `stop` sets this flag rather than
    /// calling into the search directly, since the search itself runs on a
    /// different thread by the time a `stop` line is read.
    stop: Option<Arc<AtomicBool>>,
}

impl<R: BufRead + Send + 'static, W: Write> Engine<R, W> {
    /// Creates a new instance of the engine with the starting position as the
    /// search root.
    #[must_use]
    pub fn new(input: R, out: W) -> Self {
        Self {
            position: Position::starting(),
            debug: false,
            input,
            out,
            tt: TranspositionTable::new(DEFAULT_HASH_MB),
            threads: 1,
            stop: None,
        }
    }

    /// Continuously reads the input stream and executes sent UCI commands
    /// until `quit` is sent or the input stream ends.
    ///
    /// The implementation here does not aim to be complete and exhaustive,
    /// because the main goal is to make the engine work in relatively simple
    /// setups. The assumption is that the UCI input stream is well-formed; a
    /// malformed command is reported via `info string` in debug mode and
    /// otherwise silently skipped.
    pub fn uci_loop(mut self) -> anyhow::Result<()> {
        let mut input = self.input;
        let (line_tx, line_rx) = mpsc::channel::<String>();
        let reader = std::thread::spawn(move || {
            let mut line = String::new();
            loop {
                line.clear();
                match input.read_line(&mut line) {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {
                        let trimmed = line.trim();
                        if !trimmed.is_empty() && line_tx.send(trimmed.to_string()).is_err() {
                            break;
                        }
                    },
                }
            }
        });

        while let Ok(line) = line_rx.recv() {
            match Command::parse(&line) {
                Command::Uci => self.handshake()?,
                Command::Debug { on } => self.debug = on,
                Command::IsReady => self.sync()?,
                Command::SetOption { option, value } => self.set_option(option, value),
                Command::SetPosition { fen, moves } => {
                    if let Err(error) = self.set_position(fen, &moves) {
                        if self.debug {
                            writeln!(self.out, "info string {error}")?;
                        }
                    }
                },
                Command::NewGame => self.new_game(),
                Command::Go { depth, wtime, btime, winc, binc, movestogo, nodes, movetime, infinite } => {
                    if let Err(error) = self.validate_go(wtime, btime, movetime, infinite) {
                        writeln!(self.out, "info string {error}")?;
                        continue;
                    }
                    let limits =
                        GoLimits { depth, wtime, btime, winc, binc, movestogo, nodes, movetime, infinite };
                    self.go(limits, &line_rx)?;
                },
                Command::Stop => {
                    if let Some(stop) = &self.stop {
                        stop.store(true, Ordering::Relaxed);
                    }
                },
                Command::Quit => break,
                Command::Unknown(text) => {
                    if self.debug {
                        writeln!(self.out, "info string unknown command: {text}")?;
                    }
                },
            }
        }
        drop(line_rx);
        let _ = reader.join();
        Ok(())
    }

    /// Responds to the `uci` handshake command by identifying the engine and
    /// declaring the options it supports.
    fn handshake(&mut self) -> anyhow::Result<()> {
        writeln!(self.out, "id name {} {}", env!("CARGO_PKG_NAME"), crate::engine_version())?;
        writeln!(self.out, "id author {}", env!("CARGO_PKG_AUTHORS"))?;
        writeln!(self.out, "option name Hash type spin default {DEFAULT_HASH_MB} min 1 max 4096")?;
        writeln!(self.out, "option name Threads type spin default 1 min 1 max 256")?;
        writeln!(self.out, "option name SyzygyTablebase type string default <empty>")?;
        writeln!(self.out, "uciok")?;
        Ok(())
    }

    /// Syncs with the UCI server by responding with `readyok`.
    fn sync(&mut self) -> anyhow::Result<()> {
        writeln!(self.out, "readyok")?;
        Ok(())
    }

    fn new_game(&mut self) {
        self.position = Position::starting();
        self.tt.clear();
    }

    fn set_option(&mut self, option: EngineOption, value: OptionValue) {
        match (option, value) {
            (EngineOption::Hash, OptionValue::Integer(megabytes)) => {
                self.tt = TranspositionTable::new(megabytes.max(1));
            },
            (EngineOption::Threads, OptionValue::Integer(threads)) => self.threads = threads.max(1),
            // Tablebase probing is out of scope; accepted and ignored so GUIs
            // that always send it don't get treated as unsupported.
            (EngineOption::SyzygyTablebase, OptionValue::String(_)) => {},
            _ => {},
        }
    }

    /// Changes the position of the board to the one specified in the
    /// command. Each UCI move is matched against the legal move list so its
    /// real [`crate::chess::core::MoveFlag`] (castling, en passant, double
    /// push) is recovered: [`Move::from_uci`] alone can't tell those apart
    /// from a normal move.
    fn set_position(&mut self, fen: Option<String>, moves: &[String]) -> anyhow::Result<()> {
        let mut position = match fen {
            Some(fen) => Position::from_fen(&fen)?,
            None => Position::starting(),
        };
        for text in moves {
            let requested = Move::from_uci(text)?;
            let legal = movegen::generate_legal_moves(&position);
            let resolved = legal
                .iter()
                .find(|mv| {
                    mv.from == requested.from && mv.to == requested.to && mv.promote == requested.promote
                })
                .with_context(|| format!("move {text} is not legal in the given position"))?;
            position.make_move(resolved);
        }
        self.position = position;
        Ok(())
    }

    fn validate_go(
        &self,
        wtime: Option<Duration>,
        btime: Option<Duration>,
        movetime: Option<Duration>,
        infinite: bool,
    ) -> anyhow::Result<()> {
        if infinite && (wtime.is_some() || btime.is_some() || movetime.is_some()) {
            bail!("infinite is set, but wtime, btime or movetime is also set");
        }
        if movetime.is_some() && (wtime.is_some() || btime.is_some()) {
            bail!("movetime is set, but wtime or btime is also set");
        }
        Ok(())
    }

    fn time_budget(&self, go: &GoLimits) -> Option<Duration> {
        if let Some(movetime) = go.movetime {
            return Some(movetime);
        }
        let (time_left, increment) = match self.position.us() {
            Color::White => (go.wtime, go.winc),
            Color::Black => (go.btime, go.binc),
        };
        time_left.map(|time_left| {
            time_manager::allocate(ClockLimits {
                time_left,
                increment: increment.unwrap_or(Duration::ZERO),
                moves_to_go: go.movestogo,
            })
        })
    }

    fn format_info(&self, report: &IterationReport) -> String {
        let nps = if report.elapsed.as_secs_f64() > 0.0 {
            (report.nodes as f64 / report.elapsed.as_secs_f64()) as u64
        } else {
            0
        };
        format!(
            "info depth {} score {} nodes {} nps {} time {} pv {}",
            report.depth,
            report.score,
            report.nodes,
            nps,
            report.elapsed.as_millis(),
            report.best_move.to_uci(),
        )
    }

    /// Runs a search per `go` on a background thread, printing `info` lines
    /// as each depth completes and a final `bestmove`. Commands arriving on
    /// `commands` while the search runs are drained here: `stop`/`isready`
    /// are handled immediately, everything else is reported and discarded
    /// (no UCI client sends anything else mid-search in practice).
    fn go(&mut self, go: GoLimits, commands: &Receiver<String>) -> anyhow::Result<()> {
        let stop = Arc::new(AtomicBool::new(false));
        self.stop = Some(Arc::clone(&stop));
        let (tx, rx) = mpsc::channel();

        let position = self.position.clone();
        let threads = self.threads;
        let tt = &self.tt;
        let deadline = if go.infinite { None } else { self.time_budget(&go).map(|budget| Instant::now() + budget) };
        let depth = go.depth.unwrap_or(UNBOUNDED_SEARCH_DEPTH);
        let node_limit = go.nodes;

        std::thread::scope(|scope| {
            let worker_stop = Arc::clone(&stop);
            scope.spawn(move || {
                let control = SearchControl::with_stop(worker_stop, deadline, node_limit);
                let result = if threads > 1 {
                    search::parallel::iterative_deepening(&position, depth, threads, &control, tt, |report| {
                        let _ = tx.send(SearchEvent::Progress(report.clone()));
                    })
                } else {
                    search::iterative_deepening(&position, depth, &control, tt, |report| {
                        let _ = tx.send(SearchEvent::Progress(report.clone()));
                    })
                };
                let _ = tx.send(SearchEvent::Done(result));
            });

            let mut result = None;
            loop {
                match rx.recv_timeout(Duration::from_millis(20)) {
                    Ok(SearchEvent::Progress(report)) => {
                        let line = self.format_info(&report);
                        let _ = writeln!(self.out, "{line}");
                    },
                    Ok(SearchEvent::Done(best)) => {
                        result = best;
                        break;
                    },
                    Err(RecvTimeoutError::Timeout) => {},
                    Err(RecvTimeoutError::Disconnected) => break,
                }
                while let Ok(line) = commands.try_recv() {
                    match Command::parse(&line) {
                        Command::Stop => stop.store(true, Ordering::Relaxed),
                        Command::IsReady => {
                            let _ = writeln!(self.out, "readyok");
                        },
                        Command::Quit => stop.store(true, Ordering::Relaxed),
                        _ => {
                            if self.debug {
                                let _ = writeln!(self.out, "info string command deferred during search: {line}");
                            }
                        },
                    }
                }
            }

            match result {
                Some((mv, _)) => writeln!(self.out, "bestmove {}", mv.to_uci())?,
                None => writeln!(self.out, "bestmove 0000")?,
            }
            anyhow::Ok(())
        })?;

        self.stop = None;
        Ok(())
    }
}
