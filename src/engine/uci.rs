//! Parses [UCI] command lines into [`Command`] values. Per `spec.md` §6.1.
//!
//! [UCI]: https://www.chessprogramming.org/UCI

use std::time::Duration;

#[derive(Debug, PartialEq)]
pub(super) enum Command {
    Uci,
    Debug { on: bool },
    IsReady,
    SetOption { option: EngineOption, value: OptionValue },
    SetPosition { fen: Option<String>, moves: Vec<String> },
    NewGame,
    Go {
        depth: Option<u8>,
        wtime: Option<Duration>,
        btime: Option<Duration>,
        winc: Option<Duration>,
        binc: Option<Duration>,
        movestogo: Option<u32>,
        nodes: Option<u64>,
        movetime: Option<Duration>,
        infinite: bool,
    },
    Stop,
    Quit,
    Unknown(String),
}

#[derive(Debug, PartialEq)]
pub(super) enum EngineOption {
    Hash,
    Threads,
    SyzygyTablebase,
}

#[derive(Debug, PartialEq)]
pub(super) enum OptionValue {
    Integer(usize),
    String(String),
}

fn parse_millis(text: &str) -> Option<Duration> {
    text.parse::<u64>().ok().map(Duration::from_millis)
}

fn parse_go(parts: &[&str]) -> Command {
    let mut depth = None;
    let mut wtime = None;
    let mut btime = None;
    let mut winc = None;
    let mut binc = None;
    let mut movestogo = None;
    let mut nodes = None;
    let mut movetime = None;
    let mut infinite = false;

    let mut i = 1;
    while i < parts.len() {
        match parts[i] {
            "depth" if i + 1 < parts.len() => depth = parts[i + 1].parse().ok(),
            "wtime" if i + 1 < parts.len() => wtime = parse_millis(parts[i + 1]),
            "btime" if i + 1 < parts.len() => btime = parse_millis(parts[i + 1]),
            "winc" if i + 1 < parts.len() => winc = parse_millis(parts[i + 1]),
            "binc" if i + 1 < parts.len() => binc = parse_millis(parts[i + 1]),
            "movestogo" if i + 1 < parts.len() => movestogo = parts[i + 1].parse().ok(),
            "nodes" if i + 1 < parts.len() => nodes = parts[i + 1].parse().ok(),
            "movetime" if i + 1 < parts.len() => movetime = parse_millis(parts[i + 1]),
            "infinite" => infinite = true,
            _ => {},
        }
        i += if parts[i] == "infinite" { 1 } else { 2 };
    }

    Command::Go { depth, wtime, btime, winc, binc, movestogo, nodes, movetime, infinite }
}

fn parse_setoption(parts: &[&str]) -> Command {
    if parts.len() > 3 && parts[1] == "name" {
        let name_end = parts.iter().position(|&token| token == "value").unwrap_or(parts.len());
        let option = match parts[2..name_end].join(" ").as_str() {
            "Hash" => EngineOption::Hash,
            "Threads" => EngineOption::Threads,
            "SyzygyTablebase" => EngineOption::SyzygyTablebase,
            _ => return Command::Unknown(parts.join(" ")),
        };
        let value = if name_end < parts.len() {
            match option {
                EngineOption::Hash | EngineOption::Threads => {
                    parts[name_end + 1].parse::<usize>().ok().map(OptionValue::Integer)
                },
                EngineOption::SyzygyTablebase => {
                    Some(OptionValue::String(parts[name_end + 1..].join(" ")))
                },
            }
        } else {
            None
        };
        value.map_or_else(|| Command::Unknown(parts.join(" ")), |value| Command::SetOption { option, value })
    } else {
        Command::Unknown(parts.join(" "))
    }
}

fn parse_setposition(parts: &[&str]) -> Command {
    let fen_index = parts.iter().position(|&token| token == "fen");
    let moves_index = parts.iter().position(|&token| token == "moves");
    let fen = fen_index.map(|index| parts[index + 1..moves_index.unwrap_or(parts.len())].join(" "));
    let moves = moves_index
        .map(|index| parts[index + 1..].iter().map(|token| (*token).to_string()).collect())
        .unwrap_or_default();
    Command::SetPosition { fen, moves }
}

impl Command {
    pub(super) fn parse(input: &str) -> Self {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let Some(&keyword) = parts.first() else { return Command::Unknown(input.to_string()) };

        match keyword {
            "uci" => Command::Uci,
            "debug" if parts.len() > 1 => Command::Debug { on: parts[1] == "on" },
            "isready" => Command::IsReady,
            "setoption" => parse_setoption(&parts),
            "position" => parse_setposition(&parts),
            "ucinewgame" => Command::NewGame,
            "go" => parse_go(&parts),
            "stop" => Command::Stop,
            "quit" => Command::Quit,
            _ => Command::Unknown(input.to_string()),
        }
    }
}
