//! Request line parsing.
//!
//! Parsing never fails: anything that does not match a known route, or a
//! `/move` whose parameters do not parse, becomes [`Command::Unrecognized`].

use crate::types::Command;

const MOVE_ROUTE: &str = "/move";
const STOP_ROUTE: &str = "/stop";

impl Command {
    /// Parses the first line of a raw request, e.g. `GET /move?x=10&y=-20 HTTP/1.1`.
    pub fn parse(request: &str) -> Command {
        let line = request.lines().next().unwrap_or_default();
        match line.split_whitespace().nth(1) {
            Some(path) => Command::from_path(path),
            None => Command::Unrecognized,
        }
    }

    pub fn from_path(path: &str) -> Command {
        if path.starts_with(MOVE_ROUTE) {
            parse_move(path).unwrap_or(Command::Unrecognized)
        } else if path.starts_with(STOP_ROUTE) {
            Command::Stop
        } else {
            Command::Unrecognized
        }
    }
}

fn parse_move(path: &str) -> Option<Command> {
    let (_, query) = path.split_once('?')?;
    let x = query_param(query, "x")?;
    let y = query_param(query, "y")?;
    Some(Command::Move { x, y })
}

fn query_param(query: &str, name: &str) -> Option<i32> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .and_then(|(_, value)| value.parse().ok())
}
