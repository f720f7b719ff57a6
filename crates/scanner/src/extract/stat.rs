#![forbid(unsafe_code)]

use crate::domain::Pid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StatError {
    #[error("missing parenthesized command name")]
    MissingComm,
    #[error("malformed pid field")]
    BadPid,
    #[error("malformed state field")]
    BadState,
    #[error("missing ppid field")]
    MissingPpid,
    #[error("malformed ppid field")]
    BadPpid,
}

/// Extract the parent pid from a `/proc/<pid>/stat` record.
///
/// The record reads `pid (comm) state ppid ...`. `comm` is chosen by the
/// process and may contain spaces and parentheses, so the record is split at
/// the *last* closing parenthesis before the remaining fields are tokenized.
pub fn parse_ppid(record: &[u8]) -> Result<Pid, StatError> {
    let open = record
        .iter()
        .position(|&b| b == b'(')
        .ok_or(StatError::MissingComm)?;
    let close = record
        .iter()
        .rposition(|&b| b == b')')
        .filter(|&close| close > open)
        .ok_or(StatError::MissingComm)?;

    let pid = std::str::from_utf8(&record[..open]).map_err(|_| StatError::BadPid)?;
    let pid = pid.trim();
    if pid.is_empty() || !pid.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StatError::BadPid);
    }

    // fields after comm are plain ascii
    let rest = String::from_utf8_lossy(&record[close + 1..]);
    let mut fields = rest.split_ascii_whitespace();

    let state = fields.next().ok_or(StatError::BadState)?;
    let mut state_chars = state.chars();
    match (state_chars.next(), state_chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {}
        _ => return Err(StatError::BadState),
    }

    let ppid = fields.next().ok_or(StatError::MissingPpid)?;
    if !ppid.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StatError::BadPpid);
    }
    ppid.parse().map_err(|_| StatError::BadPpid)
}
