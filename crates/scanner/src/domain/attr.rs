#![forbid(unsafe_code)]

use crate::extract::StatError;
use std::io;

/// Outcome of extracting one attribute of a process.
///
/// Extraction races against the process exiting, so every attribute can be
/// missing independently of the others. Sentinels (`-1`, `???`) are only
/// produced when an event is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attr<T> {
    Present(T),
    /// Extraction was not requested.
    Disabled,
    Failed(AttrError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AttrError {
    /// The pseudo-file could not be read, most likely because the process
    /// is already gone.
    #[error("process vanished ({0})")]
    Vanished(io::ErrorKind),

    #[error("corrupt stat record: {0}")]
    Corrupt(#[from] StatError),
}

impl From<io::Error> for AttrError {
    fn from(err: io::Error) -> Self {
        Self::Vanished(err.kind())
    }
}

impl<T> Attr<T> {
    pub fn present(&self) -> Option<&T> {
        match self {
            Self::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }
}

impl<T, E: Into<AttrError>> From<Result<T, E>> for Attr<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Present(value),
            Err(err) => Self::Failed(err.into()),
        }
    }
}
