#![forbid(unsafe_code)]

mod bounded;
mod linux;
mod memory;

pub use bounded::read_bounded;
pub use linux::LinuxProcSource;
pub use memory::{MemoryProcess, MemorySource};

use crate::domain::Pid;
use crate::error::Error;
use std::io;

/// Per-process pseudo-files the scanner reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcFile {
    Cgroup,
    Stat,
    Cmdline,
}

impl ProcFile {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Cgroup => "cgroup",
            Self::Stat => "stat",
            Self::Cmdline => "cmdline",
        }
    }
}

/// Access to the process table and per-process metadata.
///
/// Every per-process operation may fail because the process exited after
/// it was enumerated. Only [`ProcSource::pids`] failing is fatal to a scan.
pub trait ProcSource: Send + Sync {
    /// List the ids of all live processes.
    fn pids(&self) -> Result<Vec<Pid>, Error>;
    /// Read at most `limit` bytes of one pseudo-file of `pid`.
    fn read(&self, pid: Pid, file: ProcFile, limit: usize) -> io::Result<Vec<u8>>;
    /// Owning user id of `pid`.
    fn owner(&self, pid: Pid) -> io::Result<u32>;
    /// Resolve a user id to a user name.
    fn username(&self, uid: u32) -> Option<String>;
}
