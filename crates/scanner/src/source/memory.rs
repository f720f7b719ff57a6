#![forbid(unsafe_code)]

use crate::domain::Pid;
use crate::error::Error;
use crate::source::{ProcFile, ProcSource};
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

/// One entry of a [`MemorySource`] process table.
///
/// Attributes left as `None` behave as if the process exited before they
/// could be read.
#[derive(Debug, Clone, Default)]
pub struct MemoryProcess {
    pub uid: Option<u32>,
    pub stat: Option<Vec<u8>>,
    pub cmdline: Option<Vec<u8>>,
    pub cgroup: Option<Vec<u8>>,
}

impl MemoryProcess {
    /// A well-formed live process.
    pub fn new(pid: Pid, ppid: Pid, uid: u32, argv: &[&str]) -> Self {
        let comm = argv
            .first()
            .and_then(|arg0| arg0.rsplit('/').next())
            .unwrap_or_default();
        let mut cmdline = Vec::new();
        for arg in argv {
            cmdline.extend_from_slice(arg.as_bytes());
            cmdline.push(0);
        }
        Self {
            uid: Some(uid),
            stat: Some(format!("{pid} ({comm}) S {ppid} {pid} {pid} 0 -1").into_bytes()),
            cmdline: Some(cmdline),
            cgroup: Some(b"0::/user.slice\n".to_vec()),
        }
    }

    /// A process that is listed but whose files are all gone.
    pub fn vanished() -> Self {
        Self::default()
    }

    pub fn with_cgroup(mut self, cgroup: &str) -> Self {
        self.cgroup = Some(cgroup.as_bytes().to_vec());
        self
    }

    pub fn with_stat(mut self, stat: &[u8]) -> Self {
        self.stat = Some(stat.to_vec());
        self
    }

    pub fn with_cmdline(mut self, cmdline: Option<&[u8]>) -> Self {
        self.cmdline = cmdline.map(<[u8]>::to_vec);
        self
    }

    fn file(&self, file: ProcFile) -> Option<&[u8]> {
        match file {
            ProcFile::Cgroup => self.cgroup.as_deref(),
            ProcFile::Stat => self.stat.as_deref(),
            ProcFile::Cmdline => self.cmdline.as_deref(),
        }
    }
}

#[derive(Debug, Default)]
struct Table {
    processes: BTreeMap<Pid, MemoryProcess>,
    users: HashMap<u32, String>,
    enumeration_fails: bool,
}

/// In-memory [`ProcSource`]. Clones share the same process table, so a
/// handle kept outside a scanner can spawn and kill processes between scans.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    table: Arc<Mutex<Table>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&self, pid: Pid, process: MemoryProcess) {
        self.lock().processes.insert(pid, process);
    }

    pub fn kill(&self, pid: Pid) {
        self.lock().processes.remove(&pid);
    }

    pub fn add_user(&self, uid: u32, name: &str) {
        self.lock().users.insert(uid, name.to_owned());
    }

    /// Make [`ProcSource::pids`] fail until reset.
    pub fn set_enumeration_fails(&self, fails: bool) {
        self.lock().enumeration_fails = fails;
    }

    fn lock(&self) -> MutexGuard<'_, Table> {
        // a panicking test must not cascade into unrelated assertions
        self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn not_found() -> io::Error {
    io::Error::from(io::ErrorKind::NotFound)
}

impl ProcSource for MemorySource {
    fn pids(&self) -> Result<Vec<Pid>, Error> {
        let table = self.lock();
        if table.enumeration_fails {
            return Err(Error::Enumerate {
                root: PathBuf::from("memory"),
                source: procfs::ProcError::NotFound(None),
            });
        }
        Ok(table.processes.keys().copied().collect())
    }

    fn read(&self, pid: Pid, file: ProcFile, limit: usize) -> io::Result<Vec<u8>> {
        let table = self.lock();
        let contents = table
            .processes
            .get(&pid)
            .and_then(|process| process.file(file))
            .ok_or_else(not_found)?;
        Ok(contents[..contents.len().min(limit)].to_vec())
    }

    fn owner(&self, pid: Pid) -> io::Result<u32> {
        self.lock()
            .processes
            .get(&pid)
            .and_then(|process| process.uid)
            .ok_or_else(not_found)
    }

    fn username(&self, uid: u32) -> Option<String> {
        self.lock().users.get(&uid).cloned()
    }
}
