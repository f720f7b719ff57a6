#![forbid(unsafe_code)]

use crate::domain::Pid;
use crate::error::Error;
use crate::source::{ProcFile, ProcSource, read_bounded};
use nix::sys::stat::lstat;
use nix::unistd::{Uid, User};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::trace;

/// [`ProcSource`] backed by a mounted proc filesystem.
#[derive(Debug, Clone)]
pub struct LinuxProcSource {
    root: PathBuf,
}

impl Default for LinuxProcSource {
    fn default() -> Self {
        Self::new("/proc")
    }
}

impl LinuxProcSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn process_dir(&self, pid: Pid) -> PathBuf {
        self.root.join(pid.to_string())
    }
}

impl ProcSource for LinuxProcSource {
    fn pids(&self) -> Result<Vec<Pid>, Error> {
        let entries = fs::read_dir(&self.root).map_err(|err| Error::Enumerate {
            root: self.root.clone(),
            source: err.into(),
        })?;

        // Only directory names are needed, so nothing below them is opened.
        let mut pids = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    trace!(?err, "skipping directory entry");
                    continue;
                }
            };
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !name.bytes().all(|b| b.is_ascii_digit()) {
                continue;
            }
            match name.parse::<Pid>() {
                Ok(pid) => pids.push(pid),
                Err(err) => trace!(name, ?err, "skipping process entry"),
            }
        }
        Ok(pids)
    }

    fn read(&self, pid: Pid, file: ProcFile, limit: usize) -> io::Result<Vec<u8>> {
        read_bounded(self.process_dir(pid).join(file.file_name()), limit)
    }

    fn owner(&self, pid: Pid) -> io::Result<u32> {
        let stat = lstat(self.process_dir(pid).as_path()).map_err(io::Error::from)?;
        Ok(stat.st_uid)
    }

    fn username(&self, uid: u32) -> Option<String> {
        match User::from_uid(Uid::from_raw(uid)) {
            Ok(user) => user.map(|user| user.name),
            Err(err) => {
                trace!(uid, ?err, "user lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reads_files_below_root() {
        let dir = tempdir().unwrap();
        let proc_dir = dir.path().join("4242");
        std::fs::create_dir(&proc_dir).unwrap();
        std::fs::write(proc_dir.join("cmdline"), b"/bin/sleep\x0010\x00").unwrap();

        let source = LinuxProcSource::new(dir.path());
        let cmdline = source.read(4242, ProcFile::Cmdline, 64).unwrap();
        assert_eq!(cmdline, b"/bin/sleep\x0010\x00");
        let truncated = source.read(4242, ProcFile::Cmdline, 4).unwrap();
        assert_eq!(truncated, b"/bin");
    }

    #[test]
    fn owner_matches_directory_owner() {
        use std::os::unix::fs::MetadataExt;

        let dir = tempdir().unwrap();
        let proc_dir = dir.path().join("17");
        std::fs::create_dir(&proc_dir).unwrap();
        let expected = std::fs::metadata(&proc_dir).unwrap().uid();

        let source = LinuxProcSource::new(dir.path());
        assert_eq!(source.owner(17).unwrap(), expected);
        assert_eq!(
            source.owner(18).unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn missing_file_reports_vanished_process() {
        let dir = tempdir().unwrap();
        let source = LinuxProcSource::new(dir.path());
        let err = source.read(1, ProcFile::Stat, 512).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn enumerates_numeric_entries_only() {
        let dir = tempdir().unwrap();
        for name in ["1", "42", "self", "sys", "7x"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }
        std::fs::write(dir.path().join("uptime"), b"1.0 1.0\n").unwrap();

        let source = LinuxProcSource::new(dir.path());
        let mut pids = source.pids().unwrap();
        pids.sort_unstable();
        assert_eq!(pids, vec![1, 42]);
    }

    #[test]
    fn missing_root_fails_enumeration() {
        let dir = tempdir().unwrap();
        let source = LinuxProcSource::new(dir.path().join("absent"));
        assert!(matches!(source.pids(), Err(Error::Enumerate { .. })));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn enumerates_own_process() {
        let source = LinuxProcSource::default();
        let pids = source.pids().unwrap();
        assert!(pids.contains(&std::process::id()));
    }
}
