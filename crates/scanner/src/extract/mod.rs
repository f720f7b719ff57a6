#![forbid(unsafe_code)]

mod stat;

pub use stat::{StatError, parse_ppid};

use crate::domain::{Attr, AttrError, Pid};
use crate::source::{ProcFile, ProcSource};
use config::Scan;

/// Bytes read from `/proc/<pid>/stat`; `ppid` is well within the first line.
pub const STAT_READ_LIMIT: usize = 512;

/// Reads the attributes reported for a newly seen process.
#[derive(Debug, Clone)]
pub struct Extractor {
    ppid: bool,
    max_cmd_length: usize,
}

impl Extractor {
    pub fn new(scan: &Scan) -> Self {
        Self {
            ppid: scan.ppid,
            max_cmd_length: scan.max_cmd_length,
        }
    }

    pub fn owner(&self, source: &dyn ProcSource, pid: Pid) -> Attr<u32> {
        source.owner(pid).into()
    }

    pub fn parent(&self, source: &dyn ProcSource, pid: Pid) -> Attr<Pid> {
        if !self.ppid {
            return Attr::Disabled;
        }
        let record = match source.read(pid, ProcFile::Stat, STAT_READ_LIMIT) {
            Ok(record) => record,
            Err(err) => return Attr::Failed(err.into()),
        };
        parse_ppid(&record).map_err(AttrError::from).into()
    }

    /// The command line with argument separators turned into spaces.
    /// Not trimmed.
    pub fn command(&self, source: &dyn ProcSource, pid: Pid) -> Attr<String> {
        source
            .read(pid, ProcFile::Cmdline, self.max_cmd_length)
            .map(normalize_cmdline)
            .into()
    }
}

/// Replace every NUL separator with a single space.
///
/// A character cut in half by the read limit is dropped. Other invalid
/// UTF-8 sequences are replaced with U+FFFD.
pub fn normalize_cmdline(mut raw: Vec<u8>) -> String {
    for byte in raw.iter_mut().filter(|b| **b == 0) {
        *byte = b' ';
    }
    match String::from_utf8(raw) {
        Ok(cmd) => cmd,
        Err(err) => {
            let utf8 = err.utf8_error();
            let mut raw = err.into_bytes();
            if utf8.error_len().is_none() {
                raw.truncate(utf8.valid_up_to());
            }
            String::from_utf8_lossy(&raw).into_owned()
        }
    }
}
