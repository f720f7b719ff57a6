use crate::Error;
use serde::{Deserialize, Serialize};

/// Default number of bytes read from `/proc/<pid>/cmdline`.
pub const DEFAULT_MAX_CMD_LENGTH: usize = 2048;

/// Default capacity of the event channel handed to consumers.
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Scan {
    /// Whether the parent pid of every new process should be resolved.
    ///
    /// This costs one extra read of `/proc/<pid>/stat` per process. When
    /// disabled, events carry no parent and the `PPID=` segment is omitted
    /// from the rendered line.
    pub ppid: bool,

    /// Maximum number of bytes read from the command buffer of a process.
    /// Longer command lines are truncated. Must be greater than zero.
    pub max_cmd_length: usize,

    /// Processes whose cgroup membership contains this substring are not
    /// reported. Empty string disables the filter.
    pub cgroup_exclude: String,

    /// Processes owned by one of these users are not reported.
    pub user_exclude: Vec<String>,

    /// Processes whose command line contains one of these substrings are not
    /// reported.
    ///
    /// # Note
    ///
    /// While this list is non-empty, processes whose command line could not
    /// be read (or is empty) are dropped as well. Those are almost always
    /// processes that exited before they could be inspected.
    pub cmd_exclude: Vec<String>,

    /// Whether the processes already running when the scanner starts are
    /// reported by the first scan. If false, the first scan only records
    /// them and nothing is emitted.
    pub report_existing: bool,

    /// Capacity of the event channel. A full channel pauses scanning until
    /// the consumer catches up.
    pub event_capacity: usize,
}

impl Default for Scan {
    fn default() -> Self {
        Self {
            ppid: false,
            max_cmd_length: DEFAULT_MAX_CMD_LENGTH,
            cgroup_exclude: String::new(),
            user_exclude: Vec::new(),
            cmd_exclude: Vec::new(),
            report_existing: true,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl Scan {
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_cmd_length == 0 {
            return Err(Error::Invalid(
                "scan.max_cmd_length must be greater than zero".into(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(Error::Invalid(
                "scan.event_capacity must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
