#![forbid(unsafe_code)]

use crate::domain::{Attr, Pid};
use crate::source::{ProcFile, ProcSource};
use config::Scan;
use std::collections::HashSet;

/// Bytes read from `/proc/<pid>/cgroup`.
pub const CGROUP_READ_LIMIT: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuppressReason {
    Cgroup,
    User(String),
    Command(String),
    /// The command line is unreadable or empty.
    IncompleteCommand,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict<T> {
    Emit(T),
    Suppress(SuppressReason),
}

/// Exclusion filters. Each one is disabled while its configuration is
/// empty; an enabled filter can only ever suppress.
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    cgroup: Option<String>,
    users: HashSet<String>,
    commands: Vec<String>,
}

impl FilterChain {
    pub fn new(scan: &Scan) -> Self {
        Self {
            cgroup: (!scan.cgroup_exclude.is_empty()).then(|| scan.cgroup_exclude.clone()),
            users: scan
                .user_exclude
                .iter()
                .filter(|user| !user.is_empty())
                .cloned()
                .collect(),
            commands: scan
                .cmd_exclude
                .iter()
                .filter(|cmd| !cmd.is_empty())
                .cloned()
                .collect(),
        }
    }

    /// Suppress processes whose cgroup membership mentions the excluded
    /// cgroup. An unreadable cgroup file never suppresses.
    pub fn check_cgroup(&self, source: &dyn ProcSource, pid: Pid) -> Option<SuppressReason> {
        let needle = self.cgroup.as_deref()?;
        let cgroup = source.read(pid, ProcFile::Cgroup, CGROUP_READ_LIMIT).ok()?;
        String::from_utf8_lossy(&cgroup)
            .contains(needle)
            .then_some(SuppressReason::Cgroup)
    }

    /// Suppress processes owned by an excluded user. Unknown owners and
    /// failed name lookups never suppress.
    pub fn check_user(&self, source: &dyn ProcSource, uid: &Attr<u32>) -> Option<SuppressReason> {
        if self.users.is_empty() {
            return None;
        }
        let name = source.username(*uid.present()?)?;
        self.users
            .contains(&name)
            .then_some(SuppressReason::User(name))
    }

    /// Suppress commands containing an excluded substring. While this filter
    /// is enabled, unreadable and empty commands are suppressed too.
    pub fn check_command(&self, cmd: &Attr<String>) -> Option<SuppressReason> {
        if self.commands.is_empty() {
            return None;
        }
        let cmd = match cmd.present().map(|cmd| cmd.trim()) {
            Some(cmd) if !cmd.is_empty() => cmd,
            _ => return Some(SuppressReason::IncompleteCommand),
        };
        self.commands
            .iter()
            .find(|needle| cmd.contains(needle.as_str()))
            .map(|needle| SuppressReason::Command(needle.clone()))
    }
}
