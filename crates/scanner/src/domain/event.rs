#![forbid(unsafe_code)]

use crate::domain::{Attr, Pid};
use serde::{Serialize, Serializer};
use std::fmt;

/// Rendered in place of a command line that could not be read.
pub const UNKNOWN_CMD: &str = "???";

/// Rendered in place of a numeric id that could not be determined.
pub const UNKNOWN_ID: i64 = -1;

/// A process that appeared since the previous scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEvent {
    pub pid: Pid,
    pub uid: Attr<u32>,
    pub ppid: Attr<Pid>,
    pub cmd: Attr<String>,
}

impl ProcessEvent {
    pub fn uid_or_sentinel(&self) -> i64 {
        self.uid.present().map_or(UNKNOWN_ID, |uid| i64::from(*uid))
    }

    pub fn ppid_or_sentinel(&self) -> i64 {
        self.ppid.present().map_or(UNKNOWN_ID, |ppid| i64::from(*ppid))
    }

    /// The trimmed command line, or [`UNKNOWN_CMD`].
    pub fn cmd_or_sentinel(&self) -> &str {
        self.cmd.present().map_or(UNKNOWN_CMD, |cmd| cmd.trim())
    }
}

impl fmt::Display for ProcessEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let uid = match self.uid.present() {
            Some(uid) => uid.to_string(),
            None => "???".to_string(),
        };
        write!(f, "UID={uid:<5} PID={:<6} ", self.pid)?;
        if let Some(ppid) = self.ppid.present() {
            write!(f, "PPID={ppid:<6} ")?;
        }
        write!(f, "CMD={}", self.cmd_or_sentinel())
    }
}

#[derive(Serialize)]
struct FlatEvent<'a> {
    uid: i64,
    pid: Pid,
    ppid: i64,
    cmd: &'a str,
}

impl Serialize for ProcessEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        FlatEvent {
            uid: self.uid_or_sentinel(),
            pid: self.pid,
            ppid: self.ppid_or_sentinel(),
            cmd: self.cmd_or_sentinel(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AttrError;
    use std::io::ErrorKind;

    fn vanished() -> AttrError {
        AttrError::Vanished(ErrorKind::NotFound)
    }

    #[test]
    fn renders_with_parent() {
        let event = ProcessEvent {
            pid: 4242,
            uid: Attr::Present(1000),
            ppid: Attr::Present(1),
            cmd: Attr::Present("/bin/sleep 10 ".into()),
        };
        assert_eq!(
            event.to_string(),
            "UID=1000  PID=4242   PPID=1      CMD=/bin/sleep 10"
        );
    }

    #[test]
    fn renders_without_parent_when_disabled() {
        let event = ProcessEvent {
            pid: 7,
            uid: Attr::Present(0),
            ppid: Attr::Disabled,
            cmd: Attr::Present("init".into()),
        };
        assert_eq!(event.to_string(), "UID=0     PID=7      CMD=init");
    }

    #[test]
    fn renders_sentinels_for_vanished_process() {
        let event = ProcessEvent {
            pid: 4242,
            uid: Attr::Failed(vanished()),
            ppid: Attr::Failed(vanished()),
            cmd: Attr::Failed(vanished()),
        };
        assert_eq!(event.to_string(), "UID=???   PID=4242   CMD=???");
        assert_eq!(event.uid_or_sentinel(), -1);
        assert_eq!(event.ppid_or_sentinel(), -1);
        assert_eq!(event.cmd_or_sentinel(), "???");
    }

    #[test]
    fn serializes_flat_record() {
        let event = ProcessEvent {
            pid: 4242,
            uid: Attr::Present(1000),
            ppid: Attr::Disabled,
            cmd: Attr::Present(" /bin/true ".into()),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"uid": 1000, "pid": 4242, "ppid": -1, "cmd": "/bin/true"})
        );
    }
}
