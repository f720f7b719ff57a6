#![forbid(unsafe_code)]

pub mod domain;
pub mod engine;
pub mod error;
pub mod extract;
pub mod filter;
pub mod index;
pub mod source;
pub mod trigger;

pub use domain::{Attr, AttrError, Pid, ProcessEvent};
pub use engine::{ScanReport, Scanner, ScannerHandle};
pub use error::Error;
pub use extract::{Extractor, StatError};
pub use filter::{FilterChain, SuppressReason, Verdict};
pub use index::{Diff, ProcessIndex};
pub use source::{LinuxProcSource, MemoryProcess, MemorySource, ProcFile, ProcSource};
pub use trigger::TriggerHandle;
