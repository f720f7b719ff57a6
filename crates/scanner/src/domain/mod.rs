#![forbid(unsafe_code)]

mod attr;
mod event;

pub use attr::{Attr, AttrError};
pub use event::{ProcessEvent, UNKNOWN_CMD, UNKNOWN_ID};

/// Process identifier as listed under `/proc`.
pub type Pid = u32;
