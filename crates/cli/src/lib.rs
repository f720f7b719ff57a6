#![forbid(unsafe_code)]

pub mod cli;
pub mod output;
pub mod signals;
