use scanner::ProcessEvent;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

pub fn write_event(out: &mut impl Write, event: &ProcessEvent, format: Format) -> io::Result<()> {
    match format {
        Format::Text => writeln!(out, "{event}")?,
        Format::Json => {
            serde_json::to_writer(&mut *out, event)?;
            writeln!(out)?;
        }
    }
    out.flush()
}
