#![forbid(unsafe_code)]

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Read at most `limit` bytes from `path`.
///
/// Hitting end of file early is not an error; the returned buffer is simply
/// shorter than `limit`. Any other failure (the file vanished, permission
/// denied) is returned to the caller.
pub fn read_bounded(path: impl AsRef<Path>, limit: usize) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut buffer = Vec::with_capacity(limit.min(4096));
    file.take(limit as u64).read_to_end(&mut buffer)?;
    Ok(buffer)
}
