//! Deterministic gzip.

use std::io::Write;

use flate2::{Compression, GzBuilder};

use super::error::{PackError, Result};

/// Compress at the best level with a fixed header (mtime 0, no file name),
/// so identical input always yields identical bytes.
pub fn gzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzBuilder::new()
        .mtime(0)
        .write(Vec::with_capacity(data.len() / 3), Compression::best());
    encoder.write_all(data).map_err(PackError::Compress)?;
    encoder.finish().map_err(PackError::Compress)
}
