//! Pure chunk planning.
//!
//! A chunk plan is fully determined by `(size, chunk_size)`, so resuming a
//! task never depends on chunk objects surviving a restart; only the index
//! and sizes matter.

use crate::DEFAULT_CHUNK_SIZE;

/// A contiguous byte range of a file, the unit of network transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpan {
    /// 0-based position in the chunk sequence.
    pub index: u32,
    /// Byte offset within the file.
    pub offset: u64,
    /// Length in bytes. Equal to the chunk size except possibly the last.
    pub len: u64,
}

impl ChunkSpan {
    /// Exclusive end offset of this span.
    pub fn end(&self) -> u64 {
        self.offset + self.len
    }
}

/// Number of chunks a file of `size` bytes splits into: `ceil(size / chunk_size)`.
pub fn chunk_count(size: u64, chunk_size: u64) -> u32 {
    let chunk_size = effective(chunk_size);
    size.div_ceil(chunk_size) as u32
}

/// Splits `size` bytes into ordered spans of `chunk_size` bytes each,
/// the last span possibly shorter. A `chunk_size` of 0 falls back to
/// [`DEFAULT_CHUNK_SIZE`].
pub fn chunk_spans(size: u64, chunk_size: u64) -> Vec<ChunkSpan> {
    let chunk_size = effective(chunk_size);
    let count = size.div_ceil(chunk_size);
    (0..count)
        .map(|i| {
            let offset = i * chunk_size;
            ChunkSpan {
                index: i as u32,
                offset,
                len: chunk_size.min(size - offset),
            }
        })
        .collect()
}

fn effective(chunk_size: u64) -> u64 {
    if chunk_size == 0 {
        DEFAULT_CHUNK_SIZE
    } else {
        chunk_size
    }
}
