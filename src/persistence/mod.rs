//! Persistence Module
//!
//! Flat binary snapshots of a sequential file.
//!
//! ## Responsibilities
//! - Dump the organization and every block's used prefix
//! - Rebuild an equivalent file, validating it before handing it out
//! - Remove snapshot files
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ Header (20 bytes, little-endian i32 each)                   │
//! │   BlockCapacity | Contiguous | Ordered | FixedLength |      │
//! │   AllowOverlap                                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │ Block (repeated in chain order, until end of file)          │
//! │   [UsedByteCount: i32][UsedByteCount raw bytes]             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - FixedLength is 0 for variable-length files, otherwise the fixed
//!   payload size of every slot.
//! - There is no block count and no terminator: a clean end of file where
//!   the next UsedByteCount would start ends the chain.

mod reader;
mod writer;

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::file::SequentialFile;

pub use reader::{load, read_file};
pub use writer::{save, write_file};

/// Header size: five i32 fields = 20 bytes
pub const FILE_HEADER_SIZE: usize = 20;

/// Size of the used-byte count before each block
pub const BLOCK_LENGTH_SIZE: usize = 4;

/// Delete a snapshot file from disk
pub fn remove(path: &Path) -> Result<()> {
    fs::remove_file(path)?;
    tracing::info!(path = %path.display(), "removed snapshot");
    Ok(())
}

impl SequentialFile {
    /// Write a snapshot of this file to `path`
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save(self, path.as_ref())
    }

    /// Load a file from a snapshot
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load(path.as_ref())
    }

    /// Replace this file with the one stored at `path`
    ///
    /// The current chain is only released after the snapshot has been read
    /// and validated; on error `self` is unchanged.
    pub fn reload(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let loaded = load(path.as_ref())?;
        *self = loaded;
        Ok(())
    }
}
