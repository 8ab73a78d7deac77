//! Sequential File Module
//!
//! Owns the block chain and implements the record operations.
//!
//! ## Responsibilities
//! - Allocate blocks lazily as records stop fitting
//! - Insert, search, range search, update and delete records
//! - Reorganize the chain to reclaim tombstoned space
//! - Tear the chain down one block at a time
//!
//! ## Organization
//! ```text
//!   head
//!    │
//!    ▼
//! ┌───────┐ next ┌───────┐ next ┌───────┐
//! │ Block │─────▶│ Block │─────▶│ Block │───▶ None
//! └───────┘      └───────┘      └───────┘
//! ```

mod cursor;
mod insert;
mod modify;
mod reorganize;
mod search;

pub use cursor::{RangeIter, Records};
pub use reorganize::ReorganizeStats;

use crate::block::{Block, Blocks};
use crate::config::FileConfig;
use crate::error::{Result, SeqFileError};

use cursor::{Cursor, Located};

/// A sequential file: a fixed organization plus a chain of blocks
pub struct SequentialFile {
    /// Organization, fixed at creation
    config: FileConfig,

    /// First block of the chain
    head: Option<Box<Block>>,

    /// Largest live id, kept for ordered files so inserts need no scan
    last_live: Option<i32>,
}

/// Space and record counts across the whole chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileStats {
    pub blocks: usize,
    pub capacity_bytes: usize,
    pub used_bytes: usize,
    pub free_bytes: usize,
    pub live_records: usize,
    pub tombstones: usize,
}

impl SequentialFile {
    /// Create an empty file with the given organization
    pub fn create(config: FileConfig) -> Result<Self> {
        config.validate()?;

        tracing::debug!(
            block_capacity = config.block_capacity,
            contiguous = config.contiguous,
            ordered = config.ordered,
            fixed_length = config.is_fixed_length(),
            allow_overlap = config.allow_overlap,
            "created sequential file"
        );

        Ok(Self::empty(config))
    }

    /// Link persisted blocks into a file, checking every span decodes
    pub(crate) fn from_blocks(config: FileConfig, blocks: Vec<Block>) -> Result<Self> {
        config.validate()?;

        if let Some(block) = blocks.iter().find(|b| b.capacity() != config.block_capacity) {
            return Err(SeqFileError::Corrupted(format!(
                "block capacity {} differs from file block capacity {}",
                block.capacity(),
                config.block_capacity
            )));
        }

        let mut head = None;
        for mut block in blocks.into_iter().rev() {
            block.next = head;
            head = Some(Box::new(block));
        }

        let mut file = Self {
            config,
            head,
            last_live: None,
        };
        file.last_live = file.validate()?;
        Ok(file)
    }

    /// An empty chain with the given organization, unchecked
    pub(crate) fn empty(config: FileConfig) -> Self {
        Self {
            config,
            head: None,
            last_live: None,
        }
    }

    /// Get the file organization
    pub fn config(&self) -> &FileConfig {
        &self.config
    }

    /// Iterate blocks in chain order
    pub fn blocks(&self) -> Blocks<'_> {
        Blocks::new(self.head.as_deref())
    }

    /// Number of blocks in the chain
    pub fn block_count(&self) -> usize {
        self.blocks().count()
    }

    /// True when no live record is stored
    pub fn is_empty(&self) -> bool {
        self.records().next().is_none()
    }

    /// Gather space and record counts
    pub fn stats(&self) -> FileStats {
        let mut stats = FileStats::default();

        for block in self.blocks() {
            stats.blocks += 1;
            stats.capacity_bytes += block.capacity();
            stats.used_bytes += block.used();
            stats.free_bytes += block.free_bytes();
        }

        for entry in self.entries() {
            if entry.is_tombstone() {
                stats.tombstones += 1;
            } else {
                stats.live_records += 1;
            }
        }

        stats
    }

    /// Release every block, leaving an empty file with the same organization
    pub fn clear(&mut self) {
        let mut current = self.head.take();
        while let Some(mut block) = current {
            current = block.next.take();
        }
        self.last_live = None;
    }

    /// Walk every span in the chain and fail on the first malformed one
    ///
    /// Ordered files must also keep live ids non-decreasing. Returns the
    /// last live id seen.
    pub(crate) fn validate(&self) -> Result<Option<i32>> {
        let mut last = None;

        for entry in self.cursor() {
            let entry = entry?;
            if entry.is_tombstone() {
                continue;
            }

            if let Some(prev) = last {
                if self.config.ordered && entry.id < prev {
                    return Err(SeqFileError::Corrupted(format!(
                        "ordered file holds id {} after {}",
                        entry.id, prev
                    )));
                }
            }
            last = Some(entry.id);
        }

        Ok(last)
    }

    // =========================================================================
    // Chain Helpers
    // =========================================================================

    pub(crate) fn cursor(&self) -> Cursor<'_> {
        Cursor::new(self.config.format, self.head.as_deref())
    }

    /// Logical entries (tombstones included), stopping at a malformed span
    pub(crate) fn entries(&self) -> impl Iterator<Item = Located<'_>> + '_ {
        self.cursor().map_while(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::error!(error = %e, "stopping scan at malformed span");
                None
            }
        })
    }

    /// Mutable access to the block at `index` in chain order
    pub(crate) fn block_mut(&mut self, index: usize) -> Result<&mut Block> {
        let mut current = self.head.as_deref_mut();
        for _ in 0..index {
            current = current.and_then(|block| block.next.as_deref_mut());
        }
        current.ok_or_else(|| {
            SeqFileError::Corrupted(format!("block {} is not in the chain", index))
        })
    }

    /// Allocate a block and link it at the end of the chain
    pub(crate) fn push_block(&mut self) -> Result<&mut Block> {
        let block = Box::new(Block::new(self.config.block_capacity));
        let count = self.block_count();

        tracing::trace!(index = count, capacity = self.config.block_capacity, "allocating block");

        let link = if count == 0 {
            &mut self.head
        } else {
            &mut self.block_mut(count - 1)?.next
        };
        Ok(&mut **link.insert(block))
    }
}

impl Drop for SequentialFile {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for SequentialFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequentialFile")
            .field("config", &self.config)
            .field("blocks", &self.block_count())
            .finish()
    }
}
