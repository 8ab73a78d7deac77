//! Reorganize (compaction)
//!
//! Rebuilds an unordered file from its live records only, packed densely at
//! block tails in storage order. Tombstoned spans and emptied blocks are
//! dropped. The new chain is built aside and swapped in at the end.

use crate::error::Result;

use super::insert::Placement;
use super::SequentialFile;

/// Outcome of one reorganize pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReorganizeStats {
    /// Live records carried over
    pub records: usize,
    /// Tombstoned records dropped
    pub tombstones_dropped: usize,
    pub blocks_before: usize,
    pub blocks_after: usize,
    pub used_bytes_before: usize,
    pub used_bytes_after: usize,
}

impl SequentialFile {
    /// Repack live records and reclaim tombstoned space
    ///
    /// No-op for ordered files. Running it twice yields the same blocks.
    pub fn reorganize(&mut self) -> Result<ReorganizeStats> {
        let before = self.stats();

        if self.config.ordered {
            tracing::debug!("reorganize skipped for ordered file");
            return Ok(ReorganizeStats {
                records: before.live_records,
                tombstones_dropped: 0,
                blocks_before: before.blocks,
                blocks_after: before.blocks,
                used_bytes_before: before.used_bytes,
                used_bytes_after: before.used_bytes,
            });
        }

        let mut packed = SequentialFile::empty(self.config);
        for record in self.records() {
            packed.place(record.id, &record.payload, Placement::Tail)?;
        }
        std::mem::swap(&mut self.head, &mut packed.head);

        let after = self.stats();
        let stats = ReorganizeStats {
            records: after.live_records,
            tombstones_dropped: before.tombstones,
            blocks_before: before.blocks,
            blocks_after: after.blocks,
            used_bytes_before: before.used_bytes,
            used_bytes_after: after.used_bytes,
        };

        tracing::info!(
            records = stats.records,
            tombstones_dropped = stats.tombstones_dropped,
            blocks_before = stats.blocks_before,
            blocks_after = stats.blocks_after,
            reclaimed = stats.used_bytes_before.saturating_sub(stats.used_bytes_after),
            "reorganized file"
        );

        Ok(stats)
    }
}
