//! Update and delete
//!
//! Both act in place inside the block that holds the record. Nothing ever
//! migrates across a block boundary.

use crate::error::{Result, SeqFileError};
use crate::record::{encode, mark_tombstone, RecordFormat, MAX_PAYLOAD_SIZE};

use super::SequentialFile;

impl SequentialFile {
    /// Replace the payload of the first live record with `id`
    ///
    /// A shrinking record pulls the rest of its block left; a growing one
    /// pushes it right and needs that many free bytes in the same block,
    /// otherwise `InsufficientSpace` is returned and nothing changes.
    pub fn update(&mut self, id: i32, payload: &[u8]) -> Result<()> {
        let (block_index, offset, old_span, split) = {
            let entry = self.locate(id).ok_or(SeqFileError::NotFound(id))?;
            let head = entry.head();
            (head.block, head.offset, head.span, entry.is_split())
        };

        let format = self.config.format;
        let new_span = format.span(payload.len());

        if split || payload.len() > MAX_PAYLOAD_SIZE {
            let free = self.block_mut(block_index)?.free_bytes();
            tracing::debug!(id, split, "record cannot be resized in place");
            return Err(SeqFileError::InsufficientSpace {
                needed: new_span,
                available: old_span + free,
            });
        }

        match format {
            RecordFormat::Fixed { payload_size } => {
                if payload.len() > payload_size {
                    tracing::warn!(
                        id,
                        size = payload.len(),
                        payload_size,
                        "payload truncated to fixed slot size"
                    );
                }
                let slot = format.encode(id, payload);
                self.block_mut(block_index)?.write_at(offset, &slot);
            }
            RecordFormat::Variable => {
                let span = encode(id, payload);
                let block = self.block_mut(block_index)?;
                block.resize_span(offset, old_span, span.len())?;
                block.write_at(offset, &span);
            }
        }

        tracing::debug!(id, old_span, new_span, "updated record");
        Ok(())
    }

    /// Tombstone the first live record with `id`
    ///
    /// Only the id word changes; size and payload stay so later scans can
    /// still skip the span. No space is reclaimed until `reorganize`.
    pub fn delete(&mut self, id: i32) -> Result<()> {
        let positions: Vec<(usize, usize)> = self
            .locate(id)
            .ok_or(SeqFileError::NotFound(id))?
            .fragments
            .iter()
            .map(|fragment| (fragment.block, fragment.offset))
            .collect();

        for &(block, offset) in &positions {
            mark_tombstone(self.block_mut(block)?.used_bytes_mut(), offset);
        }

        if self.config.ordered && self.last_live == Some(id) {
            self.last_live = self.scan_last_live_id();
        }

        tracing::debug!(id, fragments = positions.len(), "deleted record");
        Ok(())
    }
}
