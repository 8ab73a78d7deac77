//! Insert
//!
//! Append-only placement: spans go at the used tail of a block and
//! tombstoned gaps are never reused before compaction.

use crate::error::{Result, SeqFileError};
use crate::record::{encode_fragment, RecordFormat, HEADER_SIZE, MAX_PAYLOAD_SIZE, TOMBSTONE_ID};

use super::SequentialFile;

/// Which blocks may receive a new span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    /// First block in chain order with enough free bytes
    FirstFit,
    /// Only the last block, keeping chain order equal to insertion order
    Tail,
}

impl SequentialFile {
    /// Insert a record
    ///
    /// Fails with `RecordTooLarge` only when the record cannot fit an empty
    /// block and overlap is disabled. Ordered files reject ids below the
    /// largest live id with `OutOfOrder`. On error the file is untouched.
    pub fn insert(&mut self, id: i32, payload: &[u8]) -> Result<()> {
        if id == TOMBSTONE_ID {
            return Err(SeqFileError::ReservedId);
        }

        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(SeqFileError::RecordTooLarge {
                span: HEADER_SIZE + payload.len(),
                capacity: self.config.block_capacity,
            });
        }

        if self.config.ordered {
            if let Some(last) = self.last_live {
                if id < last {
                    return Err(SeqFileError::OutOfOrder { id, last });
                }
            }
        }

        if let RecordFormat::Fixed { payload_size } = self.config.format {
            if payload.len() > payload_size {
                tracing::warn!(
                    id,
                    size = payload.len(),
                    payload_size,
                    "payload truncated to fixed slot size"
                );
            }
        }

        let placement = if self.config.ordered {
            Placement::Tail
        } else {
            Placement::FirstFit
        };
        self.place(id, payload, placement)?;
        if self.config.ordered {
            self.last_live = Some(id);
        }

        tracing::debug!(id, size = payload.len(), "inserted record");
        Ok(())
    }

    /// Write a record into the chain without any ordering checks
    pub(crate) fn place(&mut self, id: i32, payload: &[u8], placement: Placement) -> Result<()> {
        let format = self.config.format;
        let span = format.encode(id, payload);

        if let Some(index) = self.find_fit(span.len(), placement) {
            self.block_mut(index)?.append(&span)?;
            return Ok(());
        }

        if self.config.allow_overlap && format == RecordFormat::Variable {
            return self.place_split(id, payload);
        }

        if span.len() > self.config.block_capacity {
            return Err(SeqFileError::RecordTooLarge {
                span: span.len(),
                capacity: self.config.block_capacity,
            });
        }

        self.push_block()?.append(&span)?;
        Ok(())
    }

    /// Spread a record over the tail block and as many new blocks as needed
    ///
    /// Each fragment but the last fills its block completely, so the next
    /// fragment always starts at offset 0 of a freshly linked block.
    fn place_split(&mut self, id: i32, payload: &[u8]) -> Result<()> {
        let mut rest = payload;
        let mut continuation = false;
        let mut fragments = 0usize;

        loop {
            let tail_free = self.blocks().last().map_or(0, |b| b.free_bytes());
            let tail = if tail_free > HEADER_SIZE {
                let index = self.block_count() - 1;
                self.block_mut(index)?
            } else {
                self.push_block()?
            };

            let room = tail.free_bytes() - HEADER_SIZE;
            fragments += 1;

            if rest.len() <= room {
                tail.append(&encode_fragment(id, rest, false, continuation))?;
                break;
            }

            let (chunk, remainder) = rest.split_at(room);
            tail.append(&encode_fragment(id, chunk, true, continuation))?;
            rest = remainder;
            continuation = true;
        }

        if fragments > 1 {
            tracing::debug!(id, fragments, "record split across blocks");
        }
        Ok(())
    }

    fn find_fit(&self, span: usize, placement: Placement) -> Option<usize> {
        match placement {
            Placement::FirstFit => self.blocks().position(|b| b.free_bytes() >= span),
            Placement::Tail => {
                let (index, tail) = self.blocks().enumerate().last()?;
                (tail.free_bytes() >= span).then_some(index)
            }
        }
    }

    /// Id of the last live record in storage order, by full scan
    pub(crate) fn scan_last_live_id(&self) -> Option<i32> {
        self.entries()
            .filter(|entry| !entry.is_tombstone())
            .map(|entry| entry.id)
            .last()
    }
}
