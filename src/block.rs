//! Block Module
//!
//! Fixed-capacity pages chained into a singly linked list.
//!
//! ## Layout
//! ```text
//! ┌──────────────────────────────────────┬──────────────────┐
//! │ Used prefix (capacity - free bytes)  │ Free tail        │
//! │ [span][span][tombstone span][span]   │                  │
//! └──────────────────────────────────────┴──────────────────┘
//! ```
//!
//! The used prefix always grows from offset 0 and holds back-to-back spans
//! with no gaps. Only the used prefix is held in memory; the free tail is
//! bookkeeping, so a block costs what it stores. A block never drops its successor recursively; the owning
//! file unlinks the chain one block at a time.

use std::fmt;

use crate::error::{Result, SeqFileError};

/// A fixed-capacity page in the chain
pub struct Block {
    /// Used prefix only; grows on demand up to `capacity`
    data: Vec<u8>,
    capacity: usize,
    /// Following block in the chain
    pub(crate) next: Option<Box<Block>>,
}

impl Block {
    /// Create an empty block with no successor
    pub fn new(capacity: usize) -> Self {
        Self {
            data: Vec::new(),
            capacity,
            next: None,
        }
    }

    /// Rebuild a block from a persisted used prefix
    pub(crate) fn from_used(capacity: usize, used: &[u8]) -> Result<Self> {
        if used.len() > capacity {
            return Err(SeqFileError::Corrupted(format!(
                "block holds {} used bytes, capacity is {}",
                used.len(),
                capacity
            )));
        }

        Ok(Self {
            data: used.to_vec(),
            capacity,
            next: None,
        })
    }

    /// Total capacity in bytes
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes still available at the tail
    pub fn free_bytes(&self) -> usize {
        self.capacity - self.data.len()
    }

    /// Length of the used prefix
    pub fn used(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used() == 0
    }

    /// The used prefix: back-to-back encoded spans
    pub fn used_bytes(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn used_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Following block, if any
    pub fn next(&self) -> Option<&Block> {
        self.next.as_deref()
    }

    /// Append an encoded span at the end of the used prefix
    ///
    /// Returns the offset the span was written at.
    pub(crate) fn append(&mut self, span: &[u8]) -> Result<usize> {
        let free = self.free_bytes();
        if span.len() > free {
            return Err(SeqFileError::InsufficientSpace {
                needed: span.len(),
                available: free,
            });
        }

        let offset = self.used();
        self.data.extend_from_slice(span);
        Ok(offset)
    }

    /// Resize the span at `offset` from `old_len` to `new_len` bytes
    ///
    /// Every span after it moves by the difference so the used prefix keeps
    /// no gaps. The span's own content is left for the caller to rewrite.
    pub(crate) fn resize_span(&mut self, offset: usize, old_len: usize, new_len: usize) -> Result<()> {
        let end = offset + old_len;

        if new_len > old_len {
            let grow = new_len - old_len;
            let free = self.free_bytes();
            if grow > free {
                return Err(SeqFileError::InsufficientSpace {
                    needed: grow,
                    available: free,
                });
            }
            self.data.splice(end..end, std::iter::repeat(0).take(grow));
        } else {
            self.data.drain(offset + new_len..end);
        }
        Ok(())
    }

    /// Overwrite bytes inside the used prefix
    pub(crate) fn write_at(&mut self, offset: usize, bytes: &[u8]) {
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }
}

impl fmt::Debug for Block {
    // Successors are left out so long chains do not print recursively
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("capacity", &self.capacity())
            .field("free", &self.free_bytes())
            .field("has_next", &self.next.is_some())
            .finish()
    }
}

/// Iterator over a block chain in link order
pub struct Blocks<'a> {
    current: Option<&'a Block>,
}

impl<'a> Blocks<'a> {
    pub(crate) fn new(head: Option<&'a Block>) -> Self {
        Self { current: head }
    }
}

impl<'a> Iterator for Blocks<'a> {
    type Item = &'a Block;

    fn next(&mut self) -> Option<Self::Item> {
        let block = self.current?;
        self.current = block.next();
        Some(block)
    }
}
