//! Chain cursor
//!
//! Walks spans in chain order, then offset order, and yields logical
//! records. Records split across blocks are followed into the head of each
//! successor block and reassembled; their continuation spans are skipped
//! when the walk reaches them.

use crate::block::Block;
use crate::error::{Result, SeqFileError};
use crate::record::{decode, Record, RecordFormat, TOMBSTONE_ID};

/// One span of a logical record
#[derive(Debug, Clone, Copy)]
pub(crate) struct Fragment<'a> {
    /// Block index in chain order
    pub block: usize,
    /// Offset of the span inside the block
    pub offset: usize,
    /// Encoded length of the span
    pub span: usize,
    pub payload: &'a [u8],
}

/// A logical record and where its fragments live
#[derive(Debug, Clone)]
pub(crate) struct Located<'a> {
    pub id: i32,
    /// Never empty; the first entry is the head span
    pub fragments: Vec<Fragment<'a>>,
}

impl Located<'_> {
    pub fn is_tombstone(&self) -> bool {
        self.id == TOMBSTONE_ID
    }

    pub fn is_split(&self) -> bool {
        self.fragments.len() > 1
    }

    pub fn head(&self) -> &Fragment<'_> {
        &self.fragments[0]
    }

    pub fn to_record(&self) -> Record {
        let size = self.fragments.iter().map(|f| f.payload.len()).sum();
        let mut payload = Vec::with_capacity(size);
        for fragment in &self.fragments {
            payload.extend_from_slice(fragment.payload);
        }
        Record::new(self.id, payload)
    }
}

/// Raw walk over every logical entry, tombstones included
pub(crate) struct Cursor<'a> {
    format: RecordFormat,
    block: Option<&'a Block>,
    index: usize,
    offset: usize,
    /// Last block whose head span was taken by an already followed record
    claimed: Option<usize>,
}

impl<'a> Cursor<'a> {
    pub fn new(format: RecordFormat, head: Option<&'a Block>) -> Self {
        Self {
            format,
            block: head,
            index: 0,
            offset: 0,
            claimed: None,
        }
    }

    /// Collect the continuation spans of a record whose head is in `from`
    fn follow(&self, from: &'a Block, located: &mut Located<'a>) -> Result<()> {
        let mut block = from;
        let mut index = self.index;

        loop {
            block = block.next().ok_or_else(|| {
                SeqFileError::Corrupted(format!(
                    "record {} continues past the last block",
                    located.id
                ))
            })?;
            index += 1;

            let (view, next) = decode(self.format, block.used_bytes(), 0)?;
            if !view.header.continuation || view.header.id != located.id {
                return Err(SeqFileError::Corrupted(format!(
                    "block {} does not start with a continuation of record {}",
                    index, located.id
                )));
            }

            located.fragments.push(Fragment {
                block: index,
                offset: 0,
                span: next,
                payload: view.payload,
            });

            if !view.header.more {
                return Ok(());
            }
        }
    }
}

impl<'a> Iterator for Cursor<'a> {
    type Item = Result<Located<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let block = self.block?;

            if self.offset >= block.used() {
                self.block = block.next();
                self.index += 1;
                self.offset = 0;
                continue;
            }

            let offset = self.offset;
            let (view, next) = match decode(self.format, block.used_bytes(), offset) {
                Ok(decoded) => decoded,
                Err(e) => {
                    self.block = None;
                    return Some(Err(e));
                }
            };
            self.offset = next;

            if view.header.continuation {
                let followed = matches!(self.claimed, Some(last) if self.index <= last);
                if offset != 0 || !followed {
                    self.block = None;
                    return Some(Err(SeqFileError::Corrupted(format!(
                        "orphan continuation span at offset {} of block {}",
                        offset, self.index
                    ))));
                }
                // Consumed together with its head fragment
                continue;
            }

            let mut located = Located {
                id: view.header.id,
                fragments: vec![Fragment {
                    block: self.index,
                    offset,
                    span: next - offset,
                    payload: view.payload,
                }],
            };

            if view.header.more {
                if let Err(e) = self.follow(block, &mut located) {
                    self.block = None;
                    return Some(Err(e));
                }
                self.claimed = located.fragments.last().map(|f| f.block);
            }

            return Some(Ok(located));
        }
    }
}

// =============================================================================
// Public Iterators
// =============================================================================

/// Every live record in storage order
pub struct Records<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Records<'a> {
    pub(crate) fn new(cursor: Cursor<'a>) -> Self {
        Self { cursor }
    }
}

impl Iterator for Records<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.cursor.next()? {
                Ok(entry) if entry.is_tombstone() => continue,
                Ok(entry) => return Some(entry.to_record()),
                Err(e) => {
                    tracing::error!(error = %e, "stopping scan at malformed span");
                    return None;
                }
            }
        }
    }
}

/// Live records with ids in `[low, high]`, in storage order
///
/// Forward-only. Call `search_range` again to start over.
pub struct RangeIter<'a> {
    records: Records<'a>,
    low: i32,
    high: i32,
    /// Ids never decrease, so the first id above `high` ends the range
    ordered: bool,
    done: bool,
}

impl<'a> RangeIter<'a> {
    pub(crate) fn new(records: Records<'a>, low: i32, high: i32, ordered: bool) -> Self {
        Self {
            records,
            low,
            high,
            ordered,
            done: low > high,
        }
    }
}

impl Iterator for RangeIter<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let Some(record) = self.records.next() else {
                self.done = true;
                break;
            };

            if record.id > self.high && self.ordered {
                self.done = true;
                break;
            }

            if (self.low..=self.high).contains(&record.id) {
                return Some(record);
            }
        }
        None
    }
}

impl std::iter::FusedIterator for RangeIter<'_> {}
