//! Search
//!
//! Linear scan for any organization; per-block bisection when the file is
//! both ordered and fixed-length.

use std::cmp::Ordering;

use crate::record::{decode, Record, RecordFormat, RecordView, TOMBSTONE_ID};

use super::cursor::{Located, RangeIter, Records};
use super::SequentialFile;

impl SequentialFile {
    /// Find the first live record with `id`
    ///
    /// Uses binary search when the organization allows it.
    pub fn search(&self, id: i32) -> Option<Record> {
        if self.config.supports_binary_search() {
            self.binary_search(id)
        } else {
            self.linear_search(id)
        }
    }

    /// Scan blocks front to back, skipping tombstones
    pub fn linear_search(&self, id: i32) -> Option<Record> {
        self.locate(id).map(|entry| entry.to_record())
    }

    /// Bisect each block's slot array in chain order
    ///
    /// Only valid for ordered, fixed-length files; anything else falls back
    /// to the linear scan.
    pub fn binary_search(&self, id: i32) -> Option<Record> {
        let slot = match self.config.format.slot_size() {
            Some(slot) if self.config.ordered => slot,
            _ => return self.linear_search(id),
        };

        if id == TOMBSTONE_ID {
            return None;
        }

        self.blocks()
            .find_map(|block| bisect(self.config.format, block.used_bytes(), slot, id))
            .map(|view| view.to_record())
    }

    /// Iterate every live record in storage order
    pub fn records(&self) -> Records<'_> {
        Records::new(self.cursor())
    }

    /// Lazily iterate live records with `low <= id <= high`
    pub fn search_range(&self, low: i32, high: i32) -> RangeIter<'_> {
        RangeIter::new(self.records(), low, high, self.config.ordered)
    }

    /// Locate the first live record with `id`, fragments included
    pub(crate) fn locate(&self, id: i32) -> Option<Located<'_>> {
        if id == TOMBSTONE_ID {
            return None;
        }
        self.entries().find(|entry| entry.id == id)
    }
}

/// Leftmost live slot holding `target` within one block
///
/// A tombstoned probe moves right to the nearest live slot inside the
/// window; if none is left the window shrinks to the left half. Tombstones
/// therefore never match and never hide a live slot.
fn bisect(format: RecordFormat, bytes: &[u8], slot: usize, target: i32) -> Option<RecordView<'_>> {
    let mut low = 0usize;
    let mut high = bytes.len() / slot;
    let mut found = None;

    while low < high {
        let mid = low + (high - low) / 2;

        let mut probe = mid;
        let live = loop {
            if probe >= high {
                break None;
            }
            let (view, _) = decode(format, bytes, probe * slot).ok()?;
            if !view.header.is_tombstone() {
                break Some(view);
            }
            probe += 1;
        };

        let Some(view) = live else {
            high = mid;
            continue;
        };

        match view.header.id.cmp(&target) {
            Ordering::Less => low = probe + 1,
            Ordering::Greater => high = mid,
            Ordering::Equal => {
                found = Some(view);
                high = mid;
            }
        }
    }

    found
}
