//! Record Module
//!
//! Logical records and their serialized form inside a block.
//!
//! ## Span Layout
//! ```text
//! ┌──────────┬────────────┬──────────────────────┐
//! │ Id (4)   │ Size (4)   │ Payload (Size bytes) │
//! └──────────┴────────────┴──────────────────────┘
//! ```
//!
//! - Both header words are little-endian.
//! - Id `-1` marks a tombstone. The span stays in place until compaction.
//! - The two high bits of the size word are fragment flags:
//!   bit 31 = more fragments follow, bit 30 = continuation of an earlier
//!   fragment. An unsplit record has both bits clear.
//! - In fixed-length files every span is `8 + payload_size` bytes and the
//!   payload is zero-padded; `Size` still holds the stored payload length.

mod codec;

pub use codec::{decode, encode, encode_fragment, encode_slot, read_header, write_header};
pub(crate) use codec::mark_tombstone;

/// Header size: Id (4) + Size (4) = 8 bytes
pub const HEADER_SIZE: usize = 8;

/// Id written over a deleted record
pub const TOMBSTONE_ID: i32 = -1;

/// Largest payload a single record may carry (30-bit size field)
pub const MAX_PAYLOAD_SIZE: usize = (1 << 30) - 1;

/// Size-word flag: another fragment of this record follows
pub(crate) const MORE_FLAG: u32 = 1 << 31;

/// Size-word flag: this span continues a record begun in an earlier block
pub(crate) const CONTINUATION_FLAG: u32 = 1 << 30;

/// How record spans are sized within blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    /// Span = header + actual payload length; scanned sequentially only
    Variable,

    /// Span = header + `payload_size`; slots are indexable
    Fixed { payload_size: usize },
}

impl RecordFormat {
    /// Encoded length of a span whose header stores `size`
    pub fn span(&self, size: usize) -> usize {
        match self {
            RecordFormat::Variable => HEADER_SIZE + size,
            RecordFormat::Fixed { payload_size } => HEADER_SIZE + payload_size,
        }
    }

    /// Slot length in fixed-length files
    pub fn slot_size(&self) -> Option<usize> {
        match self {
            RecordFormat::Variable => None,
            RecordFormat::Fixed { payload_size } => Some(HEADER_SIZE + payload_size),
        }
    }

    /// Encode an unsplit record in this format
    pub fn encode(&self, id: i32, payload: &[u8]) -> Vec<u8> {
        match self {
            RecordFormat::Variable => encode(id, payload),
            RecordFormat::Fixed { payload_size } => encode_slot(id, payload, *payload_size),
        }
    }
}

/// A logical record: identifier plus payload bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: i32,
    pub payload: Vec<u8>,
}

impl Record {
    pub fn new(id: i32, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            id,
            payload: payload.into(),
        }
    }

    /// Payload length in bytes
    pub fn size(&self) -> usize {
        self.payload.len()
    }
}

/// Decoded span header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub id: i32,
    /// Payload bytes stored in this span
    pub size: usize,
    /// Another fragment follows at the head of the next block
    pub more: bool,
    /// This span continues a fragment from the previous block
    pub continuation: bool,
}

impl RecordHeader {
    pub fn new(id: i32, size: usize) -> Self {
        Self {
            id,
            size,
            more: false,
            continuation: false,
        }
    }

    pub fn is_tombstone(&self) -> bool {
        self.id == TOMBSTONE_ID
    }

    /// Size word as written to the block, flags included
    pub(crate) fn size_word(&self) -> u32 {
        let mut word = self.size as u32;
        if self.more {
            word |= MORE_FLAG;
        }
        if self.continuation {
            word |= CONTINUATION_FLAG;
        }
        word
    }
}

/// A record span viewed in place inside a block buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordView<'a> {
    pub header: RecordHeader,
    pub payload: &'a [u8],
}

impl RecordView<'_> {
    pub fn to_record(&self) -> Record {
        Record::new(self.header.id, self.payload)
    }
}
