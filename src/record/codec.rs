//! Record codec
//!
//! Encoding and decoding of record spans. Spans are self-contained: no
//! addresses are ever written, so a block buffer can go to disk and come
//! back unmodified and still decode.

use bytes::{Buf, BufMut};

use crate::error::{Result, SeqFileError};

use super::{
    RecordFormat, RecordHeader, RecordView, CONTINUATION_FLAG, HEADER_SIZE, MORE_FLAG,
    TOMBSTONE_ID,
};

// =============================================================================
// Encoding
// =============================================================================

/// Encode an unsplit variable-length record
///
/// Format: id (4) + size (4) + payload, total `8 + payload.len()`
pub fn encode(id: i32, payload: &[u8]) -> Vec<u8> {
    encode_fragment(id, payload, false, false)
}

/// Encode one fragment of a record that overlaps block boundaries
pub fn encode_fragment(id: i32, payload: &[u8], more: bool, continuation: bool) -> Vec<u8> {
    let header = RecordHeader {
        id,
        size: payload.len(),
        more,
        continuation,
    };

    let mut span = Vec::with_capacity(HEADER_SIZE + payload.len());
    span.put_i32_le(header.id);
    span.put_u32_le(header.size_word());
    span.put_slice(payload);
    span
}

/// Encode a fixed-length slot: payload truncated or zero-padded to `payload_size`
pub fn encode_slot(id: i32, payload: &[u8], payload_size: usize) -> Vec<u8> {
    let stored = &payload[..payload.len().min(payload_size)];
    let mut span = encode(id, stored);
    span.resize(HEADER_SIZE + payload_size, 0);
    span
}

/// Write a header at `offset`, overwriting whatever was there
pub fn write_header(buf: &mut [u8], offset: usize, header: &RecordHeader) {
    let mut dst = &mut buf[offset..offset + HEADER_SIZE];
    dst.put_i32_le(header.id);
    dst.put_u32_le(header.size_word());
}

/// Rewrite only the id word of the span at `offset` to the tombstone id
pub(crate) fn mark_tombstone(buf: &mut [u8], offset: usize) {
    let mut dst = &mut buf[offset..offset + 4];
    dst.put_i32_le(TOMBSTONE_ID);
}

// =============================================================================
// Decoding
// =============================================================================

/// Read the header at `offset`
pub fn read_header(bytes: &[u8], offset: usize) -> Result<RecordHeader> {
    let end = offset
        .checked_add(HEADER_SIZE)
        .filter(|&end| end <= bytes.len())
        .ok_or_else(|| {
            SeqFileError::Corrupted(format!(
                "record header at offset {} runs past {} used bytes",
                offset,
                bytes.len()
            ))
        })?;

    let mut src = &bytes[offset..end];
    let id = src.get_i32_le();
    let word = src.get_u32_le();

    Ok(RecordHeader {
        id,
        size: (word & !(MORE_FLAG | CONTINUATION_FLAG)) as usize,
        more: word & MORE_FLAG != 0,
        continuation: word & CONTINUATION_FLAG != 0,
    })
}

/// Decode the span at `offset`
///
/// Returns the record view and the offset of the next span. Tombstoned
/// spans decode normally so callers can skip over them.
pub fn decode(format: RecordFormat, bytes: &[u8], offset: usize) -> Result<(RecordView<'_>, usize)> {
    let header = read_header(bytes, offset)?;

    if let RecordFormat::Fixed { payload_size } = format {
        if header.more || header.continuation {
            return Err(SeqFileError::Corrupted(format!(
                "fragment flags set on fixed-length slot at offset {}",
                offset
            )));
        }
        if header.size > payload_size {
            return Err(SeqFileError::Corrupted(format!(
                "slot at offset {} stores {} bytes, slot payload is {}",
                offset, header.size, payload_size
            )));
        }
    }

    let payload_start = offset + HEADER_SIZE;
    let next = offset + format.span(header.size);
    if next > bytes.len() {
        return Err(SeqFileError::Corrupted(format!(
            "record at offset {} spans {} bytes, only {} used",
            offset,
            next - offset,
            bytes.len() - offset
        )));
    }

    let payload = &bytes[payload_start..payload_start + header.size];
    Ok((RecordView { header, payload }, next))
}
