//! Tests for insert
//!
//! These tests verify:
//! - Back-to-back placement inside a block
//! - First-fit placement for unordered files, tail placement for ordered
//! - RecordTooLarge without overlap
//! - Record splitting with overlap (including exact block fills)
//! - Reserved id and ordering checks
//! - Fixed-length slots
//! - Tombstoned bytes are never reused by inserts

use seqfile::record::{encode, RecordFormat};
use seqfile::{FileConfig, SeqFileError, SequentialFile};

// =============================================================================
// Helper Functions
// =============================================================================

fn create_file(capacity: usize, ordered: bool, overlap: bool) -> SequentialFile {
    let config = FileConfig::builder()
        .block_capacity(capacity)
        .ordered(ordered)
        .allow_overlap(overlap)
        .build();
    SequentialFile::create(config).unwrap()
}

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

fn used_per_block(file: &SequentialFile) -> Vec<usize> {
    file.blocks().map(|block| block.used()).collect()
}

// =============================================================================
// Placement Tests
// =============================================================================

#[test]
fn test_insert_into_empty_file_allocates_block() {
    let mut file = create_file(64, false, true);
    file.insert(1, b"A").unwrap();

    assert_eq!(file.block_count(), 1);
    assert_eq!(file.search(1).unwrap().payload, b"A");
}

#[test]
fn test_insert_appends_back_to_back() {
    let mut file = create_file(64, false, true);
    file.insert(1, b"A").unwrap();
    file.insert(2, b"BB").unwrap();
    file.insert(3, b"CCC").unwrap();

    let mut expected = encode(1, b"A");
    expected.extend(encode(2, b"BB"));
    expected.extend(encode(3, b"CCC"));

    let block = file.blocks().next().unwrap();
    assert_eq!(block.used_bytes(), expected.as_slice());
    assert_eq!(block.free_bytes(), 64 - 30);
}

#[test]
fn test_insert_spills_into_new_block() {
    let mut file = create_file(32, false, false);
    file.insert(1, &[b'x'; 20]).unwrap();
    file.insert(2, b"abc").unwrap();

    assert_eq!(used_per_block(&file), vec![28, 11]);
}

#[test]
fn test_unordered_insert_uses_first_fit() {
    let mut file = create_file(40, false, false);
    file.insert(1, &[b'a'; 20]).unwrap();
    file.insert(2, &[b'b'; 20]).unwrap();
    file.insert(3, b"ab").unwrap();

    // The 10-byte span goes back into the first block's 12 free bytes
    assert_eq!(used_per_block(&file), vec![38, 28]);
    assert_eq!(file.search(3).unwrap().payload, b"ab");
}

#[test]
fn test_ordered_insert_only_uses_tail() {
    let mut file = create_file(40, true, false);
    file.insert(1, &[b'a'; 20]).unwrap();
    file.insert(2, &[b'b'; 20]).unwrap();
    file.insert(3, b"ab").unwrap();

    assert_eq!(used_per_block(&file), vec![28, 38]);

    let ids: Vec<i32> = file.records().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn test_insert_exactly_fills_block() {
    let mut file = create_file(32, false, false);
    file.insert(1, &[b'x'; 24]).unwrap();

    let block = file.blocks().next().unwrap();
    assert_eq!(block.free_bytes(), 0);
}

// =============================================================================
// RecordTooLarge Tests
// =============================================================================

#[test]
fn test_record_too_large_without_overlap() {
    let mut file = create_file(32, false, false);
    file.insert(1, b"keep").unwrap();

    let err = file.insert(2, &[b'x'; 25]).unwrap_err();
    assert!(matches!(
        err,
        SeqFileError::RecordTooLarge {
            span: 33,
            capacity: 32
        }
    ));

    // Nothing was allocated or written
    assert_eq!(file.block_count(), 1);
    assert_eq!(used_per_block(&file), vec![12]);
    assert!(file.search(2).is_none());
}

// =============================================================================
// Overlap Tests
// =============================================================================

#[test]
fn test_overlap_splits_large_record() {
    let mut file = create_file(32, false, true);
    let payload = pattern(50);
    file.insert(1, &payload).unwrap();

    // 24 + 24 + 2 payload bytes across three blocks
    assert_eq!(used_per_block(&file), vec![32, 32, 10]);
    assert_eq!(file.search(1).unwrap().payload, payload);
}

#[test]
fn test_overlap_fragment_exactly_fills_block() {
    let mut file = create_file(32, false, true);
    let payload = pattern(48);
    file.insert(1, &payload).unwrap();

    assert_eq!(used_per_block(&file), vec![32, 32]);
    assert_eq!(file.search(1).unwrap().payload, payload);

    file.insert(2, b"z").unwrap();
    assert_eq!(file.block_count(), 3);
    assert_eq!(file.search(2).unwrap().payload, b"z");

    let ids: Vec<i32> = file.records().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn test_overlap_uses_tail_free_space() {
    let mut file = create_file(32, false, true);
    file.insert(1, b"abc").unwrap();

    let payload = pattern(20);
    file.insert(2, &payload).unwrap();

    // 13 payload bytes fill the first block, 7 continue in the second
    assert_eq!(used_per_block(&file), vec![32, 15]);
    assert_eq!(file.search(1).unwrap().payload, b"abc");
    assert_eq!(file.search(2).unwrap().payload, payload);
}

#[test]
fn test_overlap_skips_tail_too_small_for_header() {
    let mut file = create_file(32, false, true);
    file.insert(1, &[b'a'; 20]).unwrap();

    let payload = pattern(30);
    file.insert(2, &payload).unwrap();

    assert_eq!(used_per_block(&file), vec![28, 32, 14]);
    assert_eq!(file.search(2).unwrap().payload, payload);
}

#[test]
fn test_records_after_split_record_in_same_block_stay_visible() {
    let mut file = create_file(32, false, true);
    file.insert(1, b"abc").unwrap();
    file.insert(2, &pattern(20)).unwrap();
    file.insert(3, b"after").unwrap();

    let ids: Vec<i32> = file.records().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn test_fixed_length_never_splits() {
    let config = FileConfig::builder()
        .block_capacity(40)
        .fixed_length(8)
        .allow_overlap(true)
        .build();
    let mut file = SequentialFile::create(config).unwrap();

    // 16-byte slots: two per block, 8 bytes left over
    for id in 0..3 {
        file.insert(id, b"x").unwrap();
    }
    assert_eq!(used_per_block(&file), vec![32, 16]);
}

// =============================================================================
// Id and Ordering Tests
// =============================================================================

#[test]
fn test_reserved_id_rejected() {
    let mut file = create_file(64, false, true);
    let err = file.insert(-1, b"x").unwrap_err();
    assert!(matches!(err, SeqFileError::ReservedId));
    assert_eq!(file.block_count(), 0);
}

#[test]
fn test_ordered_rejects_out_of_order() {
    let mut file = create_file(64, true, true);
    file.insert(5, b"five").unwrap();

    let err = file.insert(3, b"three").unwrap_err();
    assert!(matches!(err, SeqFileError::OutOfOrder { id: 3, last: 5 }));
    assert!(file.search(3).is_none());

    // Equal ids keep the sequence non-decreasing
    file.insert(5, b"again").unwrap();
    file.insert(9, b"nine").unwrap();
}

#[test]
fn test_ordered_ignores_deleted_maximum() {
    let mut file = create_file(64, true, true);
    file.insert(1, b"one").unwrap();
    file.insert(5, b"five").unwrap();
    file.delete(5).unwrap();

    file.insert(3, b"three").unwrap();
    let ids: Vec<i32> = file.records().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn test_ordered_tracks_maximum_through_deletes() {
    let mut file = create_file(32, true, true);
    for id in [1, 4, 4, 7] {
        file.insert(id, b"x").unwrap();
    }

    file.delete(7).unwrap();
    assert!(matches!(file.insert(3, b"x"), Err(SeqFileError::OutOfOrder { id: 3, last: 4 })));

    // One of the two 4s is still live
    file.delete(4).unwrap();
    assert!(matches!(file.insert(3, b"x"), Err(SeqFileError::OutOfOrder { id: 3, last: 4 })));

    file.delete(4).unwrap();
    file.insert(3, b"x").unwrap();

    file.delete(3).unwrap();
    file.delete(1).unwrap();
    file.insert(-50, b"x").unwrap();

    file.clear();
    file.insert(-100, b"x").unwrap();
    let ids: Vec<i32> = file.records().map(|r| r.id).collect();
    assert_eq!(ids, vec![-100]);
}

#[test]
fn test_long_ordered_run() {
    let config = FileConfig::builder()
        .block_capacity(128)
        .ordered(true)
        .fixed_length(8)
        .build();
    let mut file = SequentialFile::create(config).unwrap();
    for id in 0..5_000 {
        file.insert(id, &id.to_le_bytes()).unwrap();
    }

    assert_eq!(file.stats().live_records, 5_000);
    assert!(matches!(
        file.insert(10, b"x"),
        Err(SeqFileError::OutOfOrder { id: 10, last: 4_999 })
    ));
}

#[test]
fn test_unordered_accepts_any_order() {
    let mut file = create_file(64, false, true);
    for id in [5, 1, 9, 3] {
        file.insert(id, b"x").unwrap();
    }
    let ids: Vec<i32> = file.records().map(|r| r.id).collect();
    assert_eq!(ids, vec![5, 1, 9, 3]);
}

// =============================================================================
// Fixed-Length Tests
// =============================================================================

#[test]
fn test_fixed_length_slots() {
    let config = FileConfig::builder()
        .block_capacity(64)
        .fixed_length(8)
        .build();
    let mut file = SequentialFile::create(config).unwrap();
    assert_eq!(file.config().format, RecordFormat::Fixed { payload_size: 8 });

    file.insert(1, b"ab").unwrap();
    file.insert(2, b"0123456789").unwrap();

    assert_eq!(used_per_block(&file), vec![32]);
    assert_eq!(file.search(1).unwrap().payload, b"ab");
    assert_eq!(file.search(2).unwrap().payload, b"01234567");
}

// =============================================================================
// Tombstone Tests
// =============================================================================

#[test]
fn test_insert_does_not_overwrite_tombstone() {
    let mut file = create_file(64, false, true);
    file.insert(1, b"A").unwrap();
    file.insert(2, b"BB").unwrap();
    file.insert(3, b"CCC").unwrap();
    let before = file.blocks().next().unwrap().used_bytes().to_vec();

    file.delete(2).unwrap();
    file.insert(4, b"D").unwrap();

    let after = file.blocks().next().unwrap().used_bytes().to_vec();
    assert_eq!(after.len(), 30 + 9);

    // Only the id word of record 2 changed; the new record went to the tail
    assert_eq!(&after[..9], &before[..9]);
    assert_eq!(&after[9..13], &(-1i32).to_le_bytes());
    assert_eq!(&after[13..30], &before[13..30]);
    assert_eq!(&after[30..], encode(4, b"D").as_slice());
}
