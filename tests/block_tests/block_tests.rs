//! Tests for blocks and the block chain
//!
//! These tests verify:
//! - Empty block state
//! - Free-space bookkeeping as spans are appended
//! - Lazy chain growth and iteration order
//! - Chain teardown

use seqfile::record::encode;
use seqfile::{Block, FileConfig, SequentialFile};

// =============================================================================
// Helper Functions
// =============================================================================

fn unordered_file(capacity: usize, overlap: bool) -> SequentialFile {
    let config = FileConfig::builder()
        .block_capacity(capacity)
        .allow_overlap(overlap)
        .build();
    SequentialFile::create(config).unwrap()
}

// =============================================================================
// Block Tests
// =============================================================================

#[test]
fn test_new_block_is_empty() {
    let block = Block::new(64);

    assert_eq!(block.capacity(), 64);
    assert_eq!(block.free_bytes(), 64);
    assert_eq!(block.used(), 0);
    assert!(block.is_empty());
    assert!(block.used_bytes().is_empty());
    assert!(block.next().is_none());
}

#[test]
fn test_block_debug_is_shallow() {
    let block = Block::new(16);
    let text = format!("{:?}", block);
    assert!(text.contains("capacity: 16"));
    assert!(text.contains("has_next: false"));
}

// =============================================================================
// Chain Tests
// =============================================================================

#[test]
fn test_new_file_has_no_blocks() {
    let file = unordered_file(64, true);
    assert_eq!(file.block_count(), 0);
    assert!(file.blocks().next().is_none());
    assert!(file.is_empty());
}

#[test]
fn test_free_bytes_track_appended_spans() {
    let mut file = unordered_file(64, false);
    file.insert(1, b"A").unwrap();

    let block = file.blocks().next().unwrap();
    assert_eq!(block.used(), 9);
    assert_eq!(block.free_bytes(), 55);
    assert_eq!(block.used_bytes(), encode(1, b"A").as_slice());
}

#[test]
fn test_chain_grows_lazily() {
    let mut file = unordered_file(32, false);

    for id in 0..3 {
        file.insert(id, &[b'x'; 10]).unwrap();
    }

    // 18-byte spans: one per 32-byte block
    assert_eq!(file.block_count(), 3);
    for block in file.blocks() {
        assert_eq!(block.capacity(), 32);
        assert_eq!(block.used(), 18);
        assert_eq!(block.free_bytes(), 14);
    }
}

#[test]
fn test_blocks_iterate_in_chain_order() {
    let mut file = unordered_file(32, false);
    file.insert(1, &[b'a'; 20]).unwrap();
    file.insert(2, &[b'b'; 20]).unwrap();

    let ids: Vec<i32> = file
        .blocks()
        .map(|block| i32::from_le_bytes(block.used_bytes()[0..4].try_into().unwrap()))
        .collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn test_stats_sum_over_blocks() {
    let mut file = unordered_file(32, false);
    file.insert(1, &[b'a'; 20]).unwrap();
    file.insert(2, &[b'b'; 20]).unwrap();
    file.delete(2).unwrap();

    let stats = file.stats();
    assert_eq!(stats.blocks, 2);
    assert_eq!(stats.capacity_bytes, 64);
    assert_eq!(stats.used_bytes, 56);
    assert_eq!(stats.free_bytes, 8);
    assert_eq!(stats.live_records, 1);
    assert_eq!(stats.tombstones, 1);
}

// =============================================================================
// Teardown Tests
// =============================================================================

#[test]
fn test_clear_releases_chain_and_keeps_config() {
    let mut file = unordered_file(16, false);
    for id in 0..100 {
        file.insert(id, b"x").unwrap();
    }
    assert_eq!(file.block_count(), 100);

    file.clear();
    assert_eq!(file.block_count(), 0);
    assert_eq!(file.config().block_capacity, 16);

    file.insert(1, b"y").unwrap();
    assert_eq!(file.search(1).unwrap().payload, b"y");
}

#[test]
fn test_drop_long_chain() {
    let mut file = unordered_file(9, false);
    for id in 0..2_000 {
        file.insert(id, b"").unwrap();
    }
    assert_eq!(file.block_count(), 2_000);
    drop(file);
}
