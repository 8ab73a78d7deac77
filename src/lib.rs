//! # seqfile
//!
//! A sequential-access file storage engine:
//! - Records appended into fixed-size blocks chained as a linked list
//! - Ordered/unordered, fixed/variable-length, overlapping or not
//! - Tombstone deletion with compaction
//! - Flat binary snapshots that round-trip the blocks byte for byte
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        CLI (seqfile)                         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    SequentialFile                            │
//! │    insert / search / search_range / update / delete /        │
//! │                      reorganize                              │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │                                  │
//!            ▼                                  ▼
//!   ┌─────────────────┐                ┌─────────────────┐
//!   │  Block chain    │◀───────────────│   Persistence   │
//!   │ (record codec)  │  raw prefixes  │ (save / load)   │
//!   └─────────────────┘                └─────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use seqfile::{FileConfig, SequentialFile};
//!
//! let config = FileConfig::builder().block_capacity(64).build();
//! let mut file = SequentialFile::create(config)?;
//!
//! file.insert(1, b"A")?;
//! file.insert(2, b"BB")?;
//! assert_eq!(file.search(2).map(|r| r.payload), Some(b"BB".to_vec()));
//!
//! file.delete(2)?;
//! assert!(file.search(2).is_none());
//! # Ok::<(), seqfile::SeqFileError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod block;
pub mod file;
pub mod persistence;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{SeqFileError, Result};
pub use config::{FileConfig, FileConfigBuilder};
pub use record::{Record, RecordFormat};
pub use block::Block;
pub use file::{FileStats, RangeIter, Records, ReorganizeStats, SequentialFile};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of seqfile
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
