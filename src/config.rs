//! Configuration for seqfile
//!
//! The organization of a sequential file is chosen once, when the file is
//! created, and never changes afterwards. A reload restores the same values.

use crate::error::{Result, SeqFileError};
use crate::record::{RecordFormat, HEADER_SIZE};

/// Organization of one sequential file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileConfig {
    // -------------------------------------------------------------------------
    // Block Configuration
    // -------------------------------------------------------------------------
    /// Capacity of every block in the chain (in bytes)
    pub block_capacity: usize,

    /// Table (contiguous) vs. list (chained) allocation.
    /// Recorded and persisted; the chain itself is always linked.
    pub contiguous: bool,

    // -------------------------------------------------------------------------
    // Record Configuration
    // -------------------------------------------------------------------------
    /// Records are kept in non-decreasing id order
    pub ordered: bool,

    /// Fixed vs. variable-length record spans
    pub format: RecordFormat,

    /// Records may be split across block boundaries (variable-length only)
    pub allow_overlap: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            block_capacity: 256,
            contiguous: false,
            ordered: false,
            format: RecordFormat::Variable,
            allow_overlap: true,
        }
    }
}

impl FileConfig {
    /// Create a new config builder
    pub fn builder() -> FileConfigBuilder {
        FileConfigBuilder::default()
    }

    /// True when every record span has the same length
    pub fn is_fixed_length(&self) -> bool {
        matches!(self.format, RecordFormat::Fixed { .. })
    }

    /// Binary search is only meaningful on sorted, equal-size slots
    pub fn supports_binary_search(&self) -> bool {
        self.ordered && self.is_fixed_length()
    }

    /// Check that blocks can hold at least one record
    pub fn validate(&self) -> Result<()> {
        if self.block_capacity <= HEADER_SIZE {
            return Err(SeqFileError::InvalidConfig(format!(
                "block capacity {} must exceed the {}-byte record header",
                self.block_capacity, HEADER_SIZE
            )));
        }

        if self.block_capacity > i32::MAX as usize {
            return Err(SeqFileError::InvalidConfig(format!(
                "block capacity {} does not fit in a 32-bit length",
                self.block_capacity
            )));
        }

        if let RecordFormat::Fixed { payload_size } = self.format {
            if payload_size == 0 {
                return Err(SeqFileError::InvalidConfig(
                    "fixed-length payload size must be at least 1 byte".to_string(),
                ));
            }
            let slot = HEADER_SIZE + payload_size;
            if slot > self.block_capacity {
                return Err(SeqFileError::InvalidConfig(format!(
                    "fixed-length slot of {} bytes exceeds block capacity {}",
                    slot, self.block_capacity
                )));
            }
        }

        Ok(())
    }
}

/// Builder for FileConfig
#[derive(Default)]
pub struct FileConfigBuilder {
    config: FileConfig,
}

impl FileConfigBuilder {
    /// Set the block capacity (in bytes)
    pub fn block_capacity(mut self, capacity: usize) -> Self {
        self.config.block_capacity = capacity;
        self
    }

    /// Mark the file as contiguous (table) or chained (list)
    pub fn contiguous(mut self, contiguous: bool) -> Self {
        self.config.contiguous = contiguous;
        self
    }

    /// Keep records sorted by id
    pub fn ordered(mut self, ordered: bool) -> Self {
        self.config.ordered = ordered;
        self
    }

    /// Use fixed-length slots holding `payload_size` payload bytes each
    pub fn fixed_length(mut self, payload_size: usize) -> Self {
        self.config.format = RecordFormat::Fixed { payload_size };
        self
    }

    /// Use variable-length records
    pub fn variable_length(mut self) -> Self {
        self.config.format = RecordFormat::Variable;
        self
    }

    /// Allow records to overlap block boundaries
    pub fn allow_overlap(mut self, allow: bool) -> Self {
        self.config.allow_overlap = allow;
        self
    }

    pub fn build(self) -> FileConfig {
        self.config
    }
}
