//! Snapshot reader
//!
//! Rebuilds a sequential file from a snapshot. Nothing is returned until the
//! header, every block length and every span have been checked.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use bytes::Buf;

use crate::block::Block;
use crate::config::FileConfig;
use crate::error::{Result, SeqFileError};
use crate::file::SequentialFile;
use crate::record::RecordFormat;

use super::{BLOCK_LENGTH_SIZE, FILE_HEADER_SIZE};

/// Read a snapshot from any reader
pub fn read_file<R: Read>(reader: &mut R) -> Result<SequentialFile> {
    let mut header = [0u8; FILE_HEADER_SIZE];
    reader.read_exact(&mut header).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            SeqFileError::Corrupted("snapshot header truncated".to_string())
        }
        _ => SeqFileError::Io(e),
    })?;

    let config = parse_header(&header)?;
    let capacity = config.block_capacity;

    let mut blocks = Vec::new();
    while let Some(used) = read_block_length(reader)? {
        if used < 0 || used as usize > capacity {
            return Err(SeqFileError::Corrupted(format!(
                "block {} claims {} used bytes, capacity is {}",
                blocks.len(),
                used,
                capacity
            )));
        }

        let mut bytes = vec![0u8; used as usize];
        reader.read_exact(&mut bytes).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => SeqFileError::Corrupted(format!(
                "block {} truncated: expected {} bytes",
                blocks.len(),
                used
            )),
            _ => SeqFileError::Io(e),
        })?;

        blocks.push(Block::from_used(capacity, &bytes)?);
    }

    SequentialFile::from_blocks(config, blocks)
}

/// Load a snapshot from `path`
pub fn load(path: &Path) -> Result<SequentialFile> {
    let mut reader = BufReader::new(File::open(path)?);
    let file = read_file(&mut reader)?;

    tracing::info!(
        path = %path.display(),
        blocks = file.block_count(),
        "loaded snapshot"
    );
    Ok(file)
}

fn parse_header(header: &[u8; FILE_HEADER_SIZE]) -> Result<FileConfig> {
    let mut src = &header[..];
    let block_capacity = src.get_i32_le();
    let contiguous = src.get_i32_le();
    let ordered = src.get_i32_le();
    let fixed_length = src.get_i32_le();
    let allow_overlap = src.get_i32_le();

    if block_capacity <= 0 {
        return Err(SeqFileError::Corrupted(format!(
            "invalid block capacity {}",
            block_capacity
        )));
    }

    let format = match fixed_length {
        0 => RecordFormat::Variable,
        n if n > 0 => RecordFormat::Fixed {
            payload_size: n as usize,
        },
        n => {
            return Err(SeqFileError::Corrupted(format!(
                "invalid fixed-length payload size {}",
                n
            )))
        }
    };

    let config = FileConfig {
        block_capacity: block_capacity as usize,
        contiguous: contiguous != 0,
        ordered: ordered != 0,
        format,
        allow_overlap: allow_overlap != 0,
    };

    config
        .validate()
        .map_err(|e| SeqFileError::Corrupted(format!("invalid snapshot header: {}", e)))?;
    Ok(config)
}

/// Read the next block length
///
/// `Ok(None)` on a clean end of file; a partial length word is corruption.
fn read_block_length<R: Read>(reader: &mut R) -> Result<Option<i32>> {
    let mut buf = [0u8; BLOCK_LENGTH_SIZE];
    let mut filled = 0;

    while filled < BLOCK_LENGTH_SIZE {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    match filled {
        0 => Ok(None),
        BLOCK_LENGTH_SIZE => Ok(Some(i32::from_le_bytes(buf))),
        n => Err(SeqFileError::Corrupted(format!(
            "block length truncated: {} of {} bytes",
            n, BLOCK_LENGTH_SIZE
        ))),
    }
}
