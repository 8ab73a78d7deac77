//! Snapshot writer
//!
//! Serializes the organization and raw block prefixes. Block contents are
//! written as opaque bytes; only the used-byte count is interpreted.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::file::SequentialFile;
use crate::record::RecordFormat;

use super::{BLOCK_LENGTH_SIZE, FILE_HEADER_SIZE};

/// Write a snapshot to any writer
///
/// Returns the number of bytes written.
pub fn write_file<W: Write>(file: &SequentialFile, writer: &mut W) -> Result<u64> {
    let config = file.config();
    let fixed_length = match config.format {
        RecordFormat::Variable => 0,
        RecordFormat::Fixed { payload_size } => payload_size as i32,
    };

    let header: [i32; 5] = [
        config.block_capacity as i32,
        config.contiguous as i32,
        config.ordered as i32,
        fixed_length,
        config.allow_overlap as i32,
    ];
    for field in header {
        writer.write_all(&field.to_le_bytes())?;
    }

    let mut written = FILE_HEADER_SIZE as u64;
    for block in file.blocks() {
        let used = block.used_bytes();
        writer.write_all(&(used.len() as i32).to_le_bytes())?;
        writer.write_all(used)?;
        written += (BLOCK_LENGTH_SIZE + used.len()) as u64;
    }

    Ok(written)
}

/// Save a snapshot to `path`
///
/// Writes a sibling temporary file, syncs it and renames it over `path`, so
/// a failed save leaves any previous snapshot in place.
pub fn save(file: &SequentialFile, path: &Path) -> Result<()> {
    let temp = temp_path(path);

    let written = match write_synced(file, &temp) {
        Ok(written) => written,
        Err(e) => {
            let _ = fs::remove_file(&temp);
            return Err(e);
        }
    };

    if let Err(e) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(e.into());
    }

    tracing::info!(
        path = %path.display(),
        blocks = file.block_count(),
        bytes = written,
        "saved snapshot"
    );
    Ok(())
}

fn write_synced(file: &SequentialFile, path: &Path) -> Result<u64> {
    let mut writer = BufWriter::new(File::create(path)?);
    let written = write_file(file, &mut writer)?;

    let out = writer.into_inner().map_err(|e| e.into_error())?;
    out.sync_all()?;
    Ok(written)
}

/// "data.bin" -> "data.bin.tmp" in the same directory
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("seqfile"));
    name.push(".tmp");
    path.with_file_name(name)
}
