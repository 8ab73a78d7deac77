//! seqfile CLI
//!
//! Command-line interface for a sequential file stored on disk. Every
//! invocation loads the snapshot, applies one command and saves it back.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use seqfile::{persistence, FileConfig, Record, SeqFileError, SequentialFile};
use tracing_subscriber::{fmt, EnvFilter};

/// seqfile CLI
#[derive(Parser, Debug)]
#[command(name = "seqfile")]
#[command(about = "Sequential file organization over chained fixed-size blocks")]
#[command(version)]
struct Args {
    /// Snapshot file
    #[arg(short, long, default_value = "sequential_file.bin")]
    file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an empty file
    Init {
        /// Block capacity in bytes
        #[arg(short, long, default_value = "256")]
        block_size: usize,

        /// Contiguous (table) allocation instead of chained (list)
        #[arg(long)]
        contiguous: bool,

        /// Keep records sorted by id
        #[arg(long)]
        ordered: bool,

        /// Fixed-length records with this many payload bytes
        #[arg(long)]
        fixed: Option<usize>,

        /// Never split records across blocks
        #[arg(long)]
        no_overlap: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Insert a record
    Insert {
        id: i32,
        data: String,
    },

    /// Read a record by id
    Get {
        id: i32,
    },

    /// Read records with ids in [low, high]
    Range {
        low: i32,
        high: i32,
    },

    /// Read all records
    List,

    /// Replace a record's data
    Update {
        id: i32,
        data: String,
    },

    /// Delete a record
    Delete {
        id: i32,
    },

    /// Reclaim space held by deleted records
    Reorganize,

    /// Show organization and space usage
    Info,

    /// Delete the file from disk
    Remove,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,seqfile=info"));

    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();

    if let Err(e) = run(&args.file, args.command) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(path: &Path, command: Commands) -> seqfile::Result<()> {
    match command {
        Commands::Init {
            block_size,
            contiguous,
            ordered,
            fixed,
            no_overlap,
            force,
        } => {
            if path.exists() && !force {
                return Err(SeqFileError::InvalidConfig(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }

            let mut builder = FileConfig::builder()
                .block_capacity(block_size)
                .contiguous(contiguous)
                .ordered(ordered)
                .allow_overlap(!no_overlap);
            if let Some(payload_size) = fixed {
                builder = builder.fixed_length(payload_size);
            }

            let file = SequentialFile::create(builder.build())?;
            file.save(path)?;
            println!("Created {}", path.display());
        }
        Commands::Insert { id, data } => {
            let mut file = SequentialFile::load(path)?;
            file.insert(id, &text_payload(&data))?;
            file.save(path)?;
            println!("Record inserted successfully.");
        }
        Commands::Get { id } => {
            let file = SequentialFile::load(path)?;
            match file.search(id) {
                Some(record) => print_records(std::iter::once(record)),
                None => println!("Record not found."),
            }
        }
        Commands::Range { low, high } => {
            if low > high {
                return Err(SeqFileError::InvalidRange { low, high });
            }
            let file = SequentialFile::load(path)?;
            print_records(file.search_range(low, high));
        }
        Commands::List => {
            let file = SequentialFile::load(path)?;
            print_records(file.records());
        }
        Commands::Update { id, data } => {
            let mut file = SequentialFile::load(path)?;
            file.update(id, &text_payload(&data))?;
            file.save(path)?;
            println!("Record updated successfully.");
        }
        Commands::Delete { id } => {
            let mut file = SequentialFile::load(path)?;
            file.delete(id)?;
            file.save(path)?;
            println!("Record deleted successfully.");
        }
        Commands::Reorganize => {
            let mut file = SequentialFile::load(path)?;
            let stats = file.reorganize()?;
            file.save(path)?;
            println!(
                "Reorganized: {} records, {} deleted dropped, blocks {} -> {}",
                stats.records, stats.tombstones_dropped, stats.blocks_before, stats.blocks_after
            );
        }
        Commands::Info => {
            let file = SequentialFile::load(path)?;
            let config = file.config();
            let stats = file.stats();
            println!("Block capacity : {}", config.block_capacity);
            println!("Allocation     : {}", if config.contiguous { "contiguous" } else { "chained" });
            println!("Ordering       : {}", if config.ordered { "ordered" } else { "unordered" });
            println!("Record format  : {:?}", config.format);
            println!("Overlap        : {}", config.allow_overlap);
            println!("Blocks         : {}", stats.blocks);
            println!("Used / free    : {} / {}", stats.used_bytes, stats.free_bytes);
            println!("Live records   : {}", stats.live_records);
            println!("Deleted        : {}", stats.tombstones);
        }
        Commands::Remove => {
            persistence::remove(path)?;
            println!("File '{}' deleted successfully.", path.display());
        }
    }

    Ok(())
}

/// Text payloads are stored NUL-terminated
fn text_payload(data: &str) -> Vec<u8> {
    let mut payload = Vec::with_capacity(data.len() + 1);
    payload.extend_from_slice(data.as_bytes());
    payload.push(0);
    payload
}

fn print_records(records: impl Iterator<Item = Record>) {
    println!("+------------+-----------------+");
    println!("| Record ID  | Data            |");
    println!("+------------+-----------------+");
    for record in records {
        let end = record
            .payload
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(record.payload.len());
        let text = String::from_utf8_lossy(&record.payload[..end]);
        println!("| {:<10} | {:<15} |", record.id, text);
    }
    println!("+------------+-----------------+");
}
