//! far: fat archive tool.
//!
//! `far concat` merges single-target archives into one fat archive (raw
//! device binaries need the compiler toolchain's note reader and are rejected
//! here). `far list` prints the entries of an existing archive.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use far::{concatenate, decode, ArchiveOnlyInputs};

#[derive(Parser)]
#[command(name = "far", version, about = "Fat archive tool for multi-device GPU binaries")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Merge archives into one fat archive.
    Concat {
        /// Input fat archives, merged in the given order.
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Output file name.
        #[arg(short, long, default_value = "concat.ar")]
        out: PathBuf,
    },
    /// List the entries of a fat archive.
    List {
        /// Archive to inspect.
        file: PathBuf,
        /// Machine-readable JSON output.
        #[arg(long)]
        json: bool,
    },
}

#[derive(serde::Serialize)]
struct EntryRow<'a> {
    name: &'a str,
    size: usize,
    offset: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    match Cli::parse().command {
        Command::Concat { files, out } => {
            let mut inputs = Vec::with_capacity(files.len());
            for path in &files {
                let bytes = fs::read(path)
                    .map_err(|e| format!("read {}: {}", path.display(), e))?;
                inputs.push((path.display().to_string(), bytes));
            }
            let borrowed: Vec<(&str, &[u8])> = inputs
                .iter()
                .map(|(name, bytes)| (name.as_str(), bytes.as_slice()))
                .collect();

            let fatbinary = concatenate(&borrowed, &ArchiveOnlyInputs)?;
            fs::write(&out, &fatbinary)
                .map_err(|e| format!("write {}: {}", out.display(), e))?;
            eprintln!("wrote {} ({} bytes)", out.display(), fatbinary.len());
        }
        Command::List { file, json } => {
            let bytes = fs::read(&file)
                .map_err(|e| format!("read {}: {}", file.display(), e))?;
            let decoded = decode(&bytes).map_err(|failure| {
                // Warnings recorded ahead of the corrupt tail still matter.
                for warning in &failure.warnings {
                    eprintln!("warning: {warning}");
                }
                failure
            })?;
            for warning in &decoded.warnings {
                eprintln!("warning: {warning}");
            }

            let rows: Vec<EntryRow<'_>> = decoded
                .archive
                .files
                .iter()
                .map(|entry| EntryRow {
                    name: &entry.file_name,
                    size: entry.file_data.len(),
                    offset: entry.header_offset,
                })
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for row in &rows {
                    println!("{:<24} {:>10} bytes at offset {}", row.name, row.size, row.offset);
                }
            }
        }
    }
    Ok(())
}
