//! Main entry point for the zipcodec CLI application.
//!
//! This binary provides a command-line interface for packing folders into
//! ZIP archives, unpacking archives, and listing their contents.

use anyhow::Result;
use clap::Parser;
use flate2::Compression;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use zipcodec::zip::ArchiveIndex;
use zipcodec::{Cli, LocalFileReader, ZipExtractor, create_zip_file_from_folder};
use zipcodec::cli::Command;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Pack {
            folder,
            archive,
            level,
        } => pack(&folder, &archive, level).await,
        Command::Unpack { archive, dest } => unpack(&archive, dest).await,
        Command::List { archive, verbose } => list(&archive, verbose).await,
    }
}

async fn pack(folder: &Path, archive: &Path, level: u32) -> Result<()> {
    create_zip_file_from_folder(archive, folder, Compression::new(level)).await?;
    let size = tokio::fs::metadata(archive).await?.len();
    println!("{}: {}", archive.display(), format_size(size));
    Ok(())
}

async fn unpack(archive: &Path, dest: Option<PathBuf>) -> Result<()> {
    let reader = Arc::new(LocalFileReader::new(archive)?);
    let extractor = ZipExtractor::new(reader);
    let dest = dest.unwrap_or_else(|| PathBuf::from("."));

    let index = extractor.read_archive().await?;
    for entry in index.values() {
        if !entry.is_directory() {
            println!("  extracting: {}", entry.name);
        }
    }
    extractor.extract_into_folder(&dest).await?;
    Ok(())
}

/// List files in the ZIP archive.
///
/// Supports two output formats:
/// - Simple format: just entry names, one per line
/// - Verbose format (`-v`): detailed table with size, compression ratio,
///   and timestamps
async fn list(archive: &Path, verbose: bool) -> Result<()> {
    let reader = Arc::new(LocalFileReader::new(archive)?);
    let index: ArchiveIndex = ZipExtractor::new(reader).read_index().await?;

    if verbose {
        println!(
            "{:>10}  {:>10}  {:>5}  {:>10}  {:>5}  Name",
            "Length", "Size", "Cmpr", "Date", "Time"
        );
        println!("{}", "-".repeat(70));
    }

    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut file_count = 0usize;

    for entry in index.values() {
        if verbose {
            let (year, month, day) = entry.mod_date();
            let (hour, minute, _second) = entry.mod_time();

            // Compression ratio as percentage saved; incompressible
            // entries clamp at zero.
            let ratio = if entry.uncompressed_size > 0 {
                format!(
                    "{:>4}%",
                    100u64.saturating_sub(entry.compressed_size * 100 / entry.uncompressed_size)
                )
            } else {
                "  0%".to_string()
            };

            println!(
                "{:>10}  {:>10}  {}  {:04}-{:02}-{:02}  {:02}:{:02}  {}",
                entry.uncompressed_size,
                entry.compressed_size,
                ratio,
                year,
                month,
                day,
                hour,
                minute,
                entry.name
            );

            if !entry.is_directory() {
                total_uncompressed += entry.uncompressed_size;
                total_compressed += entry.compressed_size;
                file_count += 1;
            }
        } else {
            println!("{}", entry.name);
        }
    }

    if verbose {
        println!("{}", "-".repeat(70));
        let total_ratio = if total_uncompressed > 0 {
            format!(
                "{:>4}%",
                100u64.saturating_sub(total_compressed * 100 / total_uncompressed)
            )
        } else {
            "  0%".to_string()
        };
        println!(
            "{:>10}  {:>10}  {}  {:>21}  {} files",
            total_uncompressed, total_compressed, total_ratio, "", file_count
        );
    }

    Ok(())
}

/// Format a byte size into a human-readable string
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
