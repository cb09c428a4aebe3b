//! # zipcodec
//!
//! A streaming ZIP archive reader and writer with ZIP64 support.
//!
//! This library reads and writes the ZIP container format over any source
//! implementing the [`ReadAt`] trait, so archives can live on disk or in
//! memory. Reading is central-directory-first: the directory is the
//! authoritative index, local headers are only validated against it, and
//! entries whose sizes were deferred to a trailing data descriptor are
//! recovered by a boundary-safe signature search. Writing streams each
//! entry through the raw-deflate encoder and promotes records to their
//! ZIP64 variants whenever a measured value overflows a 16/32-bit field.
//!
//! ## Features
//!
//! - Read archives from local files or in-memory buffers
//! - Write archives entry by entry, or pack a whole folder
//! - ZIP64 extensions for entries and directories beyond 32-bit limits
//! - Deferred-size entries (data descriptors) in both directions
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use zipcodec::{MemReader, ZipExtractor, ZipWriter};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut writer = ZipWriter::new();
//!     writer.add_entry_bytes("hello.txt", b"hello world").await?;
//!     let bytes = writer.finish()?;
//!
//!     let extractor = ZipExtractor::new(Arc::new(MemReader::new(bytes)));
//!     for (name, entry) in extractor.read_archive().await? {
//!         println!("{name}: {} bytes", entry.uncompressed_size);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod io;
pub mod zip;

pub use cli::Cli;
pub use flate2::Compression;
pub use io::{LocalFileReader, MemReader, ReadAt};
pub use zip::{
    ArchiveIndex, EntryRecord, ZipExtractor, ZipReader, ZipWriter, compute_archive,
    create_zip_file_from_folder, extract_zip_file, read_zip_file,
};
