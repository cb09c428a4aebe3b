//! ZIP archive reading and writing.
//!
//! ## Architecture
//!
//! The module is organized around one cursor and two protocols:
//!
//! - [`cursor`]: buffered byte cursor with a boundary-safe signature search
//! - [`structures`]: data structures representing ZIP format elements
//!   (entry records, EOCD variants, signatures)
//! - [`codec`]: the raw-deflate collaborator seam
//! - [`reader`]: central-directory-first archive reading
//! - [`writer`]: streaming archive writing with ZIP64 promotion
//! - [`extractor`]: high-level extraction API for end users
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file, each possibly
//!    followed by a data descriptor when the writer deferred the sizes
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end, preceded by the
//!    ZIP64 EOCD and its locator when 16/32-bit fields overflow
//!
//! The reader walks the record stream forward: deferred-size local entries
//! carry no trustworthy length, so they cannot be skipped by declared size
//! alone. The central directory encountered at the end of the walk is the
//! authoritative index; a second pass extracts each indexed entry.
//!
//! ## Supported Features
//!
//! - Standard ZIP format (PKZIP APPNOTE 6.3.x compatible)
//! - ZIP64 extensions for files and offsets > 4GB
//! - STORED (no compression) and DEFLATE methods on read, DEFLATE on write
//! - Deferred sizes via data descriptors, in both directions
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archive support
//! - No BZIP2, LZMA, or other compression methods
//! - No repair of archives with corrupted central directories

pub mod codec;
pub mod cursor;
mod extractor;
mod reader;
pub mod structures;
mod writer;

pub use cursor::ZipCursor;
pub use extractor::{ZipExtractor, extract_zip_file, read_zip_file};
pub use reader::ZipReader;
pub use structures::*;
pub use writer::{ZipWriter, compute_archive, create_zip_file_from_folder};
