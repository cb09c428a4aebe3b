//! Streaming ZIP archive writer.
//!
//! Entries are appended one at a time: a local file header with deferred
//! sizes, the compressed payload streamed straight onto the output buffer,
//! and a data descriptor carrying the measured CRC32 and sizes. The header
//! placeholders are never back-patched; readers rely on the descriptor or
//! the central directory. `finish` emits the central directory and the
//! end-of-central-directory record, promoting to the ZIP64 variants when a
//! measured value no longer fits its 16/32-bit field.

use anyhow::{Result, bail};
use byteorder::{LittleEndian, WriteBytesExt};
use flate2::Compression;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncReadExt};

use super::codec::ContentEncoder;
use super::structures::*;

/// Version needed to extract a plain deflate entry (2.0)
const VERSION_DEFAULT: u16 = 20;
/// Version needed once ZIP64 fields are in play (4.5)
const VERSION_ZIP64: u16 = 45;
/// Input chunk size when streaming an entry's byte source
const WRITE_CHUNK: usize = 64 * 1024;
/// Largest value a 32-bit size/offset field can carry before promotion
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;
/// Largest entry count the EOCD can carry before promotion
const ZIP64_THRESHOLD_ENTRIES: usize = u16::MAX as usize;

/// Streaming archive writer over a growing output buffer.
///
/// Inputs arrive in caller-supplied order as (name, byte source) pairs;
/// the writer knows nothing about filesystem trees. The full entry list is
/// retained until [`finish`](ZipWriter::finish) flushes the central
/// directory and end record.
pub struct ZipWriter {
    out: Vec<u8>,
    entries: Vec<EntryRecord>,
    level: Compression,
    comment: Vec<u8>,
}

impl Default for ZipWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ZipWriter {
    pub fn new() -> Self {
        Self::with_level(Compression::default())
    }

    /// Create a writer with an explicit deflate level (0-9)
    pub fn with_level(level: Compression) -> Self {
        Self {
            out: Vec::new(),
            entries: Vec::new(),
            level,
            comment: Vec::new(),
        }
    }

    /// Set the archive comment written into the end record
    pub fn set_comment(&mut self, comment: impl Into<Vec<u8>>) {
        self.comment = comment.into();
    }

    /// Current output offset; the next entry's local header lands here
    pub fn offset(&self) -> u64 {
        self.out.len() as u64
    }

    /// Number of entries appended so far
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Append one entry, streaming its bytes through the compressor.
    ///
    /// Emits the local file header with placeholder sizes (general-purpose
    /// bit 3 defers the real values), the raw-deflate payload, and the data
    /// descriptor. CRC32 is accumulated over the uncompressed bytes as they
    /// are consumed; nothing is buffered beyond one input chunk.
    pub async fn add_entry<S>(&mut self, name: &str, source: &mut S) -> Result<()>
    where
        S: AsyncRead + Unpin + ?Sized,
    {
        let name_bytes = name.as_bytes();
        if name_bytes.len() > u16::MAX as usize {
            bail!("entry name exceeds the 16-bit name length field");
        }

        let offset = self.out.len() as u64;
        let flags = FLAG_DATA_DESCRIPTOR | FLAG_UTF8;

        self.out.write_u32::<LittleEndian>(SIG_LFH)?;
        self.out.write_u16::<LittleEndian>(VERSION_DEFAULT)?;
        self.out.write_u16::<LittleEndian>(flags)?;
        self.out
            .write_u16::<LittleEndian>(CompressionMethod::Deflate.as_u16())?;
        self.out.write_u16::<LittleEndian>(0)?; // mod time
        self.out.write_u16::<LittleEndian>(0)?; // mod date
        self.out.write_u32::<LittleEndian>(0)?; // crc32, deferred
        self.out.write_u32::<LittleEndian>(0)?; // compressed size, deferred
        self.out.write_u32::<LittleEndian>(0)?; // uncompressed size, deferred
        self.out
            .write_u16::<LittleEndian>(name_bytes.len() as u16)?;
        self.out.write_u16::<LittleEndian>(0)?; // extra length
        self.out.extend_from_slice(name_bytes);

        // The encoder writes compressed bytes directly onto the output
        // buffer tail; no second payload buffer exists.
        let payload_start = self.out.len();
        let mut encoder = ContentEncoder::new(
            CompressionMethod::Deflate,
            std::mem::take(&mut self.out),
            self.level,
        )?;
        let mut hasher = crc32fast::Hasher::new();
        let mut uncompressed_size = 0u64;
        let mut buf = vec![0u8; WRITE_CHUNK];
        loop {
            let n = source.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
            uncompressed_size += n as u64;
            encoder.write(&buf[..n])?;
        }
        self.out = encoder.finish()?;

        let compressed_size = (self.out.len() - payload_start) as u64;
        let crc32 = hasher.finalize();
        let zip64 = compressed_size > ZIP64_THRESHOLD
            || uncompressed_size > ZIP64_THRESHOLD
            || offset > ZIP64_THRESHOLD;

        self.write_data_descriptor(crc32, compressed_size, uncompressed_size, zip64)?;

        self.entries.push(EntryRecord {
            name: name.to_string(),
            compression_method: CompressionMethod::Deflate,
            flags,
            crc32,
            compressed_size,
            uncompressed_size,
            local_header_offset: offset,
            zip64,
            ..Default::default()
        });
        Ok(())
    }

    /// Append an entry whose bytes are already in memory
    pub async fn add_entry_bytes(&mut self, name: &str, data: &[u8]) -> Result<()> {
        let mut source = data;
        self.add_entry(name, &mut source).await
    }

    /// Flush the central directory and end record, returning the finished
    /// archive bytes.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        let cd_offset = self.out.len() as u64;
        let entries = std::mem::take(&mut self.entries);
        for entry in &entries {
            Self::write_central_header(&mut self.out, entry)?;
        }
        let cd_size = self.out.len() as u64 - cd_offset;
        let count = entries.len();

        let needs_zip64 = count > ZIP64_THRESHOLD_ENTRIES
            || cd_size > ZIP64_THRESHOLD
            || cd_offset > ZIP64_THRESHOLD;
        if needs_zip64 {
            let eocd64_offset = self.out.len() as u64;

            self.out.write_u32::<LittleEndian>(SIG_ZIP64_EOCD)?;
            // Record size counts everything after itself
            self.out
                .write_u64::<LittleEndian>((ZIP64_EOCD_SIZE - 12) as u64)?;
            self.out.write_u16::<LittleEndian>(VERSION_ZIP64)?;
            self.out.write_u16::<LittleEndian>(VERSION_ZIP64)?;
            self.out.write_u32::<LittleEndian>(0)?; // this disk
            self.out.write_u32::<LittleEndian>(0)?; // disk with the CD
            self.out.write_u64::<LittleEndian>(count as u64)?;
            self.out.write_u64::<LittleEndian>(count as u64)?;
            self.out.write_u64::<LittleEndian>(cd_size)?;
            self.out.write_u64::<LittleEndian>(cd_offset)?;

            self.out.write_u32::<LittleEndian>(SIG_ZIP64_EOCD_LOCATOR)?;
            self.out.write_u32::<LittleEndian>(0)?;
            self.out.write_u64::<LittleEndian>(eocd64_offset)?;
            self.out.write_u32::<LittleEndian>(1)?; // total disks
        }

        let short_count = if count > ZIP64_THRESHOLD_ENTRIES {
            ZIP64_SENTINEL_SHORT
        } else {
            count as u16
        };
        let clamp = |v: u64| {
            if v > ZIP64_THRESHOLD {
                ZIP64_SENTINEL
            } else {
                v as u32
            }
        };

        self.out.write_u32::<LittleEndian>(SIG_EOCD)?;
        self.out.write_u16::<LittleEndian>(0)?; // this disk
        self.out.write_u16::<LittleEndian>(0)?; // disk with the CD
        self.out.write_u16::<LittleEndian>(short_count)?;
        self.out.write_u16::<LittleEndian>(short_count)?;
        self.out.write_u32::<LittleEndian>(clamp(cd_size))?;
        self.out.write_u32::<LittleEndian>(clamp(cd_offset))?;
        self.out
            .write_u16::<LittleEndian>(self.comment.len() as u16)?;
        self.out.extend_from_slice(&self.comment);

        Ok(self.out)
    }

    fn write_data_descriptor(
        &mut self,
        crc32: u32,
        compressed_size: u64,
        uncompressed_size: u64,
        wide: bool,
    ) -> Result<()> {
        self.out.write_u32::<LittleEndian>(SIG_DD)?;
        self.out.write_u32::<LittleEndian>(crc32)?;
        if wide {
            self.out.write_u64::<LittleEndian>(compressed_size)?;
            self.out.write_u64::<LittleEndian>(uncompressed_size)?;
        } else {
            self.out.write_u32::<LittleEndian>(compressed_size as u32)?;
            self.out
                .write_u32::<LittleEndian>(uncompressed_size as u32)?;
        }
        Ok(())
    }

    /// Emit one central file header.
    ///
    /// When any of the entry's sizes or its offset overflows 32 bits, the
    /// three 32-bit fields are written as sentinels and a ZIP64 extra
    /// record carries the true 8-byte values in fixed order (uncompressed
    /// size, compressed size, offset).
    fn write_central_header(out: &mut Vec<u8>, entry: &EntryRecord) -> Result<()> {
        let zip64 = entry.compressed_size > ZIP64_THRESHOLD
            || entry.uncompressed_size > ZIP64_THRESHOLD
            || entry.local_header_offset > ZIP64_THRESHOLD;
        let version = if zip64 { VERSION_ZIP64 } else { VERSION_DEFAULT };
        let name_bytes = entry.name.as_bytes();
        // id + length + three 8-byte fields
        let zip64_extra_len: usize = 4 + 24;
        let extra_len = entry.extra_field.len() + if zip64 { zip64_extra_len } else { 0 };

        out.write_u32::<LittleEndian>(SIG_CFH)?;
        out.write_u16::<LittleEndian>(version)?; // version made by
        out.write_u16::<LittleEndian>(version)?; // version needed
        out.write_u16::<LittleEndian>(entry.flags)?;
        out.write_u16::<LittleEndian>(entry.compression_method.as_u16())?;
        out.write_u16::<LittleEndian>(entry.last_mod_time)?;
        out.write_u16::<LittleEndian>(entry.last_mod_date)?;
        out.write_u32::<LittleEndian>(entry.crc32)?;
        if zip64 {
            out.write_u32::<LittleEndian>(ZIP64_SENTINEL)?;
            out.write_u32::<LittleEndian>(ZIP64_SENTINEL)?;
        } else {
            out.write_u32::<LittleEndian>(entry.compressed_size as u32)?;
            out.write_u32::<LittleEndian>(entry.uncompressed_size as u32)?;
        }
        out.write_u16::<LittleEndian>(name_bytes.len() as u16)?;
        out.write_u16::<LittleEndian>(extra_len as u16)?;
        out.write_u16::<LittleEndian>(entry.comment.len() as u16)?;
        out.write_u16::<LittleEndian>(0)?; // disk number start
        out.write_u16::<LittleEndian>(entry.internal_attributes)?;
        out.write_u32::<LittleEndian>(entry.external_attributes)?;
        if zip64 {
            out.write_u32::<LittleEndian>(ZIP64_SENTINEL)?;
        } else {
            out.write_u32::<LittleEndian>(entry.local_header_offset as u32)?;
        }
        out.extend_from_slice(name_bytes);
        out.extend_from_slice(&entry.extra_field);
        if zip64 {
            out.write_u16::<LittleEndian>(ZIP64_EXTRA_ID)?;
            out.write_u16::<LittleEndian>(24)?;
            out.write_u64::<LittleEndian>(entry.uncompressed_size)?;
            out.write_u64::<LittleEndian>(entry.compressed_size)?;
            out.write_u64::<LittleEndian>(entry.local_header_offset)?;
        }
        out.extend_from_slice(&entry.comment);
        Ok(())
    }
}

/// Compress the contents of a folder into archive bytes without creating
/// any files.
///
/// The traversal is the writer's external collaborator: it yields a
/// deterministic (sorted) sequence of (relative name, byte source) pairs;
/// names use `/` separators regardless of platform.
pub async fn compute_archive(src_folder: &Path, level: Compression) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::with_level(level);
    for path in collect_files(src_folder).await? {
        let name = entry_name(src_folder, &path)?;
        let mut file = tokio::fs::File::open(&path).await?;
        writer.add_entry(&name, &mut file).await?;
    }
    writer.finish()
}

/// Compress the contents of a folder into a zip file on disk.
///
/// An existing file at `zip_path` is deleted up front to prevent any
/// conflicts later.
pub async fn create_zip_file_from_folder(
    zip_path: &Path,
    src_folder: &Path,
    level: Compression,
) -> Result<()> {
    if tokio::fs::try_exists(zip_path).await? {
        tokio::fs::remove_file(zip_path).await?;
    }
    let bytes = compute_archive(src_folder, level).await?;
    tokio::fs::write(zip_path, bytes).await?;
    Ok(())
}

/// Collect every file under `root`, sorted for deterministic output
async fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(item) = entries.next_entry().await? {
            if item.file_type().await?.is_dir() {
                pending.push(item.path());
            } else {
                files.push(item.path());
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Archive-relative entry name with `/` separators
fn entry_name(root: &Path, path: &Path) -> Result<String> {
    let rel = path.strip_prefix(root)?;
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}
