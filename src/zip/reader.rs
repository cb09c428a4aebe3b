//! Low-level ZIP archive reader.
//!
//! This module handles the binary parsing of ZIP file structures,
//! reading from any source that implements the [`ReadAt`] trait.
//!
//! ## Parsing Strategy
//!
//! The archive is read in two passes sharing one cursor:
//! 1. The directory pass walks forward from the start of the stream.
//!    Local records encountered before the central directory are consumed
//!    (their payload skipped by declared size, or by searching for the
//!    trailing data-descriptor signature when a deferred-size writer left
//!    no size behind) so the cursor always lands on a record boundary.
//!    Central file headers populate the index; the end-of-central-directory
//!    record (or its ZIP64 variant) terminates the pass.
//! 2. The local pass seeks to each indexed entry's local header, streams
//!    its compressed payload through the decompressor, and attaches the
//!    decoded bytes to the entry.
//!
//! The central directory is the source of truth for all metadata; local
//! headers are validated structurally but never override it.

use anyhow::{Result, bail};
use byteorder::{LittleEndian, ReadBytesExt};
use std::sync::Arc;

use crate::io::ReadAt;

use super::codec::ContentDecoder;
use super::cursor::ZipCursor;
use super::structures::*;

/// Upper bound on a single payload read during the local pass
const PAYLOAD_CHUNK: u64 = 64 * 1024;

/// Local file header fields, kept only long enough to validate the record
/// and position the cursor on the payload.
struct LocalHeader {
    flags: u16,
    name: Vec<u8>,
    compressed_size: u64,
}

impl LocalHeader {
    fn has_data_descriptor(&self) -> bool {
        self.flags & FLAG_DATA_DESCRIPTOR != 0
    }
}

/// Low-level ZIP archive reader.
///
/// Generic over the source type so archives can be read from local files
/// or from in-memory buffers. The cursor (and with it the underlying file
/// position) is exclusively owned for the duration of one read operation.
pub struct ZipReader<R: ReadAt> {
    cursor: ZipCursor<R>,
    eocd: Option<EndOfCentralDirectory>,
    eocd64: Option<Zip64Eocd>,
    locator: Option<Zip64EocdLocator>,
}

impl<R: ReadAt> ZipReader<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self {
            cursor: ZipCursor::new(reader),
            eocd: None,
            eocd64: None,
            locator: None,
        }
    }

    /// End-of-central-directory summary, available after the directory pass
    pub fn end_record(&self) -> Option<&EndOfCentralDirectory> {
        self.eocd.as_ref()
    }

    /// ZIP64 end-of-central-directory record, when the archive carries one
    pub fn zip64_end_record(&self) -> Option<&Zip64Eocd> {
        self.eocd64.as_ref()
    }

    /// ZIP64 EOCD locator record, when the archive carries one
    pub fn zip64_locator(&self) -> Option<&Zip64EocdLocator> {
        self.locator.as_ref()
    }

    /// Build the archive index from the central directory.
    ///
    /// Walks the record stream from the start of the source:
    /// local entries are consumed and discarded, central file headers are
    /// parsed into the index (duplicate names overwrite), and the pass ends
    /// at the end-of-central-directory record. The declared entry counts do
    /// not gate the index; the headers actually encountered do.
    ///
    /// # Errors
    ///
    /// An unexpected signature, or exhaustion before the EOCD record, is a
    /// malformed-archive error and aborts the whole operation.
    pub async fn read_index(&mut self) -> Result<ArchiveIndex> {
        self.cursor.seek(0);
        let mut index = ArchiveIndex::new();
        let mut in_directory = false;

        loop {
            let sig = match self.cursor.peek_signature().await? {
                Some(sig) => sig,
                None => bail!(
                    "malformed archive: stream ended before the end-of-central-directory record"
                ),
            };

            match sig {
                SIG_LFH if !in_directory => self.walk_local_entry().await?,
                SIG_CFH => {
                    in_directory = true;
                    let entry = self.parse_central_header().await?;
                    index.insert(entry.name.clone(), entry);
                }
                SIG_ZIP64_EOCD => {
                    in_directory = true;
                    self.eocd64 = Some(self.parse_zip64_eocd().await?);
                }
                SIG_ZIP64_EOCD_LOCATOR => {
                    self.locator = Some(self.parse_zip64_locator().await?);
                }
                SIG_EOCD => {
                    self.eocd = Some(self.parse_eocd().await?);
                    break;
                }
                other => bail!(
                    "malformed archive: unexpected signature 0x{:08x} at offset {}",
                    other,
                    self.cursor.position()
                ),
            }
        }

        Ok(index)
    }

    /// Read the whole archive: build the index, then extract every indexed
    /// entry's content. Entries are processed one at a time in index order;
    /// any failure aborts the operation with no partial result.
    pub async fn read_archive(&mut self) -> Result<ArchiveIndex> {
        let mut index = self.read_index().await?;
        for entry in index.values_mut() {
            self.extract_entry(entry).await?;
        }
        Ok(index)
    }

    /// Consume one local record (header, payload, optional descriptor)
    /// during the directory pass. Entries without a central-directory
    /// counterpart are still fully consumed here so the cursor stays on a
    /// record boundary; their bytes are discarded.
    async fn walk_local_entry(&mut self) -> Result<()> {
        let header = self.parse_local_header().await?;

        if header.has_data_descriptor() {
            // Sizes deferred; the payload runs until the descriptor signature.
            let found = self.cursor.search_signature(SIG_DD, None).await?;
            if !found {
                bail!(
                    "malformed archive: no data descriptor terminates the deferred-size entry at offset {}",
                    self.cursor.position()
                );
            }
            self.parse_data_descriptor_sniffed().await?;
        } else {
            self.skip_payload(header.compressed_size).await?;
        }
        Ok(())
    }

    /// Parse the fixed local file header fields plus name and extra,
    /// resolving a ZIP64 extra record when the 32-bit sizes carry the
    /// sentinel.
    async fn parse_local_header(&mut self) -> Result<LocalHeader> {
        let sig = self.cursor.read_u32().await?;
        if sig != SIG_LFH {
            bail!(
                "malformed archive: expected local file header, found 0x{:08x} at offset {}",
                sig,
                self.cursor.position() - 4
            );
        }

        let _version_needed = self.cursor.read_u16().await?;
        let flags = self.cursor.read_u16().await?;
        let _method = self.cursor.read_u16().await?;
        let _last_mod_time = self.cursor.read_u16().await?;
        let _last_mod_date = self.cursor.read_u16().await?;
        let _crc32 = self.cursor.read_u32().await?;
        let compressed_size = self.cursor.read_u32().await?;
        let uncompressed_size = self.cursor.read_u32().await?;
        let name_len = self.cursor.read_u16().await? as usize;
        let extra_len = self.cursor.read_u16().await? as usize;

        let name = self.cursor.consume_exact(name_len).await?;
        let extra = self.cursor.consume_exact(extra_len).await?;

        // The local variant of the ZIP64 extra carries the two sizes only.
        let mut csize = compressed_size as u64;
        if compressed_size == ZIP64_SENTINEL || uncompressed_size == ZIP64_SENTINEL {
            if let Some(fields) = zip64_extra_fields(&extra, 2)? {
                csize = fields[1];
            }
        }

        Ok(LocalHeader {
            flags,
            name,
            compressed_size: csize,
        })
    }

    /// Parse a central file header into an entry record.
    ///
    /// When the extra field carries a ZIP64 sub-record and any of the three
    /// 32-bit fields used the sentinel, all three 8-byte values are read in
    /// their fixed order (uncompressed size, compressed size, offset) and
    /// override the 32-bit fields.
    async fn parse_central_header(&mut self) -> Result<EntryRecord> {
        let sig = self.cursor.read_u32().await?;
        if sig != SIG_CFH {
            bail!(
                "malformed archive: expected central file header, found 0x{:08x}",
                sig
            );
        }

        let _version_made_by = self.cursor.read_u16().await?;
        let _version_needed = self.cursor.read_u16().await?;
        let flags = self.cursor.read_u16().await?;
        let method = self.cursor.read_u16().await?;
        let last_mod_time = self.cursor.read_u16().await?;
        let last_mod_date = self.cursor.read_u16().await?;
        let crc32 = self.cursor.read_u32().await?;
        let compressed_size = self.cursor.read_u32().await?;
        let uncompressed_size = self.cursor.read_u32().await?;
        let name_len = self.cursor.read_u16().await? as usize;
        let extra_len = self.cursor.read_u16().await? as usize;
        let comment_len = self.cursor.read_u16().await? as usize;
        let _disk_number_start = self.cursor.read_u16().await?;
        let internal_attributes = self.cursor.read_u16().await?;
        let external_attributes = self.cursor.read_u32().await?;
        let offset32 = self.cursor.read_u32().await?;

        let name_bytes = self.cursor.consume_exact(name_len).await?;
        // Lossy conversion handles non-UTF8 filenames gracefully
        let name = String::from_utf8_lossy(&name_bytes).to_string();
        let extra_field = self.cursor.consume_exact(extra_len).await?;
        let comment = self.cursor.consume_exact(comment_len).await?;

        let mut csize = compressed_size as u64;
        let mut usize_ = uncompressed_size as u64;
        let mut offset = offset32 as u64;
        let mut zip64 = false;

        let any_sentinel = compressed_size == ZIP64_SENTINEL
            || uncompressed_size == ZIP64_SENTINEL
            || offset32 == ZIP64_SENTINEL;
        if any_sentinel {
            if let Some(fields) = zip64_extra_fields(&extra_field, 3)? {
                usize_ = fields[0];
                csize = fields[1];
                offset = fields[2];
                zip64 = true;
            }
        }

        Ok(EntryRecord {
            name,
            compression_method: CompressionMethod::from_u16(method),
            flags,
            crc32,
            compressed_size: csize,
            uncompressed_size: usize_,
            local_header_offset: offset,
            last_mod_time,
            last_mod_date,
            internal_attributes,
            external_attributes,
            extra_field,
            comment,
            zip64,
            content: None,
        })
    }

    async fn parse_eocd(&mut self) -> Result<EndOfCentralDirectory> {
        let _sig = self.cursor.read_u32().await?;
        let disk_number = self.cursor.read_u16().await?;
        let disk_with_cd = self.cursor.read_u16().await?;
        let disk_entries = self.cursor.read_u16().await?;
        let total_entries = self.cursor.read_u16().await?;
        let cd_size = self.cursor.read_u32().await?;
        let cd_offset = self.cursor.read_u32().await?;
        let comment_len = self.cursor.read_u16().await? as usize;
        let comment = self.cursor.consume_exact(comment_len).await?;

        Ok(EndOfCentralDirectory {
            disk_number,
            disk_with_cd,
            disk_entries,
            total_entries,
            cd_size,
            cd_offset,
            comment,
        })
    }

    async fn parse_zip64_eocd(&mut self) -> Result<Zip64Eocd> {
        let _sig = self.cursor.read_u32().await?;
        let record_size = self.cursor.read_u64().await?;
        let version_made_by = self.cursor.read_u16().await?;
        let version_needed = self.cursor.read_u16().await?;
        let disk_number = self.cursor.read_u32().await?;
        let disk_with_cd = self.cursor.read_u32().await?;
        let disk_entries = self.cursor.read_u64().await?;
        let total_entries = self.cursor.read_u64().await?;
        let cd_size = self.cursor.read_u64().await?;
        let cd_offset = self.cursor.read_u64().await?;

        // record_size counts everything after itself; 44 bytes are fixed,
        // the remainder is the extensible data sector.
        let fixed = (ZIP64_EOCD_SIZE - 12) as u64;
        if record_size < fixed {
            bail!("malformed archive: ZIP64 end-of-central-directory record too short");
        }
        self.cursor.consume_exact((record_size - fixed) as usize).await?;

        Ok(Zip64Eocd {
            record_size,
            version_made_by,
            version_needed,
            disk_number,
            disk_with_cd,
            disk_entries,
            total_entries,
            cd_size,
            cd_offset,
        })
    }

    async fn parse_zip64_locator(&mut self) -> Result<Zip64EocdLocator> {
        let _sig = self.cursor.read_u32().await?;
        let disk_with_eocd64 = self.cursor.read_u32().await?;
        let eocd64_offset = self.cursor.read_u64().await?;
        let total_disks = self.cursor.read_u32().await?;

        Ok(Zip64EocdLocator {
            disk_with_eocd64,
            eocd64_offset,
            total_disks,
        })
    }

    /// Parse a data descriptor whose field width is known from the entry's
    /// ZIP64 status: 8-byte sizes when a ZIP64 extra record is present.
    async fn parse_data_descriptor(&mut self, wide: bool) -> Result<DataDescriptor> {
        let sig = self.cursor.read_u32().await?;
        if sig != SIG_DD {
            bail!(
                "malformed archive: expected data descriptor, found 0x{:08x}",
                sig
            );
        }
        let crc32 = self.cursor.read_u32().await?;
        let (compressed_size, uncompressed_size) = if wide {
            (self.cursor.read_u64().await?, self.cursor.read_u64().await?)
        } else {
            (
                self.cursor.read_u32().await? as u64,
                self.cursor.read_u32().await? as u64,
            )
        };
        Ok(DataDescriptor {
            crc32,
            compressed_size,
            uncompressed_size,
        })
    }

    /// Parse a data descriptor met during the directory pass, where the
    /// entry's ZIP64 status is not yet known. The width is sniffed by
    /// checking which candidate layout is followed by a valid record
    /// signature.
    async fn parse_data_descriptor_sniffed(&mut self) -> Result<DataDescriptor> {
        let look = self.cursor.peek(28).await?;

        let sig_at = |bytes: &[u8], at: usize| -> Option<u32> {
            let field = bytes.get(at..at + 4)?;
            Some(u32::from_le_bytes([field[0], field[1], field[2], field[3]]))
        };

        let narrow = sig_at(look, 16).is_some_and(is_record_signature);
        let wide = sig_at(look, 24).is_some_and(is_record_signature);
        if !narrow && !wide {
            bail!(
                "malformed archive: no record follows the data descriptor at offset {}",
                self.cursor.position()
            );
        }
        self.parse_data_descriptor(!narrow).await
    }

    /// Consume exactly `len` payload bytes in bounded chunks
    async fn skip_payload(&mut self, len: u64) -> Result<()> {
        let mut remaining = len;
        while remaining > 0 {
            let take = remaining.min(PAYLOAD_CHUNK) as usize;
            let chunk = self.cursor.consume(take).await?;
            if chunk.is_empty() {
                bail!("malformed archive: entry payload truncated ({remaining} bytes missing)");
            }
            remaining -= chunk.len() as u64;
        }
        Ok(())
    }

    /// Extract one indexed entry's content.
    ///
    /// Seeks to the recorded local header offset, validates the header
    /// structurally, streams the compressed payload through the
    /// decompressor (by exact size, or by descriptor search when the sizes
    /// were deferred), then reconciles the trailing descriptor.
    async fn extract_entry(&mut self, entry: &mut EntryRecord) -> Result<()> {
        self.cursor.seek(entry.local_header_offset);

        // Validated structurally; the central directory stays authoritative
        // for metadata, so the header fields are not copied over.
        let local = self.parse_local_header().await?;
        if String::from_utf8_lossy(&local.name) != entry.name {
            bail!(
                "malformed archive: local header at offset {} does not belong to entry '{}'",
                entry.local_header_offset,
                entry.name
            );
        }

        let size_was_known = entry.size_known();
        if size_was_known && entry.compressed_size == 0 {
            // Nothing to decode; directory entries and truly empty members
            // land here.
            entry.content = Some(Vec::new());
            return Ok(());
        }

        let mut decoder = ContentDecoder::new(entry.compression_method)?;

        if size_was_known {
            let mut remaining = entry.compressed_size;
            while remaining > 0 {
                let take = remaining.min(PAYLOAD_CHUNK) as usize;
                let chunk = self.cursor.consume(take).await?;
                if chunk.is_empty() {
                    bail!(
                        "malformed archive: payload of entry '{}' truncated",
                        entry.name
                    );
                }
                decoder.write(&chunk)?;
                remaining -= chunk.len() as u64;
            }
        } else {
            let mut sink = |chunk: &[u8]| decoder.write(chunk);
            let found = self
                .cursor
                .search_signature(SIG_DD, Some(&mut sink))
                .await?;
            if !found {
                bail!(
                    "malformed archive: entry '{}' has neither a declared size nor a data descriptor",
                    entry.name
                );
            }
        }

        let content = decoder.finish()?;

        // A descriptor follows when bit 3 is set, or when its signature is
        // simply present. It fills in whatever the directory left unknown.
        let descriptor_next = self.cursor.peek_signature().await? == Some(SIG_DD);
        if local.has_data_descriptor() || entry.has_data_descriptor() || descriptor_next {
            let descriptor = self.parse_data_descriptor(entry.zip64).await?;
            if entry.crc32 == 0 {
                entry.crc32 = descriptor.crc32;
            }
            if !size_was_known {
                entry.compressed_size = descriptor.compressed_size;
                entry.uncompressed_size = descriptor.uncompressed_size;
            }
        }

        if entry.crc32 != 0 {
            let mut hasher = crc32fast::Hasher::new();
            hasher.update(&content);
            let computed = hasher.finalize();
            if computed != entry.crc32 {
                bail!(
                    "decode failure: CRC32 mismatch for entry '{}' (recorded {:08x}, computed {:08x})",
                    entry.name,
                    entry.crc32,
                    computed
                );
            }
        }

        entry.content = Some(content);
        Ok(())
    }
}

/// Scan an extra field's (id, length, payload) sub-records for the ZIP64
/// record and return its first `count` 8-byte fields.
fn zip64_extra_fields(extra: &[u8], count: usize) -> Result<Option<Vec<u64>>> {
    let mut slice = extra;
    while slice.len() >= 4 {
        let id = slice.read_u16::<LittleEndian>()?;
        let len = slice.read_u16::<LittleEndian>()? as usize;
        if slice.len() < len {
            bail!("malformed archive: extra field sub-record overruns its container");
        }
        if id == ZIP64_EXTRA_ID {
            if len < count * 8 {
                bail!(
                    "malformed archive: ZIP64 extra record holds {} bytes, {} required",
                    len,
                    count * 8
                );
            }
            let mut payload = &slice[..len];
            let mut fields = Vec::with_capacity(count);
            for _ in 0..count {
                fields.push(payload.read_u64::<LittleEndian>()?);
            }
            return Ok(Some(fields));
        }
        slice = &slice[len..];
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemReader;
    use crate::zip::writer::ZipWriter;
    use byteorder::WriteBytesExt;

    fn reader_over(bytes: Vec<u8>) -> ZipReader<MemReader> {
        ZipReader::new(Arc::new(MemReader::new(bytes)))
    }

    fn find_sig(bytes: &[u8], sig: u32, from: usize) -> Option<usize> {
        let needle = sig.to_le_bytes();
        bytes[from..]
            .windows(4)
            .position(|w| w == needle)
            .map(|i| i + from)
    }

    async fn archive_with(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new();
        for (name, data) in entries {
            writer.add_entry_bytes(name, data).await.unwrap();
        }
        writer.finish().unwrap()
    }

    #[tokio::test]
    async fn test_empty_archive() {
        let bytes = ZipWriter::new().finish().unwrap();
        let mut reader = reader_over(bytes);
        let index = reader.read_index().await.unwrap();
        assert!(index.is_empty());
        assert_eq!(reader.end_record().unwrap().total_entries, 0);
    }

    #[tokio::test]
    async fn test_index_correctness() {
        let bytes = archive_with(&[
            ("a.txt", b"alpha"),
            ("b.txt", b"bravo"),
            ("dir/c.txt", b"charlie"),
        ])
        .await;
        let mut reader = reader_over(bytes);
        let index = reader.read_index().await.unwrap();
        assert_eq!(index.len(), 3);

        // Each recorded offset must point at a local header whose name
        // matches the directory's name.
        for (name, entry) in &index {
            reader.cursor.seek(entry.local_header_offset);
            let local = reader.parse_local_header().await.unwrap();
            assert_eq!(&String::from_utf8(local.name).unwrap(), name);
        }
    }

    #[tokio::test]
    async fn test_read_archive_round_trip() {
        let bytes = archive_with(&[("a.txt", b"hello"), ("dir/b.txt", b"world")]).await;
        let mut reader = reader_over(bytes);
        let index = reader.read_archive().await.unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index["a.txt"].content.as_deref(), Some(&b"hello"[..]));
        assert_eq!(index["dir/b.txt"].content.as_deref(), Some(&b"world"[..]));
        assert_eq!(index["a.txt"].uncompressed_size, 5);
    }

    #[tokio::test]
    async fn test_duplicate_names_last_write_wins() {
        let bytes = archive_with(&[("same.txt", b"first"), ("same.txt", b"second")]).await;
        let mut reader = reader_over(bytes);
        let index = reader.read_archive().await.unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index["same.txt"].content.as_deref(), Some(&b"second"[..]));
    }

    #[tokio::test]
    async fn test_truncated_archive_is_malformed() {
        let mut bytes = archive_with(&[("a.txt", b"hello")]).await;
        let eocd_at = find_sig(&bytes, SIG_EOCD, 0).unwrap();
        bytes.truncate(eocd_at);
        let mut reader = reader_over(bytes);
        let err = reader.read_index().await.unwrap_err();
        assert!(err.to_string().contains("malformed archive"));
    }

    #[tokio::test]
    async fn test_unexpected_signature_is_fatal() {
        let mut bytes = archive_with(&[("a.txt", b"hello")]).await;
        bytes[0] = 0x51; // corrupt the opening local header signature
        let mut reader = reader_over(bytes);
        let err = reader.read_index().await.unwrap_err();
        assert!(err.to_string().contains("unexpected signature"));
    }

    #[tokio::test]
    async fn test_deferred_size_entry_uses_descriptor_search() {
        let mut bytes = archive_with(&[("a.txt", b"streamed content")]).await;
        // Zero out the central directory's compressed size; with bit 3 set
        // the reader must fall back to the descriptor search.
        let cfh_at = find_sig(&bytes, SIG_CFH, 0).unwrap();
        bytes[cfh_at + 20..cfh_at + 24].fill(0);
        let mut reader = reader_over(bytes);
        let index = reader.read_archive().await.unwrap();
        let entry = &index["a.txt"];
        assert_eq!(entry.content.as_deref(), Some(&b"streamed content"[..]));
        // Sizes recovered from the descriptor
        assert_eq!(entry.uncompressed_size, 16);
        assert!(entry.compressed_size > 0);
    }

    #[tokio::test]
    async fn test_unindexed_local_entry_is_skipped() {
        let mut bytes = archive_with(&[("dropped.txt", b"ghost"), ("kept.txt", b"visible")]).await;
        // Splice the first central file header out of the directory. The
        // reader trusts the headers it encounters, not the declared count,
        // so the orphaned local record must simply be walked over.
        let first = find_sig(&bytes, SIG_CFH, 0).unwrap();
        let second = find_sig(&bytes, SIG_CFH, first + 4).unwrap();
        bytes.drain(first..second);
        let mut reader = reader_over(bytes);
        let index = reader.read_archive().await.unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index["kept.txt"].content.as_deref(), Some(&b"visible"[..]));
    }

    #[tokio::test]
    async fn test_corrupt_deflate_stream_propagates() {
        let mut bytes = archive_with(&[("a.txt", b"some compressible payload bytes")]).await;
        // Mangle the compressed payload right after the local header.
        let name_end = LFH_SIZE + "a.txt".len();
        for b in &mut bytes[name_end..name_end + 8] {
            *b = !*b;
        }
        let mut reader = reader_over(bytes);
        assert!(reader.read_archive().await.is_err());
    }

    /// Hand-built central directory carrying a ZIP64 extra record: all
    /// three 32-bit fields hold the sentinel and the extra carries the
    /// true 8-byte values in fixed order.
    #[tokio::test]
    async fn test_zip64_extra_overrides_sentinels() {
        let name = b"big.bin";
        let mut bytes = Vec::new();
        bytes.write_u32::<LittleEndian>(SIG_CFH).unwrap();
        bytes.write_u16::<LittleEndian>(45).unwrap(); // version made by
        bytes.write_u16::<LittleEndian>(45).unwrap(); // version needed
        bytes.write_u16::<LittleEndian>(0).unwrap(); // flags
        bytes.write_u16::<LittleEndian>(8).unwrap(); // method
        bytes.write_u16::<LittleEndian>(0).unwrap(); // time
        bytes.write_u16::<LittleEndian>(0).unwrap(); // date
        bytes.write_u32::<LittleEndian>(0xABCD1234).unwrap(); // crc
        bytes.write_u32::<LittleEndian>(ZIP64_SENTINEL).unwrap();
        bytes.write_u32::<LittleEndian>(ZIP64_SENTINEL).unwrap();
        bytes.write_u16::<LittleEndian>(name.len() as u16).unwrap();
        bytes.write_u16::<LittleEndian>(28).unwrap(); // extra len
        bytes.write_u16::<LittleEndian>(0).unwrap(); // comment len
        bytes.write_u16::<LittleEndian>(0).unwrap(); // disk
        bytes.write_u16::<LittleEndian>(0).unwrap(); // internal attrs
        bytes.write_u32::<LittleEndian>(0).unwrap(); // external attrs
        bytes.write_u32::<LittleEndian>(ZIP64_SENTINEL).unwrap(); // offset
        bytes.extend_from_slice(name);
        bytes.write_u16::<LittleEndian>(ZIP64_EXTRA_ID).unwrap();
        bytes.write_u16::<LittleEndian>(24).unwrap();
        bytes.write_u64::<LittleEndian>(6_000_000_000).unwrap(); // usize
        bytes.write_u64::<LittleEndian>(5_000_000_123).unwrap(); // csize
        bytes.write_u64::<LittleEndian>(4_294_967_296).unwrap(); // offset
        // EOCD terminates the pass
        bytes.write_u32::<LittleEndian>(SIG_EOCD).unwrap();
        bytes.extend_from_slice(&[0u8; 4]);
        bytes.write_u16::<LittleEndian>(1).unwrap();
        bytes.write_u16::<LittleEndian>(1).unwrap();
        bytes.write_u32::<LittleEndian>(0).unwrap();
        bytes.write_u32::<LittleEndian>(0).unwrap();
        bytes.write_u16::<LittleEndian>(0).unwrap();

        let mut reader = reader_over(bytes);
        let index = reader.read_index().await.unwrap();
        let entry = &index["big.bin"];
        assert!(entry.zip64);
        assert_eq!(entry.uncompressed_size, 6_000_000_000);
        assert_eq!(entry.compressed_size, 5_000_000_123);
        assert_eq!(entry.local_header_offset, 4_294_967_296);
    }
}
