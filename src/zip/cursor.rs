//! Buffered byte cursor over a random-access source.
//!
//! The cursor keeps an accumulation buffer that is refilled lazily in
//! bounded chunks, so records can be peeked and consumed without the caller
//! knowing where the underlying reads fall. Seeking re-synchronizes the
//! buffer to an absolute offset via positional reads; nothing is ever
//! re-read from the start of the source.

use anyhow::{Result, bail};
use byteorder::{LittleEndian, ReadBytesExt};
use std::sync::Arc;

use crate::io::ReadAt;

/// Default refill chunk size for buffered reads
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Callback receiving bytes skipped over by a signature search, delivered
/// in bounded-size batches.
pub type ChunkSink<'a> = &'a mut (dyn FnMut(&[u8]) -> Result<()> + Send);

/// Buffered, lazily-refilling cursor with a boundary-safe signature search.
pub struct ZipCursor<R: ReadAt> {
    reader: Arc<R>,
    /// Total size of the underlying source in bytes
    size: u64,
    /// Absolute offset of the first unconsumed byte
    position: u64,
    /// Unconsumed bytes starting at `position`
    buf: Vec<u8>,
    chunk_size: usize,
}

impl<R: ReadAt> ZipCursor<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self::with_chunk_size(reader, DEFAULT_CHUNK_SIZE)
    }

    /// Create a cursor with a custom refill chunk size. Small sizes force
    /// refill boundaries inside payloads, which the search handles the same
    /// as large ones.
    pub fn with_chunk_size(reader: Arc<R>, chunk_size: usize) -> Self {
        let size = reader.size();
        Self {
            reader,
            size,
            position: 0,
            buf: Vec::new(),
            chunk_size: chunk_size.max(4),
        }
    }

    /// Absolute offset of the next unconsumed byte
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Total size of the underlying source
    pub fn source_size(&self) -> u64 {
        self.size
    }

    /// Reposition to an absolute offset, discarding the buffer
    pub fn seek(&mut self, offset: u64) {
        self.buf.clear();
        self.position = offset;
    }

    /// True when no bytes remain beyond the current buffer
    fn at_source_end(&self) -> bool {
        self.position + self.buf.len() as u64 >= self.size
    }

    /// Pull chunks from the source until `want` bytes are buffered or the
    /// source is exhausted.
    async fn fill(&mut self, want: usize) -> Result<()> {
        while self.buf.len() < want && !self.at_source_end() {
            let at = self.position + self.buf.len() as u64;
            let mut chunk = vec![0u8; self.chunk_size];
            let got = self.reader.read_at(at, &mut chunk).await?;
            if got == 0 {
                break;
            }
            chunk.truncate(got);
            self.buf.extend_from_slice(&chunk);
        }
        Ok(())
    }

    /// Return up to `n` bytes without consuming them. A short slice means
    /// the source ended.
    pub async fn peek(&mut self, n: usize) -> Result<&[u8]> {
        self.fill(n).await?;
        Ok(&self.buf[..n.min(self.buf.len())])
    }

    /// Return and consume up to `n` bytes. A short result means the source
    /// ended; it is not an error.
    pub async fn consume(&mut self, n: usize) -> Result<Vec<u8>> {
        self.fill(n).await?;
        let take = n.min(self.buf.len());
        let bytes: Vec<u8> = self.buf.drain(..take).collect();
        self.position += take as u64;
        Ok(bytes)
    }

    /// Consume exactly `n` bytes; exhaustion mid-read is a malformed-archive
    /// error, not a silent zero-fill.
    pub async fn consume_exact(&mut self, n: usize) -> Result<Vec<u8>> {
        let bytes = self.consume(n).await?;
        if bytes.len() < n {
            bail!(
                "malformed archive: unexpected end of stream at offset {} ({} bytes required, {} available)",
                self.position,
                n,
                bytes.len()
            );
        }
        Ok(bytes)
    }

    pub async fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.consume_exact(2).await?;
        Ok(bytes.as_slice().read_u16::<LittleEndian>()?)
    }

    pub async fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.consume_exact(4).await?;
        Ok(bytes.as_slice().read_u32::<LittleEndian>()?)
    }

    pub async fn read_u64(&mut self) -> Result<u64> {
        let bytes = self.consume_exact(8).await?;
        Ok(bytes.as_slice().read_u64::<LittleEndian>()?)
    }

    /// Peek the next 4 bytes as a little-endian signature, if available
    pub async fn peek_signature(&mut self) -> Result<Option<u32>> {
        let bytes = self.peek(4).await?;
        if bytes.len() < 4 {
            return Ok(None);
        }
        Ok(Some(u32::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3],
        ])))
    }

    /// Consume bytes until the next 4 bytes equal the little-endian `sig`,
    /// leaving the cursor positioned at the signature. Skipped bytes are
    /// delivered to `on_chunk` in bounded batches, so an unbounded payload
    /// run can be streamed rather than buffered in full.
    ///
    /// Returns `false` when the source is exhausted without a match; the
    /// remaining bytes are still delivered. The buffer retains three
    /// trailing bytes across refills so a signature straddling two refills
    /// is found, and a near-miss never triggers early.
    pub async fn search_signature(
        &mut self,
        sig: u32,
        mut on_chunk: Option<ChunkSink<'_>>,
    ) -> Result<bool> {
        let needle = sig.to_le_bytes();
        loop {
            self.fill(self.chunk_size).await?;

            if let Some(at) = self.buf.windows(4).position(|w| w == needle) {
                self.skip(at, &mut on_chunk)?;
                return Ok(true);
            }

            if self.at_source_end() {
                let rest = self.buf.len();
                self.skip(rest, &mut on_chunk)?;
                return Ok(false);
            }

            // Keep the last 3 bytes so the 4-byte comparison stays correct
            // across the refill boundary.
            let emit = self.buf.len().saturating_sub(3);
            self.skip(emit, &mut on_chunk)?;
        }
    }

    /// Consume `n` buffered bytes, handing them to the sink in batches no
    /// larger than the refill chunk size.
    fn skip(&mut self, n: usize, on_chunk: &mut Option<ChunkSink<'_>>) -> Result<()> {
        let mut left = n;
        while left > 0 {
            let take = left.min(self.chunk_size);
            if let Some(sink) = on_chunk.as_mut() {
                sink(&self.buf[..take])?;
            }
            self.buf.drain(..take);
            self.position += take as u64;
            left -= take;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemReader;
    use crate::zip::structures::SIG_DD;

    fn cursor_over(data: Vec<u8>, chunk: usize) -> ZipCursor<MemReader> {
        ZipCursor::with_chunk_size(Arc::new(MemReader::new(data)), chunk)
    }

    #[tokio::test]
    async fn test_short_read_at_end_is_not_an_error() {
        let mut cursor = cursor_over(vec![1, 2, 3, 4, 5], 4);
        let bytes = cursor.consume(10).await.unwrap();
        assert_eq!(bytes, vec![1, 2, 3, 4, 5]);
        assert!(cursor.consume(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_consume_exact_fails_on_exhaustion() {
        let mut cursor = cursor_over(vec![1, 2, 3], 4);
        let err = cursor.consume_exact(4).await.unwrap_err();
        assert!(err.to_string().contains("malformed archive"));
    }

    #[tokio::test]
    async fn test_peek_does_not_advance() {
        let mut cursor = cursor_over(vec![0x50, 0x4b, 0x07, 0x08, 0xaa], 2);
        assert_eq!(cursor.peek(4).await.unwrap(), &[0x50, 0x4b, 0x07, 0x08]);
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.peek_signature().await.unwrap(), Some(SIG_DD));
        assert_eq!(cursor.read_u32().await.unwrap(), SIG_DD);
        assert_eq!(cursor.position(), 4);
    }

    #[tokio::test]
    async fn test_numeric_reads_little_endian() {
        let mut data = Vec::new();
        data.extend_from_slice(&0x1234u16.to_le_bytes());
        data.extend_from_slice(&0xDEADBEEFu32.to_le_bytes());
        data.extend_from_slice(&0x1_0000_0001u64.to_le_bytes());
        let mut cursor = cursor_over(data, 3);
        assert_eq!(cursor.read_u16().await.unwrap(), 0x1234);
        assert_eq!(cursor.read_u32().await.unwrap(), 0xDEADBEEF);
        assert_eq!(cursor.read_u64().await.unwrap(), 0x1_0000_0001);
    }

    #[tokio::test]
    async fn test_seek_resynchronizes() {
        let mut cursor = cursor_over((0u8..100).collect(), 8);
        cursor.consume(10).await.unwrap();
        cursor.seek(50);
        assert_eq!(cursor.consume(2).await.unwrap(), vec![50, 51]);
        cursor.seek(3);
        assert_eq!(cursor.consume(2).await.unwrap(), vec![3, 4]);
    }

    #[tokio::test]
    async fn test_search_signature_across_refill_boundary() {
        // Near-miss prefix ("PK\x07\x07") followed by the real signature
        // placed so its four bytes straddle the 8-byte refill boundary.
        let mut data = b"ABPK\x07\x07".to_vec();
        data.extend_from_slice(&SIG_DD.to_le_bytes()); // offsets 6..10
        data.extend_from_slice(b"tail");
        let mut cursor = cursor_over(data, 8);

        let mut skipped = Vec::new();
        let mut sink = |chunk: &[u8]| -> Result<()> {
            skipped.extend_from_slice(chunk);
            Ok(())
        };
        let found = cursor.search_signature(SIG_DD, Some(&mut sink)).await.unwrap();
        assert!(found);
        assert_eq!(cursor.position(), 6);
        assert_eq!(skipped, b"ABPK\x07\x07");
        assert_eq!(cursor.read_u32().await.unwrap(), SIG_DD);
    }

    #[tokio::test]
    async fn test_search_signature_exhaustion() {
        let mut cursor = cursor_over(b"no signature here".to_vec(), 4);
        let mut skipped = Vec::new();
        let mut sink = |chunk: &[u8]| -> Result<()> {
            skipped.extend_from_slice(chunk);
            Ok(())
        };
        let found = cursor.search_signature(SIG_DD, Some(&mut sink)).await.unwrap();
        assert!(!found);
        assert_eq!(skipped, b"no signature here");
        assert_eq!(cursor.position(), 17);
    }

    #[tokio::test]
    async fn test_search_signature_at_start() {
        let mut data = SIG_DD.to_le_bytes().to_vec();
        data.extend_from_slice(b"xyz");
        let mut cursor = cursor_over(data, 8);
        assert!(cursor.search_signature(SIG_DD, None).await.unwrap());
        assert_eq!(cursor.position(), 0);
    }
}
