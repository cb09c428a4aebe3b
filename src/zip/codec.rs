//! Raw-deflate collaborator seam.
//!
//! The container layer never inspects compressed bytes; it feeds chunks in
//! and takes the finished stream out. Decode errors surface to the caller
//! unchanged.

use anyhow::{Context, Result, bail};
use flate2::Compression;
use flate2::write::{DeflateDecoder, DeflateEncoder};
use std::io::Write;

use super::structures::CompressionMethod;

/// Streaming encoder writing compressed bytes onto a caller-supplied sink.
///
/// For the Deflate variant the sink receives a raw deflate stream (no zlib
/// or gzip wrapper); Stored passes bytes through untouched.
pub enum ContentEncoder {
    Stored(Vec<u8>),
    Deflate(DeflateEncoder<Vec<u8>>),
}

impl ContentEncoder {
    pub fn new(method: CompressionMethod, sink: Vec<u8>, level: Compression) -> Result<Self> {
        match method {
            CompressionMethod::Stored => Ok(ContentEncoder::Stored(sink)),
            CompressionMethod::Deflate => {
                Ok(ContentEncoder::Deflate(DeflateEncoder::new(sink, level)))
            }
            CompressionMethod::Unknown(v) => {
                bail!("unsupported compression method: {v}")
            }
        }
    }

    pub fn write(&mut self, chunk: &[u8]) -> Result<()> {
        match self {
            ContentEncoder::Stored(sink) => {
                sink.extend_from_slice(chunk);
                Ok(())
            }
            ContentEncoder::Deflate(encoder) => {
                encoder.write_all(chunk).context("deflate encoding failed")
            }
        }
    }

    /// Flush the compressed stream and return the sink
    pub fn finish(self) -> Result<Vec<u8>> {
        match self {
            ContentEncoder::Stored(sink) => Ok(sink),
            ContentEncoder::Deflate(encoder) => {
                encoder.finish().context("deflate encoding failed")
            }
        }
    }
}

/// Streaming decoder accumulating decompressed bytes.
pub enum ContentDecoder {
    Stored(Vec<u8>),
    Deflate(DeflateDecoder<Vec<u8>>),
}

impl ContentDecoder {
    pub fn new(method: CompressionMethod) -> Result<Self> {
        match method {
            CompressionMethod::Stored => Ok(ContentDecoder::Stored(Vec::new())),
            CompressionMethod::Deflate => {
                Ok(ContentDecoder::Deflate(DeflateDecoder::new(Vec::new())))
            }
            CompressionMethod::Unknown(v) => {
                bail!("unsupported compression method: {v}")
            }
        }
    }

    pub fn write(&mut self, chunk: &[u8]) -> Result<()> {
        match self {
            ContentDecoder::Stored(out) => {
                out.extend_from_slice(chunk);
                Ok(())
            }
            ContentDecoder::Deflate(decoder) => decoder
                .write_all(chunk)
                .context("corrupt deflate stream in entry payload"),
        }
    }

    /// Signal end-of-stream and return the decoded bytes. A truncated or
    /// corrupt deflate stream fails here.
    pub fn finish(self) -> Result<Vec<u8>> {
        match self {
            ContentDecoder::Stored(out) => Ok(out),
            ContentDecoder::Deflate(decoder) => decoder
                .finish()
                .context("corrupt deflate stream in entry payload"),
        }
    }
}
