mod local;
mod memory;

pub use local::LocalFileReader;
pub use memory::MemReader;

use anyhow::Result;
use async_trait::async_trait;

/// Trait for random access reading from a data source.
///
/// A short read at end-of-source is valid and is reported as fewer bytes
/// than requested, never as an error.
#[async_trait]
pub trait ReadAt: Send + Sync {
    /// Read data at the specified offset into the buffer
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize>;

    /// Get the total size of the data source
    fn size(&self) -> u64;
}
