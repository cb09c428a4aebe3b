use super::ReadAt;
use anyhow::Result;
use async_trait::async_trait;

/// In-memory reader over a finished archive buffer.
///
/// Bridges the writer's output back into the reader without touching the
/// filesystem.
pub struct MemReader {
    data: Vec<u8>,
}

impl MemReader {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

#[async_trait]
impl ReadAt for MemReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        if offset >= self.data.len() as u64 {
            return Ok(0);
        }
        let start = offset as usize;
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        Ok(n)
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
