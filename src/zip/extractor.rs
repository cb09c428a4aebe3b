//! High-level extraction API.
//!
//! Thin orchestration over [`ZipReader`]: read an archive into a
//! name-to-entry map, or unpack it into a destination folder. Writing
//! extracted bytes to the filesystem lives here, outside the format core.

use std::path::Path;
use std::sync::Arc;
use tokio::fs;

use crate::io::{LocalFileReader, ReadAt};
use anyhow::Result;

use super::reader::ZipReader;
use super::structures::ArchiveIndex;

/// ZIP archive extractor
pub struct ZipExtractor<R: ReadAt> {
    reader: Arc<R>,
}

impl<R: ReadAt> ZipExtractor<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self { reader }
    }

    /// Build the archive index without extracting any content
    pub async fn read_index(&self) -> Result<ArchiveIndex> {
        ZipReader::new(self.reader.clone()).read_index().await
    }

    /// Read the whole archive: every indexed entry with its decompressed
    /// content attached.
    pub async fn read_archive(&self) -> Result<ArchiveIndex> {
        ZipReader::new(self.reader.clone()).read_archive().await
    }

    /// Extract the archive's contents into the destination folder,
    /// creating any necessary directories along the way.
    pub async fn extract_into_folder(&self, dest: &Path) -> Result<()> {
        let index = self.read_archive().await?;
        for entry in index.values() {
            let dest_path = dest.join(&entry.name);
            if entry.is_directory() {
                fs::create_dir_all(&dest_path).await?;
                continue;
            }
            if let Some(parent) = dest_path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).await?;
                }
            }
            fs::write(&dest_path, entry.content.as_deref().unwrap_or_default()).await?;
        }
        Ok(())
    }
}

/// Read a zip file into a map of entry name to record, content included
pub async fn read_zip_file(zip_path: &Path) -> Result<ArchiveIndex> {
    let reader = Arc::new(LocalFileReader::new(zip_path)?);
    ZipExtractor::new(reader).read_archive().await
}

/// Extract the contents of a zip file into the destination folder
pub async fn extract_zip_file(zip_path: &Path, dest_folder: &Path) -> Result<()> {
    let reader = Arc::new(LocalFileReader::new(zip_path)?);
    ZipExtractor::new(reader).extract_into_folder(dest_folder).await
}
