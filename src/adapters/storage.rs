use crate::domain::ports::ExportSink;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use zip::write::{FileOptions, ZipWriter};

/// Writes export files under a base directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Remove previous output and recreate the base directory.
    pub async fn reset(&self) -> Result<()> {
        if tokio::fs::try_exists(&self.base_path).await? {
            tokio::fs::remove_dir_all(&self.base_path).await?;
        }
        tokio::fs::create_dir_all(&self.base_path).await?;
        Ok(())
    }
}

#[async_trait]
impl ExportSink for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.base_path.join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(full_path, data).await?;
        Ok(())
    }

    async fn finish(&self) -> Result<String> {
        Ok(self.base_path.display().to_string())
    }
}

type ArchiveWriter = ZipWriter<std::io::Cursor<Vec<u8>>>;

/// Collects export files into one zip archive written on `finish`.
pub struct ZipStorage {
    archive_path: PathBuf,
    writer: Mutex<Option<ArchiveWriter>>,
}

impl ZipStorage {
    pub fn new(archive_path: impl AsRef<Path>) -> Self {
        Self {
            archive_path: archive_path.as_ref().to_path_buf(),
            writer: Mutex::new(Some(ZipWriter::new(std::io::Cursor::new(Vec::new())))),
        }
    }

    fn with_writer<T>(&self, f: impl FnOnce(&mut ArchiveWriter) -> Result<T>) -> Result<T> {
        let mut guard = self
            .writer
            .lock()
            .map_err(|_| std::io::Error::other("zip writer lock poisoned"))?;
        let writer = guard
            .as_mut()
            .ok_or_else(|| std::io::Error::other("zip archive already finished"))?;
        f(writer)
    }

    fn take_writer(&self) -> Result<ArchiveWriter> {
        let mut guard = self
            .writer
            .lock()
            .map_err(|_| std::io::Error::other("zip writer lock poisoned"))?;
        Ok(guard
            .take()
            .ok_or_else(|| std::io::Error::other("zip archive already finished"))?)
    }
}

#[async_trait]
impl ExportSink for ZipStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        self.with_writer(|zip| {
            zip.start_file::<_, ()>(path, FileOptions::default())?;
            zip.write_all(data)?;
            Ok(())
        })
    }

    async fn finish(&self) -> Result<String> {
        // 完成並取回底層 Vec<u8>
        let cursor = self.take_writer()?.finish()?;
        let zip_data = cursor.into_inner();

        if let Some(parent) = self.archive_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tracing::debug!("Writing ZIP file ({} bytes)", zip_data.len());
        tokio::fs::write(&self.archive_path, zip_data).await?;
        Ok(self.archive_path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_storage_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        storage.write_file("provinces/1501.json", b"{}").await.unwrap();

        let written = std::fs::read(temp_dir.path().join("provinces/1501.json")).unwrap();
        assert_eq!(written, b"{}");
        assert_eq!(
            storage.finish().await.unwrap(),
            temp_dir.path().display().to_string()
        );
    }

    #[tokio::test]
    async fn test_local_storage_reset_clears_output() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("dist");
        let storage = LocalStorage::new(&base);

        storage.write_file("stale.json", b"[]").await.unwrap();
        storage.reset().await.unwrap();

        assert!(base.exists());
        assert!(!base.join("stale.json").exists());
    }

    #[tokio::test]
    async fn test_zip_storage() {
        let temp_dir = TempDir::new().unwrap();
        let archive_path = temp_dir.path().join("out/ubigeo.zip");
        let storage = ZipStorage::new(&archive_path);

        storage.write_file("hierarchy.json", b"[]").await.unwrap();
        storage.write_file("districts/150122.json", b"{}").await.unwrap();
        storage.finish().await.unwrap();

        let zip_data = std::fs::read(&archive_path).unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut content = String::new();
        std::io::Read::read_to_string(&mut archive.by_name("hierarchy.json").unwrap(), &mut content)
            .unwrap();
        assert_eq!(content, "[]");

        assert!(storage.write_file("late.json", b"{}").await.is_err());
    }
}
