use super::error::InfrastructureError;
use crate::domain::image::is_supported_input;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

pub struct LocalFileStorage;

impl LocalFileStorage {
    pub fn new() -> Self {
        Self
    }

    pub async fn save_image_impl(&self, path: &Path, data: &[u8]) -> Result<(), InfrastructureError> {
        let mut file = File::create(path).await.map_err(InfrastructureError::IoError)?;
        file.write_all(data).await.map_err(InfrastructureError::IoError)?;
        file.flush().await.map_err(InfrastructureError::IoError)?;
        Ok(())
    }

    pub async fn read_image_impl(&self, path: &Path) -> Result<Vec<u8>, InfrastructureError> {
        let data = fs::read(path).await.map_err(InfrastructureError::IoError)?;
        Ok(data)
    }

    /// Creates each directory that does not exist yet and returns the ones
    /// it created.
    pub async fn ensure_dirs(&self, dirs: &[&Path]) -> Result<Vec<PathBuf>, InfrastructureError> {
        let mut created = Vec::new();
        for dir in dirs {
            if fs::metadata(dir).await.is_ok() {
                continue;
            }
            fs::create_dir_all(dir).await.map_err(|e| {
                InfrastructureError::FileStorageError(format!("cannot create {:?}: {}", dir, e))
            })?;
            created.push(dir.to_path_buf());
        }
        Ok(created)
    }

    /// Regular files in `dir` (not recursive) with a supported image
    /// extension, sorted by path.
    pub async fn list_images(&self, dir: &Path) -> Result<Vec<PathBuf>, InfrastructureError> {
        let mut entries = fs::read_dir(dir).await.map_err(|e| {
            InfrastructureError::FileStorageError(format!("cannot list {:?}: {}", dir, e))
        })?;

        let mut images = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file() && is_supported_input(&path) {
                images.push(path);
            } else {
                debug!("Skipping {:?}", path);
            }
        }
        images.sort();
        Ok(images)
    }

    /// Moves a processed original into `archive_dir`, keeping its file name.
    pub async fn archive_impl(&self, path: &Path, archive_dir: &Path) -> Result<PathBuf, InfrastructureError> {
        let file_name = path.file_name().ok_or_else(|| {
            InfrastructureError::FileStorageError(format!("{:?} has no file name", path))
        })?;
        let destination = archive_dir.join(file_name);
        if fs::rename(path, &destination).await.is_err() {
            // Rename cannot cross filesystems; fall back to copy + delete.
            fs::copy(path, &destination).await?;
            fs::remove_file(path).await?;
        }
        Ok(destination)
    }
}
