pub mod area;

use std::path::PathBuf;

use thiserror::Error;

pub use area::{StorageArea, StoredImage};

pub const UPLOADS_LABEL: &str = "uploads";
pub const OUTPUTS_LABEL: &str = "outputs";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("Refusing to store under name {0:?}")]
    InvalidName(String),
    #[error("Failed to create directory {0:?}: {1}")]
    CreateDir(PathBuf, std::io::Error),
    #[error("Failed to write {0:?}: {1}")]
    Write(PathBuf, std::io::Error),
    #[error("Failed to read {0:?}: {1}")]
    Read(PathBuf, std::io::Error),
}

/// The uploads area, written by clients, and the outputs area, written by the
/// external annotation process.
#[derive(Debug, Clone)]
pub struct Storage {
    pub uploads: StorageArea,
    pub outputs: StorageArea,
}

impl Storage {
    pub fn new(uploads_dir: impl Into<PathBuf>, outputs_dir: impl Into<PathBuf>) -> Self {
        Self {
            uploads: StorageArea::new(UPLOADS_LABEL, uploads_dir),
            outputs: StorageArea::new(OUTPUTS_LABEL, outputs_dir),
        }
    }

    pub async fn ensure(&self) -> Result<(), StorageError> {
        self.uploads.ensure().await?;
        self.outputs.ensure().await
    }
}
