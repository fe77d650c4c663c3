use std::path::{Component, Path, PathBuf};

use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::{debug, warn};

use crate::storage::StorageError;

/// An open image file ready to be streamed.
#[derive(Debug)]
pub struct StoredImage {
    pub file: File,
    pub len: u64,
}

/// A flat directory of image files addressed by filename.
#[derive(Debug, Clone)]
pub struct StorageArea {
    label: String,
    root: PathBuf,
}

impl StorageArea {
    pub fn new(label: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `uploads/input1.jpg` style path used in client-facing messages.
    pub fn display_path(&self, filename: &str) -> String {
        format!("{}/{}", self.label, filename)
    }

    pub async fn ensure(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StorageError::CreateDir(self.root.clone(), e))?;
        debug!("Storage area {} ready at {:?}", self.label, self.root);
        Ok(())
    }

    /// Writes `bytes` to `filename`, replacing any previous contents.
    pub async fn store(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, StorageError> {
        let path = self
            .resolve(filename)
            .ok_or_else(|| StorageError::InvalidName(filename.to_string()))?;
        let mut file = File::create(&path)
            .await
            .map_err(|e| StorageError::Write(path.clone(), e))?;
        file.write_all(bytes)
            .await
            .map_err(|e| StorageError::Write(path.clone(), e))?;
        file.flush()
            .await
            .map_err(|e| StorageError::Write(path.clone(), e))?;
        debug!("Stored {} bytes at {:?}", bytes.len(), path);
        Ok(path)
    }

    pub async fn exists(&self, filename: &str) -> bool {
        let Some(path) = self.resolve(filename) else {
            return false;
        };
        tokio::fs::try_exists(&path).await.unwrap_or(false) && self.contains(&path).await
    }

    pub async fn open(&self, filename: &str) -> Result<StoredImage, StorageError> {
        let not_found = || StorageError::NotFound(self.display_path(filename));
        let path = self.resolve(filename).ok_or_else(not_found)?;

        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => return Err(not_found()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(StorageError::Read(path, e)),
        };
        if !self.contains(&path).await {
            warn!("Refusing to serve {:?}, it resolves outside {:?}", path, self.root);
            return Err(not_found());
        }

        let file = File::open(&path)
            .await
            .map_err(|e| StorageError::Read(path.clone(), e))?;
        Ok(StoredImage {
            file,
            len: metadata.len(),
        })
    }

    pub async fn read(&self, filename: &str) -> Result<Vec<u8>, StorageError> {
        let StoredImage { mut file, len } = self.open(filename).await?;
        let mut bytes = Vec::with_capacity(len as usize);
        file.read_to_end(&mut bytes)
            .await
            .map_err(|e| StorageError::Read(self.root.join(filename), e))?;
        Ok(bytes)
    }

    /// Joins `filename` onto the root, accepting only a single plain component.
    fn resolve(&self, filename: &str) -> Option<PathBuf> {
        let mut components = Path::new(filename).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) if name == filename => {
                Some(self.root.join(name))
            }
            _ => None,
        }
    }

    /// Whether `path` still lands inside the root once symlinks are followed.
    async fn contains(&self, path: &Path) -> bool {
        let (Ok(root), Ok(path)) = (
            tokio::fs::canonicalize(&self.root).await,
            tokio::fs::canonicalize(path).await,
        ) else {
            return false;
        };
        path.starts_with(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn area() -> (TempDir, StorageArea) {
        let dir = TempDir::new().unwrap();
        let area = StorageArea::new("uploads", dir.path().join("uploads"));
        area.ensure().await.unwrap();
        (dir, area)
    }

    #[tokio::test]
    async fn ensure_is_idempotent() {
        let (_dir, area) = area().await;
        area.ensure().await.unwrap();
        assert!(area.root().is_dir());
    }

    #[tokio::test]
    async fn store_then_read() {
        let (_dir, area) = area().await;
        assert!(!area.exists("input1.jpg").await);

        area.store("input1.jpg", b"first").await.unwrap();
        assert!(area.exists("input1.jpg").await);
        assert_eq!(area.read("input1.jpg").await.unwrap(), b"first");
    }

    #[tokio::test]
    async fn store_overwrites_previous_bytes() {
        let (_dir, area) = area().await;
        area.store("input1.jpg", b"a much longer first body").await.unwrap();
        area.store("input1.jpg", b"second").await.unwrap();
        assert_eq!(area.read("input1.jpg").await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn open_reports_length() {
        let (_dir, area) = area().await;
        area.store("input2.png", &[0u8; 37]).await.unwrap();
        assert_eq!(area.open("input2.png").await.unwrap().len, 37);
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let (_dir, area) = area().await;
        match area.read("doesnotexist.jpg").await {
            Err(StorageError::NotFound(path)) => assert_eq!(path, "uploads/doesnotexist.jpg"),
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn traversal_names_are_not_found() {
        let (dir, area) = area().await;
        std::fs::write(dir.path().join("secret.txt"), b"secret").unwrap();

        for name in ["../secret.txt", "./../secret.txt", "sub/secret.txt", "/etc/passwd", "", ".", ".."] {
            assert!(
                matches!(area.open(name).await, Err(StorageError::NotFound(_))),
                "{name:?} should not resolve"
            );
            assert!(!area.exists(name).await);
        }
    }

    #[tokio::test]
    async fn store_rejects_traversal_names() {
        let (_dir, area) = area().await;
        assert!(matches!(
            area.store("../escape.jpg", b"x").await,
            Err(StorageError::InvalidName(_))
        ));
    }

    #[tokio::test]
    async fn directories_are_not_served() {
        let (_dir, area) = area().await;
        std::fs::create_dir(area.root().join("nested")).unwrap();
        assert!(matches!(area.open("nested").await, Err(StorageError::NotFound(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinks_leaving_the_area_are_not_served() {
        let (dir, area) = area().await;
        let outside = dir.path().join("outside.jpg");
        std::fs::write(&outside, b"outside").unwrap();
        std::os::unix::fs::symlink(&outside, area.root().join("link.jpg")).unwrap();
        assert!(matches!(area.open("link.jpg").await, Err(StorageError::NotFound(_))));
        assert!(!area.exists("link.jpg").await);
    }
}
