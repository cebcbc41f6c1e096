use super::ArtifactError;
use async_trait::async_trait;
use dashmap::DashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ARTIFACT_EXTENSION: &str = "png";

/// Blob storage for rendered barcodes, addressed by serial number.
#[async_trait]
pub trait BarcodeStore: Send + Sync {
    /// Stores `png` under `key`, replacing any previous artifact.
    async fn put(&self, key: &str, png: Vec<u8>) -> Result<(), ArtifactError>;
    /// Removes the artifact under `key`. Returns whether one existed.
    async fn remove(&self, key: &str) -> Result<bool, ArtifactError>;
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ArtifactError>;
    async fn exists(&self, key: &str) -> Result<bool, ArtifactError> {
        Ok(self.get(key).await?.is_some())
    }
}

/// Keys become file names, so anything that could escape the store
/// directory is refused.
pub fn validate_key(key: &str) -> Result<(), ArtifactError> {
    let bad = key.is_empty()
        || key == "."
        || key.contains("..")
        || key
            .chars()
            .any(|c| c == '/' || c == '\\' || c == '\0' || c.is_control());
    if bad {
        Err(ArtifactError::InvalidKey(key.to_string()))
    } else {
        Ok(())
    }
}

/// One `{serial}.png` file per artifact in a single directory.
#[derive(Debug, Clone)]
pub struct FsBarcodeStore {
    root: PathBuf,
}

impl FsBarcodeStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf, ArtifactError> {
        validate_key(key)?;
        Ok(self.root.join(format!("{}.{}", key, ARTIFACT_EXTENSION)))
    }
}

#[async_trait]
impl BarcodeStore for FsBarcodeStore {
    async fn put(&self, key: &str, png: Vec<u8>) -> Result<(), ArtifactError> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.root).await?;

        // Write beside the target then rename so readers never see a partial file
        let staging = path.with_extension(format!("{}.tmp", ARTIFACT_EXTENSION));
        tokio::fs::write(&staging, &png).await?;
        if let Err(e) = tokio::fs::rename(&staging, &path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }

        debug!(path = %path.display(), bytes = png.len(), "Barcode written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, ArtifactError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Barcode removed");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ArtifactError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, ArtifactError> {
        let path = self.path_for(key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryBarcodeStore {
    artifacts: DashMap<String, Vec<u8>>,
}

impl InMemoryBarcodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.artifacts.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

#[async_trait]
impl BarcodeStore for InMemoryBarcodeStore {
    async fn put(&self, key: &str, png: Vec<u8>) -> Result<(), ArtifactError> {
        validate_key(key)?;
        self.artifacts.insert(key.to_string(), png);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, ArtifactError> {
        validate_key(key)?;
        Ok(self.artifacts.remove(key).is_some())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ArtifactError> {
        validate_key(key)?;
        Ok(self.artifacts.get(key).map(|e| e.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    #[rstest]
    #[case("HQ-ELEC-RM1-001", true)]
    #[case("LEGACY42", true)]
    #[case("", false)]
    #[case("..", false)]
    #[case("../etc/passwd", false)]
    #[case("a/b", false)]
    #[case("a\\b", false)]
    #[case("a\nb", false)]
    fn key_validation(#[case] key: &str, #[case] ok: bool) {
        assert_eq!(validate_key(key).is_ok(), ok);
    }

    #[tokio::test]
    async fn fs_store_put_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBarcodeStore::new(dir.path().join("barcodes"));

        assert!(!store.exists("HQ-ELEC-RM1-001").await.unwrap());
        store.put("HQ-ELEC-RM1-001", vec![1, 2, 3]).await.unwrap();

        let path = dir.path().join("barcodes").join("HQ-ELEC-RM1-001.png");
        assert!(path.exists());
        assert_eq!(store.get("HQ-ELEC-RM1-001").await.unwrap(), Some(vec![1, 2, 3]));

        // Overwrite in place
        store.put("HQ-ELEC-RM1-001", vec![9]).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![9]);

        assert!(store.remove("HQ-ELEC-RM1-001").await.unwrap());
        assert!(!path.exists());
        // Removing again is tolerated
        assert!(!store.remove("HQ-ELEC-RM1-001").await.unwrap());
    }

    #[tokio::test]
    async fn fs_store_refuses_escaping_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBarcodeStore::new(dir.path());
        assert_matches!(
            store.put("../outside", vec![0]).await,
            Err(ArtifactError::InvalidKey(_))
        );
        assert!(!dir.path().parent().unwrap().join("outside.png").exists());
    }

    #[tokio::test]
    async fn in_memory_store_tracks_keys() {
        let store = InMemoryBarcodeStore::new();
        store.put("B", vec![]).await.unwrap();
        store.put("A", vec![]).await.unwrap();
        assert_eq!(store.keys(), vec!["A".to_string(), "B".to_string()]);
        assert!(store.exists("A").await.unwrap());
        assert!(store.remove("A").await.unwrap());
        assert_eq!(store.len(), 1);
    }
}
