/// Local upload storage
///
/// Files land under a single directory with collision-free names; the
/// returned reference string is what posts store and clients request back.
use crate::error::{AppError, Result};
use chrono::Utc;
use std::path::PathBuf;
use tokio::fs;
use uuid::Uuid;

#[derive(Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn ensure_root(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    /// Collision-free stored name: `YYYYMMDDHHMMSS-<uuid>[.ext]`. The
    /// extension survives from the client filename when one is present;
    /// dot-files keep their full name as the extension.
    pub fn unique_name(original: Option<&str>) -> String {
        let stamp = Utc::now().format("%Y%m%d%H%M%S");
        let unique = Uuid::new_v4();

        let extension = match original.map(str::trim) {
            None | Some("") => ".dat".to_string(),
            Some(name) => match name.rfind('.') {
                Some(0) => name.to_string(),
                Some(idx) if idx < name.len() - 1 => name[idx..].to_string(),
                _ => String::new(),
            },
        };

        format!("{stamp}-{unique}{extension}")
    }

    /// Open a fresh file for an incoming upload. Returns the writable handle
    /// and the public reference (`<root>/<name>`).
    pub async fn create(&self, original_name: Option<&str>) -> Result<(fs::File, String)> {
        let name = Self::unique_name(original_name);
        let path = self.root.join(&name);

        let file = fs::File::create(&path)
            .await
            .map_err(|e| AppError::Internal(format!("failed to create upload file: {}", e)))?;

        let reference = format!("{}/{}", self.root.display(), name);
        Ok((file, reference))
    }

    /// Resolve a stored name back to its path, refusing anything that could
    /// escape the upload directory.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
            return Err(AppError::BadRequest("invalid file name".to_string()));
        }

        Ok(self.root.join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[test]
    fn unique_name_keeps_extension() {
        let name = MediaStore::unique_name(Some("holiday.jpg"));
        assert!(name.ends_with(".jpg"));
        assert!(name.matches('-').count() >= 5); // stamp separator + uuid dashes
    }

    #[test]
    fn unique_name_handles_missing_or_odd_names() {
        assert!(MediaStore::unique_name(None).ends_with(".dat"));
        assert!(MediaStore::unique_name(Some("")).ends_with(".dat"));
        assert!(MediaStore::unique_name(Some(".bashrc")).ends_with(".bashrc"));
        // trailing dot or no dot: no extension at all
        let bare = MediaStore::unique_name(Some("archive"));
        assert!(!bare.contains('.'));
    }

    #[test]
    fn unique_names_do_not_collide() {
        let a = MediaStore::unique_name(Some("a.png"));
        let b = MediaStore::unique_name(Some("a.png"));
        assert_ne!(a, b);
    }

    #[test]
    fn resolve_rejects_traversal() {
        let store = MediaStore::new("uploads");
        assert!(store.resolve("../etc/passwd").is_err());
        assert!(store.resolve("a/b.jpg").is_err());
        assert!(store.resolve("").is_err());
        assert!(store.resolve("ok.jpg").is_ok());
    }

    #[tokio::test]
    async fn create_writes_under_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = MediaStore::new(dir.path());
        store.ensure_root().await.expect("ensure root");

        let (mut file, reference) = store.create(Some("pic.jpg")).await.expect("create");
        file.write_all(b"bytes").await.expect("write");
        file.flush().await.expect("flush");

        let name = reference.rsplit('/').next().expect("name component");
        let path = store.resolve(name).expect("resolve");
        let data = tokio::fs::read(&path).await.expect("read back");
        assert_eq!(data, b"bytes");
    }
}
