// media/mod.rs — Local-disk object store for gallery images.
//
// Uploaded binaries land under `{data_dir}/media` as `{uuid}.{ext}` and are
// served read-only at `/media/...` by the REST layer. Only the public URL
// path is ever persisted in a room's gallery payload.

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use uuid::Uuid;

const PUBLIC_PREFIX: &str = "/media/";
const MAX_EXT_LEN: usize = 8;

pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    /// Open (and create if missing) the media directory.
    pub async fn new(root: PathBuf) -> Result<Self> {
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("failed to create media directory {}", root.display()))?;
        Ok(Self { root })
    }

    /// Directory served at `/media` by the HTTP layer.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store one uploaded binary and return its public URL path.
    ///
    /// The stored name is a fresh uuid plus a sanitized extension taken from
    /// the client filename — the client name itself never reaches the disk.
    pub async fn save(&self, bytes: &[u8], original_name: &str) -> Result<String> {
        let ext = sanitize_extension(original_name);
        let file = format!("{}.{ext}", Uuid::new_v4());
        let path = self.root.join(&file);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("failed to write media file {}", path.display()))?;
        Ok(format!("{PUBLIC_PREFIX}{file}"))
    }

    /// Best-effort removal of a previously saved file.
    ///
    /// Only URL paths of the exact `/media/{file}` shape are touched; anything
    /// else (external URLs, traversal attempts) is ignored.
    pub async fn delete(&self, public_url: &str) -> Result<()> {
        let Some(file) = public_url.strip_prefix(PUBLIC_PREFIX) else {
            return Ok(());
        };
        if file.is_empty() || file.contains('/') || file.contains("..") {
            return Ok(());
        }
        match tokio::fs::remove_file(self.root.join(file)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keep a short lowercase-alphanumeric extension; everything else becomes "bin".
fn sanitize_extension(name: &str) -> String {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext.is_empty() || ext.len() > MAX_EXT_LEN || !ext.bytes().all(|b| b.is_ascii_alphanumeric())
    {
        "bin".to_string()
    } else {
        ext
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_plain_extensions() {
        assert_eq!(sanitize_extension("heater.JPG"), "jpg");
        assert_eq!(sanitize_extension("photo.webp"), "webp");
    }

    #[test]
    fn sanitize_rejects_odd_extensions() {
        assert_eq!(sanitize_extension("noext"), "bin");
        assert_eq!(sanitize_extension("weird.tar.gz../x"), "bin");
        assert_eq!(sanitize_extension("a.superlongext"), "bin");
    }

    #[tokio::test]
    async fn save_then_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path().join("media")).await.unwrap();

        let url = store.save(b"img-bytes", "heater.png").await.unwrap();
        assert!(url.starts_with("/media/"));
        assert!(url.ends_with(".png"));

        let file = store.root().join(url.strip_prefix("/media/").unwrap());
        assert!(file.exists());

        store.delete(&url).await.unwrap();
        assert!(!file.exists());

        // Deleting again (or deleting nonsense) is not an error.
        store.delete(&url).await.unwrap();
        store.delete("https://elsewhere.example/x.png").await.unwrap();
        store.delete("/media/../escape").await.unwrap();
    }
}
