use std::path::{Path, PathBuf};

use anyhow::Result;
use tokio::fs;
use tracing::info;
use uuid::Uuid;

/// On-disk storage for uploaded attachments.
///
/// Files are stored flat under the upload directory, named by a generated
/// UUID plus the sanitized extension of the original filename. Only the
/// stored name is persisted on the owning entity.
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub async fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Attachment storage directory: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn file_path(&self, stored_name: &str) -> PathBuf {
        self.dir.join(stored_name)
    }

    /// Persist an attachment, returning the generated stored name.
    pub async fn save_attachment(&self, original_name: &str, data: &[u8]) -> Result<String> {
        let stored_name = match sanitized_extension(original_name) {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };

        fs::write(self.dir.join(&stored_name), data).await?;
        Ok(stored_name)
    }

    pub async fn delete_attachment(&self, stored_name: &str) -> Result<()> {
        match fs::remove_file(self.dir.join(stored_name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Extension of the client-supplied filename, restricted to short alphanumeric
/// suffixes. Anything else (traversal attempts, no extension) yields None.
fn sanitized_extension(original_name: &str) -> Option<&str> {
    let ext = Path::new(original_name).extension()?.to_str()?;
    if ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(ext)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_extension() {
        assert_eq!(sanitized_extension("scan.pdf"), Some("pdf"));
        assert_eq!(sanitized_extension("photo.JPG"), Some("JPG"));
        assert_eq!(sanitized_extension("no-extension"), None);
        assert_eq!(sanitized_extension("weird.ex!t"), None);
        assert_eq!(sanitized_extension("x.waytoolongsuffix"), None);
    }

    #[tokio::test]
    async fn test_save_and_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf()).await.unwrap();

        let name = storage.save_attachment("scan.pdf", b"%PDF-").await.unwrap();
        assert!(name.ends_with(".pdf"));
        assert!(storage.file_path(&name).exists());

        storage.delete_attachment(&name).await.unwrap();
        assert!(!storage.file_path(&name).exists());
        // deleting again is a no-op
        storage.delete_attachment(&name).await.unwrap();
    }
}
