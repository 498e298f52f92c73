/// Filesystem store for uploaded images
///
/// Uploaded files are written under a single upload directory with a
/// generated UUID name (keeping the original extension), so user-supplied
/// filenames never reach the filesystem. Reads refuse any name that could
/// escape the directory.
///
/// # Example
///
/// ```no_run
/// use listings_api::storage::ImageStore;
///
/// # async fn example() -> std::io::Result<()> {
/// let store = ImageStore::new("./uploads");
/// let stored_name = store.save("kitchen.png", b"...png bytes...").await?;
/// assert!(stored_name.ends_with(".png"));
/// # Ok(())
/// # }
/// ```

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

/// Filesystem-backed image store rooted at the upload directory
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Creates a store rooted at `dir` (not created until first write)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { root: dir.into() }
    }

    /// Upload directory this store writes to
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Saves file bytes under a generated name, returning the stored name
    ///
    /// The stored name is a UUID v4 plus the lowercased extension of the
    /// original filename (if any). The upload directory is created on
    /// demand.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the write fails
    pub async fn save(&self, original_filename: &str, bytes: &[u8]) -> std::io::Result<String> {
        fs::create_dir_all(&self.root).await?;

        let stored_name = match extension_of(original_filename) {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };

        let path = self.root.join(&stored_name);
        fs::write(&path, bytes).await?;

        debug!(file = %stored_name, size = bytes.len(), "Stored uploaded image");
        Ok(stored_name)
    }

    /// Reads a stored file by name
    ///
    /// # Returns
    ///
    /// The file bytes, or None if the name is unsafe or the file does not
    /// exist
    pub async fn read(&self, filename: &str) -> std::io::Result<Option<Vec<u8>>> {
        if !is_safe_filename(filename) {
            warn!(file = %filename, "Rejected unsafe image filename");
            return Ok(None);
        }

        let path = self.root.join(filename);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Deletes a stored file by name, ignoring a missing file
    pub async fn delete(&self, filename: &str) -> std::io::Result<()> {
        if !is_safe_filename(filename) {
            return Ok(());
        }

        let path = self.root.join(filename);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Rejects names that could address a file outside the upload directory
fn is_safe_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.contains('/')
        && !filename.contains('\\')
        && !filename.contains("..")
}

/// Lowercased extension of a filename, if it has one
fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Content type a stored file is served with, derived from its extension
///
/// Unknown extensions fall back to JPEG.
pub fn content_type_for(filename: &str) -> &'static str {
    match extension_of(filename).as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> ImageStore {
        ImageStore::new(std::env::temp_dir().join(format!("listings-test-{}", Uuid::new_v4())))
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a.png"), "image/png");
        assert_eq!(content_type_for("a.PNG"), "image/png");
        assert_eq!(content_type_for("a.gif"), "image/gif");
        assert_eq!(content_type_for("a.webp"), "image/webp");
        assert_eq!(content_type_for("a.jpg"), "image/jpeg");
        assert_eq!(content_type_for("a.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("noextension"), "image/jpeg");
    }

    #[test]
    fn test_is_safe_filename() {
        assert!(is_safe_filename("abc123.png"));
        assert!(!is_safe_filename("../etc/passwd"));
        assert!(!is_safe_filename("a/b.png"));
        assert!(!is_safe_filename("a\\b.png"));
        assert!(!is_safe_filename(""));
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("photo.JPG"), Some("jpg".to_string()));
        assert_eq!(extension_of("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(extension_of("noext"), None);
    }

    #[tokio::test]
    async fn test_save_read_delete_roundtrip() {
        let store = temp_store();

        let stored = store.save("house.png", b"pretend-png").await.unwrap();
        assert!(stored.ends_with(".png"));
        assert_ne!(stored, "house.png");

        let bytes = store.read(&stored).await.unwrap();
        assert_eq!(bytes.as_deref(), Some(b"pretend-png".as_slice()));

        store.delete(&stored).await.unwrap();
        assert!(store.read(&stored).await.unwrap().is_none());

        // Deleting again is not an error
        store.delete(&stored).await.unwrap();
    }

    #[tokio::test]
    async fn test_read_rejects_traversal() {
        let store = temp_store();
        assert!(store.read("../secret.txt").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let store = temp_store();
        assert!(store.read("does-not-exist.png").await.unwrap().is_none());
    }
}
