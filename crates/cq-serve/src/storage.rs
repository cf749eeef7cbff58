use cq_core::files::{FileStorage, FileStorageError, SavedFile, extension_of};
use std::fs;
use std::path::PathBuf;
use ulid::Ulid;

/// Stores attachment bytes under `<root>/<folder>/<ulid>.<ext>` and serves
/// them back through the `/uploads` static route.
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

fn io_error(err: std::io::Error) -> FileStorageError {
    FileStorageError::Io {
        message: err.to_string(),
    }
}

impl FileStorage for LocalFileStorage {
    fn save(
        &self,
        folder: &str,
        original_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<SavedFile, FileStorageError> {
        let extension = extension_of(original_name).unwrap_or_else(|| "bin".to_string());
        let stored_name = format!("{}.{extension}", Ulid::new());

        let dir = self.root.join(folder);
        fs::create_dir_all(&dir).map_err(io_error)?;
        fs::write(dir.join(&stored_name), bytes).map_err(io_error)?;

        Ok(SavedFile {
            url: format!("/uploads/{folder}/{stored_name}"),
            stored_name,
            size_bytes: bytes.len() as u64,
            content_type: content_type.to_string(),
        })
    }

    fn delete(&self, folder: &str, stored_name: &str) -> Result<bool, FileStorageError> {
        let path = self.root.join(folder).join(stored_name);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path).map_err(io_error)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_delete_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path().to_path_buf());

        let saved = storage
            .save("requests/req_x", "photo.jpg", "image/jpeg", b"abc")
            .unwrap();
        assert!(saved.stored_name.ends_with(".jpg"));
        assert_eq!(saved.size_bytes, 3);
        assert!(dir.path().join("requests/req_x").join(&saved.stored_name).exists());

        assert!(storage.delete("requests/req_x", &saved.stored_name).unwrap());
        assert!(!storage.delete("requests/req_x", &saved.stored_name).unwrap());
    }
}
