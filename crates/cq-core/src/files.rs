use thiserror::Error;

/// Extensions accepted for request attachments; checked before any storage
/// I/O happens.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "heic"];

pub fn extension_of(file_name: &str) -> Option<String> {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

pub fn is_allowed_extension(extension: &str) -> bool {
    ALLOWED_EXTENSIONS.contains(&extension)
}

#[derive(Debug, Error)]
pub enum FileStorageError {
    #[error("io error: {message}")]
    Io { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub stored_name: String,
    pub url: String,
    pub size_bytes: u64,
    pub content_type: String,
}

/// External byte-persistence collaborator. Attachment records are created
/// only after `save` succeeds; `delete` is best-effort on the way out.
pub trait FileStorage: Send + Sync {
    fn save(
        &self,
        folder: &str,
        original_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<SavedFile, FileStorageError>;

    /// Returns whether a file was actually removed.
    fn delete(&self, folder: &str, stored_name: &str) -> Result<bool, FileStorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(extension_of("IMG_0042.JPG").as_deref(), Some("jpg"));
        assert_eq!(extension_of("scan.heic").as_deref(), Some("heic"));
        assert_eq!(extension_of("no-extension"), None);
    }

    #[test]
    fn allow_list_rejects_everything_else() {
        assert!(is_allowed_extension("png"));
        assert!(!is_allowed_extension("gif"));
        assert!(!is_allowed_extension("exe"));
    }
}
