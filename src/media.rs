use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

/// Hard cap on a single image upload.
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

const ALLOWED_IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("File extension must be one of: jpg, jpeg, png")]
    UnsupportedExtension,
    #[error("File size must be under 2MB.")]
    TooLarge,
    #[error("failed to store file: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes uploaded blobs beneath a single root directory and hands back the
/// relative path that gets persisted on the owning row.
#[derive(Clone, Debug)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Validates and stores one uploaded image; returns the relative path.
    ///
    /// Filenames are replaced with a uuid so uploads cannot collide or
    /// traverse out of the media root.
    pub async fn store_image(
        &self,
        subdir: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<String, MediaError> {
        let extension = image_extension(original_name)?;
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(MediaError::TooLarge);
        }

        let relative = format!(
            "{subdir}/{}.{}",
            Uuid::new_v4(),
            extension.to_ascii_lowercase()
        );
        let target = self.root.join(&relative);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;

        Ok(relative)
    }

    /// Absolute path of a previously stored file.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}

fn image_extension(name: &str) -> Result<&str, MediaError> {
    let extension = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(MediaError::UnsupportedExtension)?;

    ALLOWED_IMAGE_EXTENSIONS
        .iter()
        .find(|allowed| allowed.eq_ignore_ascii_case(extension))
        .copied()
        .ok_or(MediaError::UnsupportedExtension)
}
