// Downloadable generated image
// Author: kelexine (https://github.com/kelexine)

use crate::error::Result;
use crate::vision::DecodedImage;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tracing::info;

pub const ARTIFACT_FILE_NAME: &str = "generated_image.png";
pub const ARTIFACT_MIME_TYPE: &str = "image/png";

/// The retained image of a response, staged for download.
///
/// The bytes are exactly what the service returned; name and MIME type are
/// fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub data: Bytes,
}

impl DownloadArtifact {
    pub fn new(data: Bytes) -> Self {
        Self {
            file_name: ARTIFACT_FILE_NAME,
            mime_type: ARTIFACT_MIME_TYPE,
            data,
        }
    }

    pub fn from_image(image: &DecodedImage) -> Self {
        Self::new(image.data.clone())
    }

    /// Write the artifact into `dir`, creating the directory if needed.
    /// An existing file of the same name is overwritten.
    pub async fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(self.file_name);
        tokio::fs::write(&path, &self.data).await?;
        info!("Saved generated image to {} ({} bytes)", path.display(), self.data.len());
        Ok(path)
    }
}
