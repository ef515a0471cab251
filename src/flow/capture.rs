use std::path::PathBuf;

use tracing::debug;

use crate::error::PhotoReadError;
use crate::session::{PhotoHandle, PhotoView};
use crate::validation::FileMetadata;

/// Where the selected file's contents come from.
#[derive(Debug, Clone, PartialEq)]
pub enum PhotoSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

/// A file selected for a photo step: the metadata the picker reported plus
/// a way to read its contents.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoFile {
    pub metadata: FileMetadata,
    pub source: PhotoSource,
}

impl PhotoFile {
    pub fn from_bytes(name: &str, mime_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            metadata: FileMetadata {
                name: name.to_string(),
                mime_type: mime_type.to_string(),
                size_bytes: bytes.len() as u64,
            },
            source: PhotoSource::Bytes(bytes),
        }
    }

    /// Metadata is taken as given; the path is only opened by `read_photo`.
    pub fn from_path(path: impl Into<PathBuf>, mime_type: &str, size_bytes: u64) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            metadata: FileMetadata {
                name,
                mime_type: mime_type.to_string(),
                size_bytes,
            },
            source: PhotoSource::Path(path),
        }
    }
}

/// Read and decode a selected file into an in-memory photo.
///
/// Decoding runs on the blocking pool; only the dimensions are kept, the
/// original encoded bytes are what the handle stores.
pub async fn read_photo(view: PhotoView, file: &PhotoFile) -> Result<PhotoHandle, PhotoReadError> {
    let name = file.metadata.name.clone();

    let bytes = match &file.source {
        PhotoSource::Bytes(bytes) => bytes.clone(),
        PhotoSource::Path(path) => {
            tokio::fs::read(path)
                .await
                .map_err(|e| PhotoReadError::Io {
                    name: name.clone(),
                    reason: e.to_string(),
                })?
        }
    };

    let decode_name = name.clone();
    let (width, height, bytes) = tokio::task::spawn_blocking(move || {
        let decoded = image::load_from_memory(&bytes).map_err(|e| PhotoReadError::Decode {
            name: decode_name,
            reason: e.to_string(),
        })?;
        Ok::<_, PhotoReadError>((decoded.width(), decoded.height(), bytes))
    })
    .await
    .map_err(|e| PhotoReadError::Decode {
        name: name.clone(),
        reason: format!("decoder task failed: {}", e),
    })??;

    debug!("Read {} photo '{}' ({}x{})", view, name, width, height);
    Ok(PhotoHandle::new(
        view,
        &file.metadata.mime_type,
        width,
        height,
        bytes,
    ))
}
