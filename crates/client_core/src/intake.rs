use std::{collections::HashMap, fmt, path::Path, sync::Arc};

use shared::domain::{ImageId, IntakeSource, PreviewId};
use thiserror::Error;

use crate::service::ImageUpload;

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";
const FALLBACK_FILE_NAME: &str = "image.png";

#[derive(Debug, Clone)]
pub struct ImageBlob {
    pub bytes: Vec<u8>,
    pub media_type: String,
    pub file_name: Option<String>,
}

impl ImageBlob {
    pub fn new(bytes: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            bytes,
            media_type: media_type.into(),
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Reads a file from disk, guessing the media type from its extension.
    pub async fn from_path(path: &Path) -> Result<Self, IntakeError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| IntakeError::Read {
                path: path.display().to_string(),
                source,
            })?;
        let media_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or(FALLBACK_MEDIA_TYPE)
            .to_string();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        Ok(Self {
            bytes,
            media_type,
            file_name,
        })
    }

    pub fn is_image(&self) -> bool {
        self.media_type
            .trim()
            .to_ascii_lowercase()
            .starts_with("image/")
    }
}

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("failed to read image file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NoFile,
    EmptyFile,
    NotAnImage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeDisposition {
    Selected(ImageId),
    Ignored(IgnoreReason),
}

/// Decides whether a selection is taken. Drops must carry an `image/*` type;
/// the picker already filters by type so its media type is taken as is.
pub fn screen(blob: Option<ImageBlob>, source: IntakeSource) -> Result<ImageBlob, IgnoreReason> {
    let Some(blob) = blob else {
        return Err(IgnoreReason::NoFile);
    };
    if blob.bytes.is_empty() {
        return Err(IgnoreReason::EmptyFile);
    }
    if source == IntakeSource::Drop && !blob.is_image() {
        return Err(IgnoreReason::NotAnImage);
    }
    Ok(blob)
}

/// Transient handle used to display a selected image. Valid until released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewLocator(PreviewId);

impl PreviewLocator {
    pub fn id(&self) -> PreviewId {
        self.0
    }
}

impl fmt::Display for PreviewLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "preview:{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct PreviewData {
    pub media_type: String,
    pub bytes: Arc<[u8]>,
}

/// Owns every live preview. Entries share the selected image's buffer.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    entries: HashMap<PreviewId, PreviewData>,
}

impl PreviewRegistry {
    pub fn allocate(&mut self, bytes: Arc<[u8]>, media_type: &str) -> PreviewLocator {
        let id = PreviewId::new();
        self.entries.insert(
            id,
            PreviewData {
                media_type: media_type.to_string(),
                bytes,
            },
        );
        PreviewLocator(id)
    }

    pub fn resolve(&self, locator: &PreviewLocator) -> Option<PreviewData> {
        self.entries.get(&locator.0).cloned()
    }

    pub fn release(&mut self, locator: &PreviewLocator) -> bool {
        self.entries.remove(&locator.0).is_some()
    }

    pub fn live_count(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Clone)]
pub struct SelectedImage {
    id: ImageId,
    file_name: Option<String>,
    media_type: String,
    bytes: Arc<[u8]>,
    preview: PreviewLocator,
}

impl SelectedImage {
    pub(crate) fn new(blob: ImageBlob, previews: &mut PreviewRegistry) -> Self {
        let bytes: Arc<[u8]> = Arc::from(blob.bytes);
        let media_type = if blob.media_type.trim().is_empty() {
            FALLBACK_MEDIA_TYPE.to_string()
        } else {
            blob.media_type.trim().to_string()
        };
        let preview = previews.allocate(Arc::clone(&bytes), &media_type);
        Self {
            id: ImageId::new(),
            file_name: blob.file_name,
            media_type,
            bytes,
            preview,
        }
    }

    pub fn id(&self) -> ImageId {
        self.id
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn preview(&self) -> PreviewLocator {
        self.preview
    }

    pub(crate) fn to_upload(&self) -> ImageUpload {
        ImageUpload {
            file_name: self
                .file_name
                .clone()
                .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string()),
            media_type: self.media_type.clone(),
            bytes: Arc::clone(&self.bytes),
        }
    }
}
