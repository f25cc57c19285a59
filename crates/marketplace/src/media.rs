//! Listing image uploads.
//!
//! Uploaded images are stored inline on the listing as base64 `data:` URIs.
//! Only those can be sent to the image analysis service; listings imported
//! with plain URLs have to be filled in by hand.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{MarketError, Result};

/// Largest accepted upload, in bytes (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// A raw uploaded image.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    mime_type: String,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageUpload {
    /// Accept an upload.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Validation` for empty or oversized payloads and
    /// for non-image MIME types.
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let mime_type = mime_type.into();
        if !mime_type.starts_with("image/") {
            return Err(MarketError::validation(format!(
                "unsupported file type {mime_type}, expected an image"
            )));
        }
        if bytes.is_empty() {
            return Err(MarketError::validation("image is empty"));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(MarketError::validation(format!(
                "image is {} bytes, the limit is 5MB",
                bytes.len()
            )));
        }
        Ok(Self { mime_type, bytes })
    }

    /// Read an image from disk, inferring the MIME type from its extension.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Validation` if the file cannot be read or is
    /// not an accepted image.
    pub fn from_path(path: &Path) -> Result<Self> {
        let mime_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(mime_from_extension)
            .ok_or_else(|| {
                MarketError::validation(format!("{} is not a jpeg, png, webp or gif", path.display()))
            })?;
        let bytes = std::fs::read(path).map_err(|e| {
            MarketError::validation(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::new(mime_type, bytes)
    }

    /// Decode a `data:<mime>;base64,<payload>` URI.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Validation` for anything that is not a base64
    /// image data URI, including plain `https://` links.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let rest = uri.strip_prefix("data:").ok_or_else(|| {
            MarketError::validation("image analysis only works on newly uploaded images")
        })?;
        let (mime_type, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| MarketError::validation("image data is not base64 encoded"))?;
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| MarketError::validation(format!("invalid image data: {e}")))?;
        Self::new(mime_type, bytes)
    }

    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Payload as standard base64, as the analysis API expects it.
    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// Inline form stored on listings.
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

/// MIME type for an accepted image file extension.
#[must_use]
pub fn mime_from_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}
