//! Media payloads and references.
//!
//! A [`MediaPayload`] is raw bytes that still have to be uploaded to the
//! vendor. A [`MediaReference`] points at media the vendor can already
//! reach, either by public URL or by the id returned from an upload.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// MIME type used when nothing better can be inferred.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Media the vendor can resolve on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MediaReference {
    /// Publicly reachable URL.
    Url { url: String },
    /// Id of a previously uploaded media asset.
    MediaId { media_id: String },
}

/// Local bytes waiting to be uploaded.
#[derive(Clone, PartialEq, Eq)]
pub struct MediaPayload {
    pub bytes: Vec<u8>,
    pub filename: String,
    /// Explicit MIME type. Inferred from `filename` when `None`.
    pub mime_type: Option<String>,
}

impl MediaPayload {
    pub fn new(bytes: Vec<u8>, filename: impl Into<String>) -> Self {
        Self {
            bytes,
            filename: filename.into(),
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// The explicit MIME type, else one inferred from the file extension.
    pub fn effective_mime_type(&self) -> &str {
        match self.mime_type.as_deref() {
            Some(mime) if !mime.trim().is_empty() => mime,
            _ => mime_for_path(Path::new(&self.filename)),
        }
    }

    /// Lower-cased file extension without the dot, if any.
    pub fn extension(&self) -> Option<String> {
        extension_of(Path::new(&self.filename))
    }

    /// Uploads of empty payloads are rejected before any network call.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.bytes.is_empty() {
            return Err(CoreError::Validation(format!(
                "Media payload '{}' is empty",
                self.filename
            )));
        }
        Ok(())
    }
}

// Bytes are elided so logging a payload does not dump the whole file.
impl std::fmt::Debug for MediaPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaPayload")
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// MIME inference
// ---------------------------------------------------------------------------

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// MIME type for a lower-case extension, if it is one we recognise.
pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "mp4" => Some("video/mp4"),
        "mov" => Some("video/quicktime"),
        "webm" => Some("video/webm"),
        "m4v" => Some("video/x-m4v"),
        _ => None,
    }
}

/// MIME type inferred from a path's extension, defaulting to
/// [`DEFAULT_MIME_TYPE`].
pub fn mime_for_path(path: &Path) -> &'static str {
    extension_of(path)
        .and_then(|ext| mime_for_extension(&ext))
        .unwrap_or(DEFAULT_MIME_TYPE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn infers_common_image_and_video_types() {
        assert_eq!(mime_for_path(Path::new("kitchen.JPG")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("hall.png")), "image/png");
        assert_eq!(mime_for_path(Path::new("walkthrough.mov")), "video/quicktime");
    }

    #[test]
    fn unknown_extension_defaults_to_octet_stream() {
        assert_eq!(mime_for_path(Path::new("scan.xyz")), DEFAULT_MIME_TYPE);
        assert_eq!(mime_for_path(Path::new("no_extension")), DEFAULT_MIME_TYPE);
    }

    #[test]
    fn explicit_mime_type_wins() {
        let payload = MediaPayload::new(vec![1], "photo.bin").with_mime_type("image/png");
        assert_eq!(payload.effective_mime_type(), "image/png");
    }

    #[test]
    fn blank_explicit_mime_type_falls_back_to_inference() {
        let payload = MediaPayload::new(vec![1], "photo.webp").with_mime_type("  ");
        assert_eq!(payload.effective_mime_type(), "image/webp");
    }

    #[test]
    fn empty_payload_is_rejected() {
        let payload = MediaPayload::new(Vec::new(), "empty.jpg");
        assert_matches!(payload.validate(), Err(CoreError::Validation(msg)) if msg.contains("empty.jpg"));
    }

    #[test]
    fn media_reference_shapes_are_distinct() {
        let url: MediaReference =
            serde_json::from_str(r#"{"url":"https://cdn.example.com/a.jpg"}"#).unwrap();
        assert_matches!(url, MediaReference::Url { .. });

        let id: MediaReference = serde_json::from_str(r#"{"media_id":"m_123"}"#).unwrap();
        assert_eq!(
            id,
            MediaReference::MediaId {
                media_id: "m_123".into()
            }
        );
    }

    #[test]
    fn debug_output_omits_bytes() {
        let payload = MediaPayload::new(vec![0xAB; 4096], "big.jpg");
        let rendered = format!("{payload:?}");
        assert!(rendered.contains("len: 4096"));
        assert!(!rendered.contains("171"));
    }
}
