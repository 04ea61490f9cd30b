//! Normalized prompt descriptors.
//!
//! A [`PromptDescriptor`] describes what the world should be generated
//! from, independent of how the vendor wants it encoded. The vendor
//! payload builder in `tourforge-marble` maps it onto the wire format.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::azimuth::{self, Direction};
use crate::error::CoreError;
use crate::media::{MediaPayload, MediaReference};

/// Longest free-text prompt accepted.
pub const MAX_TEXT_PROMPT_CHARS: usize = 2_000;

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// A single piece of prompt media.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum PromptContent {
    /// Base64 content embedded directly in the request.
    Inline {
        data_base64: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        extension: Option<String>,
    },
    /// Publicly reachable URL.
    Url { url: String },
    /// Previously uploaded vendor media asset.
    Media { media_id: String },
    /// Local bytes the uploader still has to send to the vendor.
    #[serde(skip)]
    Upload(MediaPayload),
}

impl PromptContent {
    /// Embed raw bytes as base64.
    pub fn inline(bytes: &[u8], extension: Option<String>) -> Self {
        PromptContent::Inline {
            data_base64: BASE64.encode(bytes),
            extension,
        }
    }

    /// Whether this content still needs an upload before submission.
    pub fn needs_upload(&self) -> bool {
        matches!(self, PromptContent::Upload(_))
    }

    fn validate(&self) -> Result<(), CoreError> {
        match self {
            PromptContent::Inline { data_base64, .. } if data_base64.is_empty() => Err(
                CoreError::Validation("Inline prompt content is empty".to_string()),
            ),
            PromptContent::Url { url } if url.trim().is_empty() => {
                Err(CoreError::Validation("Media URL is empty".to_string()))
            }
            PromptContent::Media { media_id } if media_id.trim().is_empty() => {
                Err(CoreError::Validation("Media id is empty".to_string()))
            }
            PromptContent::Upload(payload) => payload.validate(),
            _ => Ok(()),
        }
    }
}

impl From<MediaReference> for PromptContent {
    fn from(reference: MediaReference) -> Self {
        match reference {
            MediaReference::Url { url } => PromptContent::Url { url },
            MediaReference::MediaId { media_id } => PromptContent::Media { media_id },
        }
    }
}

impl From<MediaPayload> for PromptContent {
    fn from(payload: MediaPayload) -> Self {
        PromptContent::Upload(payload)
    }
}

/// One image of a multi-image prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiImageItem {
    pub content: PromptContent,
    /// Explicit angle in degrees. Takes precedence over `direction`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azimuth: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

impl MultiImageItem {
    pub fn new(content: impl Into<PromptContent>) -> Self {
        Self {
            content: content.into(),
            azimuth: None,
            direction: None,
        }
    }

    pub fn facing(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    /// The explicitly assigned angle, if any.
    pub fn explicit_azimuth(&self) -> Option<u16> {
        self.azimuth.or(self.direction.map(Direction::degrees))
    }
}

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// What a world is generated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromptDescriptor {
    Text {
        text: String,
    },
    Image {
        content: PromptContent,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    MultiImage {
        images: Vec<MultiImageItem>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    Video {
        content: PromptContent,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    Panorama {
        content: PromptContent,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
}

impl PromptDescriptor {
    /// Short name of the variant, used in logs and events.
    pub fn kind(&self) -> &'static str {
        match self {
            PromptDescriptor::Text { .. } => "text",
            PromptDescriptor::Image { .. } => "image",
            PromptDescriptor::MultiImage { .. } => "multi_image",
            PromptDescriptor::Video { .. } => "video",
            PromptDescriptor::Panorama { .. } => "panorama",
        }
    }

    /// Optional text hint accompanying media prompts.
    pub fn text(&self) -> Option<&str> {
        match self {
            PromptDescriptor::Text { text } => Some(text),
            PromptDescriptor::Image { text, .. }
            | PromptDescriptor::MultiImage { text, .. }
            | PromptDescriptor::Video { text, .. }
            | PromptDescriptor::Panorama { text, .. } => text.as_deref(),
        }
    }

    /// All media contents in submission order.
    pub fn contents(&self) -> Vec<&PromptContent> {
        match self {
            PromptDescriptor::Text { .. } => Vec::new(),
            PromptDescriptor::Image { content, .. }
            | PromptDescriptor::Video { content, .. }
            | PromptDescriptor::Panorama { content, .. } => vec![content],
            PromptDescriptor::MultiImage { images, .. } => {
                images.iter().map(|item| &item.content).collect()
            }
        }
    }

    /// Mutable access to all media contents in submission order.
    pub fn contents_mut(&mut self) -> Vec<&mut PromptContent> {
        match self {
            PromptDescriptor::Text { .. } => Vec::new(),
            PromptDescriptor::Image { content, .. }
            | PromptDescriptor::Video { content, .. }
            | PromptDescriptor::Panorama { content, .. } => vec![content],
            PromptDescriptor::MultiImage { images, .. } => {
                images.iter_mut().map(|item| &mut item.content).collect()
            }
        }
    }

    /// Number of contents still waiting for an upload.
    pub fn pending_uploads(&self) -> usize {
        self.contents().into_iter().filter(|c| c.needs_upload()).count()
    }

    /// Final azimuths for a multi-image prompt, `None` for other kinds.
    pub fn resolved_azimuths(&self) -> Option<Vec<u16>> {
        match self {
            PromptDescriptor::MultiImage { images, .. } => {
                let explicit: Vec<Option<u16>> =
                    images.iter().map(MultiImageItem::explicit_azimuth).collect();
                Some(azimuth::resolve_azimuths(&explicit))
            }
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(text) = self.text() {
            if text.chars().count() > MAX_TEXT_PROMPT_CHARS {
                return Err(CoreError::Validation(format!(
                    "Text prompt exceeds {MAX_TEXT_PROMPT_CHARS} characters"
                )));
            }
        }

        match self {
            PromptDescriptor::Text { text } if text.trim().is_empty() => {
                return Err(CoreError::Validation("Text prompt is empty".to_string()));
            }
            PromptDescriptor::MultiImage { images, .. } => {
                if images.is_empty() {
                    return Err(CoreError::Validation(
                        "Multi-image prompt needs at least one image".to_string(),
                    ));
                }
                for item in images {
                    if let Some(degrees) = item.azimuth {
                        azimuth::validate_azimuth(degrees)?;
                    }
                }
            }
            _ => {}
        }

        for content in self.contents() {
            content.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn url(u: &str) -> PromptContent {
        PromptContent::Url { url: u.to_string() }
    }

    #[test]
    fn inline_content_is_base64_encoded() {
        let content = PromptContent::inline(b"hello", Some("jpg".into()));
        assert_eq!(
            content,
            PromptContent::Inline {
                data_base64: "aGVsbG8=".into(),
                extension: Some("jpg".into()),
            }
        );
    }

    #[test]
    fn descriptor_json_is_tagged_by_type() {
        let json = r#"{
            "type": "multi_image",
            "images": [
                {"content": {"source": "url", "url": "https://x/a.jpg"}, "direction": "back"},
                {"content": {"source": "media", "media_id": "m1"}}
            ]
        }"#;
        let descriptor: PromptDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(descriptor.kind(), "multi_image");
        assert_eq!(descriptor.resolved_azimuths(), Some(vec![180, 0]));
    }

    #[test]
    fn multi_image_without_directions_is_evenly_spaced() {
        let descriptor = PromptDescriptor::MultiImage {
            images: (0..4).map(|i| MultiImageItem::new(url(&format!("https://x/{i}.jpg")))).collect(),
            text: None,
        };
        assert_eq!(descriptor.resolved_azimuths(), Some(vec![0, 90, 180, 270]));
    }

    #[test]
    fn explicit_degrees_override_direction() {
        let mut item = MultiImageItem::new(url("https://x/a.jpg")).facing(Direction::Left);
        item.azimuth = Some(45);
        assert_eq!(item.explicit_azimuth(), Some(45));
    }

    #[test]
    fn pending_uploads_are_counted() {
        let descriptor = PromptDescriptor::MultiImage {
            images: vec![
                MultiImageItem::new(MediaPayload::new(vec![1], "a.jpg")),
                MultiImageItem::new(url("https://x/b.jpg")),
                MultiImageItem::new(MediaPayload::new(vec![2], "c.jpg")),
            ],
            text: None,
        };
        assert_eq!(descriptor.pending_uploads(), 2);
    }

    #[test]
    fn empty_text_prompt_is_invalid() {
        let descriptor = PromptDescriptor::Text { text: "   ".into() };
        assert_matches!(descriptor.validate(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn empty_multi_image_is_invalid() {
        let descriptor = PromptDescriptor::MultiImage {
            images: Vec::new(),
            text: None,
        };
        assert_matches!(descriptor.validate(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn out_of_range_azimuth_is_invalid() {
        let mut item = MultiImageItem::new(url("https://x/a.jpg"));
        item.azimuth = Some(400);
        let descriptor = PromptDescriptor::MultiImage {
            images: vec![item],
            text: None,
        };
        assert_matches!(descriptor.validate(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn empty_upload_payload_is_invalid() {
        let descriptor = PromptDescriptor::Video {
            content: MediaPayload::new(Vec::new(), "tour.mp4").into(),
            text: None,
        };
        assert_matches!(descriptor.validate(), Err(CoreError::Validation(_)));
    }
}
