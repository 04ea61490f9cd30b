//! Request body builder for `POST /worlds/generate`.
//!
//! Maps a normalized [`GenerationRequest`] onto the vendor's
//! `world_prompt` shape.

use serde_json::{json, Map, Value};
use tourforge_core::error::CoreError;
use tourforge_core::prompt::{PromptContent, PromptDescriptor};
use tourforge_core::request::GenerationRequest;

/// Build the JSON body for a world generation request.
///
/// Fails when the request is invalid or still holds content that has
/// not been uploaded yet.
pub fn build_generate_payload(request: &GenerationRequest) -> Result<Value, CoreError> {
    request.validate()?;

    Ok(json!({
        "display_name": request.display_name,
        "model": request.model_tier.model_id(),
        "world_prompt": build_world_prompt(&request.prompt)?,
    }))
}

/// Build the `world_prompt` object for a descriptor.
pub fn build_world_prompt(prompt: &PromptDescriptor) -> Result<Value, CoreError> {
    let mut out = Map::new();

    match prompt {
        PromptDescriptor::Text { text } => {
            out.insert("type".into(), json!("text"));
            out.insert("text_prompt".into(), json!(text));
            return Ok(Value::Object(out));
        }
        PromptDescriptor::Image { content, .. } => {
            out.insert("type".into(), json!("image"));
            out.insert("image_prompt".into(), content_json(content)?);
        }
        PromptDescriptor::Panorama { content, .. } => {
            out.insert("type".into(), json!("image"));
            out.insert("image_prompt".into(), content_json(content)?);
            out.insert("is_pano".into(), json!(true));
        }
        PromptDescriptor::Video { content, .. } => {
            out.insert("type".into(), json!("video"));
            out.insert("video_prompt".into(), content_json(content)?);
        }
        PromptDescriptor::MultiImage { images, .. } => {
            let azimuths = prompt.resolved_azimuths().unwrap_or_default();
            let entries = images
                .iter()
                .zip(azimuths)
                .map(|(item, azimuth)| -> Result<Value, CoreError> {
                    Ok(json!({
                        "azimuth": azimuth,
                        "content": content_json(&item.content)?,
                    }))
                })
                .collect::<Result<Vec<_>, _>>()?;
            out.insert("type".into(), json!("multi-image"));
            out.insert("multi_image_prompt".into(), Value::Array(entries));
        }
    }

    if let Some(text) = prompt.text().filter(|t| !t.trim().is_empty()) {
        out.insert("text_prompt".into(), json!(text));
    }
    Ok(Value::Object(out))
}

/// Encode one piece of prompt media.
pub fn content_json(content: &PromptContent) -> Result<Value, CoreError> {
    match content {
        PromptContent::Url { url } => Ok(json!({"source": "uri", "uri": url})),
        PromptContent::Media { media_id } => {
            Ok(json!({"source": "media_asset", "media_asset_id": media_id}))
        }
        PromptContent::Inline {
            data_base64,
            extension,
        } => {
            let mut out = json!({"source": "data_base64", "data_base64": data_base64});
            if let Some(ext) = extension {
                out["extension"] = json!(ext);
            }
            Ok(out)
        }
        PromptContent::Upload(payload) => Err(CoreError::Validation(format!(
            "'{}' has not been uploaded yet",
            payload.filename
        ))),
    }
}
