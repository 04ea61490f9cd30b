//! World generation requests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::prompt::PromptDescriptor;

/// Vendor model used for [`ModelTier::Standard`].
pub const MODEL_STANDARD: &str = "Marble 0.1-plus";
/// Vendor model used for [`ModelTier::Draft`].
pub const MODEL_DRAFT: &str = "Marble 0.1-mini";

/// Longest display name the vendor accepts.
pub const MAX_DISPLAY_NAME_CHARS: usize = 128;

/// Quality/cost preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    #[default]
    Standard,
    Draft,
}

impl ModelTier {
    /// Vendor model identifier for this tier.
    pub fn model_id(self) -> &'static str {
        match self {
            ModelTier::Standard => MODEL_STANDARD,
            ModelTier::Draft => MODEL_DRAFT,
        }
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelTier::Standard => f.write_str("standard"),
            ModelTier::Draft => f.write_str("draft"),
        }
    }
}

impl FromStr for ModelTier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(ModelTier::Standard),
            "draft" => Ok(ModelTier::Draft),
            other => Err(CoreError::Validation(format!(
                "Unknown model tier '{other}'. Must be 'standard' or 'draft'"
            ))),
        }
    }
}

/// A request to generate one world.
///
/// The workflow only ever borrows a request, so it stays unchanged from
/// submission to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: PromptDescriptor,
    pub display_name: String,
    #[serde(default)]
    pub model_tier: ModelTier,
}

impl GenerationRequest {
    pub fn new(prompt: PromptDescriptor, display_name: impl Into<String>, model_tier: ModelTier) -> Self {
        Self {
            prompt,
            display_name: display_name.into(),
            model_tier,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        validate_display_name(&self.display_name)?;
        self.prompt.validate()
    }
}

pub fn validate_display_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("Display name is required".to_string()));
    }
    if name.chars().count() > MAX_DISPLAY_NAME_CHARS {
        return Err(CoreError::Validation(format!(
            "Display name exceeds {MAX_DISPLAY_NAME_CHARS} characters"
        )));
    }
    Ok(())
}
