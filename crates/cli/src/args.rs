//! Command-line flags and their translation into a generation request.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgGroup, Parser};
use tourforge_core::azimuth::parse_direction_list;
use tourforge_core::config::VendorConfig;
use tourforge_core::error::CoreError;
use tourforge_core::prompt::{MultiImageItem, PromptContent, PromptDescriptor};
use tourforge_core::request::{GenerationRequest, ModelTier};
use tourforge_pipeline::upload::read_payload;
use tourforge_pipeline::WorkflowError;

pub const DEFAULT_DISPLAY_NAME: &str = "Property Tour";

/// Generate a navigable 3D tour from listing photos, video or a text
/// description.
#[derive(Parser, Debug)]
#[command(name = "tourforge", version)]
#[command(group(
    ArgGroup::new("input")
        .required(true)
        .args(["text", "image", "images", "video", "panorama"]),
))]
pub struct Cli {
    /// Describe the space in words.
    #[arg(long, value_name = "PROMPT")]
    pub text: Option<String>,

    /// A single photo.
    #[arg(long, value_name = "FILE")]
    pub image: Option<PathBuf>,

    /// Several photos of the same space.
    #[arg(long, value_name = "FILE", num_args = 1..)]
    pub images: Vec<PathBuf>,

    /// Facing of each `--images` entry, by position, e.g. `front,,back`.
    #[arg(long, value_name = "LIST", requires = "images")]
    pub directions: Option<String>,

    /// A walkthrough video.
    #[arg(long, value_name = "FILE")]
    pub video: Option<PathBuf>,

    /// A 360 degree panorama.
    #[arg(long, value_name = "FILE")]
    pub panorama: Option<PathBuf>,

    /// Display name of the tour.
    #[arg(long, default_value = DEFAULT_DISPLAY_NAME)]
    pub name: String,

    /// Use the faster, cheaper draft model.
    #[arg(long)]
    pub draft: bool,

    /// Embed media as base64 instead of uploading it first.
    #[arg(long)]
    pub inline: bool,

    /// Directory for the JSON result file.
    #[arg(long, value_name = "DIR", default_value = "tours")]
    pub output_dir: PathBuf,

    /// Env-style file holding `WLT_API_KEY`.
    #[arg(long, value_name = "FILE")]
    pub credentials: Option<PathBuf>,

    #[arg(long, value_name = "SECS")]
    pub poll_interval_secs: Option<u64>,

    /// Give up waiting for the world after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Skip the world metadata lookup and use the default viewer URL.
    #[arg(long)]
    pub no_enrich: bool,
}

impl Cli {
    pub fn model_tier(&self) -> ModelTier {
        if self.draft {
            ModelTier::Draft
        } else {
            ModelTier::Standard
        }
    }

    /// Vendor settings from the credentials file (or the environment),
    /// with the poll flags applied on top.
    pub fn vendor_config(&self) -> Result<VendorConfig, CoreError> {
        let mut config = match &self.credentials {
            Some(path) => VendorConfig::from_credentials_file(path)?,
            None => VendorConfig::from_env()?,
        };
        self.apply_poll_overrides(&mut config)?;
        Ok(config)
    }

    pub fn apply_poll_overrides(&self, config: &mut VendorConfig) -> Result<(), CoreError> {
        if let Some(secs) = self.poll_interval_secs {
            if secs == 0 {
                return Err(CoreError::Config(
                    "--poll-interval-secs must be greater than zero".to_string(),
                ));
            }
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = self.timeout_secs {
            config.poll_timeout = Duration::from_secs(secs);
        }
        Ok(())
    }

    /// Read the input files and build the request.
    pub async fn build_request(&self) -> Result<GenerationRequest, WorkflowError> {
        let prompt = self.build_prompt().await?;
        let request = GenerationRequest::new(prompt, self.name.trim(), self.model_tier());
        request.validate()?;
        Ok(request)
    }

    async fn build_prompt(&self) -> Result<PromptDescriptor, WorkflowError> {
        if let Some(text) = &self.text {
            return Ok(PromptDescriptor::Text { text: text.clone() });
        }
        if let Some(path) = &self.image {
            return Ok(PromptDescriptor::Image {
                content: self.load(path).await?,
                text: None,
            });
        }
        if let Some(path) = &self.panorama {
            return Ok(PromptDescriptor::Panorama {
                content: self.load(path).await?,
                text: None,
            });
        }
        if let Some(path) = &self.video {
            return Ok(PromptDescriptor::Video {
                content: self.load(path).await?,
                text: None,
            });
        }
        if !self.images.is_empty() {
            return self.build_multi_image().await;
        }
        Err(WorkflowError::Validation(
            "one of --text, --image, --images, --video or --panorama is required".to_string(),
        ))
    }

    async fn build_multi_image(&self) -> Result<PromptDescriptor, WorkflowError> {
        let directions = match &self.directions {
            Some(list) => parse_direction_list(list)?,
            None => Vec::new(),
        };
        if directions.len() > self.images.len() {
            return Err(WorkflowError::Validation(format!(
                "{} directions given for {} images",
                directions.len(),
                self.images.len()
            )));
        }

        let mut items = Vec::with_capacity(self.images.len());
        for (i, path) in self.images.iter().enumerate() {
            let item = MultiImageItem::new(self.load(path).await?);
            items.push(match directions.get(i).copied().flatten() {
                Some(direction) => item.facing(direction),
                None => item,
            });
        }

        Ok(PromptDescriptor::MultiImage {
            images: items,
            text: None,
        })
    }

    async fn load(&self, path: &Path) -> Result<PromptContent, WorkflowError> {
        let payload = read_payload(path).await?;
        payload.validate()?;
        if self.inline {
            Ok(PromptContent::inline(&payload.bytes, payload.extension()))
        } else {
            Ok(payload.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tourforge_core::azimuth::Direction;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tourforge").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    fn write(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
        path
    }

    #[test]
    fn an_input_flag_is_required() {
        assert!(Cli::try_parse_from(["tourforge", "--name", "x"]).is_err());
    }

    #[test]
    fn input_flags_are_exclusive() {
        assert!(Cli::try_parse_from(["tourforge", "--text", "a", "--image", "b.jpg"]).is_err());
    }

    #[test]
    fn directions_need_images() {
        assert!(Cli::try_parse_from(["tourforge", "--text", "a", "--directions", "front"]).is_err());
    }

    #[test]
    fn defaults() {
        let cli = parse(&["--text", "porch"]);
        assert_eq!(cli.name, DEFAULT_DISPLAY_NAME);
        assert_eq!(cli.output_dir, PathBuf::from("tours"));
        assert_eq!(cli.model_tier(), ModelTier::Standard);
        assert!(!cli.no_enrich);
    }

    #[test]
    fn draft_flag_selects_draft_tier() {
        assert_eq!(parse(&["--text", "porch", "--draft"]).model_tier(), ModelTier::Draft);
    }

    #[tokio::test]
    async fn text_request() {
        let request = parse(&["--text", "Cozy reading nook", "--name", "Nook"])
            .build_request()
            .await
            .unwrap();
        assert_eq!(request.display_name, "Nook");
        assert_matches!(request.prompt, PromptDescriptor::Text { ref text } if text == "Cozy reading nook");
    }

    #[tokio::test]
    async fn image_is_queued_for_upload() {
        let dir = tempfile::tempdir().unwrap();
        let photo = write(dir.path(), "kitchen.jpg");

        let request = parse(&["--image", photo.to_str().unwrap()])
            .build_request()
            .await
            .unwrap();
        assert_eq!(request.prompt.pending_uploads(), 1);
    }

    #[tokio::test]
    async fn inline_flag_embeds_base64() {
        let dir = tempfile::tempdir().unwrap();
        let pano = write(dir.path(), "pano.jpg");

        let request = parse(&["--panorama", pano.to_str().unwrap(), "--inline"])
            .build_request()
            .await
            .unwrap();
        assert_eq!(request.prompt.pending_uploads(), 0);
        assert_matches!(
            request.prompt,
            PromptDescriptor::Panorama {
                content: PromptContent::Inline { ref extension, .. },
                ..
            } if extension.as_deref() == Some("jpg")
        );
    }

    #[tokio::test]
    async fn directions_are_aligned_by_position() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.jpg");
        let b = write(dir.path(), "b.jpg");
        let c = write(dir.path(), "c.jpg");

        let request = parse(&[
            "--images",
            a.to_str().unwrap(),
            b.to_str().unwrap(),
            c.to_str().unwrap(),
            "--directions",
            "back,,left",
        ])
        .build_request()
        .await
        .unwrap();

        let PromptDescriptor::MultiImage { images, .. } = &request.prompt else {
            panic!("expected a multi-image prompt");
        };
        assert_eq!(images[0].direction, Some(Direction::Back));
        assert_eq!(images[1].direction, None);
        assert_eq!(request.prompt.resolved_azimuths(), Some(vec![180, 0, 270]));
    }

    #[tokio::test]
    async fn too_many_directions_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.jpg");

        let result = parse(&["--images", a.to_str().unwrap(), "--directions", "front,back"])
            .build_request()
            .await;
        assert_matches!(result, Err(WorkflowError::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_direction_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.jpg");

        let result = parse(&["--images", a.to_str().unwrap(), "--directions", "up"])
            .build_request()
            .await;
        assert_matches!(result, Err(WorkflowError::Validation(_)));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let result = parse(&["--video", "/definitely/not/here.mp4"]).build_request().await;
        assert_matches!(result, Err(WorkflowError::Io(_)));
    }

    #[test]
    fn poll_overrides_apply() {
        let cli = parse(&["--text", "x", "--poll-interval-secs", "2", "--timeout-secs", "60"]);
        let mut config = VendorConfig::new("k");
        cli.apply_poll_overrides(&mut config).unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.poll_timeout, Duration::from_secs(60));
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let cli = parse(&["--text", "x", "--poll-interval-secs", "0"]);
        let mut config = VendorConfig::new("k");
        assert_matches!(cli.apply_poll_overrides(&mut config), Err(CoreError::Config(_)));
    }
}
