//! Media uploader.
//!
//! Sends local media to the vendor and swaps every pending
//! [`PromptContent::Upload`] in a prompt for the returned media id.

use std::path::Path;

use tourforge_core::media::{mime_for_path, MediaPayload, MediaReference};
use tourforge_core::prompt::{PromptContent, PromptDescriptor};
use tourforge_events::WorkflowEventKind;
use tourforge_marble::api::MarbleApi;

use crate::error::WorkflowError;
use crate::report::Reporter;

pub struct MediaUploader<'a> {
    api: &'a MarbleApi,
    reporter: Reporter<'a>,
}

impl<'a> MediaUploader<'a> {
    pub fn new(api: &'a MarbleApi) -> Self {
        Self {
            api,
            reporter: Reporter::silent(),
        }
    }

    pub fn with_reporter(mut self, reporter: Reporter<'a>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Upload one payload and return a reference to the stored asset.
    pub async fn upload(&self, payload: &MediaPayload) -> Result<MediaReference, WorkflowError> {
        payload.validate()?;

        let media_id = self.api.upload_media(payload).await.map_err(|e| {
            WorkflowError::from_vendor(e, |vendor_status, vendor_body| {
                WorkflowError::UploadFailed {
                    filename: payload.filename.clone(),
                    vendor_status,
                    vendor_body,
                }
            })
        })?;

        tracing::info!(
            filename = %payload.filename,
            bytes = payload.bytes.len(),
            media_id = %media_id,
            "Media uploaded",
        );
        Ok(MediaReference::MediaId { media_id })
    }

    /// Read a file from disk and upload it.
    pub async fn upload_file(&self, path: &Path) -> Result<MediaReference, WorkflowError> {
        let payload = read_payload(path).await?;
        self.upload(&payload).await
    }

    /// Upload every pending content of `prompt` in submission order,
    /// replacing each with its media id.
    ///
    /// Stops at the first failure; contents after it stay pending.
    /// Returns the number of uploads performed.
    pub async fn resolve_uploads(&self, prompt: &mut PromptDescriptor) -> Result<usize, WorkflowError> {
        let mut uploaded = 0;

        for content in prompt.contents_mut() {
            let PromptContent::Upload(payload) = &*content else {
                continue;
            };
            let filename = payload.filename.clone();

            self.reporter.emit(WorkflowEventKind::UploadStarted {
                filename: filename.clone(),
            });
            let reference = self.upload(payload).await?;
            if let MediaReference::MediaId { media_id } = &reference {
                self.reporter.emit(WorkflowEventKind::UploadCompleted {
                    filename,
                    media_id: media_id.clone(),
                });
            }

            *content = PromptContent::from(reference);
            uploaded += 1;
        }

        Ok(uploaded)
    }
}

/// Load a file into a [`MediaPayload`], inferring the MIME type from its
/// extension.
pub async fn read_payload(path: &Path) -> Result<MediaPayload, WorkflowError> {
    let bytes = tokio::fs::read(path).await?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| WorkflowError::Validation(format!("'{}' is not a file", path.display())))?;

    Ok(MediaPayload::new(bytes, filename).with_mime_type(mime_for_path(path)))
}
