use tourforge_core::error::CoreError;
use tourforge_marble::api::MarbleApiError;
use tourforge_pipeline::WorkflowError;

/// Anything that makes the CLI exit with status 1.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] CoreError),

    #[error("Failed to create HTTP client: {0}")]
    Client(#[from] MarbleApiError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}
