//! `tourforge` binary.
//!
//! Runs one generation workflow, writes the result to
//! `<output-dir>/<slug>-<timestamp>.json` and prints the viewer URL.
//! Exits with status 1 on any failure. Ctrl-C cancels a running poll.
//!
//! Credentials come from `--credentials <file>` or the environment
//! (`WLT_API_KEY`, see `VendorConfig::from_env`).

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tourforge_cli::args::Cli;
use tourforge_cli::error::CliError;
use tourforge_cli::progress;
use tourforge_events::EventBus;
use tourforge_marble::api::MarbleApi;
use tourforge_pipeline::store::{ResultStore, StoredTour};
use tourforge_pipeline::{JobWorkflow, WorkflowConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tourforge_cli=info,tourforge_pipeline=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => {}
        Err(e) => {
            tracing::error!(error = %e, "Tour generation failed");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let vendor = cli.vendor_config()?;
    tracing::debug!(config = ?vendor, "Vendor configuration loaded");

    let request = cli.build_request().await?;
    let api = Arc::new(MarbleApi::new(&vendor)?);

    let bus = Arc::new(EventBus::default());
    let printer = tokio::spawn(progress::log_events(bus.subscribe()));

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling");
            interrupt.cancel();
        }
    });

    let workflow = JobWorkflow::new(
        api,
        WorkflowConfig::from_vendor(&vendor).with_enrichment(!cli.no_enrich),
    )
    .with_event_bus(Arc::clone(&bus));

    tracing::info!(
        display_name = %request.display_name,
        kind = request.prompt.kind(),
        model = request.model_tier.model_id(),
        "Starting tour generation",
    );

    let outcome = async {
        let handle = workflow.start(&request).await?;
        let tour = workflow
            .complete(&handle, &request.display_name, &cancel)
            .await?;
        Ok::<_, CliError>((handle, tour))
    }
    .await;

    drop(workflow);
    drop(bus);
    let _ = printer.await;

    let (handle, tour) = outcome?;
    let saved = ResultStore::new(&cli.output_dir)
        .save(&StoredTour {
            result: tour.clone(),
            operation_id: handle.operation_id,
            model: request.model_tier.model_id().to_string(),
        })
        .await?;

    tracing::info!(path = %saved.display(), "Result written");
    println!("{}", tour.view_url);
    Ok(())
}
