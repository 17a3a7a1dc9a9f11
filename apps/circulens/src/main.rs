use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    AnalyzeDisposition, HttpAnalysisService, IntakeDisposition, Presentation, ResultsPanel,
    ServiceEndpoint, WorkflowController,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod export;

use config::load_settings;
use export::FileDiagramExporter;

#[derive(Parser, Debug)]
#[command(name = "circulens", version, about = "Analyze circuit photos with a CircuLens service")]
struct Args {
    /// Base address of the analysis service.
    #[arg(long, global = true)]
    service_url: Option<String>,
    /// Config file; defaults to ./circulens.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a circuit photo and print the analysis.
    Analyze {
        image: PathBuf,
        /// Download the generated schematic to this path.
        #[arg(long)]
        save_diagram: Option<PathBuf>,
        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Check that the analysis service is reachable.
    Health,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(url) = args.service_url {
        settings.service_url = url;
    }
    let endpoint = ServiceEndpoint::parse(&settings.service_url)?;
    let service = Arc::new(
        HttpAnalysisService::with_timeout(endpoint.clone(), settings.request_timeout())
            .context("failed to build http client")?,
    );
    info!(service = endpoint.base_url(), "using analysis service");

    match args.command {
        Command::Health => {
            let health = service
                .health()
                .await
                .with_context(|| format!("analysis service at {} is unreachable", endpoint.base_url()))?;
            println!("{}", health.message);
            Ok(ExitCode::SUCCESS)
        }
        Command::Analyze {
            image,
            save_diagram,
            json,
        } => {
            let controller = WorkflowController::new(service.clone(), endpoint);
            match controller.select_image_file(&image).await? {
                IntakeDisposition::Selected(image_id) => {
                    info!(%image_id, path = %image.display(), "image loaded")
                }
                IntakeDisposition::Ignored(reason) => {
                    bail!("'{}' was not accepted: {reason:?}", image.display())
                }
            }

            let disposition = controller.analyze().await;
            let presentation = controller.presentation().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&presentation)?);
            } else {
                print_presentation(&presentation);
            }

            if let Some(path) = save_diagram {
                let exporter = FileDiagramExporter::new(service, path.clone());
                if !controller.export_diagram(&exporter).await? {
                    warn!(path = %path.display(), "no diagram to save");
                }
            }

            let succeeded = matches!(
                disposition,
                AnalyzeDisposition::Completed(ref outcome) if outcome.is_success()
            );
            Ok(if succeeded {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

fn print_presentation(presentation: &Presentation) {
    match &presentation.panel {
        ResultsPanel::Report(report) => {
            println!("{}", report.markdown.trim_end());
            println!();
            println!("Diagram: {}", report.diagram.url);
        }
        ResultsPanel::Error { message } => eprintln!("Error: {message}"),
        ResultsPanel::Progress => eprintln!("Analyzing circuit components..."),
        ResultsPanel::Placeholder => {
            eprintln!("Analysis results will appear here after processing the image")
        }
    }
}
