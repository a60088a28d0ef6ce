//! `configure-cdn` entry point
//!
//! Puts the LMS, CMS and any extra domains behind CloudFront. Every run is
//! idempotent: resources that already exist are reused, missing ones are
//! created.
//!
//! # Usage
//! ```bash
//! configure-cdn --config config.toml create-cloudfront-resources
//! ```

mod config;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use cdn_orchestrator_core::types::{Outcome, ReconcileReport};
use cdn_orchestrator_core::{ReconcileService, ServiceContext};
use cdn_orchestrator_provider::{create_provider, log_sanitizer::mask_secret};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

// ============================================================
// CLI Definition
// ============================================================

#[derive(Parser, Debug)]
#[command(name = "configure-cdn")]
#[command(about = "Commands for configuring CloudFront", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (TOML); a missing file means defaults plus environment
    #[arg(
        long,
        env = "CDN_ORCHESTRATOR_CONFIG",
        default_value = "config.toml",
        global = true
    )]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Create the CloudFront resources on AWS for the instance
    CreateCloudfrontResources,
}

// ============================================================
// Main Entry Point
// ============================================================

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; stdout only carries the completion line.
fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::CreateCloudfrontResources => create_cloudfront_resources(&cli.config).await,
    }
}

async fn create_cloudfront_resources(config_path: &std::path::Path) -> Result<()> {
    let settings = config::load_settings(config_path)?;
    let plan = settings.validate().context("Invalid CloudFront settings")?;

    tracing::info!(
        "Using access key {} in region {} for {} domain(s)",
        mask_secret(&settings.aws_access_key_id),
        settings.aws_region,
        plan.targets.len()
    );

    let provider = create_provider(settings.provider_credentials());
    let service = ReconcileService::new(Arc::new(ServiceContext::new(provider)));

    let report = service.reconcile(&plan).await?;
    for line in report_lines(&report) {
        tracing::info!("{line}");
    }

    if let Some(message) = completion_message(&report) {
        println!("{message}");
    }
    Ok(())
}

/// stdout 上的完成提示，报告为空时不输出
fn completion_message(report: &ReconcileReport) -> Option<String> {
    report
        .last_domain()
        .map(|domain| format!("CloudFront is set up for {domain}"))
}

/// 每个资源一行，按处理顺序
fn report_lines(report: &ReconcileReport) -> Vec<String> {
    report
        .domains
        .iter()
        .flat_map(|domain| {
            domain.resources.iter().map(move |resource| {
                let verb = match resource.outcome {
                    Outcome::Created => "created",
                    Outcome::Reused => "reused",
                };
                format!(
                    "{}: {} {} ({}) {verb}",
                    domain.domain, resource.kind, resource.name, resource.id
                )
            })
        })
        .collect()
}
