mod args;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use scout_core::config::PipelineConfig;
use scout_core::Error;
use scout_finder::{export, Pipeline, TwitterServices};
use scout_util::parse_handle;

use crate::args::{Cli, Command, RunArgs};

#[tokio::main]
async fn main() {
    dotenv().ok();

    // 1. Initialize logger
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::DEBUG.into())
        .from_env_lossy()
        .add_directive("hyper=info".parse().expect("valid directive"))
        .add_directive("reqwest=info".parse().expect("valid directive"));
    tracing_subscriber::fmt().with_env_filter(filter).compact().init();

    // 2. Dispatch
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Run(args) => run(args).await,
        Command::Open { csv } => open(&csv).await,
    };
    if let Err(e) = result {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: RunArgs) -> anyhow::Result<()> {
    let operator = parse_handle(&args.operator).context("invalid operator handle")?;
    let target = parse_handle(&args.target).context("invalid target handle")?;

    let base = match args.config {
        Some(ref path) => load_config(path).await?,
        None => PipelineConfig::default(),
    };
    let config = args.apply(base);
    tracing::debug!("Configuration: {:?}", config);

    let services = TwitterServices::from_token(&args.bearer_token)?;
    let mut pipeline = Pipeline::new(services.clone(), services, config);

    let result = with_timeout(args.timeout(), pipeline.run(&operator, &target)).await;
    let report = result.with_context(|| format!("run stopped during {}", pipeline.stage()))?;
    if let Some(path) = report.base_csv {
        tracing::info!("Base list: {}", path.display());
    }
    if let Some(path) = report.mutuals_csv {
        tracing::info!("Mutuals list: {}", path.display());
    }
    Ok(())
}

/// Print the profile URLs of an exported list for the operator to open.
async fn open(csv: &Path) -> anyhow::Result<()> {
    let urls = export::read_profile_urls(csv)
        .await
        .with_context(|| format!("cannot read {}", csv.display()))?;
    for url in urls {
        println!("{}", url);
    }
    Ok(())
}

async fn load_config(path: &Path) -> anyhow::Result<PipelineConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read config {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid config {}", path.display()))
}

/// Bound the whole run. Dropping the run also cancels a pending rate-limit wait.
async fn with_timeout<T>(limit: Option<Duration>, f: impl Future<Output = scout_core::Result<T>>) -> scout_core::Result<T> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, f)
            .await
            .unwrap_or_else(|_| Err(Error::Timeout(format!("run exceeded {} s", limit.as_secs())))),
        None => f.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn timeout_cancels_a_long_wait() {
        let wait = async {
            tokio::time::sleep(Duration::from_secs(16 * 60)).await;
            Ok(())
        };
        let result = with_timeout(Some(Duration::from_secs(60)), wait).await;
        assert!(matches!(result, Err(Error::Timeout(_))));
    }

    #[tokio::test]
    async fn no_timeout_runs_to_completion() {
        let result = with_timeout(None, async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
