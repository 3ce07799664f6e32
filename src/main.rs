// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use setup_kind::config::Config;
use setup_kind::exec::ProcessRunner;
use setup_kind::pipeline;
use setup_kind::provisioner::Provisioner;
use setup_kind::tools::HttpDownloader;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => pipeline::report_failure(&e),
    }
}

async fn run() -> Result<()> {
    info!("Starting setup-kind");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: policy={:?}, cluster={}, kind={}",
        config.policy, config.cluster.cluster_name, config.cluster.version
    );

    // Installed tools are looked up in the bin dir before the inherited PATH
    let runner = ProcessRunner::new([config.layout.bin_dir.clone()]);
    let downloader = HttpDownloader::new(config.layout.download_dir.clone())
        .context("Failed to create HTTP client")?;

    let provisioner = Provisioner::new(config, runner, downloader);
    let result = provisioner.run().await?;

    info!(
        "Cluster ready, kubeconfig at {}",
        result.kubeconfig.display()
    );
    Ok(())
}
