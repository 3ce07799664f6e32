// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Installation of the kind and kubectl binaries

pub mod download;
pub mod fs;

pub use download::{Downloader, HttpDownloader};

use crate::constants::{releases, tools};
use crate::error::{Result, SetupKindError};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use url::Url;

/// A binary to install and where to get it from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: &'static str,
    pub download_url: Url,
}

impl ToolSpec {
    /// The kind release matching `version`
    pub fn kind(version: &str) -> Result<Self> {
        Self::new(tools::KIND, &releases::KIND_URL.replace("{version}", version))
    }

    pub fn kubectl() -> Result<Self> {
        Self::new(tools::KUBECTL, releases::KUBECTL_URL)
    }

    fn new(name: &'static str, url: &str) -> Result<Self> {
        let download_url = Url::parse(url).map_err(|e| SetupKindError::Download {
            url: url.to_string(),
            reason: format!("invalid URL: {}", e),
        })?;
        Ok(Self { name, download_url })
    }
}

/// Download `tool` and place it as an executable in `bin_dir`.
/// Returns the installed path. Installing over an existing binary replaces it.
#[instrument(skip(downloader, tool), fields(tool = tool.name))]
pub async fn install_tool<D: Downloader>(
    downloader: &D,
    tool: &ToolSpec,
    bin_dir: &Path,
) -> Result<PathBuf> {
    info!("Installing {}...", tool.name);

    let downloaded = downloader.download(&tool.download_url).await?;

    let binary = bin_dir.join(tool.name);
    if let Err(e) = place_binary(&downloaded, &binary).await {
        let _ = tokio::fs::remove_file(&downloaded).await;
        return Err(e);
    }
    fs::make_executable(&binary).await?;

    Ok(binary)
}

async fn place_binary(downloaded: &Path, binary: &Path) -> Result<()> {
    if let Some(bin_dir) = binary.parent() {
        fs::create_dir_all(bin_dir).await?;
        info!("Moving {} to {}", downloaded.display(), bin_dir.display());
    }
    fs::move_file(downloaded, binary).await
}
