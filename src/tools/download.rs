// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Fetching release artifacts into the runner's temp directory

use crate::error::{Result, SetupKindError};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};
use url::Url;

/// Fetches a remote artifact and returns the local path it was stored at
#[allow(async_fn_in_trait)]
pub trait Downloader {
    async fn download(&self, url: &Url) -> Result<PathBuf>;
}

pub struct HttpDownloader {
    client: reqwest::Client,
    download_dir: PathBuf,
}

impl HttpDownloader {
    pub fn new(download_dir: PathBuf) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("setup-kind/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            download_dir,
        })
    }
}

impl Downloader for HttpDownloader {
    #[instrument(skip_all, fields(url = %url))]
    async fn download(&self, url: &Url) -> Result<PathBuf> {
        info!("Downloading {}", url);
        let failed = |reason: String| SetupKindError::Download {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(failed(format!("server responded with {}", response.status())));
        }

        tokio::fs::create_dir_all(&self.download_dir)
            .await
            .map_err(|e| SetupKindError::filesystem(&self.download_dir, e))?;

        let (file, path) = tempfile::Builder::new()
            .prefix("setup-kind-")
            .tempfile_in(&self.download_dir)
            .and_then(|f| f.keep().map_err(|e| e.error))
            .map_err(|e| SetupKindError::filesystem(&self.download_dir, e))?;

        match write_body(response, File::from_std(file), &path).await {
            Ok(0) => {
                let _ = tokio::fs::remove_file(&path).await;
                Err(failed("response body is empty".to_string()))
            }
            Ok(written) => {
                debug!("Stored {} bytes at {}", written, path.display());
                Ok(path)
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&path).await;
                Err(match e {
                    WriteError::Stream(reason) => failed(reason),
                    WriteError::Io(source) => SetupKindError::filesystem(&path, source),
                })
            }
        }
    }
}

enum WriteError {
    Stream(String),
    Io(std::io::Error),
}

async fn write_body(
    response: reqwest::Response,
    mut file: File,
    path: &Path,
) -> std::result::Result<u64, WriteError> {
    let mut written = 0u64;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| WriteError::Stream(e.to_string()))?;
        file.write_all(&chunk).await.map_err(WriteError::Io)?;
        written += chunk.len() as u64;
    }
    file.sync_all().await.map_err(WriteError::Io)?;
    debug!("Finished writing {}", path.display());
    Ok(written)
}
