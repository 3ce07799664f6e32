// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetupKindError {
    #[error("Failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("Filesystem operation on {} failed: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed with exit status {status}\n{output}")]
    Provisioning {
        command: String,
        status: i32,
        output: String,
    },

    #[error("Failed to resolve kubeconfig: {0}")]
    Resolution(String),

    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl SetupKindError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SetupKindError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SetupKindError>;
