// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Communication with the invoking CI pipeline over the GitHub Actions
//! environment-file and workflow-command protocol.

use crate::error::{Result, SetupKindError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info};

/// Environment variable carrying the value of a declared input
pub fn input_env_name(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    output_file: Option<PathBuf>,
    path_file: Option<PathBuf>,
}

impl Pipeline {
    pub fn new(output_file: Option<PathBuf>, path_file: Option<PathBuf>) -> Self {
        Self {
            output_file,
            path_file,
        }
    }

    pub fn output_file(&self) -> Option<&Path> {
        self.output_file.as_deref()
    }

    pub fn path_file(&self) -> Option<&Path> {
        self.path_file.as_deref()
    }

    /// Make `dir` part of the search path of every later pipeline step
    pub async fn add_path(&self, dir: &Path) -> Result<()> {
        match &self.path_file {
            Some(file) => append_line(file, &dir.to_string_lossy()).await,
            None => {
                debug!("GITHUB_PATH not set, not exporting {}", dir.display());
                Ok(())
            }
        }
    }

    /// Publish a named step output
    pub async fn set_output(&self, name: &str, value: &str) -> Result<()> {
        info!("Setting output {}={}", name, value);
        match &self.output_file {
            Some(file) => append_line(file, &format!("{}={}", name, value)).await,
            None => {
                println!("::set-output name={}::{}", name, escape_data(value));
                Ok(())
            }
        }
    }
}

/// Mark the step as failed. The caller is expected to exit non-zero afterwards.
pub fn set_failed(message: &str) {
    println!("{}", error_command(message));
}

/// Report `err` with its whole cause chain and return the exit status for it
pub fn report_failure(err: &anyhow::Error) -> ExitCode {
    let message = failure_message(err);
    error!("Provisioning failed: {}", message);
    set_failed(&message);
    ExitCode::FAILURE
}

fn failure_message(err: &anyhow::Error) -> String {
    format!("{:#}", err)
}

fn error_command(message: &str) -> String {
    format!("::error::{}", escape_data(message))
}

fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

async fn append_line(file: &Path, line: &str) -> Result<()> {
    let mut f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(file)
        .await
        .map_err(|e| SetupKindError::filesystem(file, e))?;
    f.write_all(format!("{}\n", line).as_bytes())
        .await
        .map_err(|e| SetupKindError::filesystem(file, e))?;
    f.flush()
        .await
        .map_err(|e| SetupKindError::filesystem(file, e))
}
