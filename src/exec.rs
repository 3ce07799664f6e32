// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! External process execution

use crate::error::{Result, SetupKindError};
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Captured output of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs an external command to completion.
///
/// Implementations return `SetupKindError::Provisioning` when the command
/// exits non-zero. Only one command is ever in flight.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput>;
}

/// Render a command the way it would be typed in a shell, for logs and errors
pub fn command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Runs commands as child processes, forwarding their output to the log.
///
/// Directories in `search_path` are looked up before the inherited `PATH`.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    search_path: Vec<PathBuf>,
}

impl ProcessRunner {
    pub fn new(search_path: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            search_path: search_path.into_iter().collect(),
        }
    }

    async fn resolve(&self, program: &str) -> PathBuf {
        for dir in &self.search_path {
            let candidate = dir.join(program);
            if let Ok(metadata) = tokio::fs::metadata(&candidate).await {
                if metadata.is_file() {
                    return candidate;
                }
            }
        }
        PathBuf::from(program)
    }

    fn path_env(&self) -> Option<OsString> {
        let inherited = env::var_os("PATH");
        let dirs = self
            .search_path
            .iter()
            .cloned()
            .chain(inherited.iter().flat_map(env::split_paths));
        env::join_paths(dirs).ok()
    }
}

impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        let command = command_line(program, args);
        info!("[command]{}", command);

        let mut cmd = Command::new(self.resolve(program).await);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(path) = self.path_env() {
            cmd.env("PATH", path);
        }

        let mut child = cmd.spawn().map_err(|e| SetupKindError::Spawn {
            command: command.clone(),
            source: e,
        })?;

        let (stdout, stderr) = tokio::join!(
            forward_lines(child.stdout.take()),
            forward_lines(child.stderr.take())
        );

        let status = child.wait().await.map_err(|e| SetupKindError::Spawn {
            command: command.clone(),
            source: e,
        })?;

        if !status.success() {
            return Err(SetupKindError::Provisioning {
                command,
                status: status.code().unwrap_or(-1),
                output: format!("{}{}", stdout, stderr),
            });
        }

        debug!("`{}` finished successfully", command);
        Ok(CommandOutput { stdout, stderr })
    }
}

/// Log every line of `reader` as it arrives and return everything read.
///
/// Lines that are not valid UTF-8 are decoded lossily; the reader is drained
/// to EOF so the child never writes into a closed pipe.
async fn forward_lines<R: AsyncRead + Unpin>(reader: Option<R>) -> String {
    let mut captured = String::new();
    let Some(reader) = reader else {
        return captured;
    };

    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(&['\n', '\r'][..]);
                info!("{}", line);
                captured.push_str(line);
                captured.push('\n');
            }
            Err(e) => {
                warn!("Failed to read command output: {}", e);
                break;
            }
        }
    }
    captured
}
