// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Filesystem helpers for placing binaries and credentials

use crate::error::{Result, SetupKindError};
use std::path::Path;
use tracing::debug;

pub async fn create_dir_all(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| SetupKindError::filesystem(dir, e))
}

/// Move `from` to `to`, replacing whatever is at `to`.
///
/// Falls back to copy and delete when a rename is not possible, e.g. when the
/// runner temp dir and the home directory are on different devices.
pub async fn move_file(from: &Path, to: &Path) -> Result<()> {
    if let Err(e) = tokio::fs::rename(from, to).await {
        debug!(
            "Rename {} -> {} failed ({}), copying instead",
            from.display(),
            to.display(),
            e
        );
        tokio::fs::copy(from, to)
            .await
            .map_err(|e| SetupKindError::filesystem(from, e))?;
        tokio::fs::remove_file(from)
            .await
            .map_err(|e| SetupKindError::filesystem(from, e))?;
    }
    Ok(())
}

#[cfg(unix)]
pub async fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .await
        .map_err(|e| SetupKindError::filesystem(path, e))
}

#[cfg(not(unix))]
pub async fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
