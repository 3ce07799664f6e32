// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Locating the kubeconfig kind generated for the new cluster

use super::Provisioner;
use crate::config::KubeconfigPolicy;
use crate::error::{Result, SetupKindError};
use crate::exec::CommandRunner;
use crate::tools::{fs, Downloader};
use kube::config::Kubeconfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

impl<R: CommandRunner, D: Downloader> Provisioner<R, D> {
    /// Ask kind where it wrote the kubeconfig and, depending on the policy,
    /// either return that path or move the file to the default location.
    #[instrument(skip(self), fields(cluster = %self.cluster.cluster_name, policy = ?self.policy))]
    pub async fn resolve_kubeconfig(&self) -> Result<PathBuf> {
        let reported = self.query_kubeconfig_path().await?;
        describe_kubeconfig(&reported).await?;

        match self.policy {
            KubeconfigPolicy::PathOutput => Ok(reported),
            KubeconfigPolicy::DefaultLocation => {
                let target = self.layout.kubeconfig_path.clone();
                relocate(&reported, &target).await?;

                self.kubectl(&["cluster-info"]).await?;
                self.kubectl(&["get", "nodes"]).await?;
                Ok(target)
            }
        }
    }

    async fn query_kubeconfig_path(&self) -> Result<PathBuf> {
        let output = self
            .kind(&[
                "get",
                "kubeconfig-path",
                "--name",
                self.cluster.cluster_name.as_str(),
            ])
            .await
            .map_err(|e| SetupKindError::Resolution(e.to_string()))?;

        let path = output.stdout.trim();
        if path.is_empty() {
            return Err(SetupKindError::Resolution(format!(
                "kind reported no kubeconfig path for cluster {}",
                self.cluster.cluster_name
            )));
        }
        debug!("kind reported kubeconfig path {}", path);
        Ok(PathBuf::from(path))
    }
}

/// Check that `path` holds a kubeconfig and log which context it selects
async fn describe_kubeconfig(path: &Path) -> Result<()> {
    let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
        SetupKindError::Resolution(format!("cannot read {}: {}", path.display(), e))
    })?;
    let kubeconfig = Kubeconfig::from_yaml(&contents).map_err(|e| {
        SetupKindError::Resolution(format!(
            "{} is not a usable kubeconfig: {}",
            path.display(),
            e
        ))
    })?;

    info!(
        "Kubeconfig {} selects context {}",
        path.display(),
        kubeconfig.current_context.as_deref().unwrap_or("<none>")
    );
    Ok(())
}

/// Replace `target` with `source`. Nothing is restored if this fails halfway.
async fn relocate(source: &Path, target: &Path) -> Result<()> {
    let failed = |e: SetupKindError| {
        SetupKindError::Resolution(format!(
            "moving {} to {}: {}",
            source.display(),
            target.display(),
            e
        ))
    };

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).await.map_err(failed)?;
    }
    fs::move_file(source, target).await.map_err(failed)?;
    info!("Kubeconfig moved to {}", target.display());
    Ok(())
}
