// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The cluster provisioning workflow: install tools, create the cluster,
//! resolve its kubeconfig, optionally install a storage provisioner and
//! report back to the pipeline.

mod kubeconfig;
mod storage;

use crate::config::{ClusterConfig, Config, KubeconfigPolicy, Layout};
use crate::constants::{tools, KUBECONFIG_OUTPUT};
use crate::error::Result;
use crate::exec::{CommandOutput, CommandRunner};
use crate::pipeline::Pipeline;
use crate::tools::{install_tool, Downloader, ToolSpec};
use std::path::PathBuf;
use tracing::{info, instrument};

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningResult {
    pub kubeconfig: PathBuf,
}

pub struct Provisioner<R, D> {
    policy: KubeconfigPolicy,
    cluster: ClusterConfig,
    layout: Layout,
    pipeline: Pipeline,
    runner: R,
    downloader: D,
}

impl<R: CommandRunner, D: Downloader> Provisioner<R, D> {
    pub fn new(config: Config, runner: R, downloader: D) -> Self {
        Self {
            policy: config.policy,
            cluster: config.cluster,
            layout: config.layout,
            pipeline: config.pipeline,
            runner,
            downloader,
        }
    }

    /// Run the whole workflow. The first failing step ends the run; nothing
    /// that already happened is undone.
    pub async fn run(&self) -> Result<ProvisioningResult> {
        self.install_tools().await?;
        self.create_cluster().await?;
        let kubeconfig = self.resolve_kubeconfig().await?;

        if self.cluster.install_storage_provisioner {
            self.install_storage_provisioner().await?;
        }

        self.report(&kubeconfig).await?;
        Ok(ProvisioningResult { kubeconfig })
    }

    /// Install kind and kubectl into the bin directory and put it on the
    /// pipeline's search path
    #[instrument(skip(self), fields(bin_dir = %self.layout.bin_dir.display()))]
    pub async fn install_tools(&self) -> Result<()> {
        let tools = [ToolSpec::kind(&self.cluster.version)?, ToolSpec::kubectl()?];
        for tool in &tools {
            install_tool(&self.downloader, tool, &self.layout.bin_dir).await?;
        }

        self.pipeline.add_path(&self.layout.bin_dir).await
    }

    #[instrument(skip(self), fields(cluster = %self.cluster.cluster_name))]
    pub async fn create_cluster(&self) -> Result<()> {
        info!("Creating kind cluster...");
        self.runner
            .run(tools::KIND, &self.cluster.create_cluster_args())
            .await?;
        info!("Cluster '{}' created", self.cluster.cluster_name);
        Ok(())
    }

    async fn report(&self, kubeconfig: &std::path::Path) -> Result<()> {
        match self.policy {
            KubeconfigPolicy::PathOutput => {
                self.pipeline
                    .set_output(KUBECONFIG_OUTPUT, &kubeconfig.to_string_lossy())
                    .await
            }
            KubeconfigPolicy::DefaultLocation => {
                info!("Kubeconfig available at {}", kubeconfig.display());
                Ok(())
            }
        }
    }

    async fn kubectl(&self, args: &[&str]) -> Result<CommandOutput> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        self.runner.run(tools::KUBECTL, &args).await
    }

    async fn kind(&self, args: &[&str]) -> Result<CommandOutput> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        self.runner.run(tools::KIND, &args).await
    }
}
