// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{bail, Context, Result};
use std::env;
use std::path::{Path, PathBuf};

use crate::constants::{defaults, POLICY_ENV};
use crate::pipeline::{input_env_name, Pipeline};

/// How the generated kubeconfig is handed back to the pipeline.
///
/// The two policies come with their own input names and output contracts and
/// are never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KubeconfigPolicy {
    /// Leave the kubeconfig where kind wrote it and expose its path as the
    /// `kubeconfig` output.
    PathOutput,
    /// Move the kubeconfig to `~/.kube/config` and declare no output.
    #[default]
    DefaultLocation,
}

impl KubeconfigPolicy {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim() {
            "" | "default-location" => Ok(KubeconfigPolicy::DefaultLocation),
            "path-output" => Ok(KubeconfigPolicy::PathOutput),
            other => bail!(
                "unknown {} '{}', expected 'default-location' or 'path-output'",
                POLICY_ENV,
                other
            ),
        }
    }

    /// Names under which the pipeline declares the inputs for this policy
    pub fn inputs(&self) -> &'static InputNames {
        match self {
            KubeconfigPolicy::PathOutput => &PATH_OUTPUT_INPUTS,
            KubeconfigPolicy::DefaultLocation => &DEFAULT_LOCATION_INPUTS,
        }
    }
}

/// Declared input names of one action variant
#[derive(Debug)]
pub struct InputNames {
    pub version: &'static str,
    pub config: &'static str,
    pub node_image: &'static str,
    pub cluster_name: &'static str,
    pub wait_duration: &'static str,
    pub log_level: &'static str,
    pub install_storage_provisioner: Option<&'static str>,
}

static DEFAULT_LOCATION_INPUTS: InputNames = InputNames {
    version: "version",
    config: "config",
    node_image: "node-image",
    cluster_name: "cluster-name",
    wait_duration: "wait-duration",
    log_level: "log-level",
    install_storage_provisioner: Some("install-local-path-provisioner"),
};

static PATH_OUTPUT_INPUTS: InputNames = InputNames {
    version: "version",
    config: "configFile",
    node_image: "nodeImage",
    cluster_name: "clusterName",
    wait_duration: "waitDuration",
    log_level: "logLevel",
    install_storage_provisioner: None,
};

/// Cluster settings, fixed once the inputs have been read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterConfig {
    pub version: String,
    pub config_file: Option<PathBuf>,
    pub node_image: Option<String>,
    pub cluster_name: String,
    pub wait_duration: String,
    pub log_level: Option<String>,
    pub install_storage_provisioner: bool,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        ClusterConfig {
            version: defaults::KIND_VERSION.to_string(),
            config_file: None,
            node_image: None,
            cluster_name: defaults::CLUSTER_NAME.to_string(),
            wait_duration: defaults::WAIT_DURATION.to_string(),
            log_level: None,
            install_storage_provisioner: false,
        }
    }
}

impl ClusterConfig {
    /// Build the configuration from raw input values. `input` returns the
    /// trimmed value of a declared input, empty when it was not provided.
    pub fn from_inputs(names: &InputNames, input: impl Fn(&str) -> String) -> Self {
        let install_storage_provisioner = names
            .install_storage_provisioner
            .map(|name| input(name) == "true")
            .unwrap_or(false);

        ClusterConfig {
            version: or_default(input(names.version), defaults::KIND_VERSION),
            config_file: non_empty(input(names.config)).map(PathBuf::from),
            node_image: non_empty(input(names.node_image)),
            cluster_name: or_default(input(names.cluster_name), defaults::CLUSTER_NAME),
            wait_duration: or_default(input(names.wait_duration), defaults::WAIT_DURATION),
            log_level: non_empty(input(names.log_level)),
            install_storage_provisioner,
        }
    }

    /// Arguments for `kind create cluster`, flags in a fixed order
    pub fn create_cluster_args(&self) -> Vec<String> {
        let mut args = vec!["create".to_string(), "cluster".to_string()];

        if let Some(config_file) = &self.config_file {
            args.push("--config".to_string());
            args.push(config_file.to_string_lossy().into_owned());
        }
        if let Some(image) = &self.node_image {
            args.push("--image".to_string());
            args.push(image.clone());
        }
        push_flag(&mut args, "--name", &self.cluster_name);
        push_flag(&mut args, "--wait", &self.wait_duration);
        if let Some(log_level) = &self.log_level {
            args.push("--loglevel".to_string());
            args.push(log_level.clone());
        }

        args
    }
}

fn push_flag(args: &mut Vec<String>, flag: &str, value: &str) {
    if !value.is_empty() {
        args.push(flag.to_string());
        args.push(value.to_string());
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn or_default(value: String, default: &str) -> String {
    non_empty(value).unwrap_or_else(|| default.to_string())
}

/// Where binaries, downloads and credentials live on the runner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub bin_dir: PathBuf,
    pub kubeconfig_path: PathBuf,
    pub download_dir: PathBuf,
}

impl Layout {
    pub fn from_home(home: &Path, download_dir: PathBuf) -> Self {
        Layout {
            bin_dir: home.join("bin"),
            kubeconfig_path: home.join(".kube").join("config"),
            download_dir,
        }
    }
}

/// Action configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub policy: KubeconfigPolicy,
    pub cluster: ClusterConfig,
    pub layout: Layout,
    pub pipeline: Pipeline,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any environment-like source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let policy = KubeconfigPolicy::parse(&lookup(POLICY_ENV).unwrap_or_default())?;

        let home = lookup("HOME")
            .filter(|h| !h.is_empty())
            .context("HOME environment variable not set")?;
        let download_dir = lookup("RUNNER_TEMP")
            .filter(|d| !d.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir);
        let layout = Layout::from_home(Path::new(&home), download_dir);

        let cluster = ClusterConfig::from_inputs(policy.inputs(), |name| {
            lookup(&input_env_name(name))
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        });

        let pipeline = Pipeline::new(
            lookup("GITHUB_OUTPUT").filter(|p| !p.is_empty()).map(PathBuf::from),
            lookup("GITHUB_PATH").filter(|p| !p.is_empty()).map(PathBuf::from),
        );

        Ok(Config {
            policy,
            cluster,
            layout,
            pipeline,
        })
    }
}
