// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Fallbacks used when the corresponding input is empty
pub mod defaults {
    pub const KIND_VERSION: &str = "v0.5.1";
    pub const CLUSTER_NAME: &str = "chart-testing";
    pub const WAIT_DURATION: &str = "60s";
}

/// Release locations of the installed binaries
pub mod releases {
    /// `{version}` is substituted with the requested kind release tag
    pub const KIND_URL: &str =
        "https://github.com/kubernetes-sigs/kind/releases/download/{version}/kind-linux-amd64";
    pub const KUBECTL_URL: &str =
        "https://storage.googleapis.com/kubernetes-release/release/v1.16.0/bin/linux/amd64/kubectl";
}

/// Names of the external binaries, also used as their file names in the bin directory
pub mod tools {
    pub const KIND: &str = "kind";
    pub const KUBECTL: &str = "kubectl";
}

/// Local-path storage provisioner installation
pub mod storage {
    pub const MANIFEST_URL: &str =
        "https://raw.githubusercontent.com/rancher/local-path-provisioner/master/deploy/local-path-storage.yaml";
    /// Storage class created by kind, demoted from default
    pub const KIND_STORAGE_CLASS: &str = "standard";
    /// Storage class created by the manifest, promoted to default
    pub const LOCAL_PATH_STORAGE_CLASS: &str = "local-path";
    pub const DEFAULT_CLASS_ANNOTATION: &str = "storageclass.kubernetes.io/is-default-class";
}

/// Name of the pipeline output carrying the kubeconfig path
pub const KUBECONFIG_OUTPUT: &str = "kubeconfig";

/// Environment variable selecting the kubeconfig policy
pub const POLICY_ENV: &str = "SETUP_KIND_POLICY";
