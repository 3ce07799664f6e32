// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Local-path storage provisioner installation

use super::Provisioner;
use crate::constants::storage::{
    DEFAULT_CLASS_ANNOTATION, KIND_STORAGE_CLASS, LOCAL_PATH_STORAGE_CLASS, MANIFEST_URL,
};
use crate::error::Result;
use crate::exec::CommandRunner;
use crate::tools::Downloader;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;
use tracing::{info, instrument};

impl<R: CommandRunner, D: Downloader> Provisioner<R, D> {
    /// Install the local-path provisioner and make its storage class the default.
    ///
    /// A failure after the manifest was applied leaves the cluster as it is,
    /// possibly with no default storage class.
    #[instrument(skip(self))]
    pub async fn install_storage_provisioner(&self) -> Result<()> {
        info!("Installing local-path provisioner...");
        self.kubectl(&["apply", "-f", MANIFEST_URL]).await?;

        info!("Changing default StorageClass...");
        self.set_default_class(KIND_STORAGE_CLASS, false).await?;
        self.set_default_class(LOCAL_PATH_STORAGE_CLASS, true).await?;

        info!("Available StorageClasses:");
        self.kubectl(&["get", "storageclasses"]).await?;
        Ok(())
    }

    async fn set_default_class(&self, storage_class: &str, is_default: bool) -> Result<()> {
        let patch = default_class_patch(is_default);
        self.kubectl(&[
            "patch",
            "storageclass",
            storage_class,
            "--patch",
            patch.as_str(),
        ])
        .await?;
        Ok(())
    }
}

/// Merge patch setting the default-class annotation of a storage class
fn default_class_patch(is_default: bool) -> String {
    let metadata = ObjectMeta {
        annotations: Some(BTreeMap::from([(
            DEFAULT_CLASS_ANNOTATION.to_string(),
            is_default.to_string(),
        )])),
        ..Default::default()
    };
    serde_json::json!({ "metadata": metadata }).to_string()
}
