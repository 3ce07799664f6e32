// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities standing in for the external binaries and the network.

use crate::config::{ClusterConfig, Config, KubeconfigPolicy, Layout};
use crate::constants::storage::DEFAULT_CLASS_ANNOTATION;
use crate::error::{Result, SetupKindError};
use crate::exec::{command_line, CommandOutput, CommandRunner};
use crate::pipeline::Pipeline;
use crate::tools::Downloader;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use url::Url;

#[derive(Clone, Debug)]
enum Scripted {
    Stdout(String),
    Fail(i32, String),
}

/// What the fake commands have done to the pretend cluster
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FakeCluster {
    pub created: bool,
    pub applied: Vec<String>,
    /// Storage class name to value of its default-class annotation
    pub storage_classes: BTreeMap<String, String>,
}

#[derive(Default)]
struct FakeState {
    calls: Vec<String>,
    responses: Vec<(String, Scripted)>,
    cluster: FakeCluster,
}

/// A command runner that records every invocation and answers from a script.
///
/// Responses are matched on the rendered command line, exact match first,
/// then prefix. Unscripted commands succeed with empty output.
#[derive(Clone, Default)]
pub struct FakeRunner {
    state: Arc<Mutex<FakeState>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Succeed with `stdout` for commands matching `command`
    pub fn on(self, command: &str, stdout: &str) -> Self {
        self.state.lock().unwrap().responses.push((
            command.to_string(),
            Scripted::Stdout(stdout.to_string()),
        ));
        self
    }

    /// Exit with `status` for commands matching `command`
    pub fn fail_on(self, command: &str, status: i32, output: &str) -> Self {
        self.state.lock().unwrap().responses.push((
            command.to_string(),
            Scripted::Fail(status, output.to_string()),
        ));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn cluster(&self) -> FakeCluster {
        self.state.lock().unwrap().cluster.clone()
    }

    fn find_response(state: &FakeState, line: &str) -> Option<Scripted> {
        if let Some((_, resp)) = state.responses.iter().find(|(c, _)| c == line) {
            return Some(resp.clone());
        }
        state
            .responses
            .iter()
            .find(|(c, _)| line.starts_with(c.as_str()))
            .map(|(_, resp)| resp.clone())
    }
}

impl CommandRunner for FakeRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        let line = command_line(program, args);
        let mut state = self.state.lock().unwrap();
        state.calls.push(line.clone());

        match Self::find_response(&state, &line) {
            Some(Scripted::Fail(status, output)) => Err(SetupKindError::Provisioning {
                command: line,
                status,
                output,
            }),
            Some(Scripted::Stdout(stdout)) => {
                simulate(&mut state.cluster, program, args);
                Ok(CommandOutput {
                    stdout,
                    stderr: String::new(),
                })
            }
            None => {
                simulate(&mut state.cluster, program, args);
                Ok(CommandOutput::default())
            }
        }
    }
}

/// Apply the effect a successful command would have on a real cluster
fn simulate(cluster: &mut FakeCluster, program: &str, args: &[String]) {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match (program, args.as_slice()) {
        ("kind", ["create", "cluster", ..]) => {
            cluster.created = true;
            cluster
                .storage_classes
                .insert("standard".to_string(), "true".to_string());
        }
        ("kubectl", ["apply", "-f", manifest]) => {
            cluster.applied.push(manifest.to_string());
            cluster
                .storage_classes
                .insert("local-path".to_string(), "false".to_string());
        }
        ("kubectl", ["patch", "storageclass", name, "--patch", patch]) => {
            let patch: serde_json::Value = serde_json::from_str(patch).unwrap();
            let value = patch["metadata"]["annotations"][DEFAULT_CLASS_ANNOTATION]
                .as_str()
                .unwrap()
                .to_string();
            cluster.storage_classes.insert(name.to_string(), value);
        }
        _ => {}
    }
}

/// A downloader writing a small fake binary per URL into `dir`
#[derive(Clone)]
pub struct FakeDownloader {
    dir: PathBuf,
    fail: bool,
    counter: Arc<AtomicUsize>,
    downloaded: Arc<Mutex<Vec<Url>>>,
}

impl FakeDownloader {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            fail: false,
            counter: Arc::new(AtomicUsize::new(0)),
            downloaded: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every download fails as if the release was unreachable
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn content_for(&self, url: &Url) -> String {
        format!("#!/bin/sh\n# fetched from {}\n", url)
    }

    pub fn downloaded(&self) -> Vec<Url> {
        self.downloaded.lock().unwrap().clone()
    }
}

impl Downloader for FakeDownloader {
    async fn download(&self, url: &Url) -> Result<PathBuf> {
        if self.fail {
            return Err(SetupKindError::Download {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        std::fs::create_dir_all(&self.dir).unwrap();
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let path = self.dir.join(format!("download-{}", n));
        std::fs::write(&path, self.content_for(url)).unwrap();
        self.downloaded.lock().unwrap().push(url.clone());
        Ok(path)
    }
}

/// A configuration with every runner location inside `root`
pub fn test_config(root: &Path, policy: KubeconfigPolicy, cluster: ClusterConfig) -> Config {
    Config {
        policy,
        cluster,
        layout: Layout::from_home(&root.join("home"), root.join("runner-temp")),
        pipeline: Pipeline::new(
            Some(root.join("github-output")),
            Some(root.join("github-path")),
        ),
    }
}

/// Write a kubeconfig the way kind generates it for `cluster_name`
pub fn write_kubeconfig(path: &Path, cluster_name: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let kubeconfig = format!(
        r#"apiVersion: v1
kind: Config
clusters:
- cluster:
    certificate-authority-data: ZmFrZQ==
    server: https://127.0.0.1:44321
  name: {name}
contexts:
- context:
    cluster: {name}
    user: kubernetes-admin
  name: kubernetes-admin@{name}
current-context: kubernetes-admin@{name}
preferences: {{}}
users:
- name: kubernetes-admin
  user:
    client-certificate-data: ZmFrZQ==
    client-key-data: ZmFrZQ==
"#,
        name = cluster_name
    );
    std::fs::write(path, kubeconfig).unwrap();
}
