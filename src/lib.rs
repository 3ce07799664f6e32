// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod config;
pub mod constants;
pub mod error;
pub mod exec;
pub mod pipeline;
pub mod provisioner;
pub mod tools;

#[cfg(test)]
mod test_utils;
