//! Command implementations for the stylebridge CLI
//!
//! Each command plays the part of a host bundler: it drives the plugin
//! hooks in order and reports what happened.

pub mod build;
pub mod deps;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use stylebridge::{PluginConfig, PluginContext};
use stylebridge_runtime::NativeRuntime;

/// Host context that remembers which files the plugin asked to watch.
#[derive(Debug, Default)]
pub struct CollectingContext {
    pub watched: Vec<PathBuf>,
}

impl PluginContext for CollectingContext {
    fn add_watch_file(&mut self, path: &Path) {
        if !self.watched.iter().any(|p| p == path) {
            self.watched.push(path.to_path_buf());
        }
    }
}

/// Load the plugin configuration, or start from defaults.
pub fn load_config(path: Option<&Path>) -> Result<PluginConfig> {
    match path {
        Some(path) => PluginConfig::from_json_file(&NativeRuntime::new(), path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(PluginConfig::new()),
    }
}

/// Absolute form of an entry point, as a bundler would hand it to plugins.
pub fn absolute(entry: &Path) -> Result<PathBuf> {
    std::path::absolute(entry)
        .with_context(|| format!("Failed to resolve entry point {}", entry.display()))
}
