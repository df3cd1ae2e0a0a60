//! State owned by a single build.
//!
//! Copyright (c) 2025 Posit, PBC

use std::path::Path;
use std::sync::Arc;

use stylebridge_runtime::SystemRuntime;
use tracing::debug;

use crate::compiler::{CompileRequest, StyleCompiler};
use crate::config::PluginConfig;
use crate::error::StyleError;
use crate::importer::{ImportResolver, Importer};
use crate::paths::normalize;
use crate::registry::{StyleRegistry, StyleUnit, WatchSet};
use crate::resolver::RuntimeResolver;

/// Registry and watch set for one build. Created fresh by every build start,
/// so nothing compiled in an earlier build can leak into this one's output.
#[derive(Debug, Default)]
pub struct BuildSession {
    registry: StyleRegistry,
    watch: WatchSet,
}

impl BuildSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &StyleRegistry {
        &self.registry
    }

    /// Every file consumed by the compiles of this build.
    pub fn watch_set(&self) -> &WatchSet {
        &self.watch
    }

    /// Compile one entry point and store the result.
    ///
    /// On success the unit is in the registry and the returned set holds the
    /// files this compile consumed (entry included). On failure the registry
    /// is left untouched, so other entry points are unaffected.
    pub fn compile_entry(
        &mut self,
        entry: &Path,
        config: &PluginConfig,
        runtime: &dyn SystemRuntime,
        compiler: &dyn StyleCompiler,
    ) -> Result<WatchSet, StyleError> {
        let entry = normalize(entry);
        let source = match &config.data {
            Some(data) => data.clone(),
            None => runtime
                .file_read_string(&entry)
                .map_err(|e| StyleError::read(&entry, e))?,
        };

        let importers: &[Arc<dyn Importer>] = &config.importers;
        let resolver = RuntimeResolver::new(runtime);
        let mut imports = ImportResolver::new(runtime, &resolver, importers, &entry);

        let request = CompileRequest {
            entry: &entry,
            source: &source,
            options: &config.compiler,
        };
        let output = compiler.compile(&request, &mut imports)?;

        let mut watched = imports.into_watch_set();
        if config.data.is_none() {
            watched.insert(entry.clone());
        }
        for file in output.included_files {
            watched.insert(normalize(&file));
        }

        debug!(
            entry = %entry.display(),
            compiler = compiler.name(),
            files = watched.len(),
            "compiled stylesheet"
        );

        self.registry.put(entry.clone(), StyleUnit::new(entry, output.css));
        self.watch.extend(watched.clone());
        Ok(watched)
    }
}
