//! Bundler-facing plugin.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! The hooks mirror a rollup-style plugin lifecycle:
//!
//! 1. `build_start` once per build
//! 2. `handles`, `load` and `transform` for every module id
//! 3. `generate_bundle` once the bundle is assembled
//!
//! Stylesheets are compiled during `load` but kept out of the module graph;
//! the compiled CSS only reaches disk (or the bundle) in `generate_bundle`.

use std::path::Path;
use std::sync::Arc;

use stylebridge_runtime::{NativeRuntime, SystemRuntime};

use crate::compiler::StyleCompiler;
use crate::config::PluginConfig;
use crate::emit::{Bundle, EmitReport, OutputEmitter, OutputOptions, OutputTarget};
use crate::error::StyleError;
use crate::filter::StyleFilter;
use crate::grass_compiler::GrassCompiler;
use crate::registry::{StyleRegistry, WatchSet};
use crate::session::BuildSession;

/// Module body returned by `transform` for handled stylesheets.
pub const PLACEHOLDER_MODULE: &str = "export default \"\";";

/// Services the host bundler offers to a plugin while loading a module.
pub trait PluginContext {
    /// Ask the host to rebuild when `path` changes.
    fn add_watch_file(&mut self, path: &Path);
}

/// The stylesheet plugin.
pub struct SassPlugin {
    config: PluginConfig,
    runtime: Arc<dyn SystemRuntime>,
    compiler: Box<dyn StyleCompiler>,
    filter: StyleFilter,
    session: BuildSession,
}

impl SassPlugin {
    /// Plugin on the native filesystem with the grass compiler.
    pub fn new(config: PluginConfig) -> Result<Self, StyleError> {
        Self::with_runtime(config, Arc::new(NativeRuntime::new()))
    }

    pub fn with_runtime(
        config: PluginConfig,
        runtime: Arc<dyn SystemRuntime>,
    ) -> Result<Self, StyleError> {
        let cwd = runtime.cwd().map_err(|e| StyleError::Config {
            message: format!("cannot determine working directory: {}", e),
        })?;
        let filter = StyleFilter::new(&config.include, &config.exclude, &cwd)?;
        let compiler = Box::new(GrassCompiler::new(runtime.clone()));
        Ok(Self {
            config,
            runtime,
            compiler,
            filter,
            session: BuildSession::new(),
        })
    }

    /// Replace the stylesheet compiler.
    pub fn with_compiler(mut self, compiler: impl StyleCompiler + 'static) -> Self {
        self.compiler = Box::new(compiler);
        self
    }

    pub fn name(&self) -> &'static str {
        "sass"
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// Start a build: drop everything the previous build compiled.
    pub fn build_start(&mut self) {
        self.session = BuildSession::new();
    }

    pub fn handles(&self, id: &Path) -> bool {
        self.filter.handles(id)
    }

    /// Compile a stylesheet module.
    ///
    /// Returns `Ok(None)` for ids this plugin does not handle, and an empty
    /// module body otherwise.
    pub fn load(
        &mut self,
        id: &Path,
        ctx: &mut dyn PluginContext,
    ) -> Result<Option<String>, StyleError> {
        if !self.handles(id) {
            return Ok(None);
        }

        let watched = self.session.compile_entry(
            id,
            &self.config,
            self.runtime.as_ref(),
            self.compiler.as_ref(),
        )?;
        for file in watched.iter() {
            ctx.add_watch_file(file);
        }
        Ok(Some(String::new()))
    }

    pub fn transform(&self, _code: &str, id: &Path) -> Option<String> {
        self.handles(id).then(|| PLACEHOLDER_MODULE.to_string())
    }

    /// Emit everything compiled in this build.
    ///
    /// Write failures are logged and reported, never returned as errors.
    pub fn generate_bundle(&mut self, output: &OutputOptions, bundle: &mut Bundle) -> EmitReport {
        let cwd = self.runtime.cwd().unwrap_or_default();
        let target = OutputTarget::select(&self.config, output, bundle, &cwd);
        OutputEmitter::new(self.runtime.as_ref()).emit(&target, self.session.registry(), bundle)
    }

    pub fn registry(&self) -> &StyleRegistry {
        self.session.registry()
    }

    pub fn watch_set(&self) -> &WatchSet {
        self.session.watch_set()
    }
}

impl std::fmt::Debug for SassPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SassPlugin")
            .field("config", &self.config)
            .field("compiler", &self.compiler.name())
            .field("filter", &self.filter)
            .field("session", &self.session)
            .finish()
    }
}
