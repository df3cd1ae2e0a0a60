/*
 * build.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Build command implementation
 */

//! Build command implementation.
//!
//! Runs one plugin build over the given entry points: `build_start`, then
//! `load` for each entry, then `generate_bundle`. An entry that fails to
//! compile is reported and skipped; the others are still emitted.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use stylebridge::{Bundle, OutputOptions, OutputStyle, OutputTarget, SassPlugin};
use tracing::{error, info, warn};

use super::{CollectingContext, absolute, load_config};

/// Arguments for the build command
#[derive(Debug)]
pub struct BuildArgs {
    pub entries: Vec<PathBuf>,
    pub config: Option<PathBuf>,
    pub out_file: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub exclude: Vec<String>,
    pub style: Option<String>,
}

pub fn execute(args: BuildArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(file) = args.out_file {
        config = config.with_out_file(file);
    }
    if let Some(dir) = args.out_dir {
        config = config.with_out_dir(dir);
    }
    for pattern in args.exclude {
        config = config.with_exclude(pattern);
    }
    if let Some(style) = args.style {
        let style: OutputStyle = style.parse().context("Invalid --style")?;
        config = config.with_output_style(style);
    }

    let mut plugin = SassPlugin::new(config).context("Failed to set up plugin")?;
    plugin.build_start();

    let mut ctx = CollectingContext::default();
    let mut failed = 0usize;
    for entry in &args.entries {
        let entry = absolute(entry)?;
        match plugin.load(&entry, &mut ctx) {
            Ok(Some(_)) => {}
            Ok(None) => warn!(entry = %entry.display(), "not a handled stylesheet; skipped"),
            Err(e) => {
                error!("{}", e);
                failed += 1;
            }
        }
    }

    let report = plugin.generate_bundle(&OutputOptions::default(), &mut Bundle::new());
    if report.target == OutputTarget::None {
        warn!("no outFile or outDir configured; nothing written");
    }
    let write_failures = report.failures().count();
    info!(
        compiled = plugin.registry().len(),
        watched = ctx.watched.len(),
        "build finished"
    );

    if failed > 0 || write_failures > 0 {
        bail!(
            "{} entry point(s) failed to compile, {} file(s) failed to write",
            failed,
            write_failures
        );
    }
    Ok(())
}
