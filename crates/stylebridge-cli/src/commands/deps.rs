/*
 * deps.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Deps command implementation
 */

//! Print the watch set of a build without emitting anything.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use stylebridge::SassPlugin;

use super::{CollectingContext, absolute, load_config};

pub fn execute(entries: &[PathBuf], config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let mut plugin = SassPlugin::new(config).context("Failed to set up plugin")?;
    plugin.build_start();

    let mut ctx = CollectingContext::default();
    for entry in entries {
        let entry = absolute(entry)?;
        plugin
            .load(&entry, &mut ctx)
            .with_context(|| format!("Failed to compile {}", entry.display()))?;
    }

    for file in plugin.watch_set().iter() {
        println!("{}", file.display());
    }
    Ok(())
}
