//! End-to-end compiles through the grass backend.
//!
//! Copyright (c) 2025 Posit, PBC

mod common;

use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;

use common::{FixtureRuntime, RecordingContext, read, write};
use stylebridge::{
    Bundle, ImportedFile, ImporterResult, OutputOptions, OutputStyle, PluginConfig, SassPlugin,
    StyleError,
};
use tempfile::TempDir;

fn grass_plugin(root: &Path, config: PluginConfig) -> SassPlugin {
    SassPlugin::with_runtime(config, Arc::new(FixtureRuntime::new(root))).unwrap()
}

fn compiled(plugin: &SassPlugin, entry: &Path) -> String {
    plugin.registry().get(entry).unwrap().css.clone()
}

#[test]
fn compiles_partials_and_watches_them() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let main = write(
        root,
        "src/main.scss",
        "@import \"partials/vars\";\n.a { color: $accent; }\n",
    );
    let vars = write(root, "src/partials/_vars.scss", "@import \"base\";\n$accent: $base;\n");
    let base = write(root, "src/partials/_base.scss", "$base: red;\n");

    let mut plugin = grass_plugin(root, PluginConfig::new());
    let mut ctx = RecordingContext::default();
    plugin.load(&main, &mut ctx).unwrap();

    assert!(compiled(&plugin, &main).contains("color: red"));
    let mut expected = vec![main, vars, base];
    expected.sort();
    assert_eq!(ctx.watched, expected);
}

#[test]
fn compressed_output_style() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let main = write(root, "main.scss", ".a {\n  .b { color: blue; }\n}\n");

    let config = PluginConfig::new().with_output_style(OutputStyle::Compressed);
    let mut plugin = grass_plugin(root, config);
    plugin.load(&main, &mut RecordingContext::default()).unwrap();

    assert!(compiled(&plugin, &main).contains(".a .b{color:blue}"));
}

#[test]
fn imported_urls_end_up_relative_to_output() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let main = write(root, "src/main.scss", "@import \"theme/colors\";\n");
    write(
        root,
        "src/theme/_colors.scss",
        ".bg { background: url(../img/bg.png); }\n",
    );

    let mut plugin = grass_plugin(root, PluginConfig::new().with_out_file("dist/app.css"));
    plugin.load(&main, &mut RecordingContext::default()).unwrap();
    let report = plugin.generate_bundle(&OutputOptions::default(), &mut Bundle::new());

    assert!(report.is_success());
    let css = read(&root.join("dist/app.css"));
    assert!(css.contains("url('../src/img/bg.png')"), "got {}", css);
}

#[test]
fn missing_import_is_an_import_resolution_error() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let main = write(root, "src/main.scss", "@import \"missing\";\n");

    let mut plugin = grass_plugin(root, PluginConfig::new());
    match plugin.load(&main, &mut RecordingContext::default()) {
        Err(StyleError::ImportResolution {
            reference,
            importer,
        }) => {
            assert_eq!(reference, "missing");
            assert_eq!(importer, main);
        }
        other => panic!("expected ImportResolution, got {:?}", other),
    }
    assert!(plugin.registry().is_empty());
}

#[test]
fn nested_missing_import_names_the_partial() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let main = write(root, "src/main.scss", "@import \"parts/a\";\n");
    let partial = write(root, "src/parts/_a.scss", "@import \"missing\";\n");

    let mut plugin = grass_plugin(root, PluginConfig::new());
    match plugin.load(&main, &mut RecordingContext::default()) {
        Err(StyleError::ImportResolution {
            reference,
            importer,
        }) => {
            assert_eq!(reference, "missing");
            assert_eq!(importer, partial);
        }
        other => panic!("expected ImportResolution, got {:?}", other),
    }
}

#[test]
fn syntax_error_is_a_compile_error() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let main = write(root, "main.scss", ".a { color: red;\n");

    let mut plugin = grass_plugin(root, PluginConfig::new());
    let err = plugin
        .load(&main, &mut RecordingContext::default())
        .unwrap_err();
    assert!(matches!(err, StyleError::Compile { .. }), "got {:?}", err);
}

#[test]
fn user_importer_supplies_virtual_stylesheet() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let main = write(
        root,
        "src/main.scss",
        "@import \"brand\";\n.logo { color: $brand; }\n",
    );

    let config = PluginConfig::new().with_importer(|url: &str, _: &Path| -> ImporterResult {
        let exact = Path::new(url).file_name() == Some(OsStr::new("brand.scss"));
        Ok(exact.then(|| ImportedFile::new("/virtual/brand.scss", "$brand: #123456;")))
    });
    let mut plugin = grass_plugin(root, config);
    plugin.load(&main, &mut RecordingContext::default()).unwrap();

    assert!(compiled(&plugin, &main).contains("#123456"));
    assert!(plugin.watch_set().contains(Path::new("/virtual/brand.scss")));
}

#[test]
fn failing_user_importer_fails_the_compile() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let main = write(root, "src/main.scss", "@import \"remote\";\n");

    let config = PluginConfig::new().with_importer(|_: &str, _: &Path| -> ImporterResult {
        Err(StyleError::importer("registry offline"))
    });
    let mut plugin = grass_plugin(root, config);
    let err = plugin
        .load(&main, &mut RecordingContext::default())
        .unwrap_err();

    match err {
        StyleError::Importer { message } => assert_eq!(message, "registry offline"),
        other => panic!("expected Importer, got {:?}", other),
    }
}

#[test]
fn plain_css_entry() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let reset = write(root, "styles/reset.css", "body { margin: 0; }\n");

    let mut plugin = grass_plugin(root, PluginConfig::new());
    plugin.load(&reset, &mut RecordingContext::default()).unwrap();

    assert!(compiled(&plugin, &reset).contains("margin: 0"));
}

#[test]
fn inline_data_compiles_with_entry_directory() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "src/_vars.scss", "$size: 12px;\n");
    let entry = root.join("src/inline.scss");

    let config = PluginConfig::new().with_data("@import \"vars\";\n.t { font-size: $size; }\n");
    let mut plugin = grass_plugin(root, config);
    plugin.load(&entry, &mut RecordingContext::default()).unwrap();

    assert!(compiled(&plugin, &entry).contains("font-size: 12px"));
}
