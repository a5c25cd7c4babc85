//! Package entry point tying the router, schemas and types together.

use crate::config::GenerationConfig;
use crate::model::{GeneratedFile, StageOutput};
use crate::naming::GENERATED_HEADER;
use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

/// `package.json` written next to the entry point
#[derive(Debug, Serialize)]
struct PackageManifest<'a> {
    name: &'a str,
    version: &'a str,
    private: bool,
    main: String,
    types: String,
}

/// Produces `index.<ext>` and `package.json`.
pub fn generate_index(config: &GenerationConfig) -> StageOutput {
    info!("Generating package index");
    let mut output = StageOutput::default();

    output.push_file(GeneratedFile::new(
        config.output_module("index"),
        render_index(config),
    ));

    match render_manifest(config) {
        Ok(manifest) => output.push_file(GeneratedFile::new(
            config.output_dir.join("package.json"),
            manifest,
        )),
        Err(e) => output.push_error(format!("index: {:#}", e)),
    }
    output
}

/// Renders the top-level re-export module.
pub fn render_index(config: &GenerationConfig) -> String {
    let mut out = String::from(GENERATED_HEADER);
    out.push_str(&format!("// Package: {}\n", config.package_name));
    out.push_str("export * from './router';\n");
    out.push_str("export * from './schemas';\n");
    if config.type_generation_enabled {
        out.push_str(&format!("export * from '{}';\n", config.types_import()));
    }
    out
}

fn render_manifest(config: &GenerationConfig) -> Result<String> {
    let entry = format!("index.{}", config.extension);
    let manifest = PackageManifest {
        name: &config.package_name,
        version: "0.0.0",
        private: true,
        main: entry.clone(),
        types: entry,
    };
    let mut json =
        serde_json::to_string_pretty(&manifest).context("Failed to serialize package.json")?;
    json.push('\n');
    Ok(json)
}
