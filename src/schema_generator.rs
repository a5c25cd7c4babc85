//! Copies each sector's validator module into the shared `schemas/` output directory.
//!
//! The copy is verbatim. An adjacent source map travels with it when one exists. Once every
//! sector has been processed a barrel module re-exports each copy under the same namespace
//! the router module imports it as.

use crate::config::GenerationConfig;
use crate::model::{GeneratedFile, SectorInfo, StageOutput};
use crate::naming::{schema_module_stem, schema_namespace, sector_idents, GENERATED_HEADER};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Produces `schemas/<sector>-schemas.<ext>` for every sector plus `schemas/index.<ext>`.
///
/// A sector whose schema module cannot be read is reported in [`StageOutput::errors`] and
/// left out of the barrel; the remaining sectors are still processed.
pub fn generate_schemas(config: &GenerationConfig, sectors: &[SectorInfo]) -> StageOutput {
    info!("Generating schema modules for {} sectors", sectors.len());

    let schemas_dir = config.schemas_dir();
    let mut output = StageOutput::default();
    // (sector, identifier base) of every module copied
    let mut copied: Vec<(&str, String)> = Vec::new();

    for (sector, ident) in sectors.iter().zip(sector_idents(sectors)) {
        let source = schema_source(config, &sector.name);
        let text = match read_schema(&source) {
            Ok(text) => text,
            Err(e) => {
                output.push_error(format!("schemas: sector '{}': {:#}", sector.name, e));
                continue;
            }
        };

        for missing in missing_exports(sector, &text) {
            output.push_error(format!(
                "schemas: sector '{}': validator '{}' used by endpoint '{}' is not exported from {}",
                sector.name,
                missing.1,
                missing.0,
                source.display()
            ));
        }

        let file_name = format!("{}.{}", schema_module_stem(&sector.name), config.extension);
        let target = schemas_dir.join(&file_name);
        debug!("Copying {} -> {}", source.display(), target.display());

        let map_source = with_map_suffix(&source);
        if map_source.is_file() {
            match fs::read_to_string(&map_source) {
                Ok(map) => output.push_file(GeneratedFile::new(with_map_suffix(&target), map)),
                Err(e) => warn!("Skipping source map {}: {}", map_source.display(), e),
            }
        }

        output.push_file(GeneratedFile::new(target, text));
        copied.push((sector.name.as_str(), ident));
    }

    output.push_file(GeneratedFile::new(
        schemas_dir.join(format!("index.{}", config.extension)),
        schema_barrel(&copied),
    ));
    output
}

/// The compiled-tree artifact when configured and present, otherwise the source module.
fn schema_source(config: &GenerationConfig, sector: &str) -> PathBuf {
    if let Some(ref build_pattern) = config.schema_build_pattern {
        let built = config.resolve_pattern(build_pattern, sector);
        if built.is_file() {
            debug!("Using built schema artifact {}", built.display());
            return built;
        }
    }
    config.resolve_pattern(&config.schema_file_pattern, sector)
}

fn read_schema(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("failed to read schema module {}", path.display()))
}

fn with_map_suffix(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".map");
    PathBuf::from(name)
}

/// Renders the barrel module over `(sector, identifier base)` pairs.
pub fn schema_barrel(sectors: &[(&str, String)]) -> String {
    let mut out = String::from(GENERATED_HEADER);
    for (sector, ident) in sectors {
        out.push_str(&format!(
            "export * as {} from './{}';\n",
            schema_namespace(ident),
            schema_module_stem(sector)
        ));
    }
    out
}

/// Endpoints whose validator is not exported by the schema module, as `(endpoint, validator)`.
fn missing_exports<'a>(sector: &'a SectorInfo, text: &str) -> Vec<(&'a str, &'a str)> {
    sector
        .endpoints
        .iter()
        .filter_map(|e| e.input_validator.as_deref().map(|v| (e.name.as_str(), v)))
        .filter(|(_, validator)| !exports_symbol(text, validator))
        .collect()
}

/// Whether `text` exports `symbol` as an ES module or CommonJS export.
///
/// An `export { local as exported }` list counts under its exported name. A bare
/// `export * from '...'` cannot be followed without resolving the other module, so its
/// presence makes every symbol count as exported.
pub fn exports_symbol(text: &str, symbol: &str) -> bool {
    let escaped = regex::escape(symbol);
    let direct = [
        format!(
            r"export\s+(?:declare\s+)?(?:const|let|var|function|class|enum)\s+{}\b",
            escaped
        ),
        format!(r"exports\.{}\s*=", escaped),
    ];
    if direct
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .any(|re| re.is_match(text))
    {
        return true;
    }

    if export_lists(text).iter().any(|name| name == symbol) {
        return true;
    }

    if export_star(text) {
        debug!("'{}' may come from an `export *` re-export, assuming it is exported", symbol);
        return true;
    }
    false
}

/// Names exported through `export { ... }` lists, after any `as` renaming.
fn export_lists(text: &str) -> Vec<String> {
    let Ok(list) = Regex::new(r"export\s*(?:type\s+)?\{([^}]*)\}") else {
        return Vec::new();
    };
    list.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .flat_map(|specifiers| specifiers.as_str().split(','))
        .filter_map(|specifier| {
            let specifier = specifier.trim();
            let specifier = specifier.strip_prefix("type ").unwrap_or(specifier).trim();
            let exported = match specifier.split_once(" as ") {
                Some((_, exported)) => exported.trim(),
                None => specifier,
            };
            (!exported.is_empty()).then(|| exported.to_string())
        })
        .collect()
}

/// Whether `text` has an un-namespaced `export * from` re-export.
fn export_star(text: &str) -> bool {
    Regex::new(r#"export\s*\*\s*from\s*['"]"#)
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}
