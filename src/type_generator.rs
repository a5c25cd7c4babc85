//! Boundary to the validator-to-type stage.
//!
//! The pipeline only knows the [`TypeGenerator`] contract: given a sector and where its
//! schemas live, return the type modules to write. [`InferTypeGenerator`] is the built-in
//! implementation and derives every type from its validator with `z.infer`.

use crate::config::GenerationConfig;
use crate::model::{GeneratedFile, SectorInfo, StageOutput};
use crate::naming::{
    schema_module_stem, sector_idents, types_module_stem, types_namespace, GENERATED_HEADER,
};
use anyhow::Result;
use log::{debug, info};
use std::collections::HashSet;
use std::path::Path;

/// Turns a sector's named validators into plain type declarations.
pub trait TypeGenerator {
    /// Generates type modules for one sector.
    ///
    /// # Arguments
    ///
    /// * `sector` - The sector whose validators should be converted
    /// * `schema_import` - Import specifier of the sector's schema module, relative to `out_dir`
    /// * `out_dir` - Directory the returned files should be placed in
    /// * `extension` - File extension for emitted modules
    fn generate(
        &self,
        sector: &SectorInfo,
        schema_import: &str,
        out_dir: &Path,
        extension: &str,
    ) -> Result<Vec<GeneratedFile>>;
}

/// Emits `export type X = z.infer<typeof schemas.XSchema>` per validator.
#[derive(Debug, Default, Clone, Copy)]
pub struct InferTypeGenerator;

impl TypeGenerator for InferTypeGenerator {
    fn generate(
        &self,
        sector: &SectorInfo,
        schema_import: &str,
        out_dir: &Path,
        extension: &str,
    ) -> Result<Vec<GeneratedFile>> {
        let refs = sector.validator_refs();
        if refs.is_empty() {
            debug!("Sector '{}' has no validators, no types emitted", sector.name);
            return Ok(Vec::new());
        }

        let mut out = String::from(GENERATED_HEADER);
        out.push_str("import type { z } from 'zod';\n");
        out.push_str(&format!("import type * as schemas from '{}';\n\n", schema_import));
        for (name, validator) in type_names(&refs).iter().zip(&refs) {
            out.push_str(&format!(
                "export type {} = z.infer<typeof schemas.{}>;\n",
                name, validator
            ));
        }

        let path = out_dir.join(format!("{}.{}", types_module_stem(&sector.name), extension));
        Ok(vec![GeneratedFile::new(path, out)])
    }
}

/// `GetUserSchema` -> `GetUser`; a bare `Schema` becomes `SchemaType`.
pub fn type_name(validator: &str) -> String {
    for suffix in ["Schema", "Validator"] {
        if let Some(stem) = validator.strip_suffix(suffix) {
            if !stem.is_empty() {
                return stem.to_string();
            }
        }
    }
    format!("{}Type", validator)
}

/// Type names for `refs`, in order and without repeats.
///
/// When two validators shorten to the same name (`GetUserSchema` and `GetUserValidator`)
/// the later one keeps its full validator name instead.
fn type_names(refs: &[&str]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    refs.iter()
        .map(|validator| {
            let mut name = type_name(validator);
            if taken.contains(&name) {
                debug!("Type name '{}' already used, keeping '{}'", name, validator);
                name = validator.to_string();
            }
            while taken.contains(&name) {
                name.push_str("Type");
            }
            taken.insert(name.clone());
            name
        })
        .collect()
}

/// Runs `generator` for every sector and adds a namespaced barrel over the results.
pub fn generate_types(
    config: &GenerationConfig,
    sectors: &[SectorInfo],
    generator: &dyn TypeGenerator,
) -> StageOutput {
    info!("Generating type modules");

    let types_dir = config.types_dir();
    let schema_prefix = relative_prefix(&config.type_output_dir);
    let mut output = StageOutput::default();
    // (identifier base, module stem of the sector's primary types file)
    let mut emitted: Vec<(String, String)> = Vec::new();

    for (sector, ident) in sectors.iter().zip(sector_idents(sectors)) {
        let schema_import = format!(
            "{}schemas/{}",
            schema_prefix,
            schema_module_stem(&sector.name)
        );
        match generator.generate(sector, &schema_import, &types_dir, &config.extension) {
            Ok(files) if files.is_empty() => {}
            Ok(files) => {
                let stem = files[0]
                    .path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| types_module_stem(&sector.name));
                files.into_iter().for_each(|f| output.push_file(f));
                emitted.push((ident, stem));
            }
            Err(e) => output.push_error(format!("types: sector '{}': {:#}", sector.name, e)),
        }
    }

    let mut barrel = String::from(GENERATED_HEADER);
    for (ident, stem) in &emitted {
        barrel.push_str(&format!(
            "export * as {} from './{}';\n",
            types_namespace(ident),
            stem
        ));
    }
    if emitted.is_empty() {
        barrel.push_str("export {};\n");
    }
    output.push_file(GeneratedFile::new(
        types_dir.join(format!("index.{}", config.extension)),
        barrel,
    ));
    output
}

/// `../` repeated once per component of the types directory
fn relative_prefix(types_dir: &Path) -> String {
    "../".repeat(types_dir.components().count().max(1))
}
