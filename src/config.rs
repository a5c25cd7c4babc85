//! Generator configuration.
//!
//! Configuration is a plain data file (YAML or JSON) read once per run. The raw file shape is
//! deserialized with every field optional, then [`GenerationConfig::from_raw`] validates it
//! into an immutable, fully-resolved [`GenerationConfig`]. Validation covers required fields,
//! the `{sector}` placeholder in path patterns, and both extraction regexes; any failure is
//! fatal and happens before discovery starts.
//!
//! ```yaml
//! source:
//!   sectorsDir: src/sectors
//!   routerPattern: "src/sectors/{sector}/router.ts"
//!   schemaPattern: "src/sectors/{sector}/schemas.ts"
//! generation:
//!   outputDir: generated/api
//!   packageName: "@acme/api-contract"
//!   routerName: AppRouter
//! parsing:
//!   routerMethodPattern: '\brouter\s*\('
//!   endpointPattern: '(?P<name>\w+)\s*:\s*\w+(?:\.\w+)*?(?:\.input\((?P<input>[\w.]+)\))?\.(?P<kind>query|mutation)\('
//! zod2ts:
//!   enabled: true
//!   outputDir: types
//! ```

use crate::error::{Error, Result};
use log::debug;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Placeholder replaced by a sector name in path patterns
pub const SECTOR_PLACEHOLDER: &str = "{sector}";

const DEFAULT_EXTENSION: &str = "ts";
const DEFAULT_TYPES_DIR: &str = "types";
const DEFAULT_DEBOUNCE_MS: u64 = 200;

/// Configuration file as written on disk.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub source: RawSource,
    pub generation: RawGeneration,
    pub parsing: RawParsing,
    pub zod2ts: RawTypeGeneration,
    pub watch: RawWatch,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawSource {
    pub sectors_dir: Option<String>,
    pub router_pattern: Option<String>,
    pub schema_pattern: Option<String>,
    /// Compiled-tree location of the schema module, preferred when it exists
    pub schema_build_pattern: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawGeneration {
    pub output_dir: Option<String>,
    pub package_name: Option<String>,
    pub router_name: Option<String>,
    pub extension: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawParsing {
    pub endpoint_pattern: Option<String>,
    pub router_method_pattern: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawTypeGeneration {
    pub enabled: Option<bool>,
    pub output_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawWatch {
    pub debounce_ms: Option<u64>,
}

/// Validated configuration shared read-only by every pipeline stage.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Base directory that relative paths were resolved against
    pub project_dir: PathBuf,
    pub sectors_dir: PathBuf,
    pub router_file_pattern: String,
    pub schema_file_pattern: String,
    pub schema_build_pattern: Option<String>,
    pub output_dir: PathBuf,
    pub package_name: String,
    pub router_type_name: String,
    /// File extension of every emitted module, without the dot
    pub extension: String,
    pub endpoint_pattern: Regex,
    pub router_body_pattern: Regex,
    pub type_generation_enabled: bool,
    /// Types directory, relative to `output_dir`
    pub type_output_dir: PathBuf,
    pub watch_debounce: Duration,
}

impl GenerationConfig {
    /// Reads and validates a configuration file.
    ///
    /// `.json` files are read as JSON; anything else is read as YAML.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`Error`] if the file cannot be read, cannot be parsed, or fails
    /// validation.
    pub fn load(path: &Path, project_dir: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());

        let content = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path.extension().and_then(|s| s.to_str()) == Some("json");
        let raw: RawConfig = if is_json {
            serde_json::from_str(&content).map_err(|e| Error::ConfigParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        } else {
            serde_yaml::from_str(&content).map_err(|e| Error::ConfigParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        };

        Self::from_raw(raw, project_dir)
    }

    /// Validates a raw configuration and resolves its paths against `project_dir`.
    pub fn from_raw(raw: RawConfig, project_dir: &Path) -> Result<Self> {
        let sectors_dir = required(raw.source.sectors_dir, "source.sectorsDir")?;
        let router_file_pattern = required(raw.source.router_pattern, "source.routerPattern")?;
        let schema_file_pattern = required(raw.source.schema_pattern, "source.schemaPattern")?;
        let output_dir = required(raw.generation.output_dir, "generation.outputDir")?;
        let package_name = required(raw.generation.package_name, "generation.packageName")?;
        let router_type_name = required(raw.generation.router_name, "generation.routerName")?;
        let endpoint_source = required(raw.parsing.endpoint_pattern, "parsing.endpointPattern")?;
        let body_source = required(
            raw.parsing.router_method_pattern,
            "parsing.routerMethodPattern",
        )?;

        check_placeholder(&router_file_pattern, "source.routerPattern")?;
        check_placeholder(&schema_file_pattern, "source.schemaPattern")?;
        if let Some(ref build) = raw.source.schema_build_pattern {
            check_placeholder(build, "source.schemaBuildPattern")?;
        }

        let endpoint_pattern = compile(&endpoint_source, "parsing.endpointPattern")?;
        for group in ["name", "kind"] {
            if !endpoint_pattern.capture_names().flatten().any(|n| n == group) {
                return Err(Error::InvalidPattern {
                    field: "parsing.endpointPattern",
                    message: format!("missing named capture group `{}`", group),
                });
            }
        }
        let router_body_pattern = compile(&body_source, "parsing.routerMethodPattern")?;

        if !is_identifier(&router_type_name) {
            return Err(Error::InvalidConfig(format!(
                "generation.routerName `{}` is not a valid type identifier",
                router_type_name
            )));
        }

        let extension = raw
            .generation
            .extension
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
            .trim_start_matches('.')
            .to_string();
        if extension.is_empty() {
            return Err(Error::InvalidConfig(
                "generation.extension must not be empty".to_string(),
            ));
        }

        let type_output_dir = PathBuf::from(
            raw.zod2ts
                .output_dir
                .unwrap_or_else(|| DEFAULT_TYPES_DIR.to_string()),
        );
        if type_output_dir.is_absolute() {
            return Err(Error::InvalidConfig(format!(
                "zod2ts.outputDir must be relative to generation.outputDir, got {}",
                type_output_dir.display()
            )));
        }

        Ok(Self {
            project_dir: project_dir.to_path_buf(),
            sectors_dir: resolve(project_dir, &sectors_dir),
            router_file_pattern,
            schema_file_pattern,
            schema_build_pattern: raw.source.schema_build_pattern,
            output_dir: resolve(project_dir, &output_dir),
            package_name,
            router_type_name,
            extension,
            endpoint_pattern,
            router_body_pattern,
            type_generation_enabled: raw.zod2ts.enabled.unwrap_or(false),
            type_output_dir,
            watch_debounce: Duration::from_millis(
                raw.watch.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS),
            ),
        })
    }

    /// Substitutes `sector` into a path pattern and resolves it against the project directory.
    pub fn resolve_pattern(&self, pattern: &str, sector: &str) -> PathBuf {
        resolve(&self.project_dir, &pattern.replace(SECTOR_PLACEHOLDER, sector))
    }

    /// Path of an emitted module directly under the output directory
    pub fn output_module(&self, stem: &str) -> PathBuf {
        self.output_dir.join(format!("{}.{}", stem, self.extension))
    }

    pub fn schemas_dir(&self) -> PathBuf {
        self.output_dir.join("schemas")
    }

    pub fn types_dir(&self) -> PathBuf {
        self.output_dir.join(&self.type_output_dir)
    }

    /// Import specifier of the types directory relative to the output directory
    pub fn types_import(&self) -> String {
        let rel = self
            .type_output_dir
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!("./{}", rel)
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::MissingField(field)),
    }
}

fn check_placeholder(pattern: &str, field: &'static str) -> Result<()> {
    if pattern.contains(SECTOR_PLACEHOLDER) {
        Ok(())
    } else {
        Err(Error::InvalidPattern {
            field,
            message: format!("pattern must contain the {} placeholder", SECTOR_PLACEHOLDER),
        })
    }
}

fn compile(source: &str, field: &'static str) -> Result<Regex> {
    Regex::new(source).map_err(|e| Error::InvalidPattern {
        field,
        message: e.to_string(),
    })
}

fn resolve(base: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Whether `name` can be used bare as a TypeScript identifier
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
