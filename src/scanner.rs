use crate::config::GenerationConfig;
use crate::error::{Error, Result};
use crate::model::SectorInfo;
use crate::naming::{sector_ident, sector_idents};
use crate::parser::RouterParser;
use log::{debug, info, warn};
use std::fs;
use std::io::ErrorKind;
use walkdir::WalkDir;

/// Sector scanner for discovering feature modules under the sectors root.
///
/// Every immediate subdirectory of the configured sectors directory is a candidate sector.
/// The scanner skips hidden directories (those starting with `.`) and `node_modules`.
///
/// # Example
///
/// ```no_run
/// use sector_codegen::config::GenerationConfig;
/// use sector_codegen::scanner::SectorScanner;
/// use std::path::Path;
///
/// let config = GenerationConfig::load(Path::new("codegen.yaml"), Path::new(".")).unwrap();
/// let discovery = SectorScanner::new(&config).discover().unwrap();
/// println!("Found {} sectors", discovery.sectors.len());
/// ```
pub struct SectorScanner<'a> {
    config: &'a GenerationConfig,
    parser: RouterParser,
}

/// Result of sector discovery.
///
/// Contains the sectors that contributed at least one endpoint and any stage-scoped errors
/// encountered while reading router files.
#[derive(Debug)]
pub struct Discovery {
    /// Sectors in directory-name order
    pub sectors: Vec<SectorInfo>,
    /// Router files that existed but could not be read
    pub errors: Vec<String>,
}

impl<'a> SectorScanner<'a> {
    pub fn new(config: &'a GenerationConfig) -> Self {
        let parser = RouterParser::new(
            config.router_body_pattern.clone(),
            config.endpoint_pattern.clone(),
        );
        Self { config, parser }
    }

    /// Scans the sectors root and parses each candidate's router file.
    ///
    /// A candidate without a router file, or whose router yields no endpoints, is left out
    /// silently. A router file that exists but cannot be read is recorded in
    /// [`Discovery::errors`] and the sector contributes nothing.
    ///
    /// # Errors
    ///
    /// Returns a fatal error if the sectors root cannot be enumerated or no sector has any
    /// endpoints.
    pub fn discover(&self) -> Result<Discovery> {
        let root = &self.config.sectors_dir;
        info!("Discovering sectors in {}", root.display());

        let mut sectors = Vec::new();
        let mut errors = Vec::new();

        let walker = WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                let file_name = e.file_name().to_string_lossy();
                !file_name.starts_with('.') && file_name != "node_modules"
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(Error::SectorsDirUnreadable {
                        path: root.clone(),
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    warn!("Failed to access path: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            let router_path = self
                .config
                .resolve_pattern(&self.config.router_file_pattern, &name);

            let text = match fs::read_to_string(&router_path) {
                Ok(text) => text,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!("Sector '{}' has no router at {}", name, router_path.display());
                    continue;
                }
                Err(e) => {
                    let message = format!(
                        "discover: failed to read router for sector '{}' at {}: {}",
                        name,
                        router_path.display(),
                        e
                    );
                    warn!("{}", message);
                    errors.push(message);
                    continue;
                }
            };

            let endpoints = self.parser.parse(&text);
            if endpoints.is_empty() {
                debug!("Sector '{}' yields no endpoints, skipping", name);
                continue;
            }

            debug!("Sector '{}': {} endpoints", name, endpoints.len());
            sectors.push(SectorInfo::new(name, endpoints));
        }

        if sectors.is_empty() {
            return Err(Error::NoSectors(root.clone()));
        }

        for (sector, ident) in sectors.iter().zip(sector_idents(&sectors)) {
            if ident != sector_ident(&sector.name) {
                warn!(
                    "Sector '{}' maps to the same identifier as an earlier sector; its namespaces use '{}'",
                    sector.name, ident
                );
            }
        }

        info!("Discovered {} sectors", sectors.len());
        Ok(Discovery { sectors, errors })
    }
}
