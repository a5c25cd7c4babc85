//! Orchestrates a single generation run.
//!
//! Stages run strictly in order: discover, schemas, router, types, index. Discovery is the
//! only fatal stage. Every later stage is a function from the config and the discovered
//! sectors to a [`StageOutput`]; the pipeline writes each stage's files (unless it is a dry
//! run) and folds files and errors into the [`GenerationResult`]. A failing stage never
//! stops the stages after it.

use crate::config::GenerationConfig;
use crate::error::Result;
use crate::index_generator::generate_index;
use crate::model::{GenerationResult, StageOutput};
use crate::router_generator::generate_router;
use crate::scanner::SectorScanner;
use crate::schema_generator::generate_schemas;
use crate::type_generator::{generate_types, InferTypeGenerator, TypeGenerator};
use crate::writer::write_generated;
use log::{debug, info, warn};

/// One generation run over a validated configuration.
pub struct Pipeline<'a> {
    config: &'a GenerationConfig,
    dry_run: bool,
    type_generator: Box<dyn TypeGenerator + 'a>,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a GenerationConfig) -> Self {
        Self {
            config,
            dry_run: false,
            type_generator: Box::new(InferTypeGenerator),
        }
    }

    /// When set, stages run but nothing is written.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Replaces the built-in validator-to-type stage.
    pub fn type_generator(mut self, generator: impl TypeGenerator + 'a) -> Self {
        self.type_generator = Box::new(generator);
        self
    }

    /// Runs every stage.
    ///
    /// # Errors
    ///
    /// Only discovery failures are returned as errors; they abort the run before any file
    /// is written. Everything else ends up in [`GenerationResult::errors`].
    pub fn run(&self) -> Result<GenerationResult> {
        let discovery = SectorScanner::new(self.config).discover()?;

        let mut result = GenerationResult {
            sectors: discovery.sectors,
            generated_files: Vec::new(),
            errors: discovery.errors,
        };

        let schemas = generate_schemas(self.config, &result.sectors);
        self.apply("schemas", schemas, &mut result);

        let router = generate_router(self.config, &result.sectors);
        self.apply("router", router, &mut result);

        if self.config.type_generation_enabled {
            let types = generate_types(
                self.config,
                &result.sectors,
                self.type_generator.as_ref(),
            );
            self.apply("types", types, &mut result);
        } else {
            debug!("Type generation disabled");
        }

        let index = generate_index(self.config);
        self.apply("index", index, &mut result);

        info!(
            "Generation finished: {} files, {} errors",
            result.generated_files.len(),
            result.errors.len()
        );
        Ok(result)
    }

    fn apply(&self, stage: &str, output: StageOutput, result: &mut GenerationResult) {
        for error in &output.errors {
            warn!("{}", error);
        }
        result.errors.extend(output.errors);

        for file in output.files {
            if self.dry_run {
                info!("[dry-run] would write {}", file.path.display());
                result.generated_files.push(file.path);
                continue;
            }
            match write_generated(&file) {
                Ok(()) => result.generated_files.push(file.path),
                Err(e) => {
                    let message = format!("{}: {:#}", stage, e);
                    warn!("{}", message);
                    result.errors.push(message);
                }
            }
        }
    }
}
