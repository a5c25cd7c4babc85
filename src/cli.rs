use crate::config::GenerationConfig;
use crate::model::GenerationResult;
use crate::pipeline::Pipeline;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{debug, error, info};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Sector Codegen - Generate a merged tRPC router contract from sector-organized sources
#[derive(Parser, Debug)]
#[command(name = "sector-codegen")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the generation pipeline once
    Generate {
        #[command(flatten)]
        common: CommonArgs,

        /// Run every stage without writing any file
        #[arg(long = "dry-run")]
        dry_run: bool,
    },
    /// Generate once, then regenerate whenever a sector changes
    Watch {
        #[command(flatten)]
        common: CommonArgs,
    },
}

/// Options shared by both subcommands
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Path to the generator config file (YAML or JSON)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: PathBuf,

    /// Project directory that relative config paths are resolved against
    #[arg(short = 'p', long = "project", value_name = "DIR")]
    pub project: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,
}

impl CliArgs {
    pub fn common(&self) -> &CommonArgs {
        match &self.command {
            Command::Generate { common, .. } | Command::Watch { common } => common,
        }
    }
}

/// Loads the config named by the arguments, resolving the project directory.
pub fn load_config(args: &CommonArgs) -> Result<GenerationConfig> {
    debug!("Parsed arguments: {:?}", args);

    let project_dir = resolve_project_dir(args.project.as_deref())?;
    let config = GenerationConfig::load(&args.config, &project_dir)?;
    print_summary(&config);
    Ok(config)
}

/// Absolute, canonical project directory; the current directory when none is given.
fn resolve_project_dir(project: Option<&Path>) -> Result<PathBuf> {
    let project_dir = match project {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    if !project_dir.is_dir() {
        anyhow::bail!(
            "Project path is not a directory: {}",
            project_dir.display()
        );
    }
    project_dir
        .canonicalize()
        .with_context(|| format!("Failed to resolve project path {}", project_dir.display()))
}

/// Run the selected subcommand
pub fn run(args: CliArgs) -> Result<ExitCode> {
    let config = load_config(args.common())?;

    match args.command {
        Command::Generate { dry_run, .. } => {
            let result = Pipeline::new(&config).dry_run(dry_run).run()?;
            if report(&result, dry_run) {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Watch { .. } => {
            crate::watch::watch(&config, || match Pipeline::new(&config).run() {
                Ok(result) => {
                    report(&result, false);
                }
                Err(e) => {
                    error!("Regeneration failed: {}", e);
                    eprintln!("error: {}", e);
                }
            })?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_summary(config: &GenerationConfig) {
    info!("Configuration loaded");
    println!("Sectors:     {}", config.sectors_dir.display());
    println!("Router file: {}", config.router_file_pattern);
    println!("Schema file: {}", config.schema_file_pattern);
    println!("Output:      {}", config.output_dir.display());
    println!("Package:     {}", config.package_name);
    println!("Router type: {}", config.router_type_name);
    println!(
        "Types:       {}",
        if config.type_generation_enabled {
            "enabled"
        } else {
            "disabled"
        }
    );
}

/// Prints the outcome of a run. Returns whether the run was clean.
pub fn report(result: &GenerationResult, dry_run: bool) -> bool {
    if result.is_success() {
        let verb = if dry_run { "Would generate" } else { "Generated" };
        println!(
            "{} {} files for {} sectors",
            verb,
            result.generated_files.len(),
            result.sectors.len()
        );
        for path in &result.generated_files {
            debug!("  {}", path.display());
        }
        true
    } else {
        eprintln!("Generation finished with {} errors:", result.errors.len());
        for error in &result.errors {
            eprintln!("  - {}", error);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SectorInfo;

    #[test]
    fn test_parse_generate_command() {
        let args = CliArgs::try_parse_from([
            "sector-codegen",
            "generate",
            "--config",
            "codegen.yaml",
            "--project",
            "/work",
            "--dry-run",
            "--debug",
        ])
        .unwrap();

        match &args.command {
            Command::Generate { common, dry_run } => {
                assert!(*dry_run);
                assert!(common.debug);
                assert_eq!(common.config, PathBuf::from("codegen.yaml"));
                assert_eq!(common.project, Some(PathBuf::from("/work")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_watch_command() {
        let args = CliArgs::try_parse_from(["sector-codegen", "watch", "-c", "codegen.json"]).unwrap();
        assert!(matches!(args.command, Command::Watch { .. }));
        assert!(!args.common().debug);
    }

    #[test]
    fn test_watch_rejects_dry_run() {
        let result =
            CliArgs::try_parse_from(["sector-codegen", "watch", "-c", "x.yaml", "--dry-run"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_is_required() {
        assert!(CliArgs::try_parse_from(["sector-codegen", "generate"]).is_err());
    }

    #[test]
    fn test_report_success_flag() {
        let ok = GenerationResult {
            sectors: vec![SectorInfo::new("user", vec![])],
            generated_files: vec![PathBuf::from("router.ts")],
            errors: vec![],
        };
        assert!(report(&ok, false));

        let failed = GenerationResult {
            errors: vec!["router: boom".to_string()],
            ..Default::default()
        };
        assert!(!report(&failed, false));
    }

    #[test]
    fn test_relative_project_dir_becomes_absolute() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let nested = temp_dir.path().join("app");
        std::fs::create_dir_all(nested.join("src")).unwrap();

        let resolved = resolve_project_dir(Some(nested.join("src/..").as_path())).unwrap();
        assert!(resolved.is_absolute());
        assert_eq!(resolved, nested.canonicalize().unwrap());

        let current = resolve_project_dir(Some(Path::new("."))).unwrap();
        assert!(current.is_absolute());
        assert_eq!(current, std::env::current_dir().unwrap().canonicalize().unwrap());
    }

    #[test]
    fn test_load_config_rejects_missing_project_dir() {
        let args = CommonArgs {
            config: PathBuf::from("codegen.yaml"),
            project: Some(PathBuf::from("/nonexistent/project")),
            debug: false,
        };
        let err = load_config(&args).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }
}
