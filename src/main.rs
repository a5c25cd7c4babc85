//! Sector Codegen - Command-line tool for generating a merged tRPC router contract.
//!
//! The tool scans a source tree of independent feature modules ("sectors"), extracts each
//! sector's endpoints from its router definition, and writes a merged router module, the
//! copied validator modules, optional type declarations, and a package entry point.
//!
//! # Usage
//!
//! ```bash
//! sector-codegen generate --config codegen.yaml [--project DIR] [--dry-run] [--debug]
//! sector-codegen watch --config codegen.yaml [--project DIR] [--debug]
//! ```
//!
//! `generate` exits with status 1 when configuration or discovery fails, or when the run
//! finished with errors.

use anyhow::Result;
use clap::Parser;
use log::info;
use sector_codegen::cli;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let args = cli::CliArgs::parse();

    // Initialize logger based on debug flag
    let log_level = if args.common().debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("Sector Codegen starting...");

    cli::run(args)
}
