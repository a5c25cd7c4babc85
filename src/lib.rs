//! Sector Codegen - merged API-contract generation for sector-organized tRPC projects.
//!
//! A project is split into independent feature modules ("sectors"), each declaring its own
//! procedure router. This library discovers the sectors, recovers each router's endpoints
//! with configurable patterns, and emits a single statically typed contract that client code
//! can import.
//!
//! # Architecture
//!
//! Data flows strictly downward through these modules:
//!
//! 1. [`config`] - Loads and validates the declarative generator configuration
//! 2. [`scanner`] - Discovers sector directories and reads their router files
//! 3. [`parser`] - Extracts endpoint descriptors from router source text
//! 4. [`schema_generator`] - Copies validator modules and builds the schema barrel
//! 5. [`router_generator`] - Emits the merged router and its contract type
//! 6. [`type_generator`] - Boundary for turning validators into type declarations
//! 7. [`index_generator`] - Emits the package entry point
//! 8. [`pipeline`] - Runs the stages in order and collects the generation report
//!
//! # Example Usage
//!
//! ```no_run
//! use sector_codegen::{config::GenerationConfig, pipeline::Pipeline};
//! use std::path::Path;
//!
//! let config = GenerationConfig::load(Path::new("codegen.yaml"), Path::new(".")).unwrap();
//! let result = Pipeline::new(&config).run().unwrap();
//! for error in &result.errors {
//!     eprintln!("{}", error);
//! }
//! println!("Wrote {} files", result.generated_files.len());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module, which also drives [`watch`] mode.

pub mod cli;
pub mod config;
pub mod scanner;
pub mod parser;
pub mod model;
pub mod naming;
pub mod schema_generator;
pub mod router_generator;
pub mod type_generator;
pub mod index_generator;
pub mod pipeline;
pub mod writer;
pub mod watch;
pub mod error;
