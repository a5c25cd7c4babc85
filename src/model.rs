//! Intermediate model shared by discovery, parsing and every generator.
//!
//! Discovery and the router parser produce [`SectorInfo`] values; the generators consume
//! them and never go back to the source tree for structural information.

use log::warn;
use std::path::PathBuf;

/// The kind of procedure an endpoint is declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Read operation, no side effect assumed
    Query,
    /// Write operation
    Mutation,
}

impl OperationKind {
    /// Parse the builder method name that terminates a procedure declaration.
    pub fn from_method(method: &str) -> Option<Self> {
        match method {
            "query" => Some(OperationKind::Query),
            "mutation" => Some(OperationKind::Mutation),
            _ => None,
        }
    }

    /// The builder method name emitted for this kind.
    pub fn as_method(&self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
        }
    }
}

/// One procedure recovered from a sector's router definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointInfo {
    /// Key of the procedure inside the sector router
    pub name: String,
    /// Whether the procedure is a query or a mutation
    pub kind: OperationKind,
    /// Name of the input validator symbol, if the procedure takes input
    pub input_validator: Option<String>,
}

impl EndpointInfo {
    /// Create an endpoint without an input validator
    pub fn new(name: impl Into<String>, kind: OperationKind) -> Self {
        Self {
            name: name.into(),
            kind,
            input_validator: None,
        }
    }

    /// Attach an input validator reference
    pub fn with_input(mut self, validator: impl Into<String>) -> Self {
        self.input_validator = Some(validator.into());
        self
    }
}

/// A discovered feature module with at least one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectorInfo {
    /// Directory name of the sector
    pub name: String,
    /// Endpoints in declaration order, keyed uniquely by name
    pub endpoints: Vec<EndpointInfo>,
}

impl SectorInfo {
    /// Builds a sector from the parser's raw endpoint list.
    ///
    /// A repeated endpoint name behaves like a repeated key in an object literal: the later
    /// declaration replaces the earlier one but keeps the earlier one's position.
    pub fn new(name: impl Into<String>, parsed: Vec<EndpointInfo>) -> Self {
        let name = name.into();
        let mut endpoints: Vec<EndpointInfo> = Vec::with_capacity(parsed.len());

        for endpoint in parsed {
            match endpoints.iter_mut().find(|e| e.name == endpoint.name) {
                Some(existing) => {
                    warn!(
                        "Sector '{}' declares endpoint '{}' more than once; the last declaration wins",
                        name, endpoint.name
                    );
                    *existing = endpoint;
                }
                None => endpoints.push(endpoint),
            }
        }

        Self { name, endpoints }
    }

    /// Distinct validator references in first-use order
    pub fn validator_refs(&self) -> Vec<&str> {
        let mut refs: Vec<&str> = Vec::new();
        for validator in self.endpoints.iter().filter_map(|e| e.input_validator.as_deref()) {
            if !refs.contains(&validator) {
                refs.push(validator);
            }
        }
        refs
    }
}

/// A file produced by a generation stage, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

impl GeneratedFile {
    pub fn new(path: PathBuf, contents: impl Into<String>) -> Self {
        Self {
            path,
            contents: contents.into(),
        }
    }
}

/// What a single generation stage hands back to the orchestrator.
#[derive(Debug, Default)]
pub struct StageOutput {
    pub files: Vec<GeneratedFile>,
    pub errors: Vec<String>,
}

impl StageOutput {
    pub fn push_file(&mut self, file: GeneratedFile) {
        self.files.push(file);
    }

    pub fn push_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }
}

/// Outcome of one full pipeline run.
#[derive(Debug, Default)]
pub struct GenerationResult {
    /// Sectors that contributed at least one endpoint, in discovery order
    pub sectors: Vec<SectorInfo>,
    /// Paths written (or, in a dry run, that would have been written)
    pub generated_files: Vec<PathBuf>,
    /// Non-fatal, stage-scoped failures
    pub errors: Vec<String>,
}

impl GenerationResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_kind_from_method() {
        assert_eq!(OperationKind::from_method("query"), Some(OperationKind::Query));
        assert_eq!(OperationKind::from_method("mutation"), Some(OperationKind::Mutation));
        assert_eq!(OperationKind::from_method("subscription"), None);
    }

    #[test]
    fn test_duplicate_endpoint_last_wins_in_first_position() {
        let sector = SectorInfo::new(
            "user",
            vec![
                EndpointInfo::new("getUser", OperationKind::Query),
                EndpointInfo::new("deleteUser", OperationKind::Mutation),
                EndpointInfo::new("getUser", OperationKind::Query).with_input("GetUserSchema"),
            ],
        );

        let names: Vec<_> = sector.endpoints.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["getUser", "deleteUser"]);
        assert_eq!(
            sector.endpoints[0].input_validator.as_deref(),
            Some("GetUserSchema")
        );
    }

    #[test]
    fn test_validator_refs_are_distinct() {
        let sector = SectorInfo::new(
            "project",
            vec![
                EndpointInfo::new("a", OperationKind::Query).with_input("IdSchema"),
                EndpointInfo::new("b", OperationKind::Query),
                EndpointInfo::new("c", OperationKind::Mutation).with_input("IdSchema"),
                EndpointInfo::new("d", OperationKind::Mutation).with_input("CreateSchema"),
            ],
        );
        assert_eq!(sector.validator_refs(), vec!["IdSchema", "CreateSchema"]);
    }
}
