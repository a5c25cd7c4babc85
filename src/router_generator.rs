//! Emits the merged router module.
//!
//! The module imports each sector's copied schemas as a namespace, declares one `appRouter`
//! value nesting a sub-router per sector, and exports the contract type as `typeof appRouter`
//! so the type can never drift from the value.

use crate::config::GenerationConfig;
use crate::model::{EndpointInfo, GeneratedFile, OperationKind, SectorInfo, StageOutput};
use crate::naming::{
    property_key, schema_module_stem, schema_namespace, sector_idents, GENERATED_HEADER,
};
use log::{debug, info};

const ROUTER_VALUE: &str = "appRouter";

/// Produces `router.<ext>`.
pub fn generate_router(config: &GenerationConfig, sectors: &[SectorInfo]) -> StageOutput {
    info!("Generating router module");
    let mut output = StageOutput::default();
    output.push_file(GeneratedFile::new(
        config.output_module("router"),
        render_router(&config.router_type_name, sectors),
    ));
    output
}

/// Renders the router module source.
pub fn render_router(router_type_name: &str, sectors: &[SectorInfo]) -> String {
    let namespaces: Vec<String> = sector_idents(sectors)
        .iter()
        .map(|ident| schema_namespace(ident))
        .collect();

    let mut out = String::from(GENERATED_HEADER);
    out.push_str("import { initTRPC } from '@trpc/server';\n");
    for (sector, namespace) in sectors.iter().zip(&namespaces) {
        out.push_str(&format!(
            "import * as {} from './schemas/{}';\n",
            namespace,
            schema_module_stem(&sector.name)
        ));
    }

    out.push_str("\nconst t = initTRPC.create();\n\n");
    out.push_str(&format!("export const {} = t.router({{\n", ROUTER_VALUE));

    for (sector, namespace) in sectors.iter().zip(&namespaces) {
        debug!(
            "Emitting sector '{}' with {} endpoints",
            sector.name,
            sector.endpoints.len()
        );
        out.push_str(&format!("  {}: t.router({{\n", property_key(&sector.name)));
        for endpoint in &sector.endpoints {
            out.push_str(&format!(
                "    {}: {},\n",
                property_key(&endpoint.name),
                procedure(namespace, endpoint)
            ));
        }
        out.push_str("  }),\n");
    }

    out.push_str("});\n\n");
    out.push_str(&format!(
        "export type {} = typeof {};\n",
        router_type_name, ROUTER_VALUE
    ));
    out
}

/// A stub procedure reproducing the endpoint's kind and input validator.
fn procedure(namespace: &str, endpoint: &EndpointInfo) -> String {
    let input = match endpoint.input_validator {
        Some(ref validator) => format!(".input({}.{})", namespace, validator),
        None => String::new(),
    };
    let stub = match endpoint.kind {
        OperationKind::Query => "() => []",
        OperationKind::Mutation => "() => ({})",
    };
    format!("t.procedure{}.{}({})", input, endpoint.kind.as_method(), stub)
}
