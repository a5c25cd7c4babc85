//! Identifier and file-name conventions shared by the emitters.

use crate::config::is_identifier;
use crate::model::SectorInfo;
use log::debug;
use std::collections::HashSet;

/// Banner placed at the top of every synthesized module
pub const GENERATED_HEADER: &str = "// This file is generated. Do not edit by hand.\n";

/// File stem of a sector's copied schema module, e.g. `user-schemas`
pub fn schema_module_stem(sector: &str) -> String {
    format!("{}-schemas", sector)
}

/// File stem of a sector's generated types module, e.g. `user-types`
pub fn types_module_stem(sector: &str) -> String {
    format!("{}-types", sector)
}

/// Namespace a sector's schemas are imported under, e.g. `userProfileSchemas`
pub fn schema_namespace(ident: &str) -> String {
    format!("{}Schemas", ident)
}

/// Namespace a sector's types are re-exported under, e.g. `userProfileTypes`
pub fn types_namespace(ident: &str) -> String {
    format!("{}Types", ident)
}

/// Identifier base for a sector directory name, e.g. `user-profile` -> `userProfile`
pub fn sector_ident(sector: &str) -> String {
    lower_camel(sector)
}

/// One identifier base per sector, in order, unique across the list.
///
/// Directory names that camel-case to the same identifier (`user-profile` and
/// `userProfile`) are told apart by a numeric suffix on every sector after the first:
/// `userProfile`, `userProfile2`. Every emitter derives namespaces from this list, so the
/// router imports and both barrels always agree.
pub fn sector_idents(sectors: &[SectorInfo]) -> Vec<String> {
    let bases: Vec<String> = sectors.iter().map(|s| sector_ident(&s.name)).collect();
    let mut taken: HashSet<String> = HashSet::new();
    let mut idents = Vec::with_capacity(bases.len());

    for (i, base) in bases.iter().enumerate() {
        // a suffixed name must not steal another sector's own base
        let mut ident = base.clone();
        let mut n = 2;
        while taken.contains(&ident) || (ident != *base && bases.contains(&ident)) {
            ident = format!("{}{}", base, n);
            n += 1;
        }
        if ident != *base {
            debug!("Sector '{}' renamed to identifier '{}'", sectors[i].name, ident);
        }
        taken.insert(ident.clone());
        idents.push(ident);
    }
    idents
}

/// Object-literal key for `name`, quoted when it is not a bare identifier.
pub fn property_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\\', "\\\\").replace('\'', "\\'"))
    }
}

/// Converts a directory name such as `user-profile` into `userProfile`.
fn lower_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
            if out.is_empty() {
                if c.is_ascii_digit() {
                    out.push('_');
                }
                out.push(c.to_ascii_lowercase());
            } else if upper_next {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
            upper_next = false;
        } else {
            upper_next = true;
        }
    }

    if out.is_empty() {
        out.push('_');
    }
    out
}
