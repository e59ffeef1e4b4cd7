//! Index of low level request parameter types.
//!
//! `SearchRequestParameters` is indexed as `SearchRequest`, so a high level
//! request can be matched with the query-string parameters it supports.

use crate::registry::{TypeDescriptor, TypeKind, TypeRegistry};
use std::collections::BTreeMap;
use tracing::info;

const PARAMETERS_SUFFIX: &str = "Parameters";

/// Normalized name → low level parameter type.
#[derive(Debug, Clone, Default)]
pub struct ParameterIndex {
    entries: BTreeMap<String, TypeDescriptor>,
}

impl ParameterIndex {
    /// Index every low level class named `*RequestParameters`, abstract or not.
    pub fn build(registry: &TypeRegistry) -> Self {
        let entries: BTreeMap<_, _> = registry
            .low_level()
            .types()
            .iter()
            .filter(|t| t.kind == TypeKind::Class && t.bare_name().ends_with("RequestParameters"))
            .filter_map(|t| {
                t.bare_name()
                    .strip_suffix(PARAMETERS_SUFFIX)
                    .map(|name| (name.to_string(), t.clone()))
            })
            .collect();

        info!(parameters = entries.len(), "parameter index built");
        Self { entries }
    }

    /// Parameter type for a request name such as `SearchRequest`.
    pub fn get(&self, request_name: &str) -> Option<&TypeDescriptor> {
        self.entries.get(request_name)
    }

    /// Number of indexed parameter types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
